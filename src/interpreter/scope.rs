use std::{cell::RefCell,
          collections::HashMap,
          io::Write,
          rc::Rc};

use crate::{ast::StructDecl, interpreter::value::core::Value};

/// The output sink carried by every scope and used by `print`,
/// `println` and `printf`. Tests capture output by passing a
/// `Vec<u8>`.
pub type OutputWriter = Rc<RefCell<dyn Write>>;

/// A lexical environment: a name→value map, a parallel map of struct
/// declarations, a link to the enclosing scope and the inherited
/// output writer.
///
/// Scopes form a tree rooted at the program scope. Function calls,
/// struct instantiations, standalone blocks and loop bodies each get a
/// child scope; closures keep their defining scope alive through the
/// `Rc` link.
///
/// # Example
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use magpie::interpreter::{scope::Scope, value::core::Value};
///
/// let scope = Scope::root(Rc::new(RefCell::new(Vec::<u8>::new())));
/// scope.define("x", Value::Number(1.0));
/// let child = Scope::child(&scope);
/// // Plain assignment updates the defining scope.
/// child.assign("x", Value::Number(2.0));
/// assert!(matches!(scope.get("x"), Some(Value::Number(n)) if n == 2.0));
/// ```
pub struct Scope {
    values:  RefCell<HashMap<String, Value>>,
    structs: RefCell<HashMap<String, Rc<StructDecl>>>,
    parent:  Option<Rc<Scope>>,
    writer:  OutputWriter,
}

impl Scope {
    /// Creates a root scope writing to `writer`.
    #[must_use]
    pub fn root(writer: OutputWriter) -> Rc<Self> {
        Rc::new(Self { values: RefCell::new(HashMap::new()),
                       structs: RefCell::new(HashMap::new()),
                       parent: None,
                       writer })
    }

    /// Creates a child scope. The writer is inherited from the parent.
    #[must_use]
    pub fn child(parent: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self { values:  RefCell::new(HashMap::new()),
                       structs: RefCell::new(HashMap::new()),
                       parent:  Some(Rc::clone(parent)),
                       writer:  Rc::clone(&parent.writer), })
    }

    /// Looks a name up through the scope chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.borrow().get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Binds a name in this scope, shadowing any outer binding.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Assigns to the nearest scope that already binds `name`; if none
    /// does, the name is created in this scope.
    pub fn assign(&self, name: &str, value: Value) {
        if !self.try_assign(name, &value) {
            self.define(name, value);
        }
    }

    fn try_assign(&self, name: &str, value: &Value) -> bool {
        if let Some(slot) = self.values.borrow_mut().get_mut(name) {
            *slot = value.clone();
            return true;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.try_assign(name, value))
    }

    /// Removes a binding from this scope (outer scopes are untouched).
    pub fn delete(&self, name: &str) {
        self.values.borrow_mut().remove(name);
    }

    /// Looks a struct declaration up through the scope chain.
    #[must_use]
    pub fn get_struct(&self, name: &str) -> Option<Rc<StructDecl>> {
        match self.structs.borrow().get(name) {
            Some(decl) => Some(Rc::clone(decl)),
            None => self.parent.as_ref().and_then(|parent| parent.get_struct(name)),
        }
    }

    /// Records a struct declaration in this scope.
    pub fn define_struct(&self, decl: Rc<StructDecl>) {
        self.structs.borrow_mut().insert(decl.name.clone(), decl);
    }

    /// Copies every uppercase-initial name and struct declaration into
    /// `target`. This is the export step of `import`: lowercase names
    /// stay private to their module.
    pub fn get_all_exported(&self, target: &Self) {
        for (name, value) in self.values.borrow().iter() {
            if name.chars().next().is_some_and(char::is_uppercase) {
                target.define(name, value.clone());
            }
        }
        for (name, decl) in self.structs.borrow().iter() {
            if name.chars().next().is_some_and(char::is_uppercase) {
                target.define_struct(Rc::clone(decl));
            }
        }
    }

    /// The output sink inherited by this scope.
    #[must_use]
    pub fn writer(&self) -> OutputWriter {
        Rc::clone(&self.writer)
    }

    /// A snapshot of the bindings in this scope (not its parents),
    /// used by struct inspection.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.values
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
         .field("values", &self.values.borrow().keys().collect::<Vec<_>>())
         .field("structs", &self.structs.borrow().keys().collect::<Vec<_>>())
         .field("has_parent", &self.parent.is_some())
         .finish_non_exhaustive()
    }
}
