use std::{cell::RefCell, rc::Rc};

use magpie::{interpreter::{evaluator::core::Evaluator,
                           host::{HostCallable, HostValue, ResourceProvider},
                           lexer::Lexer,
                           parser::core::Parser,
                           scope::Scope,
                           value::core::Value},
             run_source, run_with_resources};
use walkdir::WalkDir;

/// Runs a script and returns `(value inspect, captured output)`.
fn run(source: &str) -> Result<(String, String), String> {
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let result = run_source(source, buffer.clone());
    let output = String::from_utf8(buffer.borrow().clone()).expect("output is valid utf-8");
    match result {
        Ok(value) => Ok((value.to_string(), output)),
        Err(error) => Err(error.to_string()),
    }
}

fn assert_value(source: &str, expected: &str) {
    match run(source) {
        Ok((value, _)) => {
            assert_eq!(value, expected, "script: {source}");
        },
        Err(error) => panic!("script failed: {source}\n{error}"),
    }
}

fn assert_output(source: &str, expected: &str) {
    match run(source) {
        Ok((_, output)) => assert_eq!(output, expected, "script: {source}"),
        Err(error) => panic!("script failed: {source}\n{error}"),
    }
}

fn assert_error(source: &str) -> String {
    match run(source) {
        Ok((value, _)) => panic!("script succeeded with '{value}' but was expected to fail: \
                                  {source}"),
        Err(error) => error,
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_value("1 + 2", "3");
    assert_value("-1 - 2.333", "-3.333");
    assert_value("2 + (3 * 4) / (6 - 3) + 10", "16");
    assert_value("2 + 3 * 4 / 6 - 3 + 10", "11");
    assert_value("(5 + 2) * (4 - 2) + 6", "20");
    assert_value("5 + 2.1 * 4 - 2 + 6.2", "17.6");
    assert_value("10 % 3", "1");
}

#[test]
fn power_is_right_associative() {
    assert_value("2 + 2 ** 2 ** 3", "258");
    assert_value("2 ** 3 ** 2", "512");

    let mut parser = Parser::new(Lexer::new("a ** b ** c"));
    let program = parser.parse_program();
    assert!(parser.errors().is_empty());
    assert_eq!(program.to_string(), "(a ** (b ** c))");
}

#[test]
fn division_by_zero_is_an_error() {
    let message = assert_error("1 / 0");
    assert!(message.contains("Divide by zero"), "{message}");
    assert_error("let x = 4; x /= 0");
}

#[test]
fn truthiness_and_bang() {
    assert_value("!true", "false");
    assert_value("!false", "true");
    assert_value("!nil", "true");
    assert_value("!-5", "false");
    assert_value("!!!!-5", "true");
    assert_value("!0", "true");
    assert_value("!\"\"", "true");
    assert_value("!()", "true");
    assert_value("![]", "true");
}

#[test]
fn logical_operators_short_circuit() {
    assert_value("10 == 10 && 10 > 5", "true");
    assert_value("10 == 10 || 10 > 12", "true");
    assert_value("10 == 11 || 10 > 12", "false");
    // The right side must not run when the left decides the result.
    assert_value("false && boom()", "false");
    assert_value("true || boom()", "true");
}

#[test]
fn chained_comparisons() {
    assert_value("1 < 2 < 3", "true");
    assert_value("3 < 2 < 10", "false");
    assert_value("let a = 5; 1 < a <= 5", "true");
    assert_value("\"a\" < \"b\" < \"c\"", "true");

    let errors = magpie::check_source("1 < 2 < 3 < 4");
    assert!(!errors.is_empty());
}

#[test]
fn strings() {
    assert_value("let s = \"Hello \" + \"World!\"; s", "Hello World!");
    assert_value("\"Hello World!\".upper()", "HELLO WORLD!");
    assert_value("\"Hello\".lower()", "hello");
    assert_value("\"  pad  \".trim()", "pad");
    assert_value("\"banana\".contains(\"nan\")", "true");
    assert_value("\"banana\".replace(\"na\", \"-\")", "ba--");
    assert_value("len(\"Hello World\")", "11");
    assert_value("let s = \"hello\"; s[1]", "e");
    assert_value("let parts = \"a,b,c\".split(\",\"); parts[2]", "c");
    assert_value("\"ell\" in \"hello\"", "true");
}

#[test]
fn string_index_assignment_rebinds() {
    assert_value("a = \"hello world\"; a[2] = \"w\"; a", "hewlo world");
    assert_error("a = \"hi\"; a[5] = \"x\"");
}

#[test]
fn arrays() {
    assert_value("let arr = [1, 10.5, \"Hello\", true]; arr[1]", "10.5");
    assert_value("let arr = [1, 2]; len(arr)", "2");
    assert_value("let arr = [1]; arr.push(\"world\"); arr[1]", "world");
    assert_value("let arr = [1, 2, 3]; arr.pop(); len(arr)", "2");
    assert_value("let arr = [1, 2, 3]; arr.pop(0)", "1");
    assert_value("let arr = [1, 2, 3]; arr.pop(-1)", "3");
    assert_value("arr = [1, \"hello\", true]; arr[0] = \"good\"; arr[0]", "good");
    assert_value("2 in [1, 2, 3]", "true");
    assert_value("5 in [1, 2, 3]", "false");
}

#[test]
fn array_push_then_pop_restores_length() {
    assert_value("let a = [1, 2]; a.push(9); let popped = a.pop(); popped", "9");
    assert_value("let a = [1, 2]; a.push(9); a.pop(); len(a)", "2");
}

#[test]
fn array_auto_grow() {
    assert_value("let a = []; a[3] = \"x\"; a", "[nil, nil, nil, \"x\"]");
    assert_value("let a = []; a[3] = \"x\"; len(a)", "4");
}

#[test]
fn tuples() {
    assert_value("let tup = (1, 10.5, \"Hello\", true); tup[1]", "10.5");
    assert_value("let tup = (); len(tup)", "0");
    assert_value("let tup = (1,); len(tup)", "1");
    assert_value("(1)", "1");
    assert_value("let tup = (7, 8); tup.get(1)", "8");
    assert_value("let tup = (); tup.empty()", "true");
    assert_value("8 in (7, 8)", "true");
    assert_error("let tup = (1,); tup[0] = 10");
}

#[test]
fn hashes() {
    assert_value("let h = {\"name\": \"hhf\", \"height\": 165}; h[\"height\"]", "165");
    assert_value("let h = {}; h[\"name\"] = \"huanghaifeng\"; h[\"name\"]", "huanghaifeng");
    assert_value("let h = {\"a\": 1}; h[\"missing\"]", "nil");
    assert_value("let h = {\"a\": 1, \"b\": 2}; len(h.keys())", "2");
    assert_value("let h = {\"a\": 1}; h.pop(\"a\"); len(h)", "0");
    assert_value("let h = {\"a\": 1}; \"a\" in h", "true");
    assert_value("let h = {1.5: \"x\", 1.7: \"y\"}; h[1.7]", "y");
    assert_value("let h = {(1, 2): \"pair\"}; h[(1, 2)]", "pair");
    assert_value("let h = {}; h.set(\"k\", 1); h[\"k\"]", "1");
    assert_error("let h = {[1]: 2}");
}

#[test]
fn hash_dot_insertion() {
    assert_value("let h = {}; h.name = \"bird\"; h[\"name\"]", "bird");
}

#[test]
fn hash_iteration_visits_every_pair() {
    let (_, output) =
        run("let h = {\"name\": \"hhf\", \"height\": 165}; for k, v in h { println(k, \"=\", v) }")
            .unwrap();
    let mut lines: Vec<&str> = output.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["height=165", "name=hhf"]);
}

#[test]
fn functions_and_closures() {
    assert_value("let add = fn(x, y) { x + y }; add(1, 2)", "3");
    assert_value("fn add(x, y) { return x + y } add(2, 3)", "5");
    assert_value("let sum = fn(x, y) { return x + y }(2, 3); sum", "5");
    assert_value("fn makeAdder(n) { return (x) => x + n } let f = makeAdder(5); f(37)", "42");
    assert_value("let add = fn(x, factor) { x + factor(x) }; add(5, (x) => x * 2)", "15");
    assert_value("let z = () => 5 + 5; z()", "10");
    assert_value("let pair = (x, y) => x * y; pair(6, 7)", "42");
    assert_value("fn fib(n) { if n < 2 { return n } return fib(n - 1) + fib(n - 2) } fib(10)",
                 "55");
}

#[test]
fn closures_share_their_defining_scope() {
    assert_value("fn counter() { let n = 0; return () => { n = n + 1; n } } \
                  let c = counter(); c(); c(); c()",
                 "3");
}

#[test]
fn variadic_functions() {
    assert_value("fn tally(first, rest...) { return first + len(rest) } tally(10, 1, 2, 3)",
                 "13");
    assert_value("fn tally(args...) { return len(args) } tally(1, 2)", "2");
    assert_value("fn add(x, y) { return x + y } let args = [3, 4]; add(args...)", "7");
}

#[test]
fn wrong_arity_is_an_error() {
    assert_error("let add = fn(x, y) { x + y }; add(1)");
    assert_error("\"s\".upper(1)");
}

#[test]
fn multi_value_let_and_return() {
    assert_value("let x, y = 1, 2; x == 1 && y == 2", "true");
    assert_value("fn math(x, y) { return x + y, x - y } let a, b = math(5, 3); a", "8");
    assert_value("fn math(x, y) { return x + y, x - y } let a, b = math(5, 3); b", "2");
    assert_value("fn xxx(x, y) { return x + y, x - y, x * y } let a, _, c = xxx(5, 3); c",
                 "15");
    assert_value("let a, b = 1; type(b)", "nil");
    assert_value("let x; type(x)", "nil");
}

#[test]
fn multi_assignment_without_let() {
    assert_value("a, b, c = 1, true, \"hello\"; c", "hello");
    assert_value("fn math(x, y) { return x + y, x - y } add, sub = math(5, 3); sub", "2");
}

#[test]
fn if_else_chains() {
    assert_value("let x = 12; if x > 10 { 2 } else if x > 5 { 3 } else { 4 }", "2");
    assert_value("let x = 10; if x > 10 { 2 } else if x > 5 { 3 } else { 4 }", "3");
    assert_value("let x = 3; if x > 10 { 2 } else if x > 5 { 3 } else { 4 }", "4");
    assert_value("if false { 1 }", "nil");
    assert_value("let x = \"hello\"; if len(x) == 5 { x }", "hello");
}

#[test]
fn switch_expressions() {
    assert_value("let x = 2; let r = \"\"; switch x { case 1 { r = \"one\" } case 2, 3 { r = \
                  \"few\" } default { r = \"many\" } } r",
                 "few");
    assert_value("let x = 9; let r = \"\"; switch x { case 1 { r = \"one\" } default { r = \
                  \"many\" } } r",
                 "many");
    // Strict matching: a number never matches a boolean case.
    assert_value("let r = \"\"; switch 1 { case true { r = \"bool\" } default { r = \"num\" } \
                  } r",
                 "num");
    // Regex cases match the scrutinee's inspect form.
    assert_value("let r = \"\"; switch \"magpie\" { case /pie$/ { r = \"yes\" } default { r = \
                  \"no\" } } r",
                 "yes");
}

#[test]
fn switch_fallthrough() {
    assert_value("let r = \"\"; switch 1 { case 1 { r = r + \"a\"; fallthrough } case 2 { r = \
                  r + \"b\" } default { r = r + \"c\" } } r",
                 "ab");
    let errors = magpie::check_source("switch 1 { case 1 { fallthrough; 1 } case 2 { 2 } }");
    assert!(!errors.is_empty());
    let errors = magpie::check_source("switch 1 { case 1 { fallthrough } }");
    assert!(!errors.is_empty());
    let errors = magpie::check_source("switch 1 { default { 1 } default { 2 } }");
    assert!(!errors.is_empty());
}

#[test]
fn c_style_for_loops() {
    assert_value("let s = 0; for (i = 0; i < 5; i++) { s = s + i } s", "10");
    assert_value("let s = 0; for (i = 0; i < 5; i++) { if i == 2 { continue } s = s + i } s",
                 "8");
    assert_value("let s = 0; for (i = 0; ; i++) { if i == 3 { break } s = s + i } s", "3");
    // The loop counter is scoped to the loop.
    assert_error("for (i = 0; i < 2; i++) { 1 } i");
}

#[test]
fn foreach_loops() {
    assert_value("let out = for item in [1, 2, 3] { item * 2 }; out", "[2, 4, 6]");
    assert_value("let s = \"\"; for c in \"abc\" { s = s + c } s", "abc");
    assert_value("let s = 0; for item in (1, 2, 3) { s = s + item } s", "6");
    assert_value("let s = 0; for idx, item in [10, 20] { s = s + idx + item } s", "31");
    assert_value("let s = 0; for _, item in [10, 20] { s = s + item } s", "30");
    assert_value("for item in nil { item }", "[]");
    assert_value("let s = 0; for i in 1..4 { s = s + i } s", "10");
    assert_error("for item in 5 { item }");
}

#[test]
fn foreach_break_and_continue() {
    assert_output("arr = [1, true, \"Hello\"]; for idx, item in arr { if idx == 2 { break } \
                   println(item) }",
                  "1\ntrue\n");
    assert_value("let s = 0; for i in [1, 2, 3, 4] { if i == 2 { continue } s = s + i } s",
                 "8");
}

#[test]
fn while_and_do_loops() {
    assert_output("x = 3; while x-- > 0 { println(x) }", "2\n1\n0\n");
    assert_value("let x = 0; do { x++; if x == 4 { break } } x", "4");
    assert_value("let x = 0; for { x++; if x == 3 { break } } x", "3");
    assert_output("x = 5; while x-- > 0 { if x == 4 { continue } else if x == 2 { break } \
                   println(x) }",
                  "3\n");
}

#[test]
fn loop_keywords_need_a_loop() {
    assert!(!magpie::check_source("break").is_empty());
    assert!(!magpie::check_source("continue").is_empty());
    assert!(!magpie::check_source("fallthrough").is_empty());
}

#[test]
fn ranges() {
    assert_value("1..5", "[1, 2, 3, 4, 5]");
    assert_value("5..1", "[5, 4, 3, 2, 1]");
    assert_value("let r = 3..3; len(r)", "1");
    assert_error("\"a\"..3");
}

#[test]
fn postfix_operators() {
    assert_value("let i = 2; let x = i++; x", "2");
    assert_value("let i = 2; i++; i", "3");
    assert_value("let i = 3; i--; i", "2");
    // Only identifiers naming numbers can be incremented.
    assert_error("let x = 2++; x");
    assert_error("let s = \"a\"; s++");
}

#[test]
fn compound_assignment() {
    assert_value("let x = 2; x += 3; x", "5");
    assert_value("let x = 7; x -= 2; x", "5");
    assert_value("let x = 4; x *= 2; x", "8");
    assert_value("let x = 9; x /= 3; x", "3");
    assert_value("let x = 9; x %= 4; x", "1");
    assert_value("let s = \"ab\"; s += \"c\"; s", "abc");
    assert_error("let x = true; x += 1");
    assert_error("y += 1");
}

#[test]
fn regex_literals_and_matching() {
    assert_value("let name = \"Huang HaiFeng\"; name =~ /huang/i", "true");
    assert_value("let name = \"Huang HaiFeng\"; name !~ /xxx/", "true");
    assert_value("let name = \"Huang HaiFeng\"; name =~ /Huang/", "true");
    assert_value("/\\d+/.match(\"abc 123\")", "true");
    assert_value("let arr = / /.split(\"ba na za\"); arr[1]", "na");
    assert_value("/na/.replace(\"banana\", \"-\")", "ba--");
    // '/' after an operand is division, not a regex.
    assert_value("let a = 10; a / 2", "5");
    assert_error("\"x\" =~ 5");
}

#[test]
fn try_catch_finally() {
    assert_output("try { throw \"boom\" } catch e { println(e) } finally { println(\"done\") }",
                  "boom\ndone\n");
    assert_value("try { throw \"boom\" } catch e { \"caught\" }", "caught");
    assert_value("try { 1 } catch e { 2 }", "1");
    assert_value("try { throw 42 } catch { \"anonymous\" }", "anonymous");
    assert_value("try { throw \"x\" } catch e { 1 } finally { 2 }", "2");
    // The catch variable disappears after the handler runs.
    assert_error("try { throw \"x\" } catch e { 1 } e");
}

#[test]
fn uncaught_throw_reaches_the_top() {
    let message = assert_error("throw \"boom\"");
    assert!(message.contains("Throw object 'boom' not handled"), "{message}");
    let message = assert_error("fn f() { throw \"deep\" } f()");
    assert!(message.contains("not handled"), "{message}");
}

#[test]
fn throw_propagates_through_calls() {
    assert_value("fn f() { throw \"deep\" } try { f() } catch e { e }", "deep");
}

#[test]
fn decorators_desugar_to_calls() {
    assert_value("fn logged(f) { return (x) => f(x) + 1 } \
                  @logged fn inc(x) { return x + 10 } \
                  inc(5)",
                 "16");
    assert_value("fn double(f) { return (x) => f(x) * 2 } \
                  fn offset(f) { return (x) => f(x) + 3 } \
                  @double @offset fn base(x) { return x } \
                  base(5)",
                 "16");
    assert!(!magpie::check_source("@logged fn(x) { x }").is_empty());
    assert!(!magpie::check_source("@logged let x = 1").is_empty());
}

#[test]
fn structs() {
    let person = "struct Person { \
                      let name = \"\" \
                      fn init(n) { self.name = n } \
                      fn Greet() { return \"hi \" + self.name } \
                      fn helper() { return 1 } \
                  } ";
    assert_value(&format!("{person} let p = Person(\"bob\"); p.Greet()"), "hi bob");
    assert_value(&format!("{person} let p = Person(\"bob\"); p.name"), "bob");
    assert_value(&format!("{person} let p = Person(\"bob\"); p.name = \"eve\"; p.Greet()"),
                 "hi eve");
    // Lowercase methods are private to the struct.
    let message = assert_error(&format!("{person} let p = Person(\"bob\"); p.helper()"));
    assert!(message.contains("unexported"), "{message}");
    // Methods may call private helpers through self.
    assert_value("struct T { fn helper() { return 7 } fn Run() { return self.helper() } } \
                  let t = T(); t.Run()",
                 "7");
    // Arguments require an init constructor.
    assert_error("struct Empty { let x = 1 } let e = Empty(2)");
    assert_value("struct Empty { let x = 1 } let e = Empty(); e.x", "1");
}

#[test]
fn builtins() {
    assert_output("print(10, \"Hello\")", "10Hello");
    assert_output("println()", "\n");
    assert_output("say(\"hi\")", "hi\n");
    assert_output("printf(\"a=%g, b=%t, c=%s, d=%.2f\\n\", 1, true, \"hello\", 12.343678)",
                  "a=1, b=true, c=hello, d=12.34\n");
    assert_output("printf(\"2**3=%g, floor=%.0f\\n\", 2.pow(3), 2.34.floor())",
                  "2**3=8, floor=2\n");
    assert_value("type(10)", "number");
    assert_value("type(\"s\")", "string");
    assert_value("type(nil)", "nil");
    assert_value("type(true)", "bool");
    assert_value("type([1])", "array");
    assert_value("type((1, 2))", "tuple");
    assert_value("type({})", "hash");
    assert_value("type(fn(x) { x })", "function");
    assert_value("type(/re/)", "regex");
    assert_value("type(len)", "builtin");
    assert_value("type(os)", "os");
    assert_value("type(stdout)", "file");
    assert_error("len(5)");
}

#[test]
fn number_methods() {
    assert_value("2.pow(10)", "1024");
    assert_value("2.34.floor()", "2");
    assert_value("2.34.ceil()", "3");
    assert_value("(-2.7).trunc()", "-2");
    assert_value("9.sqrt()", "3");
    assert_value("3.14159.round(2)", "3.14");
    assert_value("42.str()", "42");
    assert_value("true.toYesNo()", "yes");
    assert_value("false.toTrueFalse()", "false");
}

#[test]
fn open_files_roundtrip() {
    let path = std::env::temp_dir().join("magpie_lang_test.txt");
    let path_str = path.to_string_lossy().replace('\\', "/");

    let script = format!("let f, err = open(\"{path_str}\", \"w\"); \
                          f.writeLine(\"first\"); \
                          f.writeString(\"second\"); \
                          f.close(); \
                          let g, err2 = open(\"{path_str}\", \"r\"); \
                          let line = g.readLine(); \
                          let rest = g.readLine(); \
                          g.close(); \
                          line + \"|\" + rest");
    assert_value(&script, "first|second");

    let script = format!("let f, err = open(\"{path_str}\"); f.name()");
    assert_value(&script, &path_str);

    assert_value("let f, err = open(\"/definitely/not/here.txt\"); type(err)", "error");
    assert_value("let f, err = open(\"x\", \"bogus\"); type(f)", "nil");

    let _ = std::fs::remove_file(path);
}

#[test]
fn os_facade() {
    // SAFETY: tests in this binary run single-threaded with respect to
    // this variable.
    unsafe {
        std::env::set_var("MAGPIE_TEST_VAR", "feather");
    }
    assert_value("os.getenv(\"MAGPIE_TEST_VAR\")", "feather");
    assert_value("os.getenv(\"MAGPIE_UNSET_VAR_XYZ\")", "");
    assert_value("os.setenv(\"MAGPIE_TEST_VAR2\", \"v\")", "true");
    assert_value("os.getenv(\"MAGPIE_TEST_VAR2\")", "v");
}

#[test]
fn imports_and_exports() {
    assert_value("import demos.mylib; Add(2, 3)", "5");
    assert_value("import demos.mylib; Fib(10)", "55");
    assert_value("import demos.mylib; Version", "1.0");
    // Importing twice behaves like importing once.
    assert_value("import demos.mylib; import demos.mylib; Add(1, 1)", "2");
    // Lowercase names stay private.
    assert_error("import demos.mylib; add(2, 3)");
    assert_error("import demos.mylib; secret");
    assert_error("import demos.no_such_module; 1");
}

#[test]
fn host_function_registration() {
    let evaluator = Evaluator::new();
    let add: Rc<dyn HostCallable> = Rc::new(|args: &[Value]| -> Result<Value, String> {
        match (&args[0], &args[1]) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ => Err("Add expects numbers".to_string()),
        }
    });
    evaluator.register_functions("mathx", vec![("Add", add)]).unwrap();
    evaluator.register_vars("sys", vec![("Platform", HostValue::Str("test-os".to_string())),
                                        ("Cpus", HostValue::Number(4.0))])
             .unwrap();

    let eval = |source: &str| -> Result<String, String> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        let scope = Scope::root(Rc::new(RefCell::new(Vec::<u8>::new())));
        evaluator.eval_program(&program, &scope)
                 .map(|value| value.to_string())
                 .map_err(|error| error.to_string())
    };

    assert_eq!(eval("mathx.Add(2, 3)").unwrap(), "5");
    assert_eq!(eval("sys.Platform").unwrap(), "test-os");
    assert_eq!(eval("sys.Cpus + 1").unwrap(), "5");
    assert_eq!(eval("if sys.Cpus { \"some\" } else { \"none\" }").unwrap(), "some");

    let message = eval("mathx.add(2, 3)").unwrap_err();
    assert!(message.contains("Did you mean 'mathx.Add'?"), "{message}");

    let message = eval("mathx.Add(\"a\", 3)").unwrap_err();
    assert!(message.contains("Add expects numbers"), "{message}");

    // Dotted names are rejected at registration time.
    let dotted: Rc<dyn HostCallable> =
        Rc::new(|_: &[Value]| -> Result<Value, String> { Ok(Value::Nil) });
    assert!(evaluator.register_functions("ns", vec![("bad.name", dotted)]).is_err());
}

#[test]
fn host_panics_become_errors() {
    let evaluator = Evaluator::new();
    let boom: Rc<dyn HostCallable> =
        Rc::new(|_: &[Value]| -> Result<Value, String> { panic!("kaboom") });
    evaluator.register_functions("bad", vec![("Boom", boom)]).unwrap();

    let mut parser = Parser::new(Lexer::new("bad.Boom()"));
    let program = parser.parse_program();
    let scope = Scope::root(Rc::new(RefCell::new(Vec::<u8>::new())));
    let error = evaluator.eval_program(&program, &scope).unwrap_err();
    assert!(error.to_string().contains("kaboom"), "{error}");
}

#[test]
fn resource_attachment_supplies_main() {
    struct Fixture;
    impl ResourceProvider for Fixture {
        fn list(&self) -> Vec<String> {
            vec!["main".to_string()]
        }

        fn get_resource(&self, name: &str) -> Option<Vec<u8>> {
            (name == "main").then(|| b"40 + 2".to_vec())
        }
    }

    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    let value = run_with_resources(&Fixture, buffer).unwrap().unwrap();
    assert_eq!(value.to_string(), "42");

    struct Empty;
    impl ResourceProvider for Empty {
        fn list(&self) -> Vec<String> {
            Vec::new()
        }

        fn get_resource(&self, _name: &str) -> Option<Vec<u8>> {
            None
        }
    }
    let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
    assert!(run_with_resources(&Empty, buffer).is_none());
}

#[test]
fn identity_equality_for_reference_kinds() {
    assert_value("let a = [1]; let b = a; a == b", "true");
    assert_value("[1] == [1]", "false");
    assert_value("nil == nil", "true");
    assert_value("1 == \"1\"", "false");
    assert_value("true != 1", "true");
}

#[test]
fn blocks_and_scoping() {
    assert_value("{ let x = 10 { x } }", "10");
    // `let` inside a standalone block stays in the block.
    assert_error("{ let hidden = 1 } hidden");
    // Plain assignment updates the defining scope.
    assert_value("let x = 1; { x = 2 } x", "2");
}

#[test]
fn unknown_identifiers() {
    let message = assert_error("let y = x + 1");
    assert!(message.contains("'x' is not defined"), "{message}");
}

#[test]
fn parse_errors_are_reported() {
    assert!(!magpie::check_source("\"unterminated").is_empty());
    assert!(!magpie::check_source("/* never closed").is_empty());
    assert!(!magpie::check_source("x = /abc").is_empty());
    assert!(!magpie::check_source("for _, _ in [1] { 1 }").is_empty());
    assert!(!magpie::check_source("let 5 = 3").is_empty());
    assert!(!magpie::check_source("self = 1").is_empty());
    // Errors accumulate instead of stopping at the first.
    assert!(magpie::check_source("let 5 = 3; let 6 = 4").len() >= 2);
}

#[test]
fn reparsing_rendered_programs_preserves_values() {
    for source in ["2 + 3 * 4", "2 ** 3 ** 2", "1 < 2 < 3", "!(1 > 2) && true"] {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "{source}");

        let rendered = program.to_string();
        let (original, _) = run(source).unwrap();
        let (reparsed, _) = run(&rendered).unwrap();
        assert_eq!(original, reparsed, "{source} vs {rendered}");
    }
}

#[cfg(unix)]
#[test]
fn command_literals_capture_stdout() {
    assert_value("`echo feather`", "feather");
    assert_value("let out = `printf ab`; out + \"!\"", "ab!");
    assert_error("`exit 3`");
}

#[test]
fn tailcall_returns_the_call_result() {
    assert_value("fn down(n) { if n == 0 { return \"done\" } tailcall down(n - 1) } down(5)",
                 "done");
    assert!(!magpie::check_source("tailcall 5").is_empty());
}

#[test]
fn demo_scripts_run_clean() {
    let mut count = 0;
    for entry in WalkDir::new("demos").into_iter()
                                      .filter_map(Result::ok)
                                      .filter(|e| {
                                          e.path().extension().is_some_and(|ext| ext == "mp")
                                      })
    {
        count += 1;
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        if let Err(error) = magpie::run_file(entry.path(), buffer) {
            panic!("demo {:?} failed: {error}", entry.path());
        }
    }
    assert!(count > 0, "no demo scripts found under demos/");
}

#[test]
fn demo_output_is_stable() {
    let buffer = Rc::new(RefCell::new(Vec::new()));
    magpie::run_file(std::path::Path::new("demos/imports.mp"), buffer.clone()).unwrap();
    let output = String::from_utf8(buffer.borrow().clone()).unwrap();
    assert_eq!(output, "5\n55\n1.0\n");
}
