/// Runtime value representation.
///
/// Defines the `Value` enum with every value kind the evaluator can
/// produce: numbers, booleans, nil, strings, arrays, tuples, hashes,
/// closures, builtins, structs, regular expressions, files, the `os`
/// facade and host-supplied values. Provides `inspect` rendering,
/// truthiness, type names and equality.
pub mod core;
/// Hash keys for hash literals and hash indexing.
///
/// Defines the `HashKey` type: the stable equality key used by the
/// `Hash` value kind. Numbers, booleans, strings and tuples of those
/// are hashable; everything else is rejected with a runtime error.
pub mod hash_key;
/// Intrinsic methods on values.
///
/// Implements the per-kind method tables behind `obj.method(args)`
/// dispatch: `Number.ceil`, `String.upper`, `Array.push`, `Hash.keys`,
/// `Tuple.get`, `Boolean.toYesNo`, `RegEx.match`, `File.readLine`,
/// `os.getenv` and friends.
pub mod methods;
