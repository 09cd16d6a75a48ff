//! Crudpath – filter grammars for the list endpoints of REST-style CRUD routes.
//!
//! A model is declared as typed properties. From those declarations crudpath
//! derives, for the model's list endpoint, a grammar of positional filters
//! that live entirely in the path:
//!
//! ```text
//! GET /people/name/startsWith/Al/age/between/18/65
//! ```
//!
//! Three steps are involved:
//! * Every property yields its *keywords*, the legal `(noun, verb, arity)`
//!   combinations, as decided by the capability flags of its type.
//! * The keywords are compiled into a [`syntax::Grammar`] where every noun
//!   has a fixed width, giving a fixed-length template of optional
//!   placeholders (`/:p0?/:p1?...`) that a router compiles once.
//! * At request time the path segments are decoded, left to right, into
//!   type-checked filter criteria.
//!
//! ## Modules
//! * [`datatype`] – Type descriptors: primitive kind, bounds, the capability
//!   flags (enumerable, fragmentable, comparable, searchable) and an optional
//!   absent-value marker, plus token conversion.
//! * [`typedecl`] – Parser for declarations such as `STRING(64)` (grammar in `typedecl.pest`).
//! * [`construct`] – Properties, models and the [`construct::ModelKeeper`].
//! * [`syntax`] – Keywords, verbs and grammar compilation.
//! * [`decoder`] – The positional decoder and its [`decoder::DecodeResult`].
//! * [`endpoint`] – CRUD endpoint descriptors and list path segment extraction.
//! * [`settings`] – Model schemas read from a settings file.
//!
//! ## Keywords
//! | Capability | Keywords |
//! |---|---|
//! | fragmentable | `is`, `startsWith`, `endsWith`, `contains` |
//! | enumerable | bare equality (no verb token) |
//! | comparable | `before`/`after` for dates, else `lessThan`/`moreThan`; `between` (two values); bare equality |
//! | absent-value marker | `has` (boolean value) |
//!
//! When any property is searchable the grammar also gets the noun `s`, a
//! free-text search taking one string.
//!
//! ## Errors
//! Decoding never fails as such: the first malformed segment stops decoding
//! and is reported in the result next to the criteria decoded before it.
//! Building a model fails on schema mistakes such as duplicate keys.
//!
//! ## Quick Start
//! ```
//! use crudpath::construct::{Model, Property};
//! use crudpath::datatype::DataType;
//!
//! let model = Model::new(
//!     "person",
//!     Property::new("id", DataType::integer(i64::MAX)),
//!     vec![
//!         Property::new("name", DataType::string(64)),
//!         Property::new("age", DataType::integer(150)),
//!     ],
//! )
//! .unwrap();
//! let grammar = model.grammar();
//! // name takes 3 positions, age 4 and the search noun 2
//! assert_eq!(grammar.path_length(), 9);
//! let result = grammar.decode(&["name", "startsWith", "Al", "age", "between", "18", "65"]);
//! assert!(result.is_ok());
//! assert_eq!(
//!     serde_json::to_value(&result).unwrap()["criteria"],
//!     serde_json::json!({ "name": { "startsWith": "Al" }, "age": { "between": [18, 65] } })
//! );
//! ```

pub mod construct;
pub mod datatype;
pub mod decoder;
pub mod endpoint;
pub mod error;
pub mod settings;
pub mod syntax;
pub mod typedecl;

pub use error::{CrudpathError, Result};
