//! Textual type declarations, as found in model settings.
//!
//! A declaration is a type name optionally followed by arguments, e.g.
//! `STRING(64)`, `INTEGER(1000)`, `FLOAT(-1, 1)` or `DATEONLY`. The grammar
//! lives in `typedecl.pest`. [`DataType::declaration`] renders the shortest
//! declaration that parses back into the same type.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::datatype::{ADDRESS_LEN, DEFAULT_TEXT_LEN, DataType, LONG_TEXT_LEN, TypeKind};
use crate::error::{CrudpathError, Result};

#[derive(Parser)]
#[grammar = "typedecl.pest"]
struct TypeDeclarationParser;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Argument {
    Number(f64),
    Infinity { negative: bool },
}
impl Argument {
    fn as_f64(&self) -> f64 {
        match self {
            Argument::Number(x) => *x,
            Argument::Infinity { negative: true } => f64::NEG_INFINITY,
            Argument::Infinity { negative: false } => f64::INFINITY,
        }
    }
}

fn declaration_error(declaration: &str, message: impl Into<String>) -> CrudpathError {
    CrudpathError::TypeDeclaration {
        declaration: declaration.to_owned(),
        message: message.into(),
    }
}

fn parse_argument(declaration: &str, pair: Pair<Rule>) -> Result<Argument> {
    match pair.as_rule() {
        Rule::infinity => Ok(Argument::Infinity {
            negative: pair.as_str().starts_with('-'),
        }),
        Rule::number => pair
            .as_str()
            .parse::<f64>()
            .map(Argument::Number)
            .map_err(|e| declaration_error(declaration, e.to_string())),
        rule => Err(declaration_error(declaration, format!("unexpected {:?}", rule))),
    }
}

/// Parses a declaration such as `STRING(64)` into a type descriptor.
/// Type names are case-insensitive.
pub fn parse_declaration(declaration: &str) -> Result<DataType> {
    let pair = TypeDeclarationParser::parse(Rule::declaration, declaration.trim())
        .map_err(|e| declaration_error(declaration, e.to_string()))?
        .next()
        .ok_or_else(|| declaration_error(declaration, "empty declaration"))?;

    let mut name = String::new();
    let mut arguments = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => name = inner.as_str().to_uppercase(),
            Rule::arguments => {
                for argument in inner.into_inner() {
                    arguments.push(parse_argument(declaration, argument)?);
                }
            }
            _ => (),
        }
    }
    build(declaration, &name, &arguments)
}

fn expect_at_most(declaration: &str, arguments: &[Argument], n: usize) -> Result<()> {
    if arguments.len() > n {
        return Err(declaration_error(
            declaration,
            format!("expected at most {} argument(s), found {}", n, arguments.len()),
        ));
    }
    Ok(())
}

fn length_argument(declaration: &str, argument: Option<&Argument>, default: usize) -> Result<usize> {
    match argument {
        None => Ok(default),
        Some(Argument::Number(x)) if x.fract() == 0.0 && *x >= 0.0 => Ok(*x as usize),
        Some(_) => Err(declaration_error(declaration, "length must be a non-negative integer")),
    }
}

fn integer_bound(declaration: &str, argument: Option<&Argument>) -> Result<i64> {
    match argument {
        None | Some(Argument::Infinity { negative: false }) => Ok(i64::MAX),
        Some(Argument::Number(x)) if x.fract() == 0.0 && *x >= 0.0 && *x < i64::MAX as f64 => Ok(*x as i64),
        Some(_) => Err(declaration_error(declaration, "bound must be a non-negative integer")),
    }
}

fn text(name: &'static str, max_len: usize) -> DataType {
    DataType::new(name, TypeKind::Text { max_len })
}

fn build(declaration: &str, name: &str, arguments: &[Argument]) -> Result<DataType> {
    let data_type = match name {
        "STRING" | "BINARY" => {
            expect_at_most(declaration, arguments, 1)?;
            let max_len = length_argument(declaration, arguments.first(), DEFAULT_TEXT_LEN)?;
            text(if name == "STRING" { "STRING" } else { "BINARY" }, max_len)
        }
        "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" => {
            expect_at_most(declaration, arguments, 1)?;
            let max = integer_bound(declaration, arguments.first())?;
            let name = match name {
                "BIGINT" => "BIGINT",
                "SMALLINT" => "SMALLINT",
                "TINYINT" => "TINYINT",
                _ => "INTEGER",
            };
            DataType::new(name, TypeKind::Integer { min: -max, max })
        }
        "FLOAT" | "REAL" | "DOUBLE" => {
            expect_at_most(declaration, arguments, 2)?;
            let min = arguments.first().map_or(f64::NEG_INFINITY, Argument::as_f64);
            let max = arguments.get(1).map_or(f64::INFINITY, Argument::as_f64);
            if min > max {
                return Err(declaration_error(declaration, "minimum exceeds maximum"));
            }
            let name = match name {
                "REAL" => "REAL",
                "DOUBLE" => "DOUBLE",
                _ => "FLOAT",
            };
            DataType::new(name, TypeKind::Float { min, max })
        }
        _ => {
            expect_at_most(declaration, arguments, 0)?;
            match name {
                "TEXT" => text("TEXT", LONG_TEXT_LEN),
                "CITEXT" => text("CITEXT", LONG_TEXT_LEN),
                "BLOB" => text("BLOB", LONG_TEXT_LEN),
                "TINYTEXT" => text("TINYTEXT", DEFAULT_TEXT_LEN),
                "TINYBLOB" => text("TINYBLOB", DEFAULT_TEXT_LEN),
                "UUID" => text("UUID", ADDRESS_LEN),
                "CIDR" => text("CIDR", ADDRESS_LEN),
                "INET" => text("INET", ADDRESS_LEN),
                "MACADDR" => text("MACADDR", ADDRESS_LEN),
                "DECIMAL" => DataType::decimal(),
                "DATETIME" => DataType::datetime(),
                "DATEONLY" => DataType::dateonly(),
                "TIMEONLY" => DataType::timeonly(),
                "BOOLEAN" => DataType::boolean(),
                "JSON" => DataType::json(),
                "JSONB" => DataType::new("JSONB", TypeKind::Structured),
                _ => return Err(declaration_error(declaration, format!("unknown type {}", name))),
            }
        }
    };
    Ok(data_type)
}

fn render_bound(x: f64) -> String {
    if x == f64::INFINITY {
        String::from("Infinity")
    } else if x == f64::NEG_INFINITY {
        String::from("-Infinity")
    } else {
        x.to_string()
    }
}

impl DataType {
    /// The declaration this type was (or could have been) written as, with
    /// trailing default arguments left out.
    pub fn declaration(&self) -> String {
        match *self.kind() {
            TypeKind::Text { max_len } if matches!(self.name(), "STRING" | "BINARY") => {
                if max_len == DEFAULT_TEXT_LEN {
                    self.name().to_owned()
                } else {
                    format!("{}({})", self.name(), max_len)
                }
            }
            TypeKind::Integer { max, .. } => {
                if max == i64::MAX {
                    self.name().to_owned()
                } else {
                    format!("{}({})", self.name(), max)
                }
            }
            TypeKind::Float { min, max } => match (min == f64::NEG_INFINITY, max == f64::INFINITY) {
                (true, true) => self.name().to_owned(),
                (_, true) => format!("{}({})", self.name(), render_bound(min)),
                _ => format!("{}({}, {})", self.name(), render_bound(min), render_bound(max)),
            },
            _ => self.name().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Primitive;

    #[test]
    fn parses_named_types() {
        let s = parse_declaration("STRING(64)").unwrap();
        assert_eq!(*s.kind(), TypeKind::Text { max_len: 64 });
        assert_eq!(parse_declaration("string").unwrap(), DataType::string(DEFAULT_TEXT_LEN));
        assert_eq!(*parse_declaration("UUID").unwrap().kind(), TypeKind::Text { max_len: ADDRESS_LEN });
        let i = parse_declaration("INTEGER(1000)").unwrap();
        assert_eq!(*i.kind(), TypeKind::Integer { min: -1000, max: 1000 });
        assert_eq!(
            *parse_declaration("FLOAT(-1, 1)").unwrap().kind(),
            TypeKind::Float { min: -1.0, max: 1.0 }
        );
        assert_eq!(parse_declaration("DATEONLY").unwrap().primitive(), Primitive::Date);
        assert_eq!(parse_declaration(" BOOLEAN ").unwrap(), DataType::boolean());
    }

    #[test]
    fn infinity_arguments() {
        assert_eq!(
            parse_declaration("INTEGER(Infinity)").unwrap(),
            parse_declaration("INTEGER").unwrap()
        );
        assert_eq!(
            *parse_declaration("DOUBLE(-infinity, 10)").unwrap().kind(),
            TypeKind::Float { min: f64::NEG_INFINITY, max: 10.0 }
        );
    }

    #[test]
    fn rejects_malformed_declarations() {
        for bad in ["", "STRING(", "STRING(1, 2)", "STRING(-1)", "INTEGER(1.5)", "FLOAT(2, 1)", "VARCHAR", "UUID(3)"] {
            let err = parse_declaration(bad).unwrap_err();
            assert!(matches!(err, CrudpathError::TypeDeclaration { .. }), "{bad}: {err}");
        }
    }

    #[test]
    fn declaration_renders_back() {
        for text in ["STRING", "STRING(64)", "BIGINT(100)", "INTEGER", "FLOAT", "REAL(-1, 1)", "FLOAT(0)", "TEXT", "DATETIME", "JSONB"] {
            let data_type = parse_declaration(text).unwrap();
            assert_eq!(data_type.declaration(), text);
            assert_eq!(parse_declaration(&data_type.declaration()).unwrap(), data_type);
        }
    }
}
