//! Positional decoding of list path segments into filter criteria.
//!
//! Tokens are consumed strictly left to right: a noun, an optional verb and
//! as many values as the selected keyword takes. The first malformed segment
//! ends decoding, since every later token would be read at the wrong
//! position. Criteria resolved before that point are kept next to the error.

use std::collections::{BTreeMap, VecDeque};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, trace};

use crate::datatype::Value;
use crate::syntax::{Grammar, Verb, VerbName};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown noun '{noun}'")]
    UnknownNoun { noun: String },
    #[error("Unknown verb '{}' for noun '{noun}'", .verb.as_deref().unwrap_or(""))]
    UnknownVerb { verb: Option<String>, noun: String },
    #[error("Missing value for noun '{noun}'")]
    MissingValue { noun: String },
    #[error("Invalid value '{token}' for noun '{noun}'")]
    InvalidValue { noun: String, token: String },
}
impl DecodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::UnknownNoun { .. } => "UnknownNoun",
            DecodeError::UnknownVerb { .. } => "UnknownVerb",
            DecodeError::MissingValue { .. } => "MissingValue",
            DecodeError::InvalidValue { .. } => "InvalidValue",
        }
    }
    pub fn noun(&self) -> &str {
        match self {
            DecodeError::UnknownNoun { noun }
            | DecodeError::UnknownVerb { noun, .. }
            | DecodeError::MissingValue { noun }
            | DecodeError::InvalidValue { noun, .. } => noun,
        }
    }
}
impl Serialize for DecodeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", self.kind())?;
        map.serialize_entry("noun", self.noun())?;
        match self {
            DecodeError::UnknownVerb { verb, .. } => map.serialize_entry("verb", verb)?,
            DecodeError::InvalidValue { token, .. } => map.serialize_entry("token", token)?,
            _ => (),
        }
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}

// ------------- Operand -------------
/// A single value, or the ordered `[lower, upper]` pair of a range.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(Value),
    Range(Value, Value),
}
impl Serialize for Operand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Operand::Single(value) => value.serialize(serializer),
            Operand::Range(lower, upper) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(lower)?;
                seq.serialize_element(upper)?;
                seq.end()
            }
        }
    }
}

// ------------- Criterion -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub noun: String,
    pub verb: Verb,
    pub operand: Operand,
}

// ------------- DecodeResult -------------
pub type Criteria = BTreeMap<String, BTreeMap<Verb, Operand>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodeResult {
    criteria: Criteria,
    error: Option<DecodeError>,
    tokens: Vec<String>,
}
impl DecodeResult {
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }
    pub fn get(&self, noun: &str, verb: Verb) -> Option<&Operand> {
        self.criteria.get(noun)?.get(&verb)
    }
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
    /// The raw tokens exactly as they were handed to the decoder.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
    // Verbs of one noun coexist; a repeated verb keeps the later value, and
    // the two spellings of equality count as the same verb.
    fn merge(&mut self, criterion: Criterion) {
        let verbs = self.criteria.entry(criterion.noun).or_default();
        if criterion.verb.is_equality() {
            verbs.retain(|verb, _| !verb.is_equality());
        }
        verbs.insert(criterion.verb, criterion.operand);
    }
}

struct Verbs<'a>(&'a BTreeMap<Verb, Operand>);
impl Serialize for Verbs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (verb, operand) in self.0 {
            map.serialize_entry(verb.name(), operand)?;
        }
        map.end()
    }
}
struct Nouns<'a>(&'a Criteria);
impl Serialize for Nouns<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (noun, verbs) in self.0 {
            map.serialize_entry(noun, &Verbs(verbs))?;
        }
        map.end()
    }
}
impl Serialize for DecodeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("criteria", &Nouns(&self.criteria))?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.serialize_entry("tokens", &self.tokens)?;
        map.end()
    }
}

// ------------- Decoding -------------
/// Consumes one noun segment from the front of `tokens`. Returns `Ok(None)`
/// once no tokens remain.
pub fn extract_next(grammar: &Grammar, tokens: &mut VecDeque<&str>) -> Result<Option<Criterion>, DecodeError> {
    let Some(noun) = tokens.pop_front() else {
        return Ok(None);
    };
    let syntax = grammar.noun(noun).ok_or_else(|| DecodeError::UnknownNoun {
        noun: noun.to_owned(),
    })?;

    let candidate = tokens.front().copied();
    let explicit = candidate
        .and_then(VerbName::from_token)
        .and_then(|verb| syntax.keyword(Verb::Explicit(verb)));
    let keyword = match explicit {
        Some(keyword) => {
            tokens.pop_front();
            keyword
        }
        None => syntax.bare().ok_or_else(|| DecodeError::UnknownVerb {
            verb: candidate.map(str::to_owned),
            noun: noun.to_owned(),
        })?,
    };

    if tokens.len() < keyword.arity() {
        return Err(DecodeError::MissingValue { noun: noun.to_owned() });
    }
    let value = |i: usize| {
        let token = tokens[i];
        keyword
            .data_type()
            .from_string(token)
            .ok_or_else(|| DecodeError::InvalidValue {
                noun: noun.to_owned(),
                token: token.to_owned(),
            })
    };
    let operand = match keyword.arity() {
        2 => Operand::Range(value(0)?, value(1)?),
        _ => Operand::Single(value(0)?),
    };
    tokens.drain(..keyword.arity());
    Ok(Some(Criterion {
        noun: noun.to_owned(),
        verb: keyword.verb(),
        operand,
    }))
}

/// Decodes a sequence of path segments against a compiled grammar.
/// Never fails: a malformed segment is reported in [`DecodeResult::error`].
pub fn decode<S: AsRef<str>>(grammar: &Grammar, tokens: &[S]) -> DecodeResult {
    let mut result = DecodeResult {
        tokens: tokens.iter().map(|t| t.as_ref().to_owned()).collect(),
        ..DecodeResult::default()
    };
    let mut remaining: VecDeque<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    loop {
        match extract_next(grammar, &mut remaining) {
            Ok(Some(criterion)) => {
                trace!(noun = %criterion.noun, verb = criterion.verb.name(), "decoded criterion");
                result.merge(criterion);
            }
            Ok(None) => break,
            Err(error) => {
                debug!(%error, remaining = remaining.len(), "decoding stopped");
                result.error = Some(error);
                break;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Property;
    use crate::datatype::{Capabilities, DataType};

    fn grammar() -> Grammar {
        Grammar::compile(&[
            Property::new("name", DataType::string(64)),
            Property::new("age", DataType::integer(150)),
        ])
        .unwrap()
    }

    #[test]
    fn extract_next_consumes_one_segment() {
        let grammar = grammar();
        let mut tokens: VecDeque<&str> = ["age", "lessThan", "30", "name", "Al"].into_iter().collect();
        let criterion = extract_next(&grammar, &mut tokens).unwrap().unwrap();
        assert_eq!(criterion.verb, Verb::Explicit(VerbName::LessThan));
        assert_eq!(criterion.operand, Operand::Single(Value::Integer(30)));
        assert_eq!(tokens, ["name", "Al"]);
        let criterion = extract_next(&grammar, &mut tokens).unwrap().unwrap();
        assert_eq!(criterion.verb, Verb::Bare);
        assert!(tokens.is_empty());
        assert_eq!(extract_next(&grammar, &mut tokens), Ok(None));
    }

    #[test]
    fn verb_of_another_noun_is_a_value() {
        // "before" is not a verb of a text noun, so it is the bare value
        let result = grammar().decode(&["name", "before"]);
        assert!(result.is_ok());
        assert_eq!(result.get("name", Verb::Bare), Some(&Operand::Single(Value::from("before"))));
    }

    #[test]
    fn between_checks_each_value() {
        let grammar = grammar();
        let mut tokens: VecDeque<&str> = ["age", "between", "18", "x", "name"].into_iter().collect();
        assert_eq!(
            extract_next(&grammar, &mut tokens),
            Err(DecodeError::InvalidValue {
                noun: "age".into(),
                token: "x".into()
            })
        );
        let mut tokens: VecDeque<&str> = ["age", "between", "18", "65", "name", "Al"].into_iter().collect();
        let criterion = extract_next(&grammar, &mut tokens).unwrap().unwrap();
        assert_eq!(criterion.operand, Operand::Range(Value::Integer(18), Value::Integer(65)));
        assert_eq!(tokens, ["name", "Al"]);
    }

    #[test]
    fn unknown_verb_without_bare_equality() {
        let fragments_only = DataType::string(10).with_capabilities(Capabilities {
            fragmentable: true,
            ..Capabilities::default()
        });
        let grammar = Grammar::compile(&[Property::new("code", fragments_only)]).unwrap();
        let result = grammar.decode(&["code", "x1"]);
        assert_eq!(
            result.error(),
            Some(&DecodeError::UnknownVerb {
                verb: Some("x1".into()),
                noun: "code".into()
            })
        );
        let result = grammar.decode(&["code"]);
        assert_eq!(
            result.error(),
            Some(&DecodeError::UnknownVerb {
                verb: None,
                noun: "code".into()
            })
        );
    }

    #[test]
    fn equality_spellings_share_a_slot() {
        let result = grammar().decode(&["name", "is", "Al", "name", "Bo"]);
        let verbs = &result.criteria()["name"];
        assert_eq!(verbs.len(), 1);
        assert_eq!(verbs.get(&Verb::Bare), Some(&Operand::Single(Value::from("Bo"))));
    }

    #[test]
    fn error_messages() {
        let error = DecodeError::InvalidValue {
            noun: "age".into(),
            token: "oops".into(),
        };
        assert_eq!(error.to_string(), "Invalid value 'oops' for noun 'age'");
        let error = DecodeError::UnknownVerb {
            verb: Some("up".into()),
            noun: "age".into(),
        };
        assert_eq!(error.to_string(), "Unknown verb 'up' for noun 'age'");
    }
}
