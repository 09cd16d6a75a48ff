//! Filter grammar of a list endpoint.
//!
//! Every property of a model yields a set of keywords, a keyword being a
//! legal `(noun, verb, arity)` combination. The keywords are grouped per noun
//! and each noun is given a fixed width in the path, namely the largest slot
//! count among its keywords, so that the route pattern of a list endpoint
//! never depends on which verb a caller picks:
//!
//! ```text
//! /people/name/startsWith/Al/age/between/18/65
//!         |------ name ----| |----- age -----|
//! ```
//!
//! A [`Grammar`] is compiled once per model and is read-only afterward.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::construct::{OtherHasher, Property};
use crate::datatype::{DEFAULT_TEXT_LEN, DataType, Primitive};
use crate::decoder::{DecodeResult, decode};
use crate::error::{CrudpathError, Result};

/// The noun of the free-text search keyword.
pub const SEARCH_NOUN: &str = "s";

// ------------- Verb -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerbName {
    Is,
    StartsWith,
    EndsWith,
    Contains,
    LessThan,
    MoreThan,
    Before,
    After,
    Between,
    Has,
}
impl VerbName {
    pub const ALL: [VerbName; 10] = [
        VerbName::Is,
        VerbName::StartsWith,
        VerbName::EndsWith,
        VerbName::Contains,
        VerbName::LessThan,
        VerbName::MoreThan,
        VerbName::Before,
        VerbName::After,
        VerbName::Between,
        VerbName::Has,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            VerbName::Is => "is",
            VerbName::StartsWith => "startsWith",
            VerbName::EndsWith => "endsWith",
            VerbName::Contains => "contains",
            VerbName::LessThan => "lessThan",
            VerbName::MoreThan => "moreThan",
            VerbName::Before => "before",
            VerbName::After => "after",
            VerbName::Between => "between",
            VerbName::Has => "has",
        }
    }
    /// Verb tokens are matched exactly, case included.
    pub fn from_token(token: &str) -> Option<VerbName> {
        VerbName::ALL.into_iter().find(|verb| verb.as_str() == token)
    }
}
impl fmt::Display for VerbName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either a named verb or the bare equality form that takes no verb token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verb {
    Explicit(VerbName),
    Bare,
}
impl Verb {
    /// The name used in decode results; bare equality reads as `is`.
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Explicit(verb) => verb.as_str(),
            Verb::Bare => VerbName::Is.as_str(),
        }
    }
    pub fn is_bare(&self) -> bool {
        matches!(self, Verb::Bare)
    }
    pub fn is_equality(&self) -> bool {
        matches!(self, Verb::Bare | Verb::Explicit(VerbName::Is))
    }
}

// ------------- Keyword -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    noun: String,
    verb: Verb,
    data_type: DataType,
    arity: usize,
}
impl Keyword {
    pub fn new(noun: impl Into<String>, verb: Verb, data_type: DataType) -> Self {
        let arity = match verb {
            Verb::Explicit(VerbName::Between) => 2,
            _ => 1,
        };
        Self {
            noun: noun.into(),
            verb,
            data_type,
            arity,
        }
    }
    pub fn noun(&self) -> &str {
        &self.noun
    }
    pub fn verb(&self) -> Verb {
        self.verb
    }
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
    pub fn arity(&self) -> usize {
        self.arity
    }
    /// Number of path segments the keyword occupies: noun, verb (unless bare) and values.
    pub fn slot_cost(&self) -> usize {
        let verb = if self.verb.is_bare() { 0 } else { 1 };
        1 + verb + self.arity
    }
}
impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.noun)?;
        if let Verb::Explicit(verb) = self.verb {
            write!(f, " {}", verb)?;
        }
        for _ in 0..self.arity {
            write!(f, " <{}>", self.data_type.declaration())?;
        }
        Ok(())
    }
}

/// Derives the keywords of a property from the capabilities of its type.
pub fn keywords_for(property: &Property) -> Vec<Keyword> {
    let noun = property.name();
    let data_type = property.data_type();
    let mut keywords = Vec::new();
    let mut push = |verb: Verb, data_type: &DataType| {
        if !keywords.iter().any(|k: &Keyword| k.verb() == verb) {
            keywords.push(Keyword::new(noun, verb, data_type.clone()));
        }
    };

    if data_type.is_fragmentable() {
        push(Verb::Explicit(VerbName::Is), data_type);
        push(Verb::Explicit(VerbName::StartsWith), data_type);
        push(Verb::Explicit(VerbName::EndsWith), data_type);
        push(Verb::Explicit(VerbName::Contains), data_type);
    }
    if data_type.is_enumerable() {
        push(Verb::Bare, data_type);
    }
    if data_type.is_comparable() {
        if data_type.primitive() == Primitive::Date {
            push(Verb::Explicit(VerbName::Before), data_type);
            push(Verb::Explicit(VerbName::After), data_type);
        } else {
            push(Verb::Explicit(VerbName::LessThan), data_type);
            push(Verb::Explicit(VerbName::MoreThan), data_type);
        }
        push(Verb::Explicit(VerbName::Between), data_type);
        push(Verb::Bare, data_type);
    }
    if data_type.has_absent_value() {
        push(Verb::Explicit(VerbName::Has), &DataType::boolean());
    }
    keywords
}

// ------------- NounSyntax -------------
/// The keywords of one noun together with the fixed width it takes in the path.
#[derive(Debug, Clone, PartialEq)]
pub struct NounSyntax {
    noun: String,
    keywords: Vec<Keyword>,
    width: usize,
}
impl NounSyntax {
    pub fn new(noun: impl Into<String>, keywords: Vec<Keyword>) -> Self {
        let width = keywords.iter().map(Keyword::slot_cost).max().unwrap_or(0);
        Self {
            noun: noun.into(),
            keywords,
            width,
        }
    }
    pub fn noun(&self) -> &str {
        &self.noun
    }
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn keyword(&self, verb: Verb) -> Option<&Keyword> {
        self.keywords.iter().find(|k| k.verb() == verb)
    }
    pub fn bare(&self) -> Option<&Keyword> {
        self.keyword(Verb::Bare)
    }
}

// ------------- Grammar -------------
#[derive(Debug, Clone)]
pub struct Grammar {
    nouns: Vec<NounSyntax>,
    lookup: HashMap<String, usize, OtherHasher>,
    path_length: usize,
    path_template: String,
}

impl Grammar {
    /// Compiles the grammar of a property set. Nouns keep the declaration
    /// order of their properties; the search noun, when present, comes last.
    /// Properties without any keyword are not filterable and get no noun.
    pub fn compile(properties: &[Property]) -> Result<Self> {
        let mut nouns: Vec<NounSyntax> = Vec::new();
        let mut lookup: HashMap<String, usize, OtherHasher> = HashMap::default();
        let mut declared: Vec<&str> = Vec::new();
        let mut searchable = false;

        for property in properties {
            if declared.contains(&property.name()) {
                return Err(CrudpathError::DuplicateNoun(property.name().to_owned()));
            }
            declared.push(property.name());
            searchable |= property.data_type().is_searchable();
            let keywords = keywords_for(property);
            if keywords.is_empty() {
                continue;
            }
            lookup.insert(property.name().to_owned(), nouns.len());
            nouns.push(NounSyntax::new(property.name(), keywords));
        }
        if searchable {
            if declared.contains(&SEARCH_NOUN) {
                return Err(CrudpathError::DuplicateNoun(SEARCH_NOUN.to_owned()));
            }
            let search = Keyword::new(SEARCH_NOUN, Verb::Bare, DataType::string(DEFAULT_TEXT_LEN));
            lookup.insert(SEARCH_NOUN.to_owned(), nouns.len());
            nouns.push(NounSyntax::new(SEARCH_NOUN, vec![search]));
        }

        let path_length = nouns.iter().map(NounSyntax::width).sum();
        let path_template = (0..path_length).map(|i| format!("/:p{}?", i)).collect();
        debug!(nouns = nouns.len(), path_length, searchable, "compiled grammar");
        Ok(Self {
            nouns,
            lookup,
            path_length,
            path_template,
        })
    }
    pub fn nouns(&self) -> &[NounSyntax] {
        &self.nouns
    }
    pub fn noun(&self, noun: &str) -> Option<&NounSyntax> {
        self.lookup.get(noun).map(|&i| &self.nouns[i])
    }
    pub fn has_search(&self) -> bool {
        self.lookup.contains_key(SEARCH_NOUN)
    }
    /// The keyword a noun and verb token select, if the noun declares that verb.
    pub fn keyword(&self, noun: &str, verb: &str) -> Option<&Keyword> {
        let verb = VerbName::from_token(verb)?;
        self.noun(noun)?.keyword(Verb::Explicit(verb))
    }
    /// Total number of positional segments, the sum of all noun widths.
    pub fn path_length(&self) -> usize {
        self.path_length
    }
    /// `path_length` optional placeholders, `/:p0?/:p1?...`, for the router to compile.
    pub fn path_template(&self) -> &str {
        &self.path_template
    }
    pub fn decode<S: AsRef<str>>(&self, tokens: &[S]) -> DecodeResult {
        decode(self, tokens)
    }
}

/// Compiles the grammar of a property set, see [`Grammar::compile`].
pub fn compile_grammar(properties: &[Property]) -> Result<Grammar> {
    Grammar::compile(properties)
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for noun in &self.nouns {
            writeln!(f, "{} [width {}]", noun.noun(), noun.width())?;
            for keyword in noun.keywords() {
                writeln!(f, "    {}", keyword)?;
            }
        }
        write!(f, "path length {}: {}", self.path_length, self.path_template)
    }
}
