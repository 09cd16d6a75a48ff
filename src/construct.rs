use std::sync::Arc;

// other keepers use HashMap
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

// used to print out readable forms of a construct
use std::fmt;

use tracing::info;

// our own stuff that we need
use crate::datatype::DataType;
use crate::error::{CrudpathError, Result};
use crate::syntax::Grammar;

pub type OtherHasher = BuildHasherDefault<SeaHasher>;

// ------------- Property -------------
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    data_type: DataType,
}

impl Property {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
}
impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

// ------------- Model -------------
/// A named schema: an id property and the ordered attributes that can be
/// filtered on. The grammar of the list endpoint is compiled when the model
/// is built and never changes afterward.
#[derive(Debug)]
pub struct Model {
    name: String,
    collection: Option<String>,
    id: Property,
    attributes: Vec<Property>,
    grammar: Grammar,
}

impl Model {
    pub fn new(name: impl Into<String>, id: Property, attributes: Vec<Property>) -> Result<Self> {
        let name = name.into();
        let mut keys: Vec<&str> = vec![id.name()];
        for attribute in &attributes {
            if keys.contains(&attribute.name()) {
                return Err(CrudpathError::Schema {
                    model: name,
                    message: format!("Duplicate key {}", attribute.name()),
                });
            }
            keys.push(attribute.name());
        }
        let grammar = match Grammar::compile(&attributes) {
            Ok(grammar) => grammar,
            Err(CrudpathError::DuplicateNoun(noun)) => {
                return Err(CrudpathError::Schema {
                    model: name,
                    message: format!("Attribute {} collides with a reserved noun", noun),
                });
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            name,
            collection: None,
            id,
            attributes,
            grammar,
        })
    }
    /// Sets the path segment of the list endpoint, which otherwise is the model name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(&self.name)
    }
    pub fn id(&self) -> &Property {
        &self.id
    }
    pub fn attributes(&self) -> &[Property] {
        &self.attributes
    }
    pub fn attribute(&self, name: &str) -> Option<&Property> {
        self.attributes.iter().find(|a| a.name() == name)
    }
    pub fn keys(&self) -> Vec<&str> {
        std::iter::once(self.id.name())
            .chain(self.attributes.iter().map(Property::name))
            .collect()
    }
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }
}
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {{{}", self.name, self.id)?;
        for attribute in &self.attributes {
            write!(f, ", {}", attribute)?;
        }
        write!(f, "}}")
    }
}

// ------------- ModelKeeper -------------
#[derive(Debug, Default)]
pub struct ModelKeeper {
    kept: HashMap<String, Arc<Model>, OtherHasher>,
    order: Vec<String>,
}
impl ModelKeeper {
    pub fn new() -> Self {
        Self::default()
    }
    /// Keeps the model unless one with the same name is already kept, in
    /// which case that one is returned together with `true`.
    pub fn keep(&mut self, model: Model) -> (Arc<Model>, bool) {
        let keepsake = model.name().to_owned();
        match self.kept.entry(keepsake.clone()) {
            Entry::Vacant(e) => {
                info!(model = %keepsake, path_length = model.grammar().path_length(), "keeping model");
                let kept = Arc::new(model);
                e.insert(Arc::clone(&kept));
                self.order.push(keepsake);
                (kept, false)
            }
            Entry::Occupied(e) => (Arc::clone(e.get()), true),
        }
    }
    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        self.kept.get(name).map(Arc::clone)
    }
    pub fn lookup(&self, name: &str) -> Result<Arc<Model>> {
        self.get(name).ok_or_else(|| CrudpathError::UnknownModel(name.to_owned()))
    }
    /// Names in the order the models were kept.
    pub fn names(&self) -> &[String] {
        &self.order
    }
    pub fn iter(&self) -> impl Iterator<Item = Arc<Model>> + '_ {
        self.order.iter().filter_map(|name| self.get(name))
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
