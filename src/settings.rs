//! Settings file with the model schemas.
//!
//! ```toml
//! log_level = "info"
//!
//! [[models]]
//! name = "person"
//! collection = "people"
//! id = "UUID"
//!
//! [[models.attributes]]
//! name = "name"
//! type = "STRING(64)"
//! absent = ""
//! ```
//!
//! Attributes are listed as an array since their order decides the layout
//! of the list path. Environment variables prefixed with `CRUDPATH_` override
//! top-level keys, e.g. `CRUDPATH_LOG_LEVEL=debug`.

use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::construct::{Model, ModelKeeper, Property};
use crate::error::{CrudpathError, Result};
use crate::typedecl::parse_declaration;

fn default_log_level() -> String {
    String::from("info")
}
fn default_id() -> String {
    String::from("UUID")
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub models: Vec<ModelSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub name: String,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub attributes: Vec<AttributeSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeSettings {
    pub name: String,
    #[serde(rename = "type")]
    pub declaration: String,
    #[serde(default)]
    pub absent: Option<String>,
}

impl Settings {
    /// Reads a settings file, the format following its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CRUDPATH"))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
    pub fn parse(text: &str, format: FileFormat) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(text, format))
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
    pub fn models(&self) -> Result<Vec<Model>> {
        self.models.iter().map(ModelSettings::build).collect()
    }
    /// Builds every model and keeps it; a model name given twice is an error.
    pub fn keeper(&self) -> Result<ModelKeeper> {
        let mut keeper = ModelKeeper::new();
        for model in self.models()? {
            let name = model.name().to_owned();
            let (_, previously_kept) = keeper.keep(model);
            if previously_kept {
                return Err(CrudpathError::Config(format!("Model {} is declared twice", name)));
            }
        }
        info!(models = keeper.len(), "loaded models");
        Ok(keeper)
    }
}

impl ModelSettings {
    pub fn build(&self) -> Result<Model> {
        let id = Property::new("id", parse_declaration(&self.id)?);
        let attributes = self
            .attributes
            .iter()
            .map(|attribute| attribute.build(&self.name))
            .collect::<Result<Vec<_>>>()?;
        let model = Model::new(self.name.clone(), id, attributes)?;
        Ok(match &self.collection {
            Some(collection) => model.with_collection(collection.clone()),
            None => model,
        })
    }
}

impl AttributeSettings {
    pub fn build(&self, model: &str) -> Result<Property> {
        let data_type = parse_declaration(&self.declaration)?;
        let data_type = match &self.absent {
            None => data_type,
            Some(token) => data_type
                .from_string(token)
                .and_then(|marker| data_type.clone().with_absent_value(marker))
                .ok_or_else(|| CrudpathError::Schema {
                    model: model.to_owned(),
                    message: format!("Absent value '{}' is not a valid {}", token, data_type),
                })?,
        };
        Ok(Property::new(self.name.clone(), data_type))
    }
}
