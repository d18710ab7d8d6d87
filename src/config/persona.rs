use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("Persona '{0}' not found in catalogue")]
    NotFound(String),
    #[error("Persona '{0}' has an empty prompt")]
    EmptyPrompt(String),
    #[error("Failed to read persona catalogue '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse persona catalogue '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything that distinguishes one deployment of the chat endpoint from
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaConfig {
    pub prompt: String,
    pub escape_input: bool,
    pub model: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PersonaDefinition {
    pub prompt: String,
    #[serde(default)]
    pub escape_input: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PersonaCatalogue {
    pub default: String,
    pub personas: HashMap<String, PersonaDefinition>,
}

impl PersonaCatalogue {
    pub fn parse(json: &str, origin: &str) -> Result<Self, PersonaError> {
        serde_json::from_str(json).map_err(|source| PersonaError::Json {
            path: origin.to_string(),
            source,
        })
    }

    /// Looks up `name`, or the catalogue default when no name is given.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &PersonaDefinition), PersonaError> {
        let key = name.unwrap_or(self.default.as_str());
        let (key, definition) = self.personas
            .get_key_value(key)
            .ok_or_else(|| PersonaError::NotFound(key.to_string()))?;
        if definition.prompt.trim().is_empty() {
            return Err(PersonaError::EmptyPrompt(key.clone()));
        }
        Ok((key.as_str(), definition))
    }
}

pub fn load_catalogue<P: AsRef<Path>>(path: P) -> Result<PersonaCatalogue, PersonaError> {
    let display = path.as_ref().display().to_string();
    let content = fs::read_to_string(&path).map_err(|source| PersonaError::Io {
        path: display.clone(),
        source,
    })?;
    let catalogue = PersonaCatalogue::parse(&content, &display)?;
    info!("Loaded {} personas from {}", catalogue.personas.len(), display);
    Ok(catalogue)
}
