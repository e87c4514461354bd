//! Resolved configuration store

use crate::error::ConfigError;
use figment::value::{Dict, Map, Tag, Value};
use figment::{Figment, Metadata, Profile, Provider};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Layer names reported by [`Settings::source_of`].
pub const SOURCE_DEFAULT: &str = "default";
pub const SOURCE_CONFIG_FILE: &str = "config file";
pub const SOURCE_SECRETS_FILE: &str = "secrets file";
pub const SOURCE_ENVIRONMENT: &str = "environment";
pub const SOURCE_COMMAND_LINE: &str = "command line";

/// The resolved key/value store, read by the application after load.
///
/// Keys are dot-delimited paths (`server.port`), matching item keys and the
/// nesting used in configuration files.
#[derive(Debug, Clone)]
pub struct Settings {
    figment: Figment,
}

impl Settings {
    pub(crate) fn new(figment: Figment) -> Self {
        Self { figment }
    }

    /// Read one value as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.figment
            .extract_inner(key)
            .map_err(|e| ConfigError::Read { key: key.to_string(), source: Box::new(e) })
    }

    /// Decode the whole store into a typed record.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        self.figment
            .extract()
            .map_err(|e| ConfigError::Read { key: String::new(), source: Box::new(e) })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.figment.contains(key)
    }

    /// Raw resolved value, if any layer provided one.
    pub fn value(&self, key: &str) -> Option<Value> {
        self.figment.find_value(key).ok()
    }

    /// Name of the layer the value for `key` came from.
    pub fn source_of(&self, key: &str) -> Option<String> {
        self.figment.find_metadata(key).map(|md| md.name.to_string())
    }

    pub fn figment(&self) -> &Figment {
        &self.figment
    }
}

/// A figment wrapped under a provenance name.
pub(crate) struct Layer {
    name: Cow<'static, str>,
    figment: Figment,
}

impl Layer {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>, figment: Figment) -> Self {
        Self { name: name.into(), figment }
    }
}

impl Provider for Layer {
    fn metadata(&self) -> Metadata {
        Metadata::named(self.name.clone())
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        // Re-serialize so every value is tagged with this layer, not the inner providers.
        let plain: serde_json::Value = self.figment.extract()?;
        let dict = Value::serialize(plain)?
            .into_dict()
            .ok_or_else(|| figment::Error::from(format!("{} layer is not a map", self.name)))?;
        Ok(Profile::Default.collect(expand_dotted(dict)))
    }
}

/// Nest flat `a.b: v` entries as `a: { b: v }` so file keys resolve like registered keys.
fn expand_dotted(dict: Dict) -> Dict {
    let mut out = Dict::new();
    for (key, value) in dict {
        let value = match value {
            Value::Dict(tag, inner) => Value::Dict(tag, expand_dotted(inner)),
            other => other,
        };
        let mut parts = key.split('.').rev();
        let last = parts.next().unwrap_or_default().to_string();
        let (head, nested) = parts.fold((last, value), |(child, value), parent| {
            let mut dict = Dict::new();
            dict.insert(child, value);
            (parent.to_string(), Value::Dict(Tag::Default, dict))
        });
        merge_entry(&mut out, head, nested);
    }
    out
}

fn merge_entry(dict: &mut Dict, key: String, value: Value) {
    match value {
        Value::Dict(tag, incoming) => match dict.get_mut(&key) {
            Some(Value::Dict(_, existing)) => {
                for (k, v) in incoming {
                    merge_entry(existing, k, v);
                }
            }
            _ => {
                dict.insert(key, Value::Dict(tag, incoming));
            }
        },
        value => {
            dict.insert(key, value);
        }
    }
}
