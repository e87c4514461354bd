//! Output rendering for resolved values

use anyhow::{Context, Result};
use layered_config::{ConfigItem, Settings};
use serde_json::{json, Map, Value};

/// Render every declared key as a flat `key → value` map.
///
/// With `with_sources`, each entry becomes `{ value, source }`.
pub fn render(items: &[ConfigItem], settings: &Settings, format: &str, with_sources: bool) -> Result<String> {
    let mut out = Map::new();
    for item in items {
        let value: Value = settings.get(&item.key)?;
        let entry = if with_sources {
            json!({
                "value": value,
                "source": settings.source_of(&item.key).unwrap_or_default(),
            })
        } else {
            value
        };
        out.insert(item.key.clone(), entry);
    }

    let out = Value::Object(out);
    match format {
        "json" => serde_json::to_string_pretty(&out).context("Failed to render JSON"),
        "yaml" => serde_yaml::to_string(&out).context("Failed to render YAML"),
        "toml" => toml::to_string_pretty(&out).context("Failed to render TOML"),
        other => anyhow::bail!("Unsupported output format: {}", other),
    }
}
