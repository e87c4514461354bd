//! Environment variable binding

use crate::config::item::ConfigItem;
use crate::config::value::ItemValue;
use figment::providers::Serialized;
use figment::Figment;
use std::collections::HashMap;

/// Snapshot of environment variables consulted during setup.
///
/// Names are matched exactly, including case.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Capture the current process environment. Non-UTF-8 entries are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Value of `name`; set-but-empty counts as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Bind every item to its environment variable and collect the values that are set.
///
/// Items with an empty key cannot be bound and are skipped without notice.
pub(crate) fn bind_environment(items: &[ConfigItem], env: &Environment) -> Figment {
    let mut layer = Figment::new();
    for item in items {
        if item.key.is_empty() {
            tracing::debug!("Skipping environment binding for item with empty key");
            continue;
        }

        let env_name = item.effective_env_name();
        let Some(raw) = env.get(&env_name) else {
            continue;
        };

        let value: ItemValue = item.default.coerce_like(raw);
        tracing::debug!("Environment variable {} sets {}", env_name, item.key);
        layer = layer.merge(Serialized::default(&item.key, value));
    }
    layer
}
