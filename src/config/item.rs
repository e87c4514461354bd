//! Configuration item declarations

use crate::config::validate::{self, Validator};
use crate::config::value::ItemValue;
use once_cell::sync::Lazy;
use regex::Regex;

/// Key of the well-known profiles item.
pub const PROFILES_KEY: &str = "profiles";

/// Prefix of derived environment variable names.
pub const ENV_PREFIX: &str = "CONFIG_";

static NON_ALNUM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid env name regex"));

/// One declared configuration key.
#[derive(Debug, Clone)]
pub struct ConfigItem {
    pub key: String,
    pub default: ItemValue,
    pub description: String,
    pub env_name: Option<String>,
    pub flag_name: Option<String>,
    pub validator: Validator,
}

impl ConfigItem {
    /// Declare an item that needs no validation and uses derived names.
    pub fn new(
        key: impl Into<String>,
        default: impl Into<ItemValue>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            description: description.into(),
            env_name: None,
            flag_name: None,
            validator: validate::needs_no_validation(),
        }
    }

    /// Use an explicit environment variable instead of the derived one.
    pub fn env_name(mut self, name: impl Into<String>) -> Self {
        self.env_name = Some(name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    /// Use an explicit flag name instead of the key.
    pub fn flag_name(mut self, name: impl Into<String>) -> Self {
        self.flag_name = Some(name.into()).filter(|n: &String| !n.is_empty());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn effective_flag_name(&self) -> &str {
        self.flag_name.as_deref().unwrap_or(&self.key)
    }

    pub fn effective_env_name(&self) -> String {
        match &self.env_name {
            Some(name) => name.clone(),
            None => derive_env_name(&self.key),
        }
    }
}

/// `CONFIG_` followed by `key` with every separator replaced by `_`.
///
/// Letters keep their case (`Server.Port` → `CONFIG_Server_Port`); anything
/// that is not an ASCII letter or digit becomes `_`.
pub fn derive_env_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, NON_ALNUM.replace_all(key, "_"))
}

/// Item for the list of active profiles. Add it to the registry to accept
/// `--profiles` and `CONFIG_profiles` (space separated in the environment).
pub fn profiles_item() -> ConfigItem {
    ConfigItem::new(
        PROFILES_KEY,
        Vec::<String>::new(),
        "list of profiles, separate by spaces in environment or command line parameters",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_env_name_replaces_separators() {
        assert_eq!(derive_env_name("server.address"), "CONFIG_server_address");
        assert_eq!(derive_env_name("db-pool.max_size"), "CONFIG_db_pool_max_size");
    }

    #[test]
    fn test_derive_env_name_preserves_uppercase() {
        assert_eq!(derive_env_name("Server.Port"), "CONFIG_Server_Port");
        assert_ne!(derive_env_name("Server.Port"), "CONFIG_SERVER_PORT");
    }

    #[test]
    fn test_explicit_names_win() {
        let item = ConfigItem::new("server.port", 8080u16, "port")
            .env_name("PORT")
            .flag_name("port");
        assert_eq!(item.effective_env_name(), "PORT");
        assert_eq!(item.effective_flag_name(), "port");
    }

    #[test]
    fn test_empty_explicit_names_fall_back() {
        let item = ConfigItem::new("server.port", 8080u16, "port").env_name("").flag_name("");
        assert_eq!(item.effective_env_name(), "CONFIG_server_port");
        assert_eq!(item.effective_flag_name(), "server.port");
    }

    #[test]
    fn test_profiles_item_is_string_list() {
        let item = profiles_item();
        assert_eq!(item.key, PROFILES_KEY);
        assert_eq!(item.default, ItemValue::StrList(Vec::new()));
    }
}
