//! Configuration loading and merging
//!
//! Resolves declared configuration items from command-line flags, environment
//! variables, config/secrets files and defaults with fixed precedence
//! (CLI > Env > Secrets > Config file > Defaults), then validates them.

pub mod env;
pub mod flags;
pub mod handlers;
pub mod item;
pub mod loader;
pub mod resolver;
pub mod settings;
pub mod validate;
pub mod value;

pub use env::Environment;
pub use flags::{CONFIG_PATH_FLAG, SECRETS_PATH_FLAG};
pub use handlers::Handlers;
pub use item::{derive_env_name, profiles_item, ConfigItem, ENV_PREFIX, PROFILES_KEY};
pub use loader::SearchPath;
pub use resolver::{defaults_only, Resolver, ResolverBuilder};
pub use settings::Settings;
pub use validate::Validator;
pub use value::{FlagKind, ItemValue};
