//! layered-config: resolve server configuration from layered sources
//!
//! Declare each configuration key once as a [`ConfigItem`], then let the
//! [`Resolver`] bind it to a command-line flag, an environment variable, the
//! config and secrets files, and its default. The most specific source wins and
//! every resolved value is checked by the item's validator.
//!
//! ```no_run
//! use layered_config::{validate, ConfigItem, Handlers, Resolver};
//!
//! let items = vec![
//!     ConfigItem::new("server.port", 8080u16, "port to listen on")
//!         .validate(validate::in_range(1024u16, 65535u16)),
//!     ConfigItem::new("server.address", "0.0.0.0", "address to bind"),
//! ];
//!
//! let settings = Resolver::setup(items, Handlers::exiting())
//!     .and_then(|resolver| resolver.load())
//!     .expect("exiting handler never returns");
//! let port: u16 = settings.get("server.port").expect("declared item");
//! # let _ = port;
//! ```

pub mod config;
pub mod error;

pub use config::validate;
pub use config::{
    defaults_only, derive_env_name, profiles_item, ConfigItem, Environment, FlagKind, Handlers,
    ItemValue, Resolver, ResolverBuilder, SearchPath, Settings, Validator, PROFILES_KEY,
};
pub use error::{ConfigError, Halted};
