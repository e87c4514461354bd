//! Precedence resolution and validation
//!
//! Setup registers every item with three sources: defaults, environment
//! variables and command-line flags. Load reads the config and secrets files,
//! stacks all layers so the most specific source wins, then validates.
//!
//! Effective precedence, highest first:
//! 1. command-line flag set by the user
//! 2. environment variable
//! 3. secrets file
//! 4. per-profile config files (not loaded, see [`Resolver::load`])
//! 5. base config file
//! 6. item default

use crate::config::env::{self, Environment};
use crate::config::flags::{self, FlagRegistration, CONFIG_PATH_FLAG, SECRETS_PATH_FLAG};
use crate::config::handlers::Handlers;
use crate::config::item::{ConfigItem, PROFILES_KEY};
use crate::config::loader::{self, FileKind, SearchPath};
use crate::config::settings::{
    Layer, Settings, SOURCE_COMMAND_LINE, SOURCE_DEFAULT, SOURCE_ENVIRONMENT,
};
use crate::error::{ConfigError, Halted};
use clap::Command;
use figment::providers::Serialized;
use figment::Figment;
use std::collections::BTreeSet;
use std::ffi::OsString;

/// Configures and runs resolver setup.
///
/// Items are taken as given: duplicate keys are not rejected, and a later item
/// overwrites the default, environment and flag bindings of an earlier one.
#[derive(Debug)]
pub struct ResolverBuilder {
    items: Vec<ConfigItem>,
    handlers: Handlers,
    config_path: String,
    secrets_path: String,
    args: Option<Vec<OsString>>,
    environment: Option<Environment>,
    command_name: String,
    about: Option<String>,
}

impl ResolverBuilder {
    pub fn new(items: Vec<ConfigItem>) -> Self {
        Self {
            items,
            handlers: Handlers::default(),
            config_path: String::new(),
            secrets_path: String::new(),
            args: None,
            environment: None,
            command_name: "app".to_string(),
            about: None,
        }
    }

    pub fn handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    /// Default for `--config-path`, used when the flag is not given.
    pub fn config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Default for `--secrets-path`, used when the flag is not given.
    pub fn secrets_path(mut self, path: impl Into<String>) -> Self {
        self.secrets_path = path.into();
        self
    }

    /// Command line to parse, including the binary name. Defaults to the process arguments.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Environment to bind against. Defaults to the process environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = name.into();
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Register flags, parse the command line, then bind defaults,
    /// environment variables and flags.
    pub fn setup(self) -> Result<Resolver, Halted> {
        let Self { items, handlers, config_path, secrets_path, args, environment, command_name, about } =
            self;

        let mut command = Command::new(command_name);
        if let Some(about) = about {
            command = command.about(about);
        }

        let mut registration =
            flags::register_flags(command, &items, &config_path, &secrets_path, &handlers);

        let args = args.unwrap_or_else(|| std::env::args_os().collect());
        let matches = match registration.command.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(e) => return Err(handlers.fail(ConfigError::CommandLine(e))),
        };

        let config_path = matches.get_one::<String>(CONFIG_PATH_FLAG).cloned().unwrap_or_default();
        let secrets_path = matches.get_one::<String>(SECRETS_PATH_FLAG).cloned().unwrap_or_default();

        let defaults = register_defaults(&items);
        let environment = environment.unwrap_or_else(Environment::from_process);
        let environment = env::bind_environment(&items, &environment);
        let flags = match flags::bind_flags(&items, &registration, &matches) {
            Ok(flags) => flags,
            Err(e) => return Err(handlers.fail(e)),
        };

        tracing::debug!(
            "Configuration setup complete: {} items, {} without flags",
            items.len(),
            registration.no_flag_keys.len()
        );

        Ok(Resolver {
            items,
            handlers,
            config_path: SearchPath::new(&config_path),
            secrets_path: SearchPath::new(&secrets_path),
            registration,
            defaults,
            environment,
            flags,
        })
    }

    /// Register defaults only; no flags, environment, files or validation.
    pub fn defaults_only(self) -> Settings {
        defaults_only(&self.items)
    }
}

/// Registered configuration, ready to load.
#[derive(Debug)]
pub struct Resolver {
    items: Vec<ConfigItem>,
    handlers: Handlers,
    config_path: SearchPath,
    secrets_path: SearchPath,
    registration: FlagRegistration,
    defaults: Figment,
    environment: Figment,
    flags: Figment,
}

impl Resolver {
    pub fn builder(items: Vec<ConfigItem>) -> ResolverBuilder {
        ResolverBuilder::new(items)
    }

    /// Set up against the process arguments and environment.
    ///
    /// `--help` and `--version` are handed to `handlers.fail` as
    /// [`ConfigError::CommandLine`]; both built-in handlers print them and exit.
    pub fn setup(items: Vec<ConfigItem>, handlers: Handlers) -> Result<Self, Halted> {
        ResolverBuilder::new(items).handlers(handlers).setup()
    }

    pub fn items(&self) -> &[ConfigItem] {
        &self.items
    }

    /// The generated command, e.g. for rendering help.
    pub fn command(&self) -> &Command {
        &self.registration.command
    }

    /// Keys of items that could not be given a flag.
    pub fn no_flag_keys(&self) -> &BTreeSet<String> {
        &self.registration.no_flag_keys
    }

    pub fn config_path(&self) -> &SearchPath {
        &self.config_path
    }

    pub fn secrets_path(&self) -> &SearchPath {
        &self.secrets_path
    }

    /// Read the config and secrets files, compose all layers and validate.
    ///
    /// Per-profile config files are not loaded. When profiles are active a
    /// warning says so instead.
    pub fn load(self) -> Result<Settings, Halted> {
        let config_file = loader::load_layer(FileKind::Config, &self.config_path, &self.handlers)?;
        let secrets_file =
            loader::load_layer(FileKind::Secrets, &self.secrets_path, &self.handlers)?;

        // Later merges win.
        let mut figment = Figment::new().merge(Layer::new(SOURCE_DEFAULT, self.defaults));
        if let Some(layer) = config_file {
            figment = figment.merge(layer);
        }
        if let Some(layer) = secrets_file {
            figment = figment.merge(layer);
        }
        let figment = figment
            .merge(Layer::new(SOURCE_ENVIRONMENT, self.environment))
            .merge(Layer::new(SOURCE_COMMAND_LINE, self.flags));

        let settings = Settings::new(figment);
        warn_unloaded_profiles(&self.items, &settings, &self.handlers);
        validate(&self.items, &settings, &self.handlers)?;
        Ok(settings)
    }
}

/// Resolved defaults for `items` and nothing else.
pub fn defaults_only(items: &[ConfigItem]) -> Settings {
    Settings::new(Figment::new().merge(Layer::new(SOURCE_DEFAULT, register_defaults(items))))
}

/// Run every validator in registry order, stopping at the first failure.
pub fn validate(items: &[ConfigItem], settings: &Settings, handlers: &Handlers) -> Result<(), Halted> {
    for item in items {
        if let Err(reason) = item.validator.check(&item.key, settings) {
            return Err(handlers.fail(ConfigError::Validation { key: item.key.clone(), reason }));
        }
    }
    Ok(())
}

fn register_defaults(items: &[ConfigItem]) -> Figment {
    items.iter().filter(|item| !item.key.is_empty()).fold(Figment::new(), |figment, item| {
        figment.merge(Serialized::default(&item.key, &item.default))
    })
}

fn warn_unloaded_profiles(items: &[ConfigItem], settings: &Settings, handlers: &Handlers) {
    if !items.iter().any(|item| item.key == PROFILES_KEY) {
        return;
    }
    let profiles: Vec<String> = settings.get(PROFILES_KEY).unwrap_or_default();
    if !profiles.is_empty() {
        handlers.warn(&format!(
            "profile-specific configuration files are not loaded (active profiles: {})",
            profiles.join(", ")
        ));
    }
}
