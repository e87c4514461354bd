//! Command-line flag registration and binding

use crate::config::handlers::Handlers;
use crate::config::item::ConfigItem;
use crate::config::value::{FlagKind, ItemValue};
use crate::error::ConfigError;
use clap::parser::{MatchesError, ValueSource};
use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use figment::providers::Serialized;
use figment::Figment;
use std::collections::{BTreeSet, HashMap};

pub const CONFIG_PATH_FLAG: &str = "config-path";
pub const SECRETS_PATH_FLAG: &str = "secrets-path";

const RESERVED_FLAGS: [&str; 3] = [CONFIG_PATH_FLAG, SECRETS_PATH_FLAG, "help"];

/// Outcome of registering the item flags on a command.
#[derive(Debug)]
pub(crate) struct FlagRegistration {
    pub command: Command,
    /// Keys of items that did not get a flag.
    pub no_flag_keys: BTreeSet<String>,
    /// Kind each registered flag was created with.
    pub kinds: HashMap<String, FlagKind>,
}

/// Register the two path flags plus one flag per item.
///
/// Item flags get a neutral zero default so an unset flag never overrides a
/// value from the environment or a file.
pub(crate) fn register_flags(
    command: Command,
    items: &[ConfigItem],
    default_config_path: &str,
    default_secrets_path: &str,
    handlers: &Handlers,
) -> FlagRegistration {
    let mut command = command
        .arg(path_arg(CONFIG_PATH_FLAG, default_config_path, "config file path without file name"))
        .arg(path_arg(
            SECRETS_PATH_FLAG,
            default_secrets_path,
            "secrets file path without file name",
        ));
    let mut no_flag_keys = BTreeSet::new();
    let mut kinds = HashMap::new();

    for item in items {
        let flag = item.effective_flag_name();

        let Some(kind) = item.default.flag_kind() else {
            no_flag_keys.insert(item.key.clone());
            handlers.warn(&format!(
                "unsupported data type for config item {}, cannot initialize command line argument, skipping this key",
                item.key
            ));
            continue;
        };

        if flag.is_empty() || RESERVED_FLAGS.contains(&flag) {
            no_flag_keys.insert(item.key.clone());
            handlers.warn(&format!(
                "cannot use flag name '{}' for config item {}, cannot initialize command line argument, skipping this key",
                flag, item.key
            ));
            continue;
        }

        if kinds.contains_key(flag) {
            tracing::debug!("Flag --{} already registered, {} shares it", flag, item.key);
            continue;
        }

        tracing::debug!("Registering flag --{} ({:?}) for {}", flag, kind, item.key);
        command = command.arg(item_arg(flag, kind, &item.description));
        kinds.insert(flag.to_string(), kind);
    }

    FlagRegistration { command, no_flag_keys, kinds }
}

fn path_arg(name: &'static str, default: &str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DIR")
        .action(ArgAction::Set)
        .default_value(default.to_string())
        .help(help)
}

fn item_arg(flag: &str, kind: FlagKind, description: &str) -> Arg {
    let arg = Arg::new(flag.to_string()).long(flag.to_string()).help(description.to_string());
    let arg = match kind {
        FlagKind::Str => arg.action(ArgAction::Set).value_parser(value_parser!(String)),
        FlagKind::Int8 => signed(arg).value_parser(value_parser!(i8)),
        FlagKind::Int16 => signed(arg).value_parser(value_parser!(i16)),
        FlagKind::Int32 => signed(arg).value_parser(value_parser!(i32)),
        FlagKind::Int => signed(arg).value_parser(value_parser!(i64)),
        FlagKind::Uint8 => arg.action(ArgAction::Set).value_parser(value_parser!(u8)),
        FlagKind::Uint16 => arg.action(ArgAction::Set).value_parser(value_parser!(u16)),
        FlagKind::Uint32 => arg.action(ArgAction::Set).value_parser(value_parser!(u32)),
        FlagKind::Uint => arg.action(ArgAction::Set).value_parser(value_parser!(u64)),
        // `--flag` means true, `--flag=false` is explicit.
        FlagKind::Bool => arg
            .action(ArgAction::Set)
            .value_parser(BoolishValueParser::new())
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true"),
        FlagKind::StrList => arg
            .action(ArgAction::Append)
            .value_parser(value_parser!(String))
            .value_delimiter(','),
    };
    match kind.neutral_default() {
        Some(neutral) => arg.default_value(neutral),
        None => arg,
    }
}

fn signed(arg: Arg) -> Arg {
    arg.action(ArgAction::Set).allow_negative_numbers(true)
}

/// Collect the flags the user actually passed, keyed by item key.
///
/// A flag that was never registered is an internal inconsistency and is
/// returned as [`ConfigError::FlagBinding`].
pub(crate) fn bind_flags(
    items: &[ConfigItem],
    registration: &FlagRegistration,
    matches: &ArgMatches,
) -> Result<Figment, ConfigError> {
    let mut layer = Figment::new();
    for item in items {
        if registration.no_flag_keys.contains(&item.key) {
            continue;
        }
        // A value under the empty key would replace the whole store.
        if item.key.is_empty() {
            tracing::debug!("Skipping flag binding for item with empty key");
            continue;
        }

        let flag = item.effective_flag_name();
        let binding_error = || ConfigError::FlagBinding {
            key: item.key.clone(),
            flag: flag.to_string(),
        };

        let kind = *registration.kinds.get(flag).ok_or_else(binding_error)?;
        matches.try_contains_id(flag).map_err(|_| binding_error())?;

        if matches.value_source(flag) != Some(ValueSource::CommandLine) {
            continue;
        }

        if let Some(value) = read_flag(matches, flag, kind).map_err(|_| binding_error())? {
            tracing::debug!("Flag --{} sets {}", flag, item.key);
            layer = layer.merge(Serialized::default(&item.key, value));
        }
    }
    Ok(layer)
}

fn read_flag(
    matches: &ArgMatches,
    flag: &str,
    kind: FlagKind,
) -> Result<Option<ItemValue>, MatchesError> {
    let value = match kind {
        FlagKind::Str => matches.try_get_one::<String>(flag)?.cloned().map(ItemValue::Str),
        FlagKind::Int8 => matches.try_get_one::<i8>(flag)?.copied().map(ItemValue::Int8),
        FlagKind::Int16 => matches.try_get_one::<i16>(flag)?.copied().map(ItemValue::Int16),
        FlagKind::Int32 => matches.try_get_one::<i32>(flag)?.copied().map(ItemValue::Int32),
        FlagKind::Int => matches.try_get_one::<i64>(flag)?.copied().map(ItemValue::Int),
        FlagKind::Uint8 => matches.try_get_one::<u8>(flag)?.copied().map(ItemValue::Uint8),
        FlagKind::Uint16 => matches.try_get_one::<u16>(flag)?.copied().map(ItemValue::Uint16),
        FlagKind::Uint32 => matches.try_get_one::<u32>(flag)?.copied().map(ItemValue::Uint32),
        FlagKind::Uint => matches.try_get_one::<u64>(flag)?.copied().map(ItemValue::Uint),
        FlagKind::Bool => matches.try_get_one::<bool>(flag)?.copied().map(ItemValue::Bool),
        FlagKind::StrList => matches
            .try_get_many::<String>(flag)?
            .map(|values| ItemValue::StrList(values.cloned().collect())),
    };
    Ok(value)
}
