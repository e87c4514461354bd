//! Command-line interface for config-dump
//!
//! The command line is owned by the resolver: every sample item becomes a
//! `--<key>` flag next to `--config-path` and `--secrets-path`.

use anyhow::Result;
use layered_config::{profiles_item, validate, ConfigItem, Handlers, Resolver};
use serde_json::json;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod render;

pub fn run() -> Result<()> {
    // RUST_LOG in the environment always takes precedence; warnings are shown by default.
    let filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let items = server_items();
    let settings = Resolver::builder(items.clone())
        .command_name("config-dump")
        .about("Resolve a sample server configuration and print the winning values")
        .handlers(Handlers::exiting())
        .setup()?
        .load()?;

    let format: String = settings.get("dump.format")?;
    let with_sources: bool = settings.get("dump.sources")?;
    println!("{}", render::render(&items, &settings, &format, with_sources)?);
    Ok(())
}

/// Registry of a small HTTP server.
fn server_items() -> Vec<ConfigItem> {
    vec![
        ConfigItem::new("server.address", "0.0.0.0", "address to bind")
            .validate(validate::not_empty()),
        ConfigItem::new("server.port", 8080u16, "port to listen on")
            .validate(validate::in_range(1024u16, 65535u16)),
        ConfigItem::new("server.keepalive", true, "keep idle connections open"),
        ConfigItem::new("log.level", "info", "log level")
            .validate(validate::one_of(&["trace", "debug", "info", "warn", "error"])),
        ConfigItem::new("tags", vec!["web"], "tags attached to every log line"),
        profiles_item(),
        ConfigItem::new(
            "database.options",
            json!({"pool": 4, "idle_timeout_secs": 30}),
            "connection pool options",
        ),
        ConfigItem::new("dump.format", "json", "output format: json, yaml or toml")
            .flag_name("format")
            .validate(validate::one_of(&["json", "yaml", "toml"])),
        ConfigItem::new("dump.sources", false, "print the source of every value"),
    ]
}
