//! config-dump: resolve a sample server configuration and print it
//!
//! Shows which value wins for each key when flags, environment variables,
//! config/secrets files and defaults all compete.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
