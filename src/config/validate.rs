//! Per-item validators
//!
//! A validator receives the item key and the resolved settings and returns an
//! error describing why the value is unacceptable.

use crate::config::settings::Settings;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

type ValidateFn = dyn Fn(&str, &Settings) -> anyhow::Result<()> + Send + Sync;

#[derive(Clone)]
pub struct Validator(Arc<ValidateFn>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &Settings) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn check(&self, key: &str, settings: &Settings) -> anyhow::Result<()> {
        (self.0)(key, settings)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

impl Default for Validator {
    fn default() -> Self {
        needs_no_validation()
    }
}

/// Accept any value.
pub fn needs_no_validation() -> Validator {
    Validator::new(|_, _| Ok(()))
}

/// Wrap a closure that only looks at the typed value.
pub fn custom<T, F>(check: F) -> Validator
where
    T: DeserializeOwned,
    F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Validator::new(move |key, settings| {
        let value: T = settings.get(key)?;
        check(&value)
    })
}

/// Value must lie in `[min, max]`.
pub fn in_range<T>(min: T, max: T) -> Validator
where
    T: DeserializeOwned + PartialOrd + fmt::Display + Send + Sync + 'static,
{
    custom(move |value: &T| {
        if *value < min || *value > max {
            anyhow::bail!("{} is outside the allowed range [{}, {}]", value, min, max);
        }
        Ok(())
    })
}

/// String value must contain something other than whitespace.
pub fn not_empty() -> Validator {
    custom(|value: &String| {
        if value.trim().is_empty() {
            anyhow::bail!("value must not be empty");
        }
        Ok(())
    })
}

/// String value must be one of `allowed`.
pub fn one_of(allowed: &[&str]) -> Validator {
    let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
    custom(move |value: &String| {
        if !allowed.iter().any(|a| a == value) {
            anyhow::bail!("'{}' is not one of: {}", value, allowed.join(", "));
        }
        Ok(())
    })
}

/// String value must match `pattern`.
pub fn matches_pattern(pattern: &str) -> Result<Validator, regex::Error> {
    let re = Regex::new(pattern)?;
    Ok(custom(move |value: &String| {
        if !re.is_match(value) {
            anyhow::bail!("'{}' does not match {}", value, re.as_str());
        }
        Ok(())
    }))
}
