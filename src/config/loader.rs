//! Config and secrets file discovery

use crate::config::handlers::Handlers;
use crate::config::settings::{Layer, SOURCE_CONFIG_FILE, SOURCE_SECRETS_FILE};
use crate::error::{ConfigError, Halted};
use figment::providers::{Format, Json, Toml, Yaml};
use figment::value::Dict;
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions tried in order; the first existing file wins.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    Config,
    Secrets,
}

impl FileKind {
    fn basename(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Secrets => "secrets",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::Config => SOURCE_CONFIG_FILE,
            Self::Secrets => SOURCE_SECRETS_FILE,
        }
    }
}

/// Directory searched for a file kind.
///
/// An empty path means the working directory. Decode errors are fatal only
/// when the path was given explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    pub dir: PathBuf,
    pub explicit: bool,
}

impl SearchPath {
    pub fn new(raw: &str) -> Self {
        if raw.is_empty() {
            Self { dir: PathBuf::from("."), explicit: false }
        } else {
            Self { dir: PathBuf::from(raw), explicit: true }
        }
    }
}

/// Find and decode the file for `kind` under `search`.
///
/// Returns `Ok(None)` when no usable file exists.
pub(crate) fn load_layer(
    kind: FileKind,
    search: &SearchPath,
    handlers: &Handlers,
) -> Result<Option<Layer>, Halted> {
    if !search.explicit {
        handlers.warn(&format!(
            "no {} path given, using current working directory",
            kind.basename()
        ));
    }

    let Some(path) = discover_file(&search.dir, kind.basename()) else {
        let properties = search.dir.join(format!("{}.properties", kind.basename()));
        if properties.is_file() {
            handlers.warn(&format!(
                "{} uses the properties format, which is not supported; ignoring it",
                properties.display()
            ));
        }
        tracing::info!("No {} file found in {}", kind.basename(), search.dir.display());
        return Ok(None);
    };

    match read_file(&path) {
        Ok(figment) => {
            tracing::debug!("Loaded {} file {}", kind.basename(), path.display());
            Ok(Some(Layer::new(kind.source(), figment)))
        }
        Err(e) if search.explicit => Err(handlers.fail(ConfigError::File {
            kind: kind.basename(),
            path,
            source: Box::new(e),
        })),
        Err(e) => {
            // Found in the working directory without being asked for: skip it.
            handlers.warn(&format!(
                "Failed to parse auto-discovered {} file {}: {}",
                kind.basename(),
                path.display(),
                e
            ));
            Ok(None)
        }
    }
}

pub(crate) fn discover_file(dir: &Path, basename: &str) -> Option<PathBuf> {
    for ext in SUPPORTED_EXTENSIONS {
        let path = dir.join(format!("{basename}.{ext}"));
        if path.is_file() {
            // Absolute, so the provider does not search parent directories.
            return Some(fs::canonicalize(&path).unwrap_or(path));
        }
    }
    None
}

fn read_file(path: &Path) -> Result<Figment, figment::Error> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let figment = match ext.as_str() {
        "yaml" | "yml" => Figment::from(Yaml::file(path)),
        "json" => Figment::from(Json::file(path)),
        "toml" => Figment::from(Toml::file(path)),
        other => {
            return Err(figment::Error::from(format!(
                "Unsupported config extension '.{}' for file {}",
                other,
                path.display()
            )))
        }
    };

    // Decode eagerly so syntax errors surface at load time.
    figment.extract::<Dict>()?;
    Ok(figment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn recording() -> (Handlers, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let warnings = Arc::new(Mutex::new(Vec::new()));
        let failures = Arc::new(Mutex::new(Vec::new()));
        let (w, f) = (Arc::clone(&warnings), Arc::clone(&failures));
        let handlers = Handlers::new(
            move |err| f.lock().expect("lock").push(err.to_string()),
            move |msg| w.lock().expect("lock").push(msg.to_string()),
        );
        (handlers, warnings, failures)
    }

    fn explicit(tmp: &TempDir) -> SearchPath {
        SearchPath::new(tmp.path().to_str().expect("utf8 path"))
    }

    #[test]
    fn test_search_path_empty_means_cwd() {
        let search = SearchPath::new("");
        assert_eq!(search.dir, PathBuf::from("."));
        assert!(!search.explicit);
        assert!(SearchPath::new("/etc/app").explicit);
    }

    #[test]
    fn test_discover_prefers_yaml() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.json"), "{}").expect("write");
        fs::write(tmp.path().join("config.yaml"), "a: 1\n").expect("write");

        let found = discover_file(tmp.path(), "config").expect("found");
        assert_eq!(found.file_name().and_then(|n| n.to_str()), Some("config.yaml"));
        assert!(found.is_absolute());
    }

    #[test]
    fn test_load_yaml_layer() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.yaml"), "server:\n  port: 9000\n").expect("write");
        let (handlers, warnings, _) = recording();

        let layer = load_layer(FileKind::Config, &explicit(&tmp), &handlers)
            .expect("not halted")
            .expect("layer");
        let figment = Figment::from(layer);
        assert_eq!(figment.extract_inner::<u16>("server.port").expect("port"), 9000);
        assert!(warnings.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_load_toml_and_json_secrets() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("secrets.toml"), "[db]\npassword = \"hunter2\"\n").expect("write");
        let (handlers, _, _) = recording();

        let layer = load_layer(FileKind::Secrets, &explicit(&tmp), &handlers)
            .expect("not halted")
            .expect("layer");
        let figment = Figment::from(layer);
        assert_eq!(figment.extract_inner::<String>("db.password").expect("pw"), "hunter2");

        let json_dir = TempDir::new().expect("tmp");
        fs::write(json_dir.path().join("secrets.json"), r#"{"db": {"password": "x"}}"#)
            .expect("write");
        let layer = load_layer(FileKind::Secrets, &explicit(&json_dir), &handlers)
            .expect("not halted");
        assert!(layer.is_some());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let (handlers, warnings, failures) = recording();

        let layer = load_layer(FileKind::Config, &explicit(&tmp), &handlers).expect("not halted");
        assert!(layer.is_none());
        assert!(warnings.lock().expect("lock").is_empty());
        assert!(failures.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_properties_file_is_reported() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.properties"), "server.port=1\n").expect("write");
        let (handlers, warnings, _) = recording();

        let layer = load_layer(FileKind::Config, &explicit(&tmp), &handlers).expect("not halted");
        assert!(layer.is_none());
        let warnings = warnings.lock().expect("lock");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("properties"));
    }

    #[test]
    fn test_explicit_invalid_file_fails() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.yaml"), "server: [unclosed\n").expect("write");
        let (handlers, _, failures) = recording();

        let result = load_layer(FileKind::Config, &explicit(&tmp), &handlers);
        assert!(matches!(result, Err(Halted)));
        let failures = failures.lock().expect("lock");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("config.yaml"));
    }
}
