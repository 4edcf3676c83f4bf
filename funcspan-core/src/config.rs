//! Configuration file support for funcspan
//!
//! Loads extraction settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.funcspanrc.json` next to the input file
//! 3. `funcspan.config.json` next to the input file
//! 4. `"funcspan"` key in `package.json` next to the input file
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::discover::{CollectOptions, UnresolvedTargets};
use crate::lower::{LowerOptions, DEFAULT_MAX_DEPTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MAX_DEPTH_LIMIT: usize = 10_000;

/// funcspan configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FuncspanConfig {
    /// What to do with a function assigned to a non-name target (default: error)
    #[serde(default)]
    pub unresolved_targets: Option<UnresolvedTargets>,

    /// Report arrow functions assigned to names (default: true)
    #[serde(default)]
    pub arrow_functions: Option<bool>,

    /// Report class and object-literal methods by bare key (default: false)
    #[serde(default)]
    pub methods: Option<bool>,

    /// Read inline `<script>` blocks from HTML inputs (default: true)
    #[serde(default)]
    pub html_scripts: Option<bool>,

    /// Maximum syntax nesting before giving up (default: 1024)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Log level when neither RUST_LOG nor --verbose is given (default: warn)
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

/// Log verbosity accepted in config files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Resolved configuration ready for use
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub lower: LowerOptions,
    pub collect: CollectOptions,
    pub html_scripts: bool,
    pub log_level: LogLevel,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl FuncspanConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(depth) = self.max_depth {
            if depth == 0 {
                anyhow::bail!("max_depth must be positive (got {})", depth);
            }
            if depth > MAX_DEPTH_LIMIT {
                anyhow::bail!(
                    "max_depth must be at most {} (got {})",
                    MAX_DEPTH_LIMIT,
                    depth
                );
            }
        }

        Ok(())
    }

    /// Resolve config into the options the extractor consumes
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        Ok(ResolvedConfig {
            lower: LowerOptions {
                arrow_functions: self.arrow_functions.unwrap_or(true),
                methods: self.methods.unwrap_or(false),
                max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            },
            collect: CollectOptions {
                unresolved_targets: self.unresolved_targets.unwrap_or_default(),
            },
            html_scripts: self.html_scripts.unwrap_or(true),
            log_level: self.log_level.unwrap_or_default(),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        FuncspanConfig::default().resolve()
    }
}

/// Discover and load a config file from `dir`
///
/// Search order:
/// 1. `.funcspanrc.json`
/// 2. `funcspan.config.json`
/// 3. `"funcspan"` key in `package.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(FuncspanConfig, PathBuf)>> {
    let rc_path = dir.join(".funcspanrc.json");
    if rc_path.exists() {
        let config = load_config_file(&rc_path)?;
        return Ok(Some((config, rc_path)));
    }

    let config_path = dir.join("funcspan.config.json");
    if config_path.exists() {
        let config = load_config_file(&config_path)?;
        return Ok(Some((config, config_path)));
    }

    let pkg_path = dir.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<FuncspanConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: FuncspanConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load funcspan config from the "funcspan" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<FuncspanConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get("funcspan") {
        Some(value) => {
            let config: FuncspanConfig = serde_json::from_value(value.clone())
                .with_context(|| format!("invalid funcspan config in {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid funcspan config in {}", path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for an input file
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in the directory holding `input`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(input: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        let dir = match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (FuncspanConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = FuncspanConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert_eq!(resolved.lower, LowerOptions::default());
        assert_eq!(resolved.collect.unresolved_targets, UnresolvedTargets::Error);
        assert!(resolved.html_scripts);
        assert_eq!(resolved.log_level, LogLevel::Warn);
        assert!(resolved.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let json = r#"{}"#;
        let config: FuncspanConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "unresolved_targets": "skip",
            "arrow_functions": false,
            "methods": true,
            "html_scripts": false,
            "max_depth": 256,
            "log_level": "debug"
        }"#;
        let config: FuncspanConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.collect.unresolved_targets, UnresolvedTargets::Skip);
        assert!(!resolved.lower.arrow_functions);
        assert!(resolved.lower.methods);
        assert_eq!(resolved.lower.max_depth, 256);
        assert!(!resolved.html_scripts);
        assert_eq!(resolved.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<FuncspanConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_unknown_policy() {
        let json = r#"{"unresolved_targets": "ignore"}"#;
        let result: Result<FuncspanConfig, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_zero_depth() {
        let json = r#"{"max_depth": 0}"#;
        let config: FuncspanConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_excessive_depth() {
        let json = r#"{"max_depth": 10001}"#;
        let config: FuncspanConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{"max_depth": 10000}"#;
        let config: FuncspanConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discover_funcspanrc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".funcspanrc.json");
        fs::write(&config_path, r#"{"methods": false}"#).unwrap();

        let result = discover_config(dir.path()).unwrap();
        let (config, path) = result.expect("config should be discovered");
        assert_eq!(config.methods, Some(false));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_rc_file_wins_over_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".funcspanrc.json"), r#"{"max_depth": 10}"#).unwrap();
        fs::write(dir.path().join("funcspan.config.json"), r#"{"max_depth": 20}"#).unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.max_depth, Some(10));
    }

    #[test]
    fn test_discover_package_json() {
        let dir = tempfile::tempdir().unwrap();
        let pkg_path = dir.path().join("package.json");
        fs::write(
            &pkg_path,
            r#"{
            "name": "my-project",
            "version": "1.0.0",
            "funcspan": {
                "unresolved_targets": "skip"
            }
        }"#,
        )
        .unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.unresolved_targets, Some(UnresolvedTargets::Skip));
        assert_eq!(path, pkg_path);
    }

    #[test]
    fn test_package_json_without_key() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "x"}"#).unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("funcspan.config.json");
        fs::write(&config_path, "{ not json").unwrap();

        let err = load_config_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("funcspan.config.json"));
    }

    #[test]
    fn test_load_and_resolve_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".funcspanrc.json"), r#"{"html_scripts": false}"#).unwrap();
        let input = dir.path().join("app.js");

        let resolved = load_and_resolve(&input, None).unwrap();
        assert!(!resolved.html_scripts);
        assert_eq!(
            resolved.config_path,
            Some(dir.path().join(".funcspanrc.json"))
        );
    }

    #[test]
    fn test_explicit_path_skips_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".funcspanrc.json"), r#"{"max_depth": 10}"#).unwrap();
        let explicit = dir.path().join("custom.json");
        fs::write(&explicit, r#"{"max_depth": 99}"#).unwrap();

        let resolved = load_and_resolve(&dir.path().join("app.js"), Some(&explicit)).unwrap();
        assert_eq!(resolved.lower.max_depth, 99);
        assert_eq!(resolved.config_path, Some(explicit));
    }
}
