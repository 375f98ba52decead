//! Application configuration for routeman.
//!
//! Resolution order: `--config <path>`, then `./routeman.toml`, then
//! `~/.routeman/routeman.toml`, then built-in defaults.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, RoutemanError};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "routeman.toml";

/// Config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".routeman";

// ---------------------------------------------------------------------------
// Config structs (matching routeman.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Collection metadata.
    #[serde(default)]
    pub collection: CollectionConfig,

    /// How to obtain the route listing.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Where the collection is written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Auth middleware detection.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// `[collection]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection title (`info.name`).
    #[serde(default = "default_name")]
    pub name: String,

    /// Collection description (`info.description`).
    #[serde(default = "default_description")]
    pub description: String,

    /// Default value of the `base_url` variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            base_url: default_base_url(),
        }
    }
}

fn default_name() -> String {
    "CRM Travel API".into()
}
fn default_description() -> String {
    "Auto-generated Postman collection for CRM Travel project".into()
}
fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}

/// `[routes]` section: the route-introspection command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Program to run.
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments passed to the program.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Directory to run the command in (the framework project root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            working_dir: None,
        }
    }
}

fn default_command() -> String {
    "php".into()
}
fn default_args() -> Vec<String> {
    vec!["artisan".into(), "route:list".into(), "--json".into()]
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Collection file path.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("crm_travel_postman_collection.json")
}

/// `[auth]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Middleware identifiers that mark a route as requiring a bearer token.
    #[serde(default = "default_auth_middleware")]
    pub middleware: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            middleware: default_auth_middleware(),
        }
    }
}

fn default_auth_middleware() -> Vec<String> {
    vec![
        "auth:sanctum".into(),
        "auth".into(),
        "App\\Http\\Middleware\\Authenticate:sanctum".into(),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the per-user config file (`~/.routeman/routeman.toml`).
pub fn home_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RoutemanError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Find the config file to load, if any.
///
/// An explicit path must exist; the implicit locations are optional.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(RoutemanError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = cwd.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Ok(Some(local));
    }

    // A missing home directory only disables the fallback.
    match home_config_path() {
        Ok(path) if path.exists() => Ok(Some(path)),
        _ => Ok(None),
    }
}

/// Load the application config. Returns defaults if no config file is found.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<AppConfig> {
    match resolve_config_path(explicit, cwd)? {
        Some(path) => {
            tracing::debug!(?path, "loading config file");
            load_config_from(&path)
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
///
/// Values are not validated here; callers run [`validate_config`] once CLI
/// overrides have been applied.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RoutemanError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        RoutemanError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `dir`. Returns the path to the created file.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(RoutemanError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| RoutemanError::io(dir, e))?;

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RoutemanError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RoutemanError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check values that serde cannot: the base URL and the route command.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let base_url = &config.collection.base_url;
    Url::parse(base_url).map_err(|e| {
        RoutemanError::config(format!("collection.base_url '{base_url}' is not a valid URL: {e}"))
    })?;

    if config.routes.command.trim().is_empty() {
        return Err(RoutemanError::config("routes.command must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(prefix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("route:list"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, config);
        assert_eq!(parsed.collection.base_url, "http://127.0.0.1:8000");
        assert_eq!(parsed.auth.middleware.len(), 3);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[collection]
name = "Shop API"

[routes]
working_dir = "/srv/shop"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.collection.name, "Shop API");
        assert_eq!(config.collection.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.routes.command, "php");
        assert_eq!(config.routes.working_dir, Some(PathBuf::from("/srv/shop")));
        assert_eq!(
            config.output.path,
            PathBuf::from("crm_travel_postman_collection.json")
        );
    }

    #[test]
    fn invalid_base_url_rejected() {
        let mut config = AppConfig::default();
        config.collection.base_url = "not a url".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("collection.base_url"));
    }

    #[test]
    fn empty_command_rejected() {
        let mut config = AppConfig::default();
        config.routes.command = "  ".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn init_then_load() {
        let dir = scratch_dir("routeman-config");
        let path = init_config(&dir, false).expect("init");
        assert_eq!(path, dir.join(CONFIG_FILE_NAME));

        let loaded = load_config(None, &dir).expect("load");
        assert_eq!(loaded, AppConfig::default());

        // Second init without force refuses to clobber.
        assert!(init_config(&dir, false).is_err());
        assert!(init_config(&dir, true).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_defers_validation() {
        let dir = scratch_dir("routeman-unvalidated");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[collection]\nbase_url = \"not a url\"\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.collection.base_url, "not a url");
        assert!(validate_config(&config).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = scratch_dir("routeman-missing");
        let missing = dir.join("nope.toml");
        let err = resolve_config_path(Some(&missing), &dir).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unparsable_config_reports_path() {
        let dir = scratch_dir("routeman-bad");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[collection\nname = ").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
