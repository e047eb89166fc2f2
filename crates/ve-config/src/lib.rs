//! `ve.toml` settings for the essay renderer.
//!
//! [`Config::load`] reads an explicit file, or the nearest `ve.toml` walking up
//! from the working directory, or falls back to built-in defaults. Command-line
//! flags are layered on top through [`CliSettings`].
//!
//! ## `${NAME}` references
//!
//! These string fields may reference environment variables as `${NAME}` (must
//! be set) or `${NAME:-fallback}`:
//! - `render.default_prefix`, `render.base_url`
//! - `storage.bucket`, `storage.endpoint`, `storage.token`
//! - `github.token`, `github.api_url`, `github.raw_url`
//! - every `assets.*` root

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

const CONFIG_FILENAME: &str = "ve.toml";

/// Placeholder in development asset roots replaced by the requesting host.
pub const HOST_PLACEHOLDER: &str = "{host}";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Local development: assets come from local dev servers.
    Dev,
    /// Production: assets come from the public CDN and API.
    Prod,
}

impl Env {
    /// Classify a requesting host.
    ///
    /// Loopback names and `192.168.*` addresses are development hosts.
    /// A trailing `:port` is ignored.
    #[must_use]
    pub fn from_host(host: &str) -> Self {
        let name = host.rsplit_once(':').map_or(host, |(name, _)| name);
        if name == "localhost" || name == "127.0.0.1" || name.starts_with("192.168.") {
            Self::Dev
        } else {
            Self::Prod
        }
    }

    /// Whether this is the development environment.
    #[must_use]
    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }
}

/// Flag values that win over whatever the file says. `None` leaves the file value.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override deployment environment.
    pub env: Option<Env>,
    /// Override default content prefix.
    pub default_prefix: Option<String>,
    /// Override base URL.
    pub base_url: Option<String>,
    /// Override stylesheet/script inlining.
    pub inline: Option<bool>,
    /// Override GitHub Pages link mode.
    pub ghp: Option<bool>,
}

/// Top-level `ve.toml` contents.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rendering defaults.
    pub render: RenderConfig,
    /// Object storage backend.
    pub storage: StorageConfig,
    /// GitHub content access.
    pub github: GithubConfig,
    /// Asset roots for stylesheets and scripts.
    pub assets: AssetsConfig,

    /// File this config came from; `None` for defaults.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering defaults.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Fixed environment. When unset, derived from the requesting host.
    pub env: Option<Env>,
    /// Prefix used to qualify bare essay names.
    pub default_prefix: String,
    /// Base URL written into the page `<base href>`.
    pub base_url: String,
    /// Inline stylesheets and scripts instead of linking them.
    pub inline: bool,
    /// Rebase root-relative links for GitHub Pages hosting.
    pub ghp: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            env: None,
            default_prefix: "visual-essays/content".to_owned(),
            base_url: "/".to_owned(),
            inline: true,
            ghp: false,
        }
    }
}

impl RenderConfig {
    /// Environment for a request from `host`.
    #[must_use]
    pub fn env_for_host(&self, host: &str) -> Env {
        self.env.unwrap_or_else(|| Env::from_host(host))
    }
}

/// Object storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible service.
    #[default]
    S3,
    /// Google Cloud Storage.
    Gcs,
}

/// Object storage configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend type.
    pub backend: StorageBackend,
    /// Bucket name.
    pub bucket: String,
    /// AWS region (S3 only).
    pub region: String,
    /// Custom endpoint (S3-compatible services, GCS emulators).
    pub endpoint: Option<String>,
    /// Bearer token (GCS only).
    pub token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            bucket: "visual-essays".to_owned(),
            region: "us-east-1".to_owned(),
            endpoint: None,
            token: None,
        }
    }
}

/// GitHub access configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    /// API token; anonymous access when unset or empty.
    pub token: Option<String>,
    /// REST API root.
    pub api_url: String,
    /// Raw content host.
    pub raw_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.github.com".to_owned(),
            raw_url: "https://raw.githubusercontent.com".to_owned(),
        }
    }
}

/// Asset root URLs, per environment.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Static root serving templates' linked css/js in production.
    pub api_static_root: String,
    /// Static root in development; `{host}` is replaced by the requesting host.
    pub dev_api_static_root: String,
    /// Component stylesheet root in production.
    pub css_root: String,
    /// Component stylesheet root in development.
    pub dev_css_root: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            api_static_root: "https://api.juncture-digital.org/static".to_owned(),
            dev_api_static_root: "http://{host}:8000/static".to_owned(),
            css_root: "https://unpkg.com/visual-essays/dist/visual-essays".to_owned(),
            dev_css_root: "http://localhost:3333/build".to_owned(),
        }
    }
}

impl AssetsConfig {
    /// Static root for `env`, with the host substituted in development.
    #[must_use]
    pub fn api_static_root(&self, env: Env, host: &str) -> String {
        match env {
            Env::Dev => {
                let name = host.rsplit_once(':').map_or(host, |(name, _)| name);
                self.dev_api_static_root.replace(HOST_PLACEHOLDER, name)
            }
            Env::Prod => self.api_static_root.clone(),
        }
    }

    /// Component stylesheet root for `env`.
    #[must_use]
    pub fn css_root(&self, env: Env) -> &str {
        match env {
            Env::Dev => &self.dev_css_root,
            Env::Prod => &self.css_root,
        }
    }
}

/// Failure to produce a usable [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid ve.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field parsed but holds an unusable value.
    #[error("invalid config value: {0}")]
    Validation(String),
    /// A `${NAME}` reference could not be resolved.
    #[error("{field}: {message}")]
    EnvVar {
        /// Dotted field path, such as `github.token`.
        field: String,
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        Err(ConfigError::Validation(format!("{field} is empty")))
    } else {
        Ok(())
    }
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} is not an http(s) URL: {url}"
        )))
    }
}

impl Config {
    /// Read settings and apply flag overrides.
    ///
    /// An explicit `config_path` must exist. Without one the nearest `ve.toml`
    /// above the working directory is used, and defaults when there is none.
    ///
    /// # Errors
    ///
    /// A missing explicit file, unreadable or malformed TOML, an unset `${NAME}`,
    /// or a value that fails [`Config::validate`].
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(env) = settings.env {
            self.render.env = Some(env);
        }
        if let Some(prefix) = &settings.default_prefix {
            self.render.default_prefix.clone_from(prefix);
        }
        if let Some(base_url) = &settings.base_url {
            self.render.base_url.clone_from(base_url);
        }
        if let Some(inline) = settings.inline {
            self.render.inline = inline;
        }
        if let Some(ghp) = settings.ghp {
            self.render.ghp = ghp;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(current)
    }

    fn discover_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Check fields that would otherwise fail late, at request time.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Validation`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.base_url, "render.base_url")?;
        require_non_empty(&self.storage.bucket, "storage.bucket")?;
        require_http_url(&self.github.api_url, "github.api_url")?;
        require_http_url(&self.github.raw_url, "github.raw_url")?;
        require_http_url(&self.assets.api_static_root, "assets.api_static_root")?;
        require_http_url(&self.assets.dev_api_static_root, "assets.dev_api_static_root")?;
        require_http_url(&self.assets.css_root, "assets.css_root")?;
        require_http_url(&self.assets.dev_css_root, "assets.dev_css_root")?;
        if let Some(endpoint) = &self.storage.endpoint {
            require_http_url(endpoint, "storage.endpoint")?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expand = expand::expand_env;

        self.render.default_prefix =
            expand(&self.render.default_prefix, "render.default_prefix")?;
        self.render.base_url = expand(&self.render.base_url, "render.base_url")?;

        self.storage.bucket = expand(&self.storage.bucket, "storage.bucket")?;
        if let Some(endpoint) = &self.storage.endpoint {
            self.storage.endpoint = Some(expand(endpoint, "storage.endpoint")?);
        }
        if let Some(token) = &self.storage.token {
            self.storage.token = Some(expand(token, "storage.token")?);
        }

        if let Some(token) = &self.github.token {
            self.github.token = Some(expand(token, "github.token")?);
        }
        self.github.api_url = expand(&self.github.api_url, "github.api_url")?;
        self.github.raw_url = expand(&self.github.raw_url, "github.raw_url")?;

        self.assets.api_static_root = expand(&self.assets.api_static_root, "assets.api_static_root")?;
        self.assets.dev_api_static_root =
            expand(&self.assets.dev_api_static_root, "assets.dev_api_static_root")?;
        self.assets.css_root = expand(&self.assets.css_root, "assets.css_root")?;
        self.assets.dev_css_root = expand(&self.assets.dev_css_root, "assets.dev_css_root")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.render.default_prefix, "visual-essays/content");
        assert_eq!(config.render.base_url, "/");
        assert!(config.render.inline);
        assert!(!config.render.ghp);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket, "visual-essays");
        assert_eq!(config.github.raw_url, "https://raw.githubusercontent.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[render]
env = "dev"
default_prefix = "demo/content"
inline = false

[storage]
backend = "gcs"
bucket = "essays"

[github]
api_url = "https://github.example.com/api/v3"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.render.env, Some(Env::Dev));
        assert_eq!(config.render.default_prefix, "demo/content");
        assert!(!config.render.inline);
        assert_eq!(config.storage.backend, StorageBackend::Gcs);
        assert_eq!(config.storage.bucket, "essays");
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/ve.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[render]\nprefix = \"x\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[assets]\ncss_root = \"unpkg.com/ve\"\n");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid config value: assets.css_root is not an http(s) URL: unpkg.com/ve"
        );
    }

    #[test]
    fn test_env_expansion_with_default() {
        // SAFETY: the variable name is unique to this test
        unsafe { std::env::remove_var("VE_CONFIG_TEST_TOKEN") };
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "[github]\ntoken = \"${VE_CONFIG_TEST_TOKEN:-anonymous}\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.github.token.as_deref(), Some("anonymous"));
    }

    #[test]
    fn test_cli_settings_override() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[render]\nbase_url = \"/essays/\"\n");
        let settings = CliSettings {
            env: Some(Env::Prod),
            default_prefix: Some("acme/docs".to_owned()),
            inline: Some(false),
            ..CliSettings::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.render.env, Some(Env::Prod));
        assert_eq!(config.render.default_prefix, "acme/docs");
        assert_eq!(config.render.base_url, "/essays/");
        assert!(!config.render.inline);
    }

    #[test]
    fn test_discover_from_parent() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "");
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_from(nested), Some(path));
    }

    #[test]
    fn test_env_from_host() {
        assert_eq!(Env::from_host("localhost:8080"), Env::Dev);
        assert_eq!(Env::from_host("127.0.0.1"), Env::Dev);
        assert_eq!(Env::from_host("192.168.1.20:5000"), Env::Dev);
        assert_eq!(Env::from_host("visual-essays.net"), Env::Prod);
    }

    #[test]
    fn test_env_for_host_prefers_configured() {
        let render = RenderConfig {
            env: Some(Env::Prod),
            ..RenderConfig::default()
        };

        assert_eq!(render.env_for_host("localhost"), Env::Prod);
        assert_eq!(RenderConfig::default().env_for_host("localhost"), Env::Dev);
    }

    #[test]
    fn test_asset_roots_per_env() {
        let assets = AssetsConfig::default();

        assert_eq!(
            assets.api_static_root(Env::Dev, "localhost:5000"),
            "http://localhost:8000/static"
        );
        assert_eq!(
            assets.api_static_root(Env::Prod, "localhost"),
            "https://api.juncture-digital.org/static"
        );
        assert_eq!(assets.css_root(Env::Dev), "http://localhost:3333/build");
        assert_eq!(
            assets.css_root(Env::Prod),
            "https://unpkg.com/visual-essays/dist/visual-essays"
        );
    }
}
