//! TOML configuration for the browser.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration pointed at Wikipedia.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_BURROWSER_CONFIG: &str = "BURROWSER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "burrowser.toml";

const DEFAULT_ORIGIN: &str = "https://en.wikipedia.org";
const DEFAULT_START_PATH: &str = "/wiki/Main_Page";
const DEFAULT_FORCED_QUERY: &str = "useskin=vector";
const DEFAULT_IGNORE_LIST: &[&str] = &["action=edit", "Encyclopedia"];
const DEFAULT_CONTENT_ID: &str = "content";
const DEFAULT_TITLE_CLASS: &str = "mw-first-heading";
const DEFAULT_STRIP_CLASS: &str = "mw-editsection";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = "Burrowser/0.1 (+https://burrowser)";
const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;
const DEFAULT_SINGLE_FLIGHT: bool = true;
const DEFAULT_TAB_LABEL_MAX: usize = 20;
const MIN_TAB_LABEL_MAX: usize = 4;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BurrowserConfig {
    pub site: SiteConfig,
    pub extract: ExtractConfig,
    pub net: NetConfig,
    pub navigation: NavigationConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Scheme and host that relative links resolve against.
    pub origin: String,
    pub start_path: String,
    /// Query pair appended to every internal fetch; empty disables it.
    pub forced_query: String,
    /// URLs containing any of these (case-insensitive) are never opened inline.
    pub ignore_list: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            start_path: DEFAULT_START_PATH.to_string(),
            forced_query: DEFAULT_FORCED_QUERY.to_string(),
            ignore_list: DEFAULT_IGNORE_LIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SiteConfig {
    pub fn is_ignored(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        let hit = self
            .ignore_list
            .iter()
            .any(|part| !part.is_empty() && url.contains(&part.to_lowercase()));
        log::debug!(target: "config", "is `{url}` on the ignore list? {hit}");
        hit
    }

    pub fn start_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), self.start_path)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    /// Id of the element holding the main document content.
    pub content_id: String,
    /// Class of the element whose text is the document title.
    pub title_class: String,
    /// Class of elements dropped from the title and the content.
    pub strip_class: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            content_id: DEFAULT_CONTENT_ID.to_string(),
            title_class: DEFAULT_TITLE_CLASS.to_string(),
            strip_class: DEFAULT_STRIP_CLASS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NetConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Keep at most one navigation in flight; a newer click supersedes it.
    pub single_flight: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            single_flight: DEFAULT_SINGLE_FLIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Tab labels longer than this are shortened with `...`.
    pub tab_label_max: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tab_label_max: DEFAULT_TAB_LABEL_MAX,
        }
    }
}

impl BurrowserConfig {
    pub fn from_toml_str(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw, path)?;
        log::info!(target: "config", "loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file: an explicit path, then `BURROWSER_CONFIG`,
    /// then `burrowser.toml` in the working directory.
    ///
    /// An explicitly named file must exist; the implicit default may be absent.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(ENV_BURROWSER_CONFIG) {
            return Self::load(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }
        log::debug!(target: "config", "no config file found; using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = &self.site.origin;
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "site.origin must be an http(s) URL, got `{origin}`"
            )));
        }
        if !self.site.start_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "site.start_path must start with `/`, got `{}`",
                self.site.start_path
            )));
        }
        if self.net.timeout_secs == 0 {
            return Err(ConfigError::Invalid("net.timeout_secs must be > 0".into()));
        }
        if self.ui.tab_label_max < MIN_TAB_LABEL_MAX {
            return Err(ConfigError::Invalid(format!(
                "ui.tab_label_max must be at least {MIN_TAB_LABEL_MAX}"
            )));
        }
        Ok(())
    }
}
