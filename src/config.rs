use std::net::IpAddr;
use std::path::Path;

use crate::error::Error;
use crate::logging::LogFormat;
use crate::normalize;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = ".jumptocode.toml";

/// Default helper port; the browser side posts here unless told otherwise.
pub const DEFAULT_PORT: u16 = 5123;

/// Default folders searched for a bare filename that does not exist as given.
pub const DEFAULT_SEARCH_DIRS: [&str; 4] = ["src", "app", "components", "pages"];

/// Project configuration loaded from `.jumptocode.toml`.
/// Every key is optional; CLI flags override whatever the file says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the helper binds to.
    pub bind: IpAddr,
    /// Editor executable, looked up on `PATH`.
    pub editor: String,
    /// `pretty` for humans, `json` for log shippers.
    pub log_format: LogFormat,
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Helper port.
    pub port: u16,
    /// Maximum directory depth for the basename search, per search dir.
    pub search_depth: usize,
    /// Folders searched when a path does not exist as given.
    pub search_dirs: Vec<String>,
    /// Folders that anchor display paths.
    pub source_roots: Vec<String>,
}

/// Raw TOML structure for `.jumptocode.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct JumptocodeTomlConfig {
    /// See `Config::bind`.
    bind: Option<String>,
    /// See `Config::editor`.
    editor: Option<String>,
    /// See `Config::log_format`.
    log_format: Option<LogFormat>,
    /// See `Config::log_level`.
    log_level: Option<String>,
    /// See `Config::port`.
    port: Option<u16>,
    /// See `Config::search_depth`.
    search_depth: Option<usize>,
    /// See `Config::search_dirs`.
    search_dirs: Option<Vec<String>>,
    /// See `Config::source_roots`.
    source_roots: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            bind: IpAddr::from([127, 0, 0, 1]),
            editor: "code".to_string(),
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
            port: DEFAULT_PORT,
            search_depth: 1,
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(ToString::to_string).collect(),
            source_roots: normalize::default_source_roots(),
        };
    }
}

impl Config {
    /// Load config from `.jumptocode.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed; a config the user wrote is never
    /// silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or `Error::ConfigInvalid`
    /// if a value parses but cannot be used.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::parse(&content);
    }

    /// Parse config text, filling unset keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` for malformed TOML or unknown keys, and
    /// `Error::ConfigInvalid` for unusable values.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: JumptocodeTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let bind = match raw.bind {
            Some(b) => b.parse::<IpAddr>().map_err(|_| {
                return Error::ConfigInvalid { reason: format!("bind `{b}` is not an IP address") };
            })?,
            None => defaults.bind,
        };

        let config = Self {
            bind,
            editor: raw.editor.unwrap_or(defaults.editor),
            log_format: raw.log_format.unwrap_or(defaults.log_format),
            log_level: raw.log_level.unwrap_or(defaults.log_level),
            port: raw.port.unwrap_or(defaults.port),
            search_depth: raw.search_depth.unwrap_or(defaults.search_depth),
            search_dirs: raw.search_dirs.unwrap_or(defaults.search_dirs),
            source_roots: raw.source_roots.unwrap_or(defaults.source_roots),
        };
        config.check()?;
        return Ok(config);
    }

    /// Reject values that parse but would break the helper.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` naming the first bad value.
    fn check(&self) -> Result<(), Error> {
        if self.port == 0 {
            return Err(Error::ConfigInvalid { reason: "port must be between 1 and 65535".to_string() });
        }
        if self.editor.trim().is_empty() {
            return Err(Error::ConfigInvalid { reason: "editor must not be empty".to_string() });
        }
        if let Some(dir) = self.search_dirs.iter().find(|d| return d.contains("..") || Path::new(d).is_absolute()) {
            return Err(Error::ConfigInvalid {
                reason: format!("search dir `{dir}` must be relative and stay inside the project"),
            });
        }
        return Ok(());
    }
}
