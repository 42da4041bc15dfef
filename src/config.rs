use home::home_dir;
use std::{
    collections::HashMap,
    error::Error,
    fmt::{self, Display, Formatter},
    fs::read_to_string,
    path::PathBuf,
};

/// The configuration compiled into the binary, applied when no config file exists on the system.
pub const DEFAULT_CONFIG: &str = include_str!("../default_config");

/// A fatal problem with the startup configuration.  These abort the interpreter before any
/// source is read.
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> ConfigError {
        ConfigError {
            message: message.into(),
        }
    }
}

impl Error for ConfigError {}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

type IniSections = HashMap<String, HashMap<String, String>>;

/// A minimal INI reader: `[section]` headers, `key = value` lines, `;` and `#` comments.
fn parse_ini(text: &str) -> Result<IniSections, ConfigError> {
    let mut sections = IniSections::new();
    let mut current: Option<String> = None;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::new(format!(
                "Config line {} is not a section, comment, or key = value pair",
                number + 1
            )));
        };

        let Some(section) = &current else {
            return Err(ConfigError::new(format!(
                "Config line {} appears before any [section] header",
                number + 1
            )));
        };

        sections
            .get_mut(section)
            .expect("The current section is inserted when its header is read.")
            .insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(sections)
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }

    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(rest);
        }
    }

    PathBuf::from(path)
}

/// The startup configuration: where the user keeps their sloth tree and the library directory
/// inside it.  Read once at startup from the first existing config file, falling back to the
/// compiled-in default.
pub struct Config {
    /// The user's sloth directory, with `~` expanded.
    pub sloth_dir: PathBuf,

    /// The library directory name inside sloth_dir.
    pub lib_dir: String,

    /// Where the configuration was actually read from, echoed back for diagnostics.
    pub config_file: String,
}

impl Config {
    /// The config file locations, in search order.
    fn file_candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from("sloth.config")];

        if let Some(home) = home_dir() {
            candidates.push(home.join(".sloth.config"));
            candidates.push(home.join(".sloth").join("config"));
            candidates.push(home.join(".config").join("sloth").join("config"));
        }

        candidates
    }

    /// Read the configuration from the first existing candidate file, or from the compiled-in
    /// default when none exists.  An unreadable or malformed file is fatal.
    pub fn load() -> Result<Config, ConfigError> {
        for candidate in Config::file_candidates() {
            if !candidate.exists() {
                continue;
            }

            let text = read_to_string(&candidate).map_err(|err| {
                ConfigError::new(format!(
                    "Could not read config file {}: {}",
                    candidate.display(),
                    err
                ))
            })?;

            return Config::parse(&text, &candidate.display().to_string());
        }

        Config::parse(DEFAULT_CONFIG, "<built-in>")
    }

    /// Parse configuration text, recording where it came from.
    pub fn parse(text: &str, origin: &str) -> Result<Config, ConfigError> {
        let sections = parse_ini(text)?;

        let paths = sections.get("Paths").ok_or_else(|| {
            ConfigError::new(format!("Config {} is missing the [Paths] section", origin))
        })?;

        let sloth_dir = paths.get("sloth_dir").ok_or_else(|| {
            ConfigError::new(format!("Config {} is missing Paths.sloth_dir", origin))
        })?;

        let lib_dir = paths.get("lib_dir").ok_or_else(|| {
            ConfigError::new(format!("Config {} is missing Paths.lib_dir", origin))
        })?;

        Ok(Config {
            sloth_dir: expand_home(sloth_dir),
            lib_dir: lib_dir.clone(),
            config_file: origin.to_string(),
        })
    }

    /// The configured library directory: `<sloth_dir>/<lib_dir>`.
    pub fn library_path(&self) -> PathBuf {
        self.sloth_dir.join(&self.lib_dir)
    }
}
