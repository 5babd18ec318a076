use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use tracing::{info, warn};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Port the server listens on when nothing else is configured
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the Sutekh server and CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Port the server listens on
    pub port: u16,
    /// Server the CLI talks to
    pub server_url: Option<String>,
    /// Filter applied to card listings that do not name one
    pub default_card_filter: Option<String>,
    /// Named filter expressions, usable as `saved=<name>`
    pub saved_filters: BTreeMap<String, String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub default_card_filter: Option<String>,
    /// Merged into the existing saved filters; a name given again replaces its expression
    #[serde(default)]
    pub saved_filters: Option<BTreeMap<String, String>>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "sutekh", about = "A card collection manager for Vampire: The Eternal Struggle")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port to listen on
    #[clap(long, env = "SUTEKH_PORT")]
    pub port: Option<u16>,

    /// Filter applied to card listings that do not name one
    #[clap(long, env = "SUTEKH_DEFAULT_FILTER")]
    pub default_card_filter: Option<String>,

    /// Debug mode
    #[clap(long, env = "SUTEKH_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        let mut saved_filters = self.saved_filters;
        saved_filters.extend(update.saved_filters.unwrap_or_default());

        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            port: update.port.unwrap_or(self.port),
            server_url: update.server_url.or(self.server_url),
            default_card_filter: update.default_card_filter.or(self.default_card_filter),
            saved_filters,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    let dirs = ProjectDirs::from("net", "sutekh", "sutekh");
    if dirs.is_none() {
        warn!("Could not determine the user's project directories");
    }
    dirs
}

/// Directory holding `config.toml`
pub fn get_config_dir_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Directory holding the database and log files
pub fn get_data_dir_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Full path of the configuration file
pub fn get_config_file_path() -> Option<PathBuf> {
    get_config_dir_path().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Returns the base (default) configuration
///
/// The database lives in `data_path` when one is given, and in the working
/// directory otherwise.
pub fn base_config(data_path: Option<PathBuf>) -> Config {
    let database_url = data_path.map_or("sutekh.db".to_string(), |path| {
        path.join("sutekh.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        port: DEFAULT_PORT,
        server_url: None,
        default_card_filter: None,
        saved_filters: BTreeMap::new(),
    }
}

/// Loads configuration from a TOML file
///
/// A missing path or file is not an error and yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        warn!("Failed to read config file: {}", e);
        format!("Failed to read config file: {}", e)
    })?;

    match toml::from_str::<ConfigUpdate>(&content) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            Err(format!("Failed to parse config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        port: args.port,
        server_url: None,
        default_card_filter: args.default_card_filter,
        saved_filters: None,
    }
}

/// Gets the complete configuration by combining defaults with values from
/// the config file, environment variables and command line arguments, in
/// order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let data_path = get_data_dir_path().filter(|path| {
        if let Err(e) = fs::create_dir_all(path) {
            warn!("Could not create data directory {:?}: {}", path, e);
            return false;
        }
        true
    });

    let file_update = config_from_file(get_config_file_path()).unwrap_or_default();
    let config = base_config(data_path)
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, port={}, saved_filters={}",
        config.database_url,
        config.port,
        config.saved_filters.len()
    );

    config
}
