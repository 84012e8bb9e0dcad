use std::collections::HashMap;
use std::io::Write;

use env_logger::{Builder, Target, WriteStyle};
use log::{debug, info, LevelFilter};
use serde::{Deserialize, Serialize};

/// Available logging subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggingSubsystem {
    /// Main application and CLI
    #[serde(rename = "main")]
    Main,
    /// JukeBox plugin client
    #[serde(rename = "client")]
    Client,
    /// HTTP client operations
    #[serde(rename = "http")]
    Http,
    /// Polling and prompt injection
    #[serde(rename = "injection")]
    Injection,
    /// Extension settings and the settings form
    #[serde(rename = "settings")]
    Settings,
    /// Function tools
    #[serde(rename = "tools")]
    Tools,
    /// Host integration
    #[serde(rename = "host")]
    Host,
    /// Configuration loading and parsing
    #[serde(rename = "config")]
    Config,
    /// Third-party dependencies
    #[serde(rename = "deps")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Get the module prefix for this subsystem
    pub fn module_prefix(&self) -> &'static str {
        match self {
            LoggingSubsystem::Main => "jukebox_prompt,jukebox",
            LoggingSubsystem::Client => "jukebox_prompt::jukebox",
            LoggingSubsystem::Http => "jukebox_prompt::helpers::http_client",
            LoggingSubsystem::Injection => "jukebox_prompt::injection,jukebox_prompt::extension",
            LoggingSubsystem::Settings => "jukebox_prompt::settings",
            LoggingSubsystem::Tools => "jukebox_prompt::functions",
            LoggingSubsystem::Host => "jukebox_prompt::host,jukebox_prompt::helpers::debounce",
            LoggingSubsystem::Config => "jukebox_prompt::config,jukebox_prompt::logging",
            LoggingSubsystem::Dependencies => "reqwest,hyper,hyper_util",
        }
    }

    /// Get all available subsystems
    pub fn all() -> Vec<LoggingSubsystem> {
        vec![
            LoggingSubsystem::Main,
            LoggingSubsystem::Client,
            LoggingSubsystem::Http,
            LoggingSubsystem::Injection,
            LoggingSubsystem::Settings,
            LoggingSubsystem::Tools,
            LoggingSubsystem::Host,
            LoggingSubsystem::Config,
            LoggingSubsystem::Dependencies,
        ]
    }

    /// Parse a subsystem name as used in the config file
    pub fn from_name(name: &str) -> Option<LoggingSubsystem> {
        match name.to_lowercase().as_str() {
            "main" => Some(LoggingSubsystem::Main),
            "client" | "jukebox" => Some(LoggingSubsystem::Client),
            "http" => Some(LoggingSubsystem::Http),
            "injection" => Some(LoggingSubsystem::Injection),
            "settings" => Some(LoggingSubsystem::Settings),
            "tools" => Some(LoggingSubsystem::Tools),
            "host" => Some(LoggingSubsystem::Host),
            "config" => Some(LoggingSubsystem::Config),
            "deps" | "dependencies" => Some(LoggingSubsystem::Dependencies),
            _ => None,
        }
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    /// Whether to include timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Subsystem-specific log levels
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    /// Whether to include module paths in log output
    #[serde(default)]
    pub include_module_path: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: true,
            colors: true,
            subsystems: HashMap::new(),
            include_module_path: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse logging config JSON: {}", e))
    }

    /// Convert string log level to LevelFilter
    fn parse_log_level(level: &str) -> LevelFilter {
        match level.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => {
                eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
                LevelFilter::Info
            }
        }
    }

    /// Module prefixes and levels for every configured subsystem, sorted
    fn module_filters(&self) -> Vec<(String, String)> {
        let mut filters = Vec::new();
        for (name, level) in &self.subsystems {
            match LoggingSubsystem::from_name(name) {
                Some(subsystem) => {
                    for prefix in subsystem.module_prefix().split(',') {
                        filters.push((prefix.trim().to_string(), level.clone()));
                    }
                }
                // Allow custom module specifications
                None => filters.push((name.clone(), level.clone())),
            }
        }
        filters.sort();
        filters
    }

    /// Build the environment filter string for env_logger
    pub fn build_filter_string(&self) -> String {
        let mut filter_parts = vec![self.level.clone()];
        for (module, level) in self.module_filters() {
            filter_parts.push(format!("{}={}", module, level));
        }
        filter_parts.join(",")
    }

    /// Initialize the logger with this configuration
    pub fn initialize_logger(&self) -> Result<(), String> {
        let filter_string = self.build_filter_string();
        debug!("Using logging filter: {}", filter_string);

        let mut builder = Builder::new();
        builder.filter(None, Self::parse_log_level(&self.level));
        for (module, level) in self.module_filters() {
            builder.filter(Some(&module), Self::parse_log_level(&level));
        }
        // RUST_LOG wins over the config file
        builder.parse_env("RUST_LOG");

        let write_style = if self.colors {
            WriteStyle::Auto
        } else {
            WriteStyle::Never
        };
        builder.write_style(write_style);

        match self.target.to_lowercase().as_str() {
            "stdout" => {
                builder.target(Target::Stdout);
            }
            "stderr" => {
                builder.target(Target::Stderr);
            }
            _ => {
                return Err(format!("Unknown logging target: {}", self.target));
            }
        }

        let include_module_path = self.include_module_path;
        let timestamps = self.timestamps;

        builder.format(move |buf, record| {
            let mut output = String::new();

            if timestamps {
                output.push_str(&format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
            }

            output.push_str(&format!("[{}] ", record.level()));

            if include_module_path {
                if let Some(module) = record.module_path() {
                    output.push_str(&format!("[{}] ", module));
                }
            }

            output.push_str(&format!("{}", record.args()));

            writeln!(buf, "{}", output)
        });

        builder
            .try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        info!("Logging initialized with filter: {}", filter_string);
        Ok(())
    }
}

/// Initialize logging from an optional config section and the command line flags
pub fn initialize_logging(config: Option<LoggingConfig>, debug_mode: bool, verbose_mode: bool) -> Result<(), String> {
    let mut config = config.unwrap_or_default();

    if debug_mode {
        config.level = "debug".to_string();
    } else if verbose_mode {
        config.level = "debug".to_string();
        // Verbose keeps third-party crates quiet
        config
            .subsystems
            .entry("deps".to_string())
            .or_insert_with(|| "warn".to_string());
    }

    config.initialize_logger()?;
    if debug_mode {
        info!("Debug mode enabled via command line");
    } else if verbose_mode {
        info!("Verbose mode enabled via command line");
    }
    Ok(())
}
