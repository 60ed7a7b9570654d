//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::call::AudioExtension;

/// pbx-recordings - download call recordings from your PBX
#[derive(Parser, Debug)]
#[command(name = "pbx-recordings")]
#[command(version)]
#[command(about = "Download call recordings from the PBX REST API, filtered by date and queue")]
#[command(long_about = None)]
pub struct Cli {
    /// Start of the date range, e.g. 2018-08-01
    #[arg(short = 'f', long, value_name = "DATE")]
    pub date_from: Option<String>,

    /// End of the date range, e.g. 2018-08-31
    #[arg(short = 't', long, value_name = "DATE")]
    pub date_to: Option<String>,

    /// Account email (SSO login)
    #[arg(short = 'e', long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Account password (SSO login)
    #[arg(
        short = 'p',
        long,
        value_name = "PASSWORD",
        env = "PBX_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// REST API key (System -> API -> REST)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// REST API secret
    #[arg(long, value_name = "SECRET")]
    pub api_secret: Option<String>,

    /// PBX host for API key access, e.g. company.voipex.io
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override the PBX API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the SSO API base URL
    #[arg(long, value_name = "URL")]
    pub sso_url: Option<String>,

    /// Download the recordings found (default: only summarize them)
    #[arg(short = 'd', long)]
    pub download: bool,

    /// Only calls of these queues, comma separated (e.g. Queue1,Queue2)
    #[arg(short = 'q', long, value_name = "QUEUES")]
    pub queues: Option<String>,

    /// Request recordings in this format
    #[arg(short = 'x', long, value_name = "EXT")]
    pub extension: Option<ExtensionArg>,

    /// Directory recordings are saved under
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Calls requested per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<u32>,

    /// Use the /calls and /records/{linkedid}/stream routes of older PBX
    /// versions (API key access only)
    #[arg(long)]
    pub legacy_api: bool,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Extension argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtensionArg {
    Mp3,
    Wav,
}

impl From<ExtensionArg> for AudioExtension {
    fn from(arg: ExtensionArg) -> Self {
        match arg {
            ExtensionArg::Mp3 => AudioExtension::Mp3,
            ExtensionArg::Wav => AudioExtension::Wav,
        }
    }
}

/// How the run authenticates against the PBX API
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialOptions {
    Sso { email: String, password: String },
    ApiKey { key: String, secret: String },
}

impl std::fmt::Debug for CredentialOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sso { email, .. } => f.debug_struct("Sso").field("email", email).finish(),
            Self::ApiKey { key, .. } => f.debug_struct("ApiKey").field("key", key).finish(),
        }
    }
}

/// Validated options for an export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub date_from: String,
    pub date_to: String,
    pub queues: Vec<String>,
    pub extension: Option<AudioExtension>,
    pub download: bool,
    pub credentials: CredentialOptions,
    /// Base URL of the PBX API
    pub api_url: String,
    pub sso_url: String,
    pub output_dir: PathBuf,
    pub page_size: u32,
    pub legacy_api: bool,
    /// Bound on each request and on each wait for recording data
    pub request_timeout: std::time::Duration,
    /// Cap on a whole recording download
    pub download_timeout: Option<std::time::Duration>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "sso_url",
    "host",
    "api_key",
    "api_secret",
    "email",
    "output_dir",
    "page_size",
    "request_timeout_secs",
    "download_timeout_secs",
    "legacy_api",
];

/// Keys whose values are masked when displayed
pub const SECRET_CONFIG_KEYS: &[&str] = &["api_key", "api_secret"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
