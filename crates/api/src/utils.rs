use anyhow::anyhow;
use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use smokeynet_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_API_PORT, DEFAULT_REQUEST_TIMEOUT,
};
use std::{env, time::Duration};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::{SynopticConfig, DEFAULT_NETWORKS, DEFAULT_SYNOPTIC_URL, DEFAULT_WITHIN_MINUTES};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "SmokeyNet API - Distance-weighted current weather for wildfire cameras"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SMOKEYNET_CONFIG, ./smokeynet.toml,
    /// $XDG_CONFIG_HOME/smokeynet/smokeynet.toml, /etc/smokeynet/smokeynet.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SMOKEYNET_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "SMOKEYNET_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SMOKEYNET_PORT")]
    pub port: Option<String>,

    /// CSV table of camera to weather station distances
    /// (columns: camera_id, stid, distance_mi)
    #[arg(short, long, env = "SMOKEYNET_MAPPING_FILE")]
    pub mapping_file: Option<String>,

    /// Synoptic Data API token
    #[arg(short = 't', long, env = "SYNOPTIC_TOKEN", hide_env_values = true)]
    pub synoptic_token: Option<String>,

    /// Synoptic Data API base url
    #[arg(short = 'u', long, env = "SYNOPTIC_URL")]
    pub synoptic_url: Option<String>,

    /// Comma separated Synoptic network ids to query
    #[arg(short, long, env = "SMOKEYNET_NETWORKS")]
    pub networks: Option<String>,

    /// Only use observations from the last N minutes
    #[arg(short, long, env = "SMOKEYNET_WITHIN_MINUTES")]
    pub within_minutes: Option<u32>,

    /// Timeout in seconds for requests to Synoptic
    #[arg(short, long, env = "SMOKEYNET_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Retries for transient Synoptic failures
    #[arg(long, env = "SMOKEYNET_MAX_RETRIES")]
    pub max_retries: Option<u32>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
    }

    pub fn mapping_file(&self) -> String {
        self.mapping_file
            .clone()
            .unwrap_or_else(|| "./camera_station_mappings.csv".to_string())
    }

    pub fn synoptic_url(&self) -> String {
        self.synoptic_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SYNOPTIC_URL.to_string())
    }

    pub fn networks(&self) -> String {
        self.networks
            .clone()
            .unwrap_or_else(|| DEFAULT_NETWORKS.to_string())
    }

    pub fn within_minutes(&self) -> u32 {
        self.within_minutes.unwrap_or(DEFAULT_WITHIN_MINUTES)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(3)
    }

    pub fn synoptic_config(&self) -> Result<SynopticConfig, anyhow::Error> {
        let token = self
            .synoptic_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                anyhow!("missing synoptic token, set SYNOPTIC_TOKEN or synoptic_token")
            })?;

        Ok(SynopticConfig {
            base_url: self.synoptic_url(),
            token,
            networks: self.networks(),
            within_minutes: self.within_minutes(),
            timeout: self.request_timeout(),
            max_retries: self.max_retries(),
            user_agent: format!("smokeynet-api/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Values set here win over values from `other`.
    pub fn merge(self, other: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(other.level),
            domain: self.domain.or(other.domain),
            port: self.port.or(other.port),
            mapping_file: self.mapping_file.or(other.mapping_file),
            synoptic_token: self.synoptic_token.or(other.synoptic_token),
            synoptic_url: self.synoptic_url.or(other.synoptic_url),
            networks: self.networks.or(other.networks),
            within_minutes: self.within_minutes.or(other.within_minutes),
            request_timeout: self.request_timeout.or(other.request_timeout),
            max_retries: self.max_retries.or(other.max_retries),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<(Cli, ConfigSource), anyhow::Error> {
    resolve_config(Cli::parse())
}

/// Merge parsed CLI args with the config file they point at, or the first one found.
pub fn resolve_config(cli_args: Cli) -> Result<(Cli, ConfigSource), anyhow::Error> {
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SMOKEYNET_CONFIG", "smokeynet.toml")
    };

    let file_config: Cli = load_config(&source)?;

    // CLI args override file config (env vars are handled by clap)
    Ok((cli_args.merge(file_config), source))
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_override_file_values() {
        let cli = Cli {
            port: Some(String::from("9000")),
            ..Default::default()
        };
        let file = Cli {
            port: Some(String::from("8080")),
            mapping_file: Some(String::from("/srv/mappings.csv")),
            ..Default::default()
        };
        let merged = cli.merge(file);
        assert_eq!(merged.port(), "9000");
        assert_eq!(merged.mapping_file(), "/srv/mappings.csv");
        assert_eq!(merged.host(), "127.0.0.1");
    }

    #[test]
    fn parses_file_config() {
        let cli: Cli = toml::from_str(
            r#"
            host = "0.0.0.0"
            synoptic_token = "abc123"
            within_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(cli.host(), "0.0.0.0");
        assert_eq!(cli.within_minutes(), 30);

        let synoptic = cli.synoptic_config().unwrap();
        assert_eq!(synoptic.token, "abc123");
        assert_eq!(synoptic.networks, DEFAULT_NETWORKS);
        assert_eq!(synoptic.timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT));
    }

    #[test]
    fn missing_token_is_an_error() {
        let cli = Cli {
            synoptic_token: Some(String::from("  ")),
            ..Default::default()
        };
        assert!(cli.synoptic_config().is_err());
        assert!(Cli::default().synoptic_config().is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded_and_reported() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../smokeynet.example.toml");
        let cli = Cli {
            config: Some(String::from(path)),
            port: Some(String::from("9000")),
            ..Default::default()
        };
        let (merged, source) = resolve_config(cli).unwrap();
        assert_eq!(source, ConfigSource::Explicit(path.into()));
        assert_eq!(source.to_string(), path);
        assert_eq!(merged.port(), "9000");
        assert_eq!(merged.level.as_deref(), Some("info"));
        assert_eq!(merged.networks(), DEFAULT_NETWORKS);
    }

    #[test]
    fn unknown_level_defaults_to_info() {
        let cli = Cli {
            level: Some(String::from("loud")),
            ..Default::default()
        };
        assert_eq!(get_log_level(&cli), LevelFilter::Info);
    }
}
