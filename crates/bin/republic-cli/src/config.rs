use clap::Parser;
use republic_core::{CAMERA, SENATO};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_SPARQL_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "republic-cli",
    version,
    about = "Interroga i dati aperti del Parlamento Italiano dal terminale."
)]
struct CliArgs {
    #[arg(long, env = "REPUBLIC_CAMERA_ENDPOINT", default_value = CAMERA.endpoint)]
    camera_endpoint: String,

    #[arg(long, env = "REPUBLIC_SENATO_ENDPOINT", default_value = SENATO.endpoint)]
    senato_endpoint: String,

    #[arg(
        long,
        env = "REPUBLIC_SPARQL_TIMEOUT_SECS",
        default_value_t = DEFAULT_SPARQL_TIMEOUT_SECS
    )]
    sparql_timeout_secs: u64,

    /// Runs a command (e.g. `/call get_governi {}`) and exits; repeatable.
    #[arg(long = "exec", short = 'e', value_name = "COMMAND")]
    exec: Vec<String>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub camera_endpoint: String,
    pub senato_endpoint: String,
    pub sparql_timeout: Duration,
    pub exec: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} value: {value}")]
    InvalidSetting { name: &'static str, value: String },
}

impl CliConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

fn endpoint(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    match reqwest::Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidSetting { name, value }),
    }
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.sparql_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "REPUBLIC_SPARQL_TIMEOUT_SECS",
                value: args.sparql_timeout_secs.to_string(),
            });
        }

        Ok(Self {
            camera_endpoint: endpoint("REPUBLIC_CAMERA_ENDPOINT", args.camera_endpoint)?,
            senato_endpoint: endpoint("REPUBLIC_SENATO_ENDPOINT", args.senato_endpoint)?,
            sparql_timeout: Duration::from_secs(args.sparql_timeout_secs),
            exec: args
                .exec
                .into_iter()
                .filter(|command| !command.trim().is_empty())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            camera_endpoint: CAMERA.endpoint.to_string(),
            senato_endpoint: SENATO.endpoint.to_string(),
            sparql_timeout_secs: DEFAULT_SPARQL_TIMEOUT_SECS,
            exec: Vec::new(),
        }
    }

    #[test]
    fn blank_exec_commands_are_dropped() {
        let mut args = base_args();
        args.exec = vec!["/tools".to_string(), "  ".to_string()];

        let config = CliConfig::try_from(args).expect("config should parse");
        assert_eq!(config.exec, vec!["/tools"]);
        assert_eq!(config.sparql_timeout, Duration::from_secs(30));
    }

    #[test]
    fn endpoints_and_timeouts_are_validated() {
        let mut args = base_args();
        args.camera_endpoint = "ftp://dati.camera.it/sparql".to_string();
        assert!(CliConfig::try_from(args).is_err());

        let mut args = base_args();
        args.sparql_timeout_secs = 0;
        let err = CliConfig::try_from(args).expect_err("zero timeout");
        assert_eq!(err.to_string(), "invalid REPUBLIC_SPARQL_TIMEOUT_SECS value: 0");
    }

    #[test]
    fn exec_is_repeatable() {
        let args = CliArgs::try_parse_from([
            "republic-cli",
            "--exec",
            "/tools",
            "-e",
            "/call get_governi {}",
        ])
        .expect("flags parse");
        assert_eq!(args.exec.len(), 2);
    }
}
