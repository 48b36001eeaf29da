use clap::{ArgAction, Parser, builder::BoolishValueParser};
use republic_core::{CAMERA, SENATO};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 3000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SPARQL_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "republic-mcpd",
    version,
    about = "MCP and REST server for the Camera and Senato SPARQL endpoints."
)]
struct CliArgs {
    #[arg(
        long = "stdio",
        env = "REPUBLIC_ENABLE_STDIO",
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "REPUBLIC_MCP_SERVE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(
        long,
        env = "REPUBLIC_HTTP_SERVE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    http_serve: bool,

    #[arg(long, env = "REPUBLIC_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "MCP_HOST", default_value = DEFAULT_HTTP_HOST)]
    http_host: String,

    #[arg(long, env = "MCP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    http_port: u16,

    #[arg(
        long,
        env = "REPUBLIC_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    http_timeout_secs: u64,

    #[command(flatten)]
    sparql: SparqlArgs,
}

/// Endpoint and timeout flags for the SPARQL clients.
#[derive(clap::Args, Debug)]
pub struct SparqlArgs {
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
}

/// Where and how the SPARQL endpoints are reached.
#[derive(Debug, Clone)]
pub struct SparqlSettings {
    pub camera_endpoint: String,
    pub senato_endpoint: String,
    pub timeout: Duration,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RepublicConfig {
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub http_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub http_addr: SocketAddr,
    pub http_timeout: Duration,
    pub sparql: SparqlSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),
    #[error("invalid {name} value: {value}")]
    InvalidSetting { name: &'static str, value: String },
}

impl RepublicConfig {
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

fn timeout(name: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidSetting {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn host(value: &str) -> Result<IpAddr, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
    trimmed.parse().map_err(|_| ConfigError::InvalidSetting {
        name: "MCP_HOST",
        value: value.to_string(),
    })
}

impl TryFrom<SparqlArgs> for SparqlSettings {
    type Error = ConfigError;

    fn try_from(args: SparqlArgs) -> Result<Self, Self::Error> {
        Ok(Self {
            camera_endpoint: endpoint("REPUBLIC_CAMERA_ENDPOINT", args.camera_endpoint)?,
            senato_endpoint: endpoint("REPUBLIC_SENATO_ENDPOINT", args.senato_endpoint)?,
            timeout: timeout("REPUBLIC_SPARQL_TIMEOUT_SECS", args.sparql_timeout_secs)?,
        })
    }
}

impl TryFrom<CliArgs> for RepublicConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !(args.enable_stdio || args.mcp_serve || args.http_serve) {
            return Err(ConfigError::MissingSetting(
                "REPUBLIC_ENABLE_STDIO, REPUBLIC_MCP_SERVE or REPUBLIC_HTTP_SERVE",
            ));
        }

        Ok(Self {
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            http_serve: args.http_serve,
            mcp_http_addr: args.mcp_http_addr,
            http_addr: SocketAddr::new(host(&args.http_host)?, args.http_port),
            http_timeout: timeout("REPUBLIC_HTTP_TIMEOUT_SECS", args.http_timeout_secs)?,
            sparql: SparqlSettings::try_from(args.sparql)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            enable_stdio: true,
            mcp_serve: false,
            http_serve: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            sparql: SparqlArgs {
                camera_endpoint: CAMERA.endpoint.to_string(),
                senato_endpoint: SENATO.endpoint.to_string(),
                sparql_timeout_secs: DEFAULT_SPARQL_TIMEOUT_SECS,
            },
        }
    }

    #[test]
    fn defaults_serve_stdio_against_the_public_endpoints() {
        let config = RepublicConfig::try_from(base_args()).expect("config should parse");

        assert!(config.enable_stdio);
        assert!(!config.http_serve);
        assert_eq!(config.http_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.sparql.camera_endpoint, "https://dati.camera.it/sparql");
        assert_eq!(config.sparql.timeout, Duration::from_secs(30));
    }

    #[test]
    fn at_least_one_front_end_is_required() {
        let mut args = base_args();
        args.enable_stdio = false;

        let err = RepublicConfig::try_from(args).expect_err("no front-end");
        assert!(matches!(err, ConfigError::MissingSetting(_)));
        assert_eq!(
            err.to_string(),
            "missing required setting: REPUBLIC_ENABLE_STDIO, REPUBLIC_MCP_SERVE or REPUBLIC_HTTP_SERVE"
        );
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let mut args = base_args();
        args.sparql.sparql_timeout_secs = 0;

        let err = RepublicConfig::try_from(args).expect_err("zero timeout");
        assert_eq!(err.to_string(), "invalid REPUBLIC_SPARQL_TIMEOUT_SECS value: 0");
    }

    #[test]
    fn endpoints_must_be_http_urls() {
        let mut args = base_args();
        args.sparql.senato_endpoint = "dati.senato.it/sparql".to_string();

        assert!(matches!(
            RepublicConfig::try_from(args),
            Err(ConfigError::InvalidSetting {
                name: "REPUBLIC_SENATO_ENDPOINT",
                ..
            })
        ));
    }

    #[test]
    fn localhost_binds_loopback() {
        let mut args = base_args();
        args.http_serve = true;
        args.http_host = "localhost".to_string();
        args.http_port = 8080;

        let config = RepublicConfig::try_from(args).expect("config should parse");
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn flags_parse_from_the_command_line() {
        let args = CliArgs::try_parse_from([
            "republic-mcpd",
            "--stdio",
            "false",
            "--http-serve",
            "--http-port",
            "4000",
        ])
        .expect("flags parse");

        let config = RepublicConfig::try_from(args).expect("config should parse");
        assert!(!config.enable_stdio);
        assert!(config.http_serve);
        assert_eq!(config.http_addr.port(), 4000);
    }
}
