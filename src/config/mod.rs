//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

use std::{net::SocketAddr, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, RenderArgs, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "gatechat";
const ENV_PREFIX: &str = "GATECHAT";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_GATEWAY_BASE_URL: &str = "https://gateway.ai.cloudflare.com/v1";
pub const DEFAULT_PAGE_TITLE: &str = "Corporate AI LLM";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub gateway: GatewaySettings,
    pub page: PageSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Upstream gateway settings. Credentials stay optional here so commands that
/// never call upstream can run without them; the client checks them on build.
#[derive(Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub account_id: Option<String>,
    pub gateway_name: Option<String>,
    pub provider_token: Option<String>,
    pub gateway_token: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("gateway_name", &self.gateway_name)
            .field("provider_token", &self.provider_token.as_ref().map(|_| "<redacted>"))
            .field("gateway_token", &self.gateway_token.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_render_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    gateway: RawGatewaySettings,
    page: RawPageSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.gateway_base_url.as_ref() {
            self.gateway.base_url = Some(url.clone());
        }
        if let Some(account) = overrides.gateway_account_id.as_ref() {
            self.gateway.account_id = Some(account.clone());
        }
        if let Some(name) = overrides.gateway_name.as_ref() {
            self.gateway.gateway_name = Some(name.clone());
        }
        if let Some(model) = overrides.gateway_model.as_ref() {
            self.gateway.model = Some(model.clone());
        }
        if let Some(seconds) = overrides.gateway_timeout_seconds {
            self.gateway.timeout_seconds = Some(seconds);
        }
        if let Some(title) = overrides.page_title.as_ref() {
            self.page.title = Some(title.clone());
        }
    }

    fn apply_render_overrides(&mut self, args: &RenderArgs) {
        if let Some(level) = args.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            gateway,
            page,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            gateway: build_gateway_settings(gateway)?,
            page: build_page_settings(page)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_gateway_settings(gateway: RawGatewaySettings) -> Result<GatewaySettings, LoadError> {
    let base_url = non_blank(gateway.base_url)
        .unwrap_or_else(|| DEFAULT_GATEWAY_BASE_URL.to_string());

    let timeout_seconds = gateway
        .timeout_seconds
        .unwrap_or(DEFAULT_GATEWAY_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "gateway.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(GatewaySettings {
        base_url,
        account_id: non_blank(gateway.account_id),
        gateway_name: non_blank(gateway.gateway_name),
        provider_token: non_blank(gateway.provider_token),
        gateway_token: non_blank(gateway.gateway_token),
        model: non_blank(gateway.model),
        timeout: Duration::from_secs(timeout_seconds),
    })
}

fn build_page_settings(page: RawPageSettings) -> Result<PageSettings, LoadError> {
    let title = match page.title {
        Some(title) => non_blank(Some(title))
            .ok_or_else(|| LoadError::invalid("page.title", "must not be empty"))?,
        None => DEFAULT_PAGE_TITLE.to_string(),
    };

    Ok(PageSettings { title })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawGatewaySettings {
    base_url: Option<String>,
    account_id: Option<String>,
    gateway_name: Option<String>,
    provider_token: Option<String>,
    gateway_token: Option<String>,
    model: Option<String>,
    timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for RawGatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawGatewaySettings")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("gateway_name", &self.gateway_name)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPageSettings {
    title: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
