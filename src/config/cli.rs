use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the gatechat binary.
#[derive(Debug, Parser)]
#[command(name = "gatechat", version, about = "Chat front end for an AI gateway")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "GATECHAT_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the chat page and the chat API.
    Serve(Box<ServeArgs>),
    /// Render a Markdown file (or stdin) to HTML on stdout.
    Render(RenderArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the gateway base URL.
    #[arg(long = "gateway-base-url", value_name = "URL")]
    pub gateway_base_url: Option<String>,

    /// Override the gateway account identifier.
    #[arg(long = "gateway-account-id", value_name = "ID")]
    pub gateway_account_id: Option<String>,

    /// Override the gateway name.
    #[arg(long = "gateway-name", value_name = "NAME")]
    pub gateway_name: Option<String>,

    /// Override the chat model requested upstream.
    #[arg(long = "gateway-model", value_name = "MODEL")]
    pub gateway_model: Option<String>,

    /// Override the upstream request timeout.
    #[arg(long = "gateway-timeout-seconds", value_name = "SECONDS")]
    pub gateway_timeout_seconds: Option<u64>,

    /// Override the title shown on the chat page.
    #[arg(long = "page-title", value_name = "TITLE")]
    pub page_title: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderArgs {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Markdown file to render; reads stdin when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}
