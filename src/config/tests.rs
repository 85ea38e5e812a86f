use std::time::Duration;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_applied() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:8787");
    assert_eq!(settings.gateway.base_url, DEFAULT_GATEWAY_BASE_URL);
    assert_eq!(settings.gateway.timeout, Duration::from_secs(60));
    assert!(settings.gateway.account_id.is_none());
    assert_eq!(settings.page.title, DEFAULT_PAGE_TITLE);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero port");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.gateway.timeout_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "gateway.timeout_seconds",
            ..
        }
    ));
}

#[test]
fn unparseable_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn blank_title_is_rejected() {
    let mut raw = RawSettings::default();
    raw.page.title = Some("   ".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn blank_credentials_are_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.gateway.account_id = Some("  ".to_string());
    raw.gateway.provider_token = Some(" token ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.gateway.account_id.is_none());
    assert_eq!(settings.gateway.provider_token.as_deref(), Some("token"));
}

#[test]
fn gateway_debug_output_redacts_tokens() {
    let mut raw = RawSettings::default();
    raw.gateway.provider_token = Some("sk-secret".to_string());
    raw.gateway.gateway_token = Some("gw-secret".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    let rendered = format!("{:?}", settings.gateway);
    assert!(!rendered.contains("sk-secret"));
    assert!(!rendered.contains("gw-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["gatechat"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "gatechat",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--gateway-model",
        "gpt-4o-mini",
        "--page-title",
        "Support",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.gateway_model.as_deref(), Some("gpt-4o-mini"));
            assert_eq!(serve.overrides.page_title.as_deref(), Some("Support"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from(["gatechat", "render", "--log-level", "warn", "/tmp/reply.md"]);

    match args.command.expect("render command") {
        Command::Render(render) => {
            assert_eq!(render.file, Some(std::path::PathBuf::from("/tmp/reply.md")));
            assert_eq!(render.log_level.as_deref(), Some("warn"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_without_file_reads_stdin() {
    let args = CliArgs::parse_from(["gatechat", "render"]);

    match args.command.expect("render command") {
        Command::Render(render) => assert!(render.file.is_none()),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn config_file_is_layered_under_cli_overrides() {
    use std::io::Write as _;

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    writeln!(
        file,
        "[server]\nport = 9000\n\n[gateway]\naccount_id = \"acct\"\nmodel = \"gpt-4o-mini\"\n\n[page]\ntitle = \"Support Desk\""
    )
    .expect("write config");

    let cli = CliArgs::parse_from([
        "gatechat",
        "--config-file",
        file.path().to_str().expect("utf-8 path"),
        "serve",
        "--page-title",
        "Ops Desk",
    ]);
    let settings = load(&cli).expect("settings load");

    assert_eq!(settings.server.addr.port(), 9000);
    assert_eq!(settings.gateway.account_id.as_deref(), Some("acct"));
    assert_eq!(settings.gateway.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(settings.page.title, "Ops Desk");
}

#[test]
fn missing_explicit_config_file_fails() {
    let cli = CliArgs::parse_from(["gatechat", "--config-file", "/nonexistent/gatechat.toml"]);
    let err = load(&cli).expect_err("missing file");
    assert!(matches!(err, LoadError::Build(_)));
}
