use std::{
    io::{self, Read, Write},
    path::Path,
    process,
    sync::Arc,
};

use gatechat::{
    application::{
        chat::ChatService,
        error::AppError,
        render::{RenderService, render_service},
    },
    config,
    infra::{
        error::InfraError,
        gateway::{GatewayClient, GatewayConfig},
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Render(args) => run_render(args),
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let gateway = GatewayConfig::from_settings(&settings.gateway)?;
    let client = GatewayClient::new(gateway)?;
    let endpoint = client.endpoint().clone();

    let chat = ChatService::new(Arc::new(client), render_service());
    let state = HttpState {
        chat: Arc::new(chat),
        page_title: Arc::from(settings.page.title.as_str()),
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "gatechat::serve",
        addr = %settings.server.addr,
        gateway = %endpoint,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!(target = "gatechat::serve", "server stopped");
    Ok(())
}

fn run_render(args: config::RenderArgs) -> Result<(), AppError> {
    let markdown = match args.file.as_deref() {
        Some(path) => read_file(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(InfraError::from)?;
            buffer
        }
    };

    let html = render_service().render(&markdown);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(html.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .map_err(InfraError::from)?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|err| {
        AppError::unexpected(format!("failed to read `{}`: {err}", path.display()))
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "gatechat::serve",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    info!(target = "gatechat::serve", "shutdown signal received");
}
