use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass::cli::{self, Commands, RequestCommands, UserCommands};
use gatepass::config::{self, Config, LogFormat};
use gatepass::models::{Decision, PassRequest, UserAccount};
use gatepass::store::RequestStore;
use gatepass::workflow::{self, query};
use gatepass::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load()?;
    init_tracing(cfg.log_format)?;

    let args = cli::Cli::parse();
    let db_file = args.db_file.clone().unwrap_or_else(|| cfg.db_file.clone());

    let result = match args.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, db_file, port).await
        }
        Some(Commands::Request { command }) => {
            let store = RequestStore::open_file(&db_file).await?;
            handle_request_command(&store, command).await
        }
        Some(Commands::User { command }) => {
            let store = RequestStore::open_file(&db_file).await?;
            handle_user_command(&store, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, db_file, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    // Export spans over OTLP only when a collector is configured
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "gatepass"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let (pretty_layer, json_layer) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gatepass=debug,tower_http=debug".into()),
        ))
        .with(pretty_layer)
        .with(json_layer)
        .with(telemetry_layer)
        .init();
    Ok(())
}

async fn run_server(cfg: Config, db_file: PathBuf, port: u16) -> anyhow::Result<()> {
    tracing::info!("Opening request store at {}", db_file.display());
    let store = RequestStore::open_file(&db_file)
        .await
        .with_context(|| format!("failed to open {}", db_file.display()))?;
    let state = Arc::new(AppState::new(store)?);

    let frontend_origin = cfg.frontend_origin.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            let origin_str = origin.to_str().unwrap_or("");
            origin_str == frontend_origin
                || origin_str.starts_with("http://localhost:")
                || origin_str.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let app = api::app(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Gate pass service listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn handle_request_command(store: &RequestStore, cmd: RequestCommands) -> anyhow::Result<()> {
    let outcome = cmd.outcome();
    match cmd {
        RequestCommands::List { status, requester } => {
            let requests = match requester {
                Some(name) => query::by_requester(store, &name).await,
                None => query::by_status(store, status).await,
            };
            print_requests(&requests);
        }
        RequestCommands::Approve { id, reviewer, remarks }
        | RequestCommands::Reject { id, reviewer, remarks } => {
            let outcome = outcome.context("approve/reject without an outcome")?;
            let decision = Decision {
                outcome,
                reviewer_name: reviewer,
                remarks,
            };
            let request = workflow::decide(store, &id, decision).await?;
            println!(
                "Request {} {} by {}.",
                request.id,
                request.status,
                request.reviewer_name.as_deref().unwrap_or_default()
            );
        }
        RequestCommands::Verify { id } => {
            let verification = workflow::verify(store, &id).await;
            match verification.request {
                Some(req) if verification.valid => println!(
                    "VALID pass {}\n  Requester:   {}\n  Destination: {}\n  Return by:   {}\n  Approved by: {}",
                    req.id,
                    req.requester_name,
                    req.destination,
                    req.planned_return_time,
                    req.reviewer_name.as_deref().unwrap_or_default()
                ),
                _ => println!("INVALID or not approved: {}", id),
            }
        }
    }
    Ok(())
}

async fn handle_user_command(store: &RequestStore, cmd: UserCommands) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add { username, password, role } => {
            let user = store
                .insert_user(UserAccount {
                    username,
                    password,
                    role,
                })
                .await?;
            println!("User added:\n  Username: {}\n  Role:     {}", user.username, user.role.as_str());
        }
        UserCommands::List => {
            let users = store.users().await;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<24} {:<12}", "USERNAME", "ROLE");
                for u in users {
                    println!("{:<24} {:<12}", u.username, u.role.as_str());
                }
            }
        }
    }
    Ok(())
}

fn print_requests(requests: &[PassRequest]) {
    if requests.is_empty() {
        println!("No requests found.");
        return;
    }

    println!(
        "{:<18} {:<16} {:<10} {:<20} SUBMITTED",
        "ID", "REQUESTER", "STATUS", "DESTINATION"
    );
    for r in requests {
        println!(
            "{:<18} {:<16} {:<10} {:<20} {}",
            r.id,
            r.requester_name,
            r.status.as_str(),
            r.destination,
            r.submitted_at.format("%Y-%m-%d %H:%M")
        );
    }
}
