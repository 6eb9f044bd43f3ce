use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::app::{app, AppState};
use crate::auth::{ClaimPolicy, TokenService};
use crate::config::AppConfig;
use crate::database::models::UserClaim;
use crate::database::{DatabaseManager, PgProviderStore, PgUserStore};
use crate::services::{AuthService, ProviderService};

#[derive(Parser)]
#[command(name = "provider-api")]
#[command(about = "Provider registry HTTP API with JWT authentication")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "API_PORT", help = "Port to listen on (overrides config)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        /// Shut down once stdin reaches EOF, so a supervising process that
        /// exits takes the server with it
        #[arg(long, hide = true)]
        exit_on_stdin_close: bool,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,

    #[command(about = "Attach a claim to an existing user, e.g. Provider Remove")]
    GrantClaim {
        email: String,
        claim_type: String,
        claim_value: String,
    },

    #[command(about = "Attach a role to an existing user")]
    GrantRole { email: String, role: String },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::config::config();
    tracing::info!("Starting provider-api in {:?} mode", config.environment);

    let database = DatabaseManager::connect_lazy(&config.database)
        .context("failed to configure database pool")?;

    let command = cli.command.unwrap_or(Commands::Serve {
        exit_on_stdin_close: false,
    });

    match command {
        Commands::Serve { exit_on_stdin_close } => {
            if config.database.run_migrations {
                database.migrate().await.context("failed to run migrations")?;
            }
            let port = cli.port.unwrap_or(config.api.port);
            serve(&database, config, port, exit_on_stdin_close).await
        }
        Commands::Migrate => {
            database.migrate().await.context("failed to run migrations")?;
            println!("Migrations applied");
            Ok(())
        }
        Commands::GrantClaim {
            email,
            claim_type,
            claim_value,
        } => {
            let auth = auth_service(&database, config);
            auth.grant_claim(
                &email,
                UserClaim {
                    claim_type: claim_type.clone(),
                    claim_value: claim_value.clone(),
                },
            )
            .await?;
            println!("Granted {}={} to {}", claim_type, claim_value, email);
            Ok(())
        }
        Commands::GrantRole { email, role } => {
            let auth = auth_service(&database, config);
            auth.grant_role(&email, &role).await?;
            println!("Granted role {} to {}", role, email);
            Ok(())
        }
    }
}

fn auth_service(database: &DatabaseManager, config: &AppConfig) -> AuthService {
    let users = Arc::new(PgUserStore::new(database.pool().clone()));
    AuthService::new(users, TokenService::new(&config.security), &config.security)
}

async fn serve(
    database: &DatabaseManager,
    config: &AppConfig,
    port: u16,
    exit_on_stdin_close: bool,
) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("SECURITY_JWT_SECRET is not set; every login and protected route will fail");
    }

    let state = AppState {
        providers: ProviderService::new(Arc::new(PgProviderStore::new(database.pool().clone()))),
        auth: auth_service(database, config),
        delete_policy: ClaimPolicy::provider_remove(&config.security),
    };

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Provider API listening on http://{}", bind_addr);
    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal(exit_on_stdin_close))
        .await
        .context("server error")?;

    database.close().await;
    Ok(())
}

async fn shutdown_signal(exit_on_stdin_close: bool) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let stdin_closed = async {
        if exit_on_stdin_close {
            stdin_eof().await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
        _ = stdin_closed => tracing::info!("Stdin closed, shutting down"),
    }
}

async fn stdin_eof() {
    use tokio::io::AsyncReadExt;

    let mut stdin = tokio::io::stdin();
    let mut buf = [0u8; 256];
    loop {
        match stdin.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => continue,
        }
    }
}
