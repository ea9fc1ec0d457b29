use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use crate::app::{self, AppState};
use crate::auth::{generate_jwt, AuthSettings};
use crate::cli::auth_settings;
use crate::config::config;
use crate::database::models::{new_id, NewUser, User};
use crate::database::{DatabaseManager, MemoryStorage, PgStorage, Storage};
use crate::types::Role;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Keep all data in process memory instead of Postgres")]
    pub memory: bool,

    #[arg(long, help = "Port to listen on (defaults to SCHOOL_API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, requires = "memory", help = "User id of the admin seeded into the in-memory store")]
    pub admin_id: Option<String>,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting School API in {:?} mode", config.environment);

    let auth = auth_settings(config)?;

    let storage: Arc<dyn Storage> = if args.memory {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        let storage = MemoryStorage::new();
        let (admin, token) = bootstrap_admin(&storage, &auth, args.admin_id).await?;
        tracing::info!("Seeded admin {}", admin.id);
        println!("Admin token: {}", token);
        Arc::new(storage)
    } else {
        let pool = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            DatabaseManager::migrate(&pool).await?;
        }
        Arc::new(PgStorage::new(pool))
    };

    let router = app::router(AppState::new(storage, auth), config.api.max_request_size_bytes);

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("School API listening on http://{}", bind_addr);
    app::serve(listener, router).await.context("server error")?;
    Ok(())
}

/// An empty store has no users to authenticate; seed one admin and sign a
/// token for it.
pub async fn bootstrap_admin(
    storage: &dyn Storage,
    auth: &AuthSettings,
    admin_id: Option<String>,
) -> anyhow::Result<(User, String)> {
    let admin_id = admin_id.unwrap_or_else(new_id);
    let admin = storage
        .upsert_user(
            &admin_id,
            NewUser {
                email: None,
                first_name: Some("Admin".into()),
                last_name: None,
                profile_image_url: None,
                role: Role::Admin,
            },
        )
        .await?;
    let token = generate_jwt(&admin.id, auth)?;
    Ok((admin, token))
}
