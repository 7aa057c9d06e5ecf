use std::sync::Arc;

use anyhow::Context;

use catalog_api::app::{AppState, build_app};
use catalog_api::config::{AppConfig, SuperuserConfig};
use catalog_auth::AuthError;
use catalog_core::StoreError;
use catalog_infra::{InMemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    catalog_observability::init(config.log_format);
    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let tokens = config.token_settings();
    let state = match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url, config.max_connections)
                .await
                .context("failed to open the database")?;
            tracing::info!(max_connections = config.max_connections, "using postgres store");
            AppState::new(Arc::new(store), &tokens)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on exit)");
            AppState::new(Arc::new(InMemoryStore::new()), &tokens)
        }
    };

    if let Some(superuser) = &config.superuser {
        bootstrap_superuser(&state, superuser).await?;
    }

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Create the configured superuser unless the mobile is already taken.
async fn bootstrap_superuser(state: &AppState, superuser: &SuperuserConfig) -> anyhow::Result<()> {
    match state
        .auth
        .create_superuser(&superuser.mobile, &superuser.password, &superuser.name)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "superuser created");
            Ok(())
        }
        Err(AuthError::Store(StoreError::Duplicate { .. })) => {
            tracing::info!(mobile = %superuser.mobile, "superuser already exists");
            Ok(())
        }
        Err(e) => Err(e).context("failed to create superuser"),
    }
}
