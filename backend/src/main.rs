use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sales_analyzer_backend::{
    config::Config,
    db::connection::{create_pool, DbPool},
    docs,
    router::build_router,
    state::AppState,
};

/// Hides the password portion of a connection URL.
fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return "<invalid>".into();
    };
    match rest.rsplit_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_analyzer_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %mask_database_url(&config.database_url),
        port = config.port,
        db_max_connections = config.db_max_connections,
        max_upload_bytes = config.max_upload_bytes,
        import_batch_size = config.import_batch_size,
        upload_dir = ?config.upload_dir,
        time_zone = %config.time_zone,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool: DbPool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let port = config.port;
    let app = build_router(AppState::new(pool, config)).merge(docs::swagger_ui());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_database_url_hides_password() {
        assert_eq!(
            mask_database_url("postgres://sales:secret@db:5432/sales"),
            "postgres://sales:***@db:5432/sales"
        );
    }

    #[test]
    fn mask_database_url_keeps_urls_without_credentials() {
        assert_eq!(
            mask_database_url("postgres://localhost/sales"),
            "postgres://localhost/sales"
        );
        assert_eq!(mask_database_url("not a url"), "<invalid>");
    }
}
