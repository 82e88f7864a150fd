// Nexus Shell - serves the client's views to a local front end

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nexus_client::{app_state::AppState, config::Config, shell::create_shell_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nexus_client=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    let app_state = AppState::new(config.clone()).await?;

    let app = Router::new()
        .nest("/api/v1", create_shell_router(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.shell_address();
    info!("Nexus shell starting on http://{}", addr);
    info!("  GET    /api/v1/pages/{{page}}          - Navigate and render a page");
    info!("  POST   /api/v1/auth/sign-in            - Sign in");
    info!("  POST   /api/v1/posts/{{id}}/like       - Toggle a like");
    info!("  POST   /api/v1/search                  - Search input");
    info!("  GET    /api/v1/metrics                 - Backend call statistics");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
