mod env;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use hypr_api_auth::{JwtVerifier, attach_auth};
use hypr_chat_relay::{ChatRelayConfig, SupabaseChatStore};
use hypr_supabase_db::SupabaseDb;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use env::Env;

fn app(env: &Env) -> Router {
    let db = SupabaseDb::new(
        reqwest::Client::new(),
        &env.supabase.supabase_url,
        &env.supabase.supabase_service_role_key,
    );
    let config =
        ChatRelayConfig::from_env(&env.chat_relay, Arc::new(SupabaseChatStore::new(db)));
    let verifier = JwtVerifier::new(&env.supabase.supabase_jwt_secret);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/openapi.json",
            get(|| async { Json(hypr_chat_relay::openapi()) }),
        )
        .nest("/api", hypr_chat_relay::router(config))
        .layer(from_fn_with_state(verifier, attach_auth))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = Env::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let _sentry = sentry::init((
        env.sentry_dsn.clone(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            send_default_pii: false,
            ..Default::default()
        },
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], u16::try_from(env.port)?));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server_listening");

    axum::serve(listener, app(&env))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "shutdown_signal_failed");
    }
    tracing::info!("server_shutting_down");
}
