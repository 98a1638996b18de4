use chat_relay::config::Config;
use chat_relay::directory::{Directory, DirectoryUser};
use chat_relay::gemini_client::GeminiClient;
use chat_relay::store::PgChatStore;
use chat_relay::stream_client::StreamClient;
use chat_relay::{build_router, db, AppState};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(
        "Configuration - model: {}, directory: {}, context turns: {}, http timeout: {}s",
        config.gemini_model,
        config.stream_base_url,
        config.history_context_turns,
        config.http_timeout.as_secs()
    );

    // Create the database connection pool
    let db_pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Initializing Stream Chat directory client...");
    let directory = StreamClient::new(
        config.stream_api_key.clone(),
        &config.stream_api_secret,
        config.stream_base_url.clone(),
        config.http_timeout,
    )?;

    // The bot authors every reply, so it must exist before the first channel is created.
    match directory.upsert_user(&DirectoryUser::bot()).await {
        Ok(_) => tracing::info!("🤖 Bot user ready in directory"),
        Err(e) => tracing::warn!("Failed to register bot user in directory: {}", e),
    }

    tracing::info!("Initializing Gemini AI client ({})...", config.gemini_model);
    let completion = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.http_timeout,
    )?;

    let shared_state = Arc::new(AppState {
        directory: Arc::new(directory),
        completion: Arc::new(completion),
        store: Arc::new(PgChatStore::new(db_pool)),
        history_context_turns: config.history_context_turns,
    });

    let app = build_router(shared_state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Server started on port {}", listener.local_addr()?.port());
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

// Env-filtered logging, plain text or JSON (LOG_FORMAT=json)
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_filter(cfg!(debug_assertions)).to_string());

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for production (easier for log aggregation)
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("💬 Chat relay {} starting (log filter: {})", env!("CARGO_PKG_VERSION"), log_level);

    Ok(())
}

fn default_log_filter(debug: bool) -> &'static str {
    if debug {
        "debug,chat_relay=trace,sqlx=info,reqwest=info,hyper=info"
    } else {
        "info,sqlx=warn,reqwest=warn,hyper=warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_default_log_filters_parse() {
        for debug in [true, false] {
            assert!(EnvFilter::try_new(default_log_filter(debug)).is_ok());
        }
        assert!(default_log_filter(true).contains("chat_relay=trace"));
        assert!(default_log_filter(false).starts_with("info,"));
    }
}
