use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads `.env` if present and installs the log subscriber
pub fn init() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aipoll=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
