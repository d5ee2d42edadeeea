/// API сервер предсказания задержек

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use flight_delay_ml::{
    api::{self, AppState},
    config::ServiceConfig,
    data, DelayModel,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flight_delay_ml=info,tower_http=info".into()),
        )
        .init();

    let config = ServiceConfig::from_env()?;

    // Модель обучается один раз при старте
    let mut model = DelayModel::new();
    match data::load_flights(&config.training_data).and_then(|records| model.train(&records)) {
        Ok(()) => tracing::info!("Delay model ready"),
        Err(e) => tracing::warn!("Could not train model on startup: {}", e),
    }

    let app = api::router(AppState::new(model));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    tracing::info!("Server listening on http://{}", config.addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
