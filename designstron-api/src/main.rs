use std::net::SocketAddr;
use std::sync::Arc;

use designstron_api::{app, AppState};
use designstron_order::{CheckoutUrls, MockCheckoutGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "designstron_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = designstron_store::app_config::Config::load()?;
    tracing::info!("Starting DesignStron API on port {}", config.server.port);
    tracing::info!(
        "Loaded price catalog: {} packages, {} add-ons, {} hosting tiers ({})",
        config.catalog.packages.len(),
        config.catalog.add_ons.len(),
        config.catalog.hosting_tiers.len(),
        config.catalog.currency.code,
    );

    let gateway = Arc::new(MockCheckoutGateway::new(config.payment.checkout_base_url.clone()));
    let urls = CheckoutUrls {
        success_url: config.payment.success_url.clone(),
        cancel_url: config.payment.cancel_url.clone(),
    };

    let app_state = AppState::in_memory(config.catalog, gateway, urls)?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
