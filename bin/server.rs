// Company Registry - Web Server

use anyhow::Context;
use std::sync::Arc;

use company_registry::{
    api::{self, AppState},
    import_drafts, load_drafts_csv, CompanyRegistry, Config, HttpCnpjLookup,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let registry = CompanyRegistry::new();
    if let Some(path) = &config.seed_csv {
        let drafts = load_drafts_csv(path)?;
        let summary = import_drafts(&registry, drafts);
        tracing::info!(
            path = %path.display(),
            imported = summary.imported,
            rejected = summary.rejected.len(),
            "seeded directory"
        );
    }

    let lookup = HttpCnpjLookup::new(&config.lookup)?;
    tracing::info!(registry = %config.lookup.base_url, "CNPJ lookup configured");

    let state = AppState::new(registry, Arc::new(lookup), config.per_page);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.server_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    tracing::info!("server running on http://{}", config.server_addr);
    tracing::info!("API: http://{}/api/companies", config.server_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
