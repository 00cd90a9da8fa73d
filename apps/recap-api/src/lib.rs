pub mod routes;
pub mod state;

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = recap_cli::VERSION,
	rename_all = "kebab",
	styles = recap_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: recap_cli::ConfigArgs,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = recap_config::load(&args.config.path)?;

	init_tracing(&config);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;

	if config.providers.embedding.api_key.is_none() {
		tracing::warn!("Embedding api_key is not configured; chat will answer from recency only.");
	}
	if config.storage.supabase.credentials().is_none() {
		tracing::warn!("Supabase credentials are not configured; retrieval will return no rows.");
	}

	let state = AppState::new(config)?;
	let app = routes::router(state);
	let listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	axum::serve(listener, app).await?;

	Ok(())
}

fn init_tracing(config: &recap_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
