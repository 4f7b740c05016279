use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use brickmart::config::Config;
use brickmart::http::{self, AppState};
use brickmart::storage::{MemoryStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = Config::load();
	let storage: Arc<dyn Storage> = match config.database_url.as_deref() {
		Some(url) => Arc::new(SqliteStorage::connect(url).await?),
		None => {
			warn!("BRICKMART_DATABASE_URL not set, orders will not survive a restart");
			Arc::new(MemoryStorage::new())
		}
	};

	let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
	let state = AppState::new(storage, config);
	http::serve(state, addr).await?;
	Ok(())
}
