//! HTTP presentation layer: hyper server, route dispatch, and responses.

pub mod forms;
pub mod handlers;
mod response;

pub use response::Response;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, warn};

use crate::accounts::{AccountService, Argon2Hasher};
use crate::cart::CartService;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::orders::OrderService;
use crate::reviews::ReviewService;
use crate::sessions::SessionStore;
use crate::storage::Storage;

/// Shared application state: the services, catalog, sessions, and config.
pub struct AppState {
	pub catalog: Arc<Catalog>,
	pub accounts: AccountService,
	pub cart: CartService,
	pub orders: OrderService,
	pub reviews: ReviewService,
	pub sessions: SessionStore,
	pub config: Config,
}

impl AppState {
	/// Wires the service stack over one storage backend.
	pub fn new(storage: Arc<dyn Storage>, config: Config) -> Arc<Self> {
		let catalog = Arc::new(Catalog::builtin());
		Arc::new(Self {
			accounts: AccountService::new(storage.clone(), Arc::new(Argon2Hasher::new())),
			cart: CartService::new(storage.clone(), catalog.clone()),
			orders: OrderService::new(storage.clone()),
			reviews: ReviewService::new(storage),
			catalog,
			sessions: SessionStore::new(),
			config,
		})
	}
}

/// Accepts connections until ctrl-c, spawning one task per connection.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
	let listener = TcpListener::bind(addr).await?;
	info!("listening on http://{addr}");

	loop {
		tokio::select! {
			accepted = listener.accept() => {
				let (stream, remote) = accepted?;
				let state = state.clone();
				tokio::task::spawn(async move {
					let service = service_fn(move |req| handle(state.clone(), req));
					if let Err(err) = http1::Builder::new()
						.serve_connection(TokioIo::new(stream), service)
						.await
					{
						debug!("connection from {remote} errored: {err}");
					}
				});
			}
			_ = signal::ctrl_c() => {
				info!("shutdown signal received, stopping server");
				break;
			}
		}
	}
	Ok(())
}

async fn handle(
	state: Arc<AppState>,
	req: hyper::Request<Incoming>,
) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
	let started = Instant::now();
	let (parts, body) = req.into_parts();
	let path = parts.uri.path().to_string();

	let body = match body.collect().await {
		Ok(collected) => collected.to_bytes(),
		Err(err) => {
			warn!("failed to read request body: {err}");
			return Ok(Response::bad_request().into_hyper());
		}
	};

	let response = handlers::dispatch(&state, &parts.method, &path, &parts.headers, body).await;
	info!(
		method = %parts.method,
		path = %path,
		status = response.status.as_u16(),
		elapsed_ms = started.elapsed().as_millis() as u64,
		"request"
	);
	Ok(response.into_hyper())
}
