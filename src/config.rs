//! Environment-driven configuration.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
	/// Port the HTTP server binds on.
	pub port: u16,
	/// SQLite database URL. When unset the in-memory backend is used.
	pub database_url: Option<String>,
	/// Name of the session cookie.
	pub session_cookie: String,
}

impl Config {
	pub fn load() -> Self {
		Self {
			port: load_or("BRICKMART_PORT", 8000),
			database_url: env::var("BRICKMART_DATABASE_URL").ok(),
			session_cookie: env::var("BRICKMART_SESSION_COOKIE")
				.unwrap_or_else(|_| "sessionid".to_string()),
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			port: 8000,
			database_url: None,
			session_cookie: "sessionid".to_string(),
		}
	}
}

fn load_or<T>(key: &str, default: T) -> T
where
	T: FromStr + Display,
	T::Err: Display,
{
	match env::var(key) {
		Ok(raw) => match raw.parse() {
			Ok(value) => value,
			Err(e) => {
				warn!("invalid {key} value ({e}), using default {default}");
				default
			}
		},
		Err(_) => {
			info!("{key} not set, using default {default}");
			default
		}
	}
}
