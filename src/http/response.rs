//! Minimal HTTP response type for the route table.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::error;

/// An HTTP response under construction.
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// 200 with a JSON body. A value that fails to serialize (which would be
	/// a programming error in the domain structs) degrades to a 500.
	pub fn json<T: Serialize>(value: &T) -> Self {
		match serde_json::to_vec(value) {
			Ok(body) => {
				let mut response = Self::new(StatusCode::OK);
				response.headers.insert(
					header::CONTENT_TYPE,
					HeaderValue::from_static("application/json"),
				);
				response.body = Bytes::from(body);
				response
			}
			Err(e) => {
				error!("response serialization failed: {e}");
				Self::new(StatusCode::INTERNAL_SERVER_ERROR)
			}
		}
	}

	/// 302 to `location`, matching the storefront's form-flow navigation.
	pub fn redirect(location: &str) -> Self {
		let mut response = Self::new(StatusCode::FOUND);
		if let Ok(value) = HeaderValue::from_str(location) {
			response.headers.insert(header::LOCATION, value);
		}
		response
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	/// 503; the answer to storage-layer failure, the one non-recoverable
	/// condition.
	pub fn service_unavailable() -> Self {
		Self::new(StatusCode::SERVICE_UNAVAILABLE)
	}

	/// Attaches a session cookie.
	pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(&format!("{name}={value}; Path=/; HttpOnly")) {
			self.headers.append(header::SET_COOKIE, value);
		}
		self
	}

	/// Expires a session cookie.
	pub fn with_cleared_cookie(mut self, name: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(&format!("{name}=; Path=/; Max-Age=0")) {
			self.headers.append(header::SET_COOKIE, value);
		}
		self
	}

	/// Converts into the hyper response handed back to the connection.
	pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
		let mut builder = hyper::Response::builder().status(self.status);
		if let Some(headers) = builder.headers_mut() {
			*headers = self.headers;
		}
		// The builder cannot fail once the status and headers are in place.
		builder
			.body(Full::new(self.body))
			.unwrap_or_else(|_| hyper::Response::new(Full::new(Bytes::new())))
	}
}
