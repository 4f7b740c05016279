//! Route table and handlers.
//!
//! The routes mirror the storefront's form flow: every mutation answers
//! with a redirect to the view the user lands on next, and every domain
//! rejection redirects to a sensible prior view (see [`error_response`]).
//! Handlers parse, delegate to a service, and serialize; nothing more.

use bytes::Bytes;
use hyper::{HeaderMap, Method, header};
use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use super::forms::{AddToCartForm, CheckoutForm, CredentialsForm, ReviewForm};
use super::response::Response;
use crate::error::{Error, Result};

/// Extracts the session token from the request's cookies.
fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(header::COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|pair| {
			pair.trim()
				.strip_prefix(cookie_name)?
				.strip_prefix('=')
				.map(str::to_string)
		})
}

/// Resolves the request against the route table.
pub async fn dispatch(
	state: &AppState,
	method: &Method,
	path: &str,
	headers: &HeaderMap,
	body: Bytes,
) -> Response {
	let token = session_token(headers, &state.config.session_cookie);
	let user = token.as_deref().and_then(|t| state.sessions.resolve(t));

	let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
	let result = match (method, segments.as_slice()) {
		(&Method::GET, []) => Ok(home()),
		(&Method::GET, ["login"]) => Ok(hint("submit username and password via POST /login")),
		(&Method::GET, ["register"]) => {
			Ok(hint("submit username and password via POST /register"))
		}
		(&Method::POST, ["register"]) => register(state, &body).await,
		(&Method::POST, ["login"]) => login(state, &body).await,
		(&Method::POST, ["logout"]) => Ok(logout(state, token.as_deref())),
		_ => {
			// Everything else sits behind the auth gate.
			let Some(user) = user else {
				return Response::redirect("/login");
			};
			protected(state, method, &segments, &user, &body).await
		}
	};
	result.unwrap_or_else(error_response)
}

async fn protected(
	state: &AppState,
	method: &Method,
	segments: &[&str],
	user: &str,
	body: &Bytes,
) -> Result<Response> {
	match (method, segments) {
		(&Method::GET, ["products"]) => Ok(Response::json(&json!({
			"products": state.catalog.all(),
		}))),
		(&Method::GET, ["products", key]) => Ok(match state.catalog.get(key) {
			Some(product) => Response::json(&json!({ "product": product })),
			None => Response::redirect("/products"),
		}),

		(&Method::POST, ["cart"]) => {
			let form = AddToCartForm::parse(body)?;
			state
				.cart
				.add_item(user, &form.product_name, form.quantity)
				.await?;
			Ok(Response::redirect("/cart"))
		}
		(&Method::GET, ["cart"]) => {
			let lines = state.cart.list(user).await?;
			let total = state.cart.total(user).await?;
			Ok(Response::json(&json!({
				"cart_items": lines,
				"total": total,
			})))
		}
		(&Method::POST, ["cart", "remove", id]) => {
			if let Ok(line_id) = id.parse::<i64>() {
				state.cart.remove_item(user, line_id).await?;
			}
			Ok(Response::redirect("/cart"))
		}

		(&Method::GET, ["checkout"]) => {
			let summary = state.orders.summary(user).await?;
			Ok(Response::json(&summary))
		}
		(&Method::POST, ["checkout"]) => {
			let form = CheckoutForm::parse(body)?;
			let receipt = state
				.orders
				.checkout(user, &form.shipping_address, &form.payment_method)
				.await?;
			Ok(Response::redirect(&format!(
				"/orders/track/{}",
				receipt.tracking_id
			)))
		}

		(&Method::GET, ["orders"]) => {
			let orders = state.orders.list_by_owner(user).await?;
			Ok(Response::json(&json!({ "orders": orders })))
		}
		(&Method::GET, ["orders", "track", tracking_id]) => {
			let orders = state.orders.list_by_tracking(tracking_id).await?;
			// Disclose nothing unless every row belongs to the requester.
			if orders.is_empty() || orders.iter().any(|order| order.owner != user) {
				return Ok(Response::redirect("/products"));
			}
			Ok(Response::json(&json!({
				"tracking_id": tracking_id,
				"orders": orders,
			})))
		}
		(&Method::POST, ["orders", id, "advance"]) => {
			if let Ok(order_id) = id.parse::<i64>() {
				state.orders.advance_status(order_id, user).await?;
			}
			Ok(Response::redirect("/orders"))
		}
		(&Method::GET, ["orders", id, "review"]) => {
			let order_id: i64 = id.parse().map_err(|_| Error::NotOwner)?;
			let order = state
				.orders
				.find_owned(order_id, user)
				.await?
				.ok_or(Error::NotOwner)?;
			let review = state.reviews.get(order_id).await?;
			Ok(Response::json(&json!({
				"order": order,
				"review": review,
			})))
		}
		(&Method::POST, ["orders", id, "review"]) => {
			let order_id: i64 = id.parse().map_err(|_| Error::NotOwner)?;
			let form = ReviewForm::parse(body)?;
			state
				.reviews
				.submit(order_id, user, form.rating, form.comment)
				.await?;
			Ok(Response::redirect("/orders"))
		}

		_ => Ok(Response::not_found()),
	}
}

fn home() -> Response {
	Response::json(&json!({
		"service": "brickmart",
		"status": "ok",
	}))
}

fn hint(detail: &str) -> Response {
	Response::json(&json!({ "detail": detail }))
}

async fn register(state: &AppState, body: &Bytes) -> Result<Response> {
	let form = CredentialsForm::parse(body)?;
	let user = state.accounts.register(&form.username, &form.password).await?;
	let token = state.sessions.create(&user.username);
	Ok(Response::redirect("/products").with_cookie(&state.config.session_cookie, &token))
}

async fn login(state: &AppState, body: &Bytes) -> Result<Response> {
	let form = CredentialsForm::parse(body)?;
	let user = state
		.accounts
		.authenticate(&form.username, &form.password)
		.await?;
	let token = state.sessions.create(&user.username);
	Ok(Response::redirect("/products").with_cookie(&state.config.session_cookie, &token))
}

fn logout(state: &AppState, token: Option<&str>) -> Response {
	if let Some(token) = token {
		state.sessions.destroy(token);
	}
	Response::redirect("/").with_cleared_cookie(&state.config.session_cookie)
}

/// Maps a domain rejection to the redirect the user can act on, per the
/// storefront's navigation; storage and hashing failures are the only
/// 500-class answers.
fn error_response(err: Error) -> Response {
	let location = match &err {
		Error::MalformedForm => {
			warn!("request rejected: undecodable form body");
			return Response::bad_request();
		}
		Error::InvalidInput(_) | Error::DuplicateUser => "/register",
		Error::InvalidCredentials => "/login",
		Error::UnknownProduct(_) | Error::InvalidQuantity => "/products",
		Error::MissingField("product_name") => "/products",
		Error::EmptyCart => "/cart",
		Error::MissingField(_) => "/checkout",
		Error::NotOwner | Error::InvalidRating => "/orders",
		Error::PasswordHash(_) | Error::Storage(_) => {
			error!("request failed: {err}");
			return Response::service_unavailable();
		}
	};
	warn!("request rejected ({err}), redirecting to {location}");
	Response::redirect(location)
}
