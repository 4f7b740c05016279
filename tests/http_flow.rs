//! Route-table tests: the auth gate, cookie session flow, redirects, and
//! JSON bodies, driven through the dispatcher without a network socket.

use std::sync::Arc;

use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode, header};
use serde_json::Value;

use brickmart::config::Config;
use brickmart::http::{AppState, Response, handlers};
use brickmart::storage::MemoryStorage;

fn state() -> Arc<AppState> {
	AppState::new(Arc::new(MemoryStorage::new()), Config::default())
}

async fn request(
	state: &AppState,
	method: Method,
	path: &str,
	session: Option<&str>,
	body: &str,
) -> Response {
	let mut headers = HeaderMap::new();
	if let Some(token) = session {
		headers.insert(
			header::COOKIE,
			format!("sessionid={token}").parse().unwrap(),
		);
	}
	handlers::dispatch(state, &method, path, &headers, Bytes::from(body.to_string())).await
}

/// Pulls the session token out of a Set-Cookie header.
fn session_of(response: &Response) -> String {
	let cookie = response
		.headers
		.get(header::SET_COOKIE)
		.expect("response must set a session cookie")
		.to_str()
		.unwrap();
	cookie
		.strip_prefix("sessionid=")
		.unwrap()
		.split(';')
		.next()
		.unwrap()
		.to_string()
}

fn location_of(response: &Response) -> &str {
	response
		.headers
		.get(header::LOCATION)
		.expect("response must redirect")
		.to_str()
		.unwrap()
}

fn json_of(response: &Response) -> Value {
	serde_json::from_slice(&response.body).expect("body must be JSON")
}

async fn register(state: &AppState, username: &str, password: &str) -> String {
	let response = request(
		state,
		Method::POST,
		"/register",
		None,
		&format!("username={username}&password={password}"),
	)
	.await;
	assert_eq!(response.status, StatusCode::FOUND);
	assert_eq!(location_of(&response), "/products");
	session_of(&response)
}

#[tokio::test]
async fn protected_routes_redirect_anonymous_users_to_login() {
	let state = state();
	for path in ["/products", "/cart", "/checkout", "/orders"] {
		let response = request(&state, Method::GET, path, None, "").await;
		assert_eq!(response.status, StatusCode::FOUND, "{path}");
		assert_eq!(location_of(&response), "/login", "{path}");
	}
}

#[tokio::test]
async fn register_login_logout_cycle() {
	let state = state();
	let session = register(&state, "mason", "hunter2").await;

	// The fresh session opens the catalog.
	let response = request(&state, Method::GET, "/products", Some(&session), "").await;
	assert_eq!(response.status, StatusCode::OK);
	let products = json_of(&response);
	assert_eq!(products["products"].as_array().unwrap().len(), 3);

	// Logout invalidates the token.
	let response = request(&state, Method::POST, "/logout", Some(&session), "").await;
	assert_eq!(location_of(&response), "/");
	let response = request(&state, Method::GET, "/products", Some(&session), "").await;
	assert_eq!(location_of(&response), "/login");

	// Logging back in issues a new session.
	let response = request(
		&state,
		Method::POST,
		"/login",
		None,
		"username=mason&password=hunter2",
	)
	.await;
	assert_eq!(location_of(&response), "/products");
	let session = session_of(&response);
	let response = request(&state, Method::GET, "/products", Some(&session), "").await;
	assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn bad_credentials_and_duplicate_registration_redirect_back() {
	let state = state();
	register(&state, "mason", "hunter2").await;

	let response = request(
		&state,
		Method::POST,
		"/login",
		None,
		"username=mason&password=wrong",
	)
	.await;
	assert_eq!(location_of(&response), "/login");

	let response = request(
		&state,
		Method::POST,
		"/register",
		None,
		"username=mason&password=other",
	)
	.await;
	assert_eq!(location_of(&response), "/register");
}

#[tokio::test]
async fn storefront_flow_from_cart_to_review() {
	let state = state();
	let session = register(&state, "mason", "hunter2").await;

	// Unknown product key on the detail page bounces to the listing.
	let response = request(&state, Method::GET, "/products/granite", Some(&session), "").await;
	assert_eq!(location_of(&response), "/products");

	// Add Bricks ×10, inspect the cart.
	let response = request(
		&state,
		Method::POST,
		"/cart",
		Some(&session),
		"product_name=Bricks&quantity=10",
	)
	.await;
	assert_eq!(location_of(&response), "/cart");
	let response = request(&state, Method::GET, "/cart", Some(&session), "").await;
	let cart = json_of(&response);
	assert_eq!(cart["cart_items"].as_array().unwrap().len(), 1);
	assert_eq!(cart["total"], Value::String("80.0".into()));

	// Preview then place the order.
	let response = request(&state, Method::GET, "/checkout", Some(&session), "").await;
	let preview = json_of(&response);
	assert_eq!(preview["shipping"], Value::String("150.0".into()));
	assert_eq!(preview["total"], Value::String("230.0".into()));

	let response = request(
		&state,
		Method::POST,
		"/checkout",
		Some(&session),
		"shipping_address=12+Kiln+Road&payment_method=cod",
	)
	.await;
	let track_path = location_of(&response).to_string();
	assert!(track_path.starts_with("/orders/track/"));

	// The confirmation view shows the single tracked order.
	let response = request(&state, Method::GET, &track_path, Some(&session), "").await;
	assert_eq!(response.status, StatusCode::OK);
	let tracked = json_of(&response);
	let orders = tracked["orders"].as_array().unwrap();
	assert_eq!(orders.len(), 1);
	assert_eq!(orders[0]["status"], Value::String("Pending".into()));
	let order_id = orders[0]["id"].as_i64().unwrap();

	// Advance once and review it.
	let response = request(
		&state,
		Method::POST,
		&format!("/orders/{order_id}/advance"),
		Some(&session),
		"",
	)
	.await;
	assert_eq!(location_of(&response), "/orders");

	let response = request(
		&state,
		Method::POST,
		&format!("/orders/{order_id}/review"),
		Some(&session),
		"rating=4&comment=solid",
	)
	.await;
	assert_eq!(location_of(&response), "/orders");

	let response = request(
		&state,
		Method::GET,
		&format!("/orders/{order_id}/review"),
		Some(&session),
		"",
	)
	.await;
	let review = json_of(&response);
	assert_eq!(review["review"]["rating"], Value::Number(4.into()));
	assert_eq!(review["order"]["status"], Value::String("Processing".into()));
}

#[tokio::test]
async fn tracking_ids_do_not_cross_users() {
	let state = state();
	let alice = register(&state, "alice", "pw-alice").await;
	let bob = register(&state, "bob", "pw-bob").await;

	request(
		&state,
		Method::POST,
		"/cart",
		Some(&alice),
		"product_name=Cement&quantity=1",
	)
	.await;
	let response = request(
		&state,
		Method::POST,
		"/checkout",
		Some(&alice),
		"shipping_address=1+Mortar+Lane&payment_method=cod",
	)
	.await;
	let track_path = location_of(&response).to_string();

	// Bob knows the tracking id but gets bounced to the listing.
	let response = request(&state, Method::GET, &track_path, Some(&bob), "").await;
	assert_eq!(location_of(&response), "/products");

	// And Bob cannot review Alice's order.
	let alice_orders = request(&state, Method::GET, "/orders", Some(&alice), "").await;
	let order_id = json_of(&alice_orders)["orders"][0]["id"].as_i64().unwrap();
	let response = request(
		&state,
		Method::POST,
		&format!("/orders/{order_id}/review"),
		Some(&bob),
		"rating=1",
	)
	.await;
	assert_eq!(location_of(&response), "/orders");
	let response = request(
		&state,
		Method::GET,
		&format!("/orders/{order_id}/review"),
		Some(&alice),
		"",
	)
	.await;
	assert_eq!(json_of(&response)["review"], Value::Null);
}

#[tokio::test]
async fn undecodable_form_body_is_a_bad_request() {
	let state = state();
	let session = register(&state, "mason", "hunter2").await;
	let response = request(
		&state,
		Method::POST,
		"/cart",
		Some(&session),
		"product_name=%GG",
	)
	.await;
	assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_with_empty_cart_redirects_to_cart() {
	let state = state();
	let session = register(&state, "mason", "hunter2").await;
	let response = request(
		&state,
		Method::POST,
		"/checkout",
		Some(&session),
		"shipping_address=12+Kiln+Road&payment_method=cod",
	)
	.await;
	assert_eq!(location_of(&response), "/cart");
}
