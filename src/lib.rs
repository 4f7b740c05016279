//! brickmart, a small storefront for building materials.
//!
//! The domain is split into five services over a pluggable [`storage::Storage`]
//! backend: a static [`catalog`], [`accounts`] (registration and login),
//! a per-user [`cart`], [`orders`] (checkout, tracking, status progression),
//! and [`reviews`] (one rating+comment per order). The [`http`] module is a
//! thin presentation layer: it authenticates the request through the session
//! store, parses forms into typed inputs, calls the services, and serializes
//! plain domain structs to JSON. No handler contains business logic.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod orders;
pub mod reviews;
pub mod sessions;
pub mod storage;

pub use error::{Error, Result};
