//! Scenario client core for the bookstore API.
//!
//! # Overview
//! Builds `HttpRequest` values, hands them to a caller-supplied `Transport`,
//! and checks the `HttpResponse`s that come back against the bookstore's
//! documented behavior, including the gateway's API-key rejections.
//!
//! # Design
//! - `BookstoreClient` is stateless; it holds only `base_url`.
//! - `ScenarioRunner` drives the fixed create/verify/delete sequence and
//!   returns the first failed check as a `ClientError`.
//! - No I/O happens in this crate. The binary plugs in an HTTP transport;
//!   tests plug in scripted ones.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod scenario;
pub mod types;
pub mod verify;

pub use client::BookstoreClient;
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, API_KEY_HEADER};
pub use scenario::{
    Repeat, ScenarioRunner, BLOCKED_API_KEY, BLOCKED_CLIENT_MESSAGE, UNREGISTERED_CALLER_MESSAGE,
};
pub use types::{Book, NewBook, NewShelf, Shelf};
pub use verify::Verifier;
