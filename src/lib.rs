//! A fingerprint-accurate HTTP client core: TLS ClientHello, HTTP/2 and
//! HTTP/3 wire behavior that matches real browsers byte-for-byte wherever
//! the underlying crates' public APIs allow it.
//!
//! Start with [`client::Client::builder`].

pub mod client;
pub mod config;
pub mod cookie;
pub mod dicttls;
pub mod error;
pub mod h2;
pub mod h3;
pub mod middleware;
pub mod multipart;
pub mod orchestrator;
pub mod profile;
pub mod request;
pub mod response;
pub mod transport;
pub mod utils;

pub use client::{Client, ClientBuilder, Impersonate};
pub use config::{ClientConfig, RedirectPolicy, RetryPolicy};
pub use error::{Error, Result};
pub use request::Request;
pub use response::Response;
