//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `TaskExecutor` using bounded pools on the Tokio runtime
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioTaskExecutor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let disk_io = TokioTaskExecutor::bounded("disk-io", 1)?;
//!
//!     // Hand both to the core configuration
//! }
//! ```

mod executor;
mod http;

pub use executor::TokioTaskExecutor;
pub use http::ReqwestHttpClient;
