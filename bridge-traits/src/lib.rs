//! # Host Bridge Traits
//!
//! Platform abstraction traits that the academy core consumes but never
//! implements itself.
//!
//! ## Overview
//!
//! This crate defines the contract between the catalog core and the host
//! platform. Each trait represents a capability the repository layer needs
//! and that a host provides differently (desktop, mobile shell, tests).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP request execution used by
//!   the remote catalog source
//! - [`TaskExecutor`](background::TaskExecutor) - Worker pools on which disk,
//!   network and result-delivery work is scheduled
//! - [`LoggerSink`](sink::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform errors into it and keep messages
//! actionable (URLs, pool names, status codes).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared behind an `Arc` across async tasks.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod background;
pub mod error;
pub mod http;
pub mod sink;

pub use error::BridgeError;

// Re-export commonly used types
pub use background::{BoxedTask, TaskExecutor};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use sink::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
