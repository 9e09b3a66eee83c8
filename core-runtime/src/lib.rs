//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the academy catalog core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - Worker pools for disk, network and result delivery
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the catalog and service
//! crates depend on. It establishes the scheduling model, logging conventions
//! and event broadcasting used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod executors;
pub mod logging;

pub use error::{Error, Result};
pub use executors::AppExecutors;
