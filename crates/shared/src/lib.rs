//! Shared types, errors, and configuration for Paylane.
//!
//! This crate provides common types used across all other crates:
//! - Money types in integer minor units
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, ServerConfig, WebhookConfig};
pub use error::AppError;
