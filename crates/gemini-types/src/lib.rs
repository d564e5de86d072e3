//! Shared types for the Gemini REST and WebSocket APIs
//!
//! This crate provides the core type definitions used across the connector.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Mode`] - Sandbox vs. live environment and its base URLs
//! - [`Subscription`] - Outbound subscription frame, replayed on every connect
//! - [`FrameKind`] / [`classify`] - Heartbeat vs. payload classification
//! - [`ErrorResponse`], [`ErrorReason`] - Structured REST error bodies

pub mod error;
pub mod messages;
pub mod mode;
pub mod subscription;

// Re-export commonly used types
pub use error::*;
pub use messages::*;
pub use mode::*;
pub use subscription::*;
