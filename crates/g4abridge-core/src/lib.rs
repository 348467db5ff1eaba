//! Core domain types for the g4abridge compatibility gateway.
//!
//! This crate is adapter-free: it holds the gateway configuration and the
//! chat message model (including normalization of structured content).
//! The HTTP surfaces live in `g4abridge-gateway`.

#![deny(unsafe_code)]

pub mod config;
pub mod message;

pub use config::{
    DEFAULT_BACKEND_URL, DEFAULT_LISTEN_PORT, DEFAULT_STREAM_DELAY_SECS, GatewayConfig,
};
pub use message::{ChatMessage, ContentPart, MessageContent, normalize_messages};
