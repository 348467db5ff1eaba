//! OpenAI-compatible HTTP gateway for a local GPT4All server.
//!
//! The gateway accepts OpenAI-style chat/completions requests, calls the
//! GPT4All HTTP API in non-streaming mode, and reshapes the complete answer
//! back into the form the client asked for — either a single JSON reply or a
//! synthesized SSE token stream with pacing.

#![deny(unsafe_code)]

pub mod backend;
pub mod models;
pub mod routes;
pub mod server;
pub mod sse;

pub use server::{AppState, serve};
