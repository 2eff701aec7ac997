//! farsight server library
//!
//! HTTP surface for search aggregation and streaming chat-completion
//! proxying. The binary in `main.rs` wires configuration, the provider
//! registry, and the router together.

pub mod chat;
pub mod config;
pub mod prompt;
pub mod web;
