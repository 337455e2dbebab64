//! Networking modules for the sentiment REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the `SentimentApi` seam and its HTTP implementation,
//! `error` classifies server failures, and `types` defines the wire schema.

pub mod api;
pub mod error;
pub mod types;
