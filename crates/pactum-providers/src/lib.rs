//! LLM provider layer for Pactum.
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`http_provider::HttpProvider`] — OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`] — builder from provider config + model

pub mod http_provider;
pub mod traits;

pub use http_provider::{create_provider, HttpProvider};
pub use traits::{LlmProvider, LlmRequestConfig};
