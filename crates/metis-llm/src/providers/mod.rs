//! Provider implementations
//!
//! One module per vendor; wire formats never leak outside their module.

pub mod anthropic;
pub mod moonshot;
pub mod ollama;
pub mod openai;
