//! Generative-model adapter for the Gemini `generateContent` API.
//!
//! Owns transport details only: request serialisation, timeout and HTTP
//! error mapping, and JSON decoding of the reply envelope. Prompt
//! assembly stays in the domain.

mod dto;
mod gemini_client;

pub use gemini_client::{GeminiClient, GeminiConfig};
