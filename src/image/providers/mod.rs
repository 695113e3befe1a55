//! Generation backends.

mod gemini;

pub use gemini::{GeminiBackend, GeminiBackendBuilder, DEFAULT_BASE_URL};
