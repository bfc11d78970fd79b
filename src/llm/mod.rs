pub mod gemini;
pub mod provider;
pub mod types;

pub use gemini::GeminiClient;
pub use provider::{Embedder, Generator};
pub use types::GenerationParams;
