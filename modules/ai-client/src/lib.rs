pub mod deepseek;
pub mod error;
pub mod gemini;

pub use deepseek::DeepSeekClient;
pub use error::{AiError, Result};
pub use gemini::GeminiClient;
