mod gemini_client;
mod gemini_types;
mod mock_generation_client;

pub use gemini_client::{GeminiClient, create_gemini_client};
pub use mock_generation_client::MockGenerationClient;
