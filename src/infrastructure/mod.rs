pub mod audio;
pub mod gateway;
pub mod llm;
pub mod observability;
pub mod session;
