pub mod ai_service;
pub mod models;

pub use ai_service::{ChatService, TextGenerator, CHAT_FALLBACK, SUMMARY_FALLBACK};
pub use models::GenerationOptions;
