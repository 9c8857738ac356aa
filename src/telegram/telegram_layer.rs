// Telegram layer - dispatcher and message handlers.

#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::TelegramState;
