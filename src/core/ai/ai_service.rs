// Chat service - prompt construction for the two AI features the bots
// offer: persona chat and recent-message summarization.
//
// The provider behind it is an opaque text-generation collaborator; this
// service only decides what to ask it.

use super::models::GenerationOptions;
use async_trait::async_trait;
use std::error::Error;

/// Reply the adapters fall back to when the provider errors on a chat.
pub const CHAT_FALLBACK: &str =
    "Sorry, I'm having trouble understanding right now. Could you try asking me in a different way? 😊";

/// Reply the adapters fall back to when the provider errors on a summary.
pub const SUMMARY_FALLBACK: &str = "Sorry, I couldn't generate a summary at this time.";

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends a single-prompt generation request to the provider.
    async fn generate(
        &self,
        prompt: &str,
        options: Option<&GenerationOptions>,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

pub struct ChatService<P: TextGenerator> {
    provider: P,
    chat_options: GenerationOptions,
}

impl<P: TextGenerator> ChatService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            chat_options: GenerationOptions::default(),
        }
    }

    /// Answer a user message in the "Dia" persona.
    pub async fn chat(&self, user_message: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let prompt = format!(
            "You are Dia, a friendly chat moderation bot. Please respond to this message \
             in a casual, conversational way, using simple language and a friendly tone. \
             Feel free to use appropriate emojis and keep the response concise and easy \
             to understand. Avoid technical jargon unless specifically asked and keep it \
             as short as possible.\n\nUser's message: {user_message}"
        );

        self.provider
            .generate(&prompt, Some(&self.chat_options))
            .await
    }

    /// Summarize the recent-message buffer. An empty buffer never hits
    /// the provider.
    pub async fn summarize(
        &self,
        messages: &[String],
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        if messages.is_empty() {
            return Ok("No recent messages to summarize.".to_string());
        }

        let prompt = format!(
            "Please summarize the following conversation in a concise way, highlighting \
             key points and topics discussed:\n\n{}",
            messages.join("\n")
        );

        self.provider.generate(&prompt, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider that records the prompts it receives.
    struct RecordingProvider {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingProvider {
        async fn generate(
            &self,
            prompt: &str,
            _options: Option<&GenerationOptions>,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn chat_embeds_the_user_message() {
        let service = ChatService::new(RecordingProvider::new("hey!"));
        let reply = service.chat("how are you?").await.unwrap();
        assert_eq!(reply, "hey!");

        let prompts = service.provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("User's message: how are you?"));
        assert!(prompts[0].contains("You are Dia"));
    }

    #[tokio::test]
    async fn summarize_joins_messages_in_order() {
        let service = ChatService::new(RecordingProvider::new("a summary"));
        let messages = vec!["first".to_string(), "second".to_string()];
        service.summarize(&messages).await.unwrap();

        let prompts = service.provider.prompts.lock().unwrap();
        assert!(prompts[0].contains("first\nsecond"));
    }

    #[tokio::test]
    async fn empty_buffer_short_circuits_without_calling_provider() {
        let service = ChatService::new(RecordingProvider::new("should not appear"));
        let reply = service.summarize(&[]).await.unwrap();
        assert_eq!(reply, "No recent messages to summarize.");
        assert!(service.provider.prompts.lock().unwrap().is_empty());
    }
}
