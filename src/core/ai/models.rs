// AI domain models - provider-agnostic types for text generation.

/// Sampling options passed through to the provider.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        // Tuned for short, casual chat replies.
        Self {
            temperature: 0.8,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: 200,
        }
    }
}
