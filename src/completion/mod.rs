pub mod openai;

use crate::error::EngageError;
use async_trait::async_trait;

/// A bounded text-completion capability. Given a system persona and a user
/// message, returns the completion text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, EngageError>;
}
