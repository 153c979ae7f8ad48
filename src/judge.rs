use crate::completion::TextCompletion;
use crate::config::JudgeConfig;
use crate::error::EngageError;
use std::sync::Arc;

/// Free-text instructions fixed at startup and shared across all judge calls
/// for the session.
#[derive(Debug, Clone)]
pub struct SessionPrompts {
    pub persona: String,
    pub check_prompt: String,
    pub interact_prompt: String,
}

/// Gates engagement through the completion service: a binary relevance check
/// followed by bounded comment drafting. Every external failure is converted
/// into the no-action default — a malformed or missing model reply must never
/// cause a comment to be posted.
pub struct TextJudge {
    completion: Arc<dyn TextCompletion>,
    prompts: SessionPrompts,
    config: JudgeConfig,
}

impl TextJudge {
    pub fn new(
        completion: Arc<dyn TextCompletion>,
        prompts: SessionPrompts,
        config: JudgeConfig,
    ) -> Self {
        Self {
            completion,
            prompts,
            config,
        }
    }

    /// Relevance check. Relevant iff the trimmed, lowercased completion is
    /// exactly "true". Errors, empty replies, and anything else are all
    /// treated as not relevant.
    pub async fn is_relevant(&self, content: &str) -> bool {
        let user = format!("{}: {}", self.prompts.check_prompt, content);
        let reply = self
            .safe_complete(&user, self.config.check_max_tokens, "relevance check")
            .await;
        match reply {
            Some(text) => parse_relevance(&text),
            None => false,
        }
    }

    /// Draft a comment for the post. Returns None on any service failure.
    /// Output is truncated to `max_comment_len` characters plus a "..."
    /// marker when the raw completion runs over.
    pub async fn draft(&self, content: &str) -> Option<String> {
        let user = format!("{}: {}", self.prompts.interact_prompt, content);
        let reply = self
            .safe_complete(&user, self.config.draft_max_tokens, "comment draft")
            .await?;
        Some(truncate_response(&reply, self.config.max_comment_len))
    }

    /// Run a completion call, converting any error into None with a logged
    /// diagnostic. Both judge operations share this so the fail-closed
    /// handling lives in exactly one place.
    async fn safe_complete(&self, user: &str, max_tokens: u32, what: &str) -> Option<String> {
        match self
            .completion
            .complete(
                &self.prompts.persona,
                user,
                max_tokens,
                self.config.temperature,
            )
            .await
        {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, call = what, "completion call failed, taking no action");
                None
            }
        }
    }
}

fn parse_relevance(reply: &str) -> bool {
    reply.trim().eq_ignore_ascii_case("true")
}

/// Keep the first `max_len` characters and append "..." when the raw text
/// runs over; shorter text passes through untouched.
pub fn truncate_response(response: &str, max_len: usize) -> String {
    if response.chars().count() > max_len {
        let truncated: String = response.chars().take(max_len).collect();
        format!("{}...", truncated)
    } else {
        response.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngageError;
    use async_trait::async_trait;

    struct FixedCompletion(Result<String, ()>);

    #[async_trait]
    impl TextCompletion for FixedCompletion {
        async fn complete(
            &self,
            _system: &str,
            _user: &str,
            _max_tokens: u32,
            _temperature: f64,
        ) -> Result<String, EngageError> {
            self.0
                .clone()
                .map_err(|_| EngageError::Service("unavailable".to_string()))
        }
    }

    fn judge(reply: Result<String, ()>) -> TextJudge {
        TextJudge::new(
            Arc::new(FixedCompletion(reply)),
            SessionPrompts {
                persona: "persona".to_string(),
                check_prompt: "check".to_string(),
                interact_prompt: "interact".to_string(),
            },
            JudgeConfig::default(),
        )
    }

    #[test]
    fn test_parse_relevance_exact_token_only() {
        assert!(parse_relevance("true"));
        assert!(parse_relevance(" True "));
        assert!(parse_relevance("TRUE"));
        assert!(!parse_relevance("False"));
        assert!(!parse_relevance("true."));
        assert!(!parse_relevance(""));
        assert!(!parse_relevance("yes, this is true"));
    }

    #[test]
    fn test_truncate_short_passthrough() {
        assert_eq!(truncate_response("short", 240), "short");
        assert_eq!(truncate_response("", 240), "");
    }

    #[test]
    fn test_truncate_long_appends_marker() {
        let raw = "x".repeat(300);
        let out = truncate_response(&raw, 240);
        assert_eq!(out.chars().count(), 243);
        assert!(out.ends_with("..."));
        assert_eq!(&out[..240], &raw[..240]);
    }

    #[test]
    fn test_truncate_exact_boundary_untouched() {
        let raw = "y".repeat(240);
        assert_eq!(truncate_response(&raw, 240), raw);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let raw = "é".repeat(10);
        let out = truncate_response(&raw, 4);
        assert_eq!(out, format!("{}...", "é".repeat(4)));
    }

    #[tokio::test]
    async fn test_is_relevant_fail_closed_on_error() {
        assert!(!judge(Err(())).is_relevant("post content").await);
    }

    #[tokio::test]
    async fn test_is_relevant_true_reply() {
        assert!(judge(Ok(" True ".to_string())).is_relevant("post").await);
        assert!(!judge(Ok("False".to_string())).is_relevant("post").await);
    }

    #[tokio::test]
    async fn test_draft_none_on_error() {
        assert!(judge(Err(())).draft("post content").await.is_none());
    }

    #[tokio::test]
    async fn test_draft_truncates() {
        let long = "z".repeat(400);
        let out = judge(Ok(long)).draft("post").await.unwrap();
        assert_eq!(out.chars().count(), 243);
        assert!(out.ends_with("..."));
    }
}
