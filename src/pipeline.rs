use crate::driver::PlatformDriver;
use crate::error::EngageError;
use crate::judge::TextJudge;
use crate::tracker::PostTracker;
use std::fmt;

/// Why a cycle ended without a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoNewPost,
    NoContent,
    NotRelevant,
    NoValidComment,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NoNewPost => "no new post",
            SkipReason::NoContent => "no content",
            SkipReason::NotRelevant => "not relevant",
            SkipReason::NoValidComment => "no valid comment",
        };
        f.write_str(s)
    }
}

/// Result of one pipeline run for one profile. Transient — produced for the
/// scheduler's log line and dropped.
#[derive(Debug)]
pub enum EngagementOutcome {
    Skipped(SkipReason),
    Commented { post_ref: String, comment: String },
    Failed(EngageError),
}

/// Per-profile unit of work: fetch the latest post, compare against the
/// tracker, judge, draft, submit. The tracker is only written after the full
/// cycle succeeds, so a post that was fetched but never engaged stays
/// eligible on the next visit.
pub struct EngagementPipeline {
    driver: Box<dyn PlatformDriver>,
    judge: TextJudge,
}

impl EngagementPipeline {
    pub fn new(driver: Box<dyn PlatformDriver>, judge: TextJudge) -> Self {
        Self { driver, judge }
    }

    /// Run one cycle. Recoverable errors from any step are absorbed here and
    /// reported as a `Failed` outcome; the caller decides on backoff.
    pub async fn run(&self, profile: &str, tracker: &mut PostTracker) -> EngagementOutcome {
        match self.cycle(profile, tracker).await {
            Ok(outcome) => outcome,
            Err(e) => EngagementOutcome::Failed(e),
        }
    }

    async fn cycle(
        &self,
        profile: &str,
        tracker: &mut PostTracker,
    ) -> Result<EngagementOutcome, EngageError> {
        self.driver.go_to_profile(profile).await?;

        let latest = self.driver.latest_post_ref().await?;
        if latest.is_empty() || tracker.get(profile) == Some(latest.as_str()) {
            return Ok(EngagementOutcome::Skipped(SkipReason::NoNewPost));
        }
        tracing::info!(profile, post = %latest, "new post detected");

        let content = self.driver.post_content(&latest).await?;
        if content.trim().is_empty() {
            return Ok(EngagementOutcome::Skipped(SkipReason::NoContent));
        }

        // Not-relevant posts do NOT advance the tracker: the same post is
        // re-judged on the next visit until a newer post supersedes it.
        if !self.judge.is_relevant(&content).await {
            return Ok(EngagementOutcome::Skipped(SkipReason::NotRelevant));
        }

        let Some(comment) = self.judge.draft(&content).await else {
            return Ok(EngagementOutcome::Skipped(SkipReason::NoValidComment));
        };

        self.driver.submit_comment(&comment).await?;
        tracker.record(profile, &latest);

        Ok(EngagementOutcome::Commented {
            post_ref: latest,
            comment,
        })
    }
}
