use crate::config::SchedulerConfig;
use crate::pipeline::{EngagementOutcome, EngagementPipeline};
use crate::tracker::PostTracker;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;

/// Infinite round-robin loop over the profile set. Owns the cursor and the
/// tracker exclusively; one profile is processed at a time, so no locking is
/// needed anywhere downstream.
pub struct Scheduler {
    profiles: Vec<String>,
    cursor: usize,
    pipeline: EngagementPipeline,
    tracker: PostTracker,
    poll_interval: Duration,
    failure_backoff: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        profiles: Vec<String>,
        pipeline: EngagementPipeline,
        config: &SchedulerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        if profiles.is_empty() {
            anyhow::bail!("profile rotation cannot be empty");
        }
        Ok(Self {
            profiles,
            cursor: 0,
            pipeline,
            tracker: PostTracker::new(),
            poll_interval: Duration::from_secs(config.poll_interval_s),
            failure_backoff: Duration::from_secs(config.failure_backoff_s),
            shutdown,
        })
    }

    pub fn tracker(&self) -> &PostTracker {
        &self.tracker
    }

    /// Run until shutdown is signalled. Every outcome gets one log line;
    /// failures add a backoff sleep before the standard inter-profile delay.
    pub async fn run(&mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let profile = self.profiles[self.cursor].clone();
            let outcome = self.pipeline.run(&profile, &mut self.tracker).await;

            match &outcome {
                EngagementOutcome::Skipped(reason) => {
                    tracing::info!(profile = %profile, reason = %reason, "skipped");
                }
                EngagementOutcome::Commented { post_ref, comment } => {
                    tracing::info!(profile = %profile, post = %post_ref, comment = %comment, "comment sent");
                }
                EngagementOutcome::Failed(e) => {
                    tracing::warn!(profile = %profile, error = %e, "cycle failed");
                }
            }

            self.cursor = (self.cursor + 1) % self.profiles.len();

            if matches!(outcome, EngagementOutcome::Failed(_))
                && self.sleep_or_shutdown(self.failure_backoff).await
            {
                break;
            }
            if self.sleep_or_shutdown(self.poll_interval).await {
                break;
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// Sleep, waking early on shutdown. Returns true when shutting down.
    async fn sleep_or_shutdown(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => *self.shutdown.borrow(),
            changed = self.shutdown.changed() => {
                // A dropped sender also means it is time to stop.
                changed.is_err() || *self.shutdown.borrow()
            }
        }
    }
}
