pub mod instagram;
pub mod webdriver;

use crate::config::DriverConfig;
use crate::error::EngageError;
use async_trait::async_trait;
use instagram::InstagramDriver;
use std::sync::Arc;
use webdriver::WebDriverSession;

/// Platform-specific navigation, content extraction, and comment submission.
/// One implementation per target platform, all driving a shared browser
/// session.
#[async_trait]
pub trait PlatformDriver: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<(), EngageError>;

    /// Navigate to a profile page. Implementations retry internally with a
    /// reload between attempts; exhausting the budget yields a navigation
    /// error for this cycle only.
    async fn go_to_profile(&self, profile: &str) -> Result<(), EngageError>;

    /// Reference (URL) of the profile's most recent post.
    async fn latest_post_ref(&self) -> Result<String, EngageError>;

    async fn post_content(&self, post_ref: &str) -> Result<String, EngageError>;

    async fn submit_comment(&self, text: &str) -> Result<(), EngageError>;
}

/// Look up a driver by name. Unknown names are a startup error.
pub fn build_driver(
    name: &str,
    session: Arc<WebDriverSession>,
    config: &DriverConfig,
) -> Option<Box<dyn PlatformDriver>> {
    match name {
        "instagram" => Some(Box::new(InstagramDriver::new(session, config))),
        _ => None,
    }
}

/// Names accepted by `build_driver`, for startup diagnostics.
pub const KNOWN_DRIVERS: &[&str] = &["instagram"];
