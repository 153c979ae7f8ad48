use super::webdriver::WebDriverSession;
use super::PlatformDriver;
use crate::config::DriverConfig;
use crate::error::EngageError;
use crate::retry::retry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.instagram.com";

// Instagram's DOM gives no stable ids, so these lean on page structure and
// break when the layout changes.
const LATEST_POST_SELECTOR: &str = "main > div > div:last-child > div > div:nth-child(2) a";
const POST_CONTENT_SELECTOR: &str =
    "section > main > div > div:first-child > div > div:nth-child(2) > div > div:nth-child(3) span";
const COMMENT_TEXTAREA_SELECTOR: &str =
    "textarea[aria-label='Adicione um comentário...'], textarea[aria-label='Add a comment…']";
const COMMENT_SUBMIT_SELECTOR: &str =
    "section > main > div > div:first-child > div > div:nth-child(2) form > div > div:last-child";

const TYPE_DELAY: Duration = Duration::from_secs(1);
const POST_LOGIN_DELAY: Duration = Duration::from_secs(4);

pub struct InstagramDriver {
    session: Arc<WebDriverSession>,
    nav_attempts: u32,
    nav_backoff: Duration,
}

impl InstagramDriver {
    pub fn new(session: Arc<WebDriverSession>, config: &DriverConfig) -> Self {
        Self {
            session,
            nav_attempts: config.nav_attempts,
            nav_backoff: Duration::from_secs(config.nav_backoff_s),
        }
    }
}

#[async_trait]
impl PlatformDriver for InstagramDriver {
    async fn login(&self, username: &str, password: &str) -> Result<(), EngageError> {
        self.session
            .goto(&format!("{}/accounts/login/", BASE_URL))
            .await?;

        let user_field = self.session.wait_for("[name=\"username\"]").await?;
        self.session.send_keys(&user_field, username).await?;
        tokio::time::sleep(TYPE_DELAY).await;

        let pass_field = self.session.wait_for("[name=\"password\"]").await?;
        self.session.send_keys(&pass_field, password).await?;
        tokio::time::sleep(TYPE_DELAY).await;

        let submit = self.session.wait_for("[type=\"submit\"]").await?;
        self.session.click(&submit).await?;
        tokio::time::sleep(POST_LOGIN_DELAY).await;
        Ok(())
    }

    async fn go_to_profile(&self, profile: &str) -> Result<(), EngageError> {
        let url = format!("{}/{}", BASE_URL, profile);
        let url = url.as_str();
        let session: &WebDriverSession = &self.session;

        let result = retry(
            self.nav_attempts,
            self.nav_backoff,
            move || async move {
                session.goto(url).await?;
                // Profile page counts as loaded once the post grid renders
                session.wait_for(LATEST_POST_SELECTOR).await?;
                Ok::<(), EngageError>(())
            },
            move || async move {
                if let Err(e) = session.refresh().await {
                    tracing::warn!(error = %e, "page reload before retry failed");
                }
            },
        )
        .await;

        match result {
            Ok(()) => {
                tracing::info!(profile, "navigated to profile");
                Ok(())
            }
            Err(_) => Err(EngageError::Navigation {
                profile: profile.to_string(),
                attempts: self.nav_attempts,
            }),
        }
    }

    async fn latest_post_ref(&self) -> Result<String, EngageError> {
        let anchor = self.session.wait_for(LATEST_POST_SELECTOR).await?;
        self.session.property(&anchor, "href").await
    }

    async fn post_content(&self, post_ref: &str) -> Result<String, EngageError> {
        self.session.goto(post_ref).await?;
        let span = self.session.wait_for(POST_CONTENT_SELECTOR).await?;
        self.session.text(&span).await
    }

    async fn submit_comment(&self, text: &str) -> Result<(), EngageError> {
        let submit = async {
            let textarea = self.session.wait_for(COMMENT_TEXTAREA_SELECTOR).await?;
            self.session.send_keys(&textarea, text).await?;
            let button = self.session.wait_for(COMMENT_SUBMIT_SELECTOR).await?;
            self.session.click(&button).await
        };
        submit
            .await
            .map_err(|e| EngageError::Submission(e.to_string()))
    }
}
