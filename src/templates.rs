use std::path::Path;
use tracing::info;

use crate::event::MessageContent;
use crate::shared::AppError;

/// Greeting sent to every new member, in plain text and HTML
///
/// Both bodies are sent exactly as read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GreetingTemplate {
    pub plain: String,
    pub html: String,
}

impl GreetingTemplate {
    pub fn new(plain: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            plain: plain.into(),
            html: html.into(),
        }
    }

    pub async fn load(txt_path: &Path, html_path: &Path) -> Result<Self, AppError> {
        let plain = read_template(txt_path).await?;
        let html = read_template(html_path).await?;

        info!(
            txt_path = %txt_path.display(),
            html_path = %html_path.display(),
            "Loaded greeting templates"
        );
        Ok(Self { plain, html })
    }

    pub fn to_message(&self) -> MessageContent {
        MessageContent::html(self.plain.clone(), self.html.clone())
    }
}

async fn read_template(path: &Path) -> Result<String, AppError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Config(format!("Could not read from {}: {}", path.display(), e)))
}
