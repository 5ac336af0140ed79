//! Drive metadata lookup for event attachments. Uses the v2 endpoint:
//! its alternateLink is the URL format calendar attachments accept.

use async_trait::async_trait;
use serde::Deserialize;

use runcal_core::source::{Attachment, DriveSource};
use runcal_core::RuncalResult;

use super::provider_err;

pub struct GoogleDrive {
    http: reqwest::Client,
    access_token: String,
}

impl GoogleDrive {
    pub fn new(access_token: &str) -> Self {
        GoogleDrive {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    title: Option<String>,
    mime_type: Option<String>,
    alternate_link: Option<String>,
}

#[async_trait]
impl DriveSource for GoogleDrive {
    async fn fetch_attachment(&self, file_id: &str) -> RuncalResult<Attachment> {
        let url = format!("https://www.googleapis.com/drive/v2/files/{}", file_id);

        let file: DriveFile = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(provider_err)?
            .error_for_status()
            .map_err(provider_err)?
            .json()
            .await
            .map_err(provider_err)?;

        Ok(Attachment {
            title: file.title.unwrap_or_default(),
            mime_type: file.mime_type.unwrap_or_default(),
            file_url: file.alternate_link.unwrap_or_default(),
        })
    }
}
