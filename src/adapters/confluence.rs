use crate::config::{SyncConfig, WikiSettings};
use crate::domain::model::{PageSnapshot, PageUpdate, PublishedPage};
use crate::domain::ports::PageStore;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    version: VersionInfo,
}

#[derive(Debug, Deserialize)]
struct TemplateResponse {
    #[serde(default)]
    body: Option<PageBody>,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    storage: Option<StorageValue>,
}

#[derive(Debug, Deserialize)]
struct StorageValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionInfo {
    number: u64,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    id: &'a str,
    r#type: &'static str,
    title: &'a str,
    body: UpdateBody<'a>,
    version: VersionInfo,
}

#[derive(Debug, Serialize)]
struct UpdateBody<'a> {
    storage: StorageRepresentation<'a>,
}

#[derive(Debug, Serialize)]
struct StorageRepresentation<'a> {
    value: &'a str,
    representation: &'static str,
}

/// Confluence REST client using basic auth (username + API token).
pub struct ConfluenceClient {
    client: Client,
    settings: WikiSettings,
    token: String,
}

impl ConfluenceClient {
    pub fn new(settings: WikiSettings, token: String) -> Self {
        Self {
            client: Client::new(),
            settings,
            token,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.wiki.clone(), config.secrets.wiki_token.clone())
    }

    fn content_url(&self, page_id: &str) -> String {
        format!(
            "{}/content/{}",
            self.settings.base_url.trim_end_matches('/'),
            page_id
        )
    }

    async fn get_page<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("Making Confluence request to: {}", url);
        let response = self
            .client
            .get(url)
            .basic_auth(&self.settings.username, Some(&self.token))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PageStore for ConfluenceClient {
    async fn fetch_template(&self, template_page_id: &str) -> Result<String> {
        let url = format!("{}?expand=body.storage", self.content_url(template_page_id));
        let page: TemplateResponse = self.get_page(&url).await?;

        let markup = page
            .body
            .and_then(|body| body.storage)
            .map(|storage| storage.value)
            .unwrap_or_default();

        if markup.is_empty() {
            return Err(SyncError::Template {
                page_id: template_page_id.to_string(),
            });
        }
        Ok(markup)
    }

    async fn fetch_current_page(&self, page_id: &str) -> Result<PageSnapshot> {
        let url = format!("{}?expand=body.storage,version", self.content_url(page_id));
        let page: PageResponse = self.get_page(&url).await?;

        Ok(PageSnapshot {
            id: page.id,
            title: page.title,
            version: page.version.number,
        })
    }

    async fn publish(&self, update: &PageUpdate) -> Result<PublishedPage> {
        let payload = UpdateRequest {
            id: &update.page_id,
            r#type: "page",
            title: &update.title,
            body: UpdateBody {
                storage: StorageRepresentation {
                    value: &update.markup,
                    representation: "storage",
                },
            },
            version: VersionInfo {
                number: update.next_version(),
            },
        };

        tracing::info!("📤 Sending updated content to Confluence page {}", update.page_id);
        let response = self
            .client
            .put(self.content_url(&update.page_id))
            .basic_auth(&self.settings.username, Some(&self.token))
            .json(&payload)
            .send()
            .await?;

        let status_check = response.error_for_status_ref().map(|_| ());
        if let Err(err) = status_check {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "❌ Confluence rejected update of page {} ({}): {}",
                update.page_id,
                err.status().map(|s| s.to_string()).unwrap_or_default(),
                body
            );
            return Err(err.into());
        }

        let page: PageResponse = response.json().await?;
        Ok(PublishedPage {
            id: page.id,
            title: page.title,
            version: page.version.number,
            local_path: None,
        })
    }
}
