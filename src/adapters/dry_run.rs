use crate::domain::model::{PageSnapshot, PageUpdate, PublishedPage};
use crate::domain::ports::{PageStore, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Reads through to the wrapped store, writes the rendered page to local storage.
pub struct DryRunPageStore<P: PageStore, S: Storage> {
    inner: P,
    storage: S,
}

impl<P: PageStore, S: Storage> DryRunPageStore<P, S> {
    pub fn new(inner: P, storage: S) -> Self {
        Self { inner, storage }
    }
}

#[async_trait]
impl<P: PageStore, S: Storage> PageStore for DryRunPageStore<P, S> {
    async fn fetch_template(&self, template_page_id: &str) -> Result<String> {
        self.inner.fetch_template(template_page_id).await
    }

    async fn fetch_current_page(&self, page_id: &str) -> Result<PageSnapshot> {
        self.inner.fetch_current_page(page_id).await
    }

    async fn publish(&self, update: &PageUpdate) -> Result<PublishedPage> {
        let file_name = format!("page_{}_v{}.html", update.page_id, update.next_version());
        let path = self
            .storage
            .write_file(&file_name, update.markup.as_bytes())
            .await?;

        tracing::info!("📝 Dry run: wrote page {} to {}", update.page_id, path);
        Ok(PublishedPage {
            id: update.page_id.clone(),
            title: update.title.clone(),
            version: update.next_version(),
            local_path: Some(path),
        })
    }
}
