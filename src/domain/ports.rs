use crate::domain::model::{
    BearerToken, Category, Control, CustomFieldDefinition, FieldValues, PageSnapshot, PageUpdate,
    PublishedPage,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Read side of the GRC data provider.
#[async_trait]
pub trait ControlSource: Send + Sync {
    async fn authenticate(&self) -> Result<BearerToken>;
    async fn fetch_controls(&self, framework_id: &str, token: &BearerToken)
        -> Result<Vec<Control>>;
    async fn fetch_categories(&self, token: &BearerToken) -> Result<HashMap<String, Category>>;
    async fn fetch_field_values(&self, token: &BearerToken) -> Result<FieldValues>;
    async fn fetch_custom_field_definitions(
        &self,
        token: &BearerToken,
    ) -> Result<Vec<CustomFieldDefinition>>;
    async fn fetch_tags(&self, token: &BearerToken) -> Result<HashMap<String, Vec<String>>>;
    async fn fetch_requirements(&self, token: &BearerToken) -> Result<HashMap<String, String>>;
}

#[async_trait]
pub trait PageStore: Send + Sync {
    /// Fails with `SyncError::Template` when the page body is empty.
    async fn fetch_template(&self, template_page_id: &str) -> Result<String>;
    async fn fetch_current_page(&self, page_id: &str) -> Result<PageSnapshot>;
    async fn publish(&self, update: &PageUpdate) -> Result<PublishedPage>;
}
