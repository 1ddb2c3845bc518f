use crate::config::{SyncConfig, SyncTargets};
use crate::core::aggregate::{enrich, group_by_category, resolve_requirements, resolve_scoped_systems};
use crate::core::merge::{find_unconsumed_placeholders, merge_placeholders};
use crate::core::sanitize::sanitize;
use crate::domain::model::{PageUpdate, PublishedPage};
use crate::domain::ports::{ControlSource, PageStore};
use crate::utils::error::{Result, SyncError};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub targets: SyncTargets,
    pub scoped_systems_definition_id: String,
    pub strict_placeholders: bool,
}

impl SyncOptions {
    pub fn from_config(config: &SyncConfig, strict_placeholders: bool) -> Self {
        Self {
            targets: config.targets.clone(),
            scoped_systems_definition_id: config.fields.scoped_systems_definition_id.clone(),
            strict_placeholders,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Published(PublishedPage),
    /// The template page was empty; nothing was written.
    TemplateMissing { template_page_id: String },
}

pub struct SyncEngine<S: ControlSource, P: PageStore> {
    source: S,
    pages: P,
    options: SyncOptions,
}

impl<S: ControlSource, P: PageStore> SyncEngine<S, P> {
    pub fn new(source: S, pages: P, options: SyncOptions) -> Self {
        Self {
            source,
            pages,
            options,
        }
    }

    /// Runs the whole pipeline. An empty template ends the run cleanly.
    pub async fn run(&self) -> Result<SyncOutcome> {
        match self.sync().await {
            Err(SyncError::Template { page_id }) => {
                tracing::warn!(
                    "⚠️ Template page {} has no content; nothing was published",
                    page_id
                );
                Ok(SyncOutcome::TemplateMissing {
                    template_page_id: page_id,
                })
            }
            other => other,
        }
    }

    async fn sync(&self) -> Result<SyncOutcome> {
        let targets = &self.options.targets;

        tracing::info!("🔑 Fetching bearer token");
        let token = self.source.authenticate().await?;

        tracing::info!("📥 Fetching controls for framework {}", targets.framework_id);
        let controls = self
            .source
            .fetch_controls(&targets.framework_id, &token)
            .await?;
        let categories = self.source.fetch_categories(&token).await?;

        tracing::info!("📥 Fetching field values and custom field definitions");
        let field_values = self.source.fetch_field_values(&token).await?;
        let definitions = self.source.fetch_custom_field_definitions(&token).await?;

        tracing::info!("📥 Fetching tags and requirements");
        let tags = self.source.fetch_tags(&token).await?;
        let requirements = self.source.fetch_requirements(&token).await?;

        let grouped = group_by_category(controls, &categories);
        tracing::info!(
            "📊 Grouped {} controls into {} categories",
            grouped.control_count(),
            grouped.category_count()
        );

        let scoped_systems = resolve_scoped_systems(
            &field_values.scope_keys,
            &definitions,
            &self.options.scoped_systems_definition_id,
        );
        let requirement_names = resolve_requirements(&grouped, &requirements);
        let enrichment = enrich(
            &grouped,
            &field_values,
            &scoped_systems,
            &tags,
            &requirement_names,
        );

        tracing::info!("📄 Fetching template page {}", targets.template_page_id);
        let template = self.pages.fetch_template(&targets.template_page_id).await?;

        let merged = merge_placeholders(&template, &grouped, &enrichment);
        let leftovers = find_unconsumed_placeholders(&merged);
        for leftover in &leftovers {
            tracing::warn!("⚠️ Placeholder left unreplaced: {}", leftover);
        }
        if self.options.strict_placeholders && !leftovers.is_empty() {
            return Err(SyncError::UnconsumedPlaceholders { tokens: leftovers });
        }

        let document = sanitize(&merged);

        // Read the revision as late as possible; the write is last-writer-wins.
        let current = self.pages.fetch_current_page(&targets.page_id).await?;
        tracing::info!(
            "📤 Updating page {} ({}) from version {}",
            targets.page_id,
            current.title,
            current.version
        );

        let update = PageUpdate {
            page_id: targets.page_id.clone(),
            title: current.title,
            markup: document,
            current_version: current.version,
        };
        let published = self.pages.publish(&update).await?;

        tracing::info!(
            "✅ Page {} is now at version {}",
            published.id,
            published.version
        );
        Ok(SyncOutcome::Published(published))
    }
}
