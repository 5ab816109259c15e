use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::{content::ContentError, page::PageDataService};

#[derive(Debug, Error)]
pub enum CacheWarmError {
    #[error("failed to load page data: {0}")]
    PageData(#[from] ContentError),
}

/// Entry counts per category after a warm run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmSummary {
    pub bio_sections: usize,
    pub journey: usize,
    pub tech_categories: usize,
    pub achievements: usize,
    pub projects: usize,
}

/// Fills the cache by running one full page aggregation.
pub struct CacheWarmer {
    page: Arc<PageDataService>,
}

impl CacheWarmer {
    pub fn new(page: Arc<PageDataService>) -> Self {
        Self { page }
    }

    pub async fn warm(&self) -> Result<WarmSummary, CacheWarmError> {
        info!(target = "folio::cache_warmer", "warming page data cache");

        let data = self.page.try_page_data().await?;
        let summary = WarmSummary {
            bio_sections: data.bio_sections.len(),
            journey: data.journey_data.len(),
            tech_categories: data.tech_stack.len(),
            achievements: data.achievements.len(),
            projects: data.projects.len(),
        };

        info!(
            target = "folio::cache_warmer",
            bio_sections = summary.bio_sections,
            journey = summary.journey,
            tech_categories = summary.tech_categories,
            achievements = summary.achievements,
            projects = summary.projects,
            "page data cache warmed"
        );

        Ok(summary)
    }
}
