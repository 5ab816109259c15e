//! Page data aggregation.
//!
//! One page render needs all five categories at once. They are fetched
//! concurrently through the cached content service; if any of them fails the
//! whole snapshot is discarded and the empty default is served instead, so a
//! page never mixes fresh sections with missing ones.

use std::collections::HashMap;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::try_join;
use tracing::{debug, error};

use crate::application::content::{ContentError, ContentService};
use crate::domain::entities::{Achievement, BioSection, JourneyEntry, Project, TechCategory};

const METRIC_PAGE_DATA_FALLBACK_TOTAL: &str = "folio_page_data_fallback_total";

/// Everything the page renders, as one consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub bio_sections: Vec<BioSection>,
    pub journey_data: Vec<JourneyEntry>,
    pub tech_stack: HashMap<String, TechCategory>,
    pub achievements: Vec<Achievement>,
    pub projects: Vec<Project>,
}

impl PageData {
    pub fn is_empty(&self) -> bool {
        self.bio_sections.is_empty()
            && self.journey_data.is_empty()
            && self.tech_stack.is_empty()
            && self.achievements.is_empty()
            && self.projects.is_empty()
    }
}

/// Page data plus whether it is the fallback default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub data: PageData,
    pub degraded: bool,
}

#[derive(Clone)]
pub struct PageDataService {
    content: ContentService,
}

impl PageDataService {
    pub fn new(content: ContentService) -> Self {
        Self { content }
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// Page data for rendering. Never fails: any error yields [`PageData::default`].
    pub async fn page_data(&self) -> PageData {
        self.snapshot().await.data
    }

    /// Like [`PageDataService::page_data`], but reports whether the default was served.
    pub async fn snapshot(&self) -> PageSnapshot {
        match self.try_page_data().await {
            Ok(data) => PageSnapshot {
                data,
                degraded: false,
            },
            Err(err) => {
                error!(
                    target = "folio::page",
                    collection = err.collection(),
                    error = %err,
                    "Failed to assemble page data; serving empty sections"
                );
                counter!(METRIC_PAGE_DATA_FALLBACK_TOTAL, "collection" => err.collection())
                    .increment(1);
                PageSnapshot {
                    data: PageData::default(),
                    degraded: true,
                }
            }
        }
    }

    /// Fetch all five categories concurrently; the first failure aborts the rest.
    pub async fn try_page_data(&self) -> Result<PageData, ContentError> {
        let (bio_sections, journey_data, tech_stack, achievements, projects) = try_join!(
            self.content.bio_sections(),
            self.content.journey(),
            self.content.tech_stack(),
            self.content.achievements(),
            self.content.projects(),
        )?;

        debug!(
            bio_sections = bio_sections.len(),
            journey = journey_data.len(),
            tech_categories = tech_stack.len(),
            achievements = achievements.len(),
            projects = projects.len(),
            "Assembled page data"
        );

        Ok(PageData {
            bio_sections,
            journey_data,
            tech_stack,
            achievements,
            projects,
        })
    }
}
