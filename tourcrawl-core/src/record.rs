//! Normalized travel records.
//!
//! The collector crates hand over raw records (`TourismRecord` from the API,
//! `PageRecord` from scraped pages); normalization derives a
//! [`NormalizedRecord`] from either without mutating the source. Fields are
//! fixed and typed — no ad hoc key lookups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse travel category assigned by the keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "자연")]
    Nature,
    #[serde(rename = "문화재")]
    Heritage,
    #[serde(rename = "액티비티")]
    Activity,
    #[serde(rename = "지역축제")]
    Festival,
    #[serde(rename = "기타")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Nature => "자연",
            Category::Heritage => "문화재",
            Category::Activity => "액티비티",
            Category::Festival => "지역축제",
            Category::Other => "기타",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transportation-accessibility flags inferred from the address text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportation {
    pub public_transport: bool,
    pub subway: bool,
    pub bus: bool,
    pub parking: bool,
}

impl Default for Transportation {
    fn default() -> Self {
        Self {
            public_transport: false,
            subway: false,
            bus: false,
            // Parking is assumed available unless known otherwise.
            parking: true,
        }
    }
}

/// The normalized output record: a superset of the source fields plus the
/// derived category, region/city split and transportation flags.
///
/// `content_id` is empty for page-sourced records; `source_url` is empty for
/// API-sourced ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub content_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub address: String,
    pub region: String,
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub description: String,
    pub contact: String,
    pub website: String,
    pub zipcode: String,
    pub area_code: String,
    pub sigungu_code: String,
    pub created_at: String,
    pub modified_at: String,
    pub source_url: String,
    pub crawled_at: String,
    pub transportation: Transportation,
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}
