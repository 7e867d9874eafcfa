pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod taxonomy;
pub mod tourism;
pub mod xml;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{CollectError, Result};
pub use extract::{PageFetcher, PageRecord, SiteExtractor};
pub use taxonomy::{CategoryNode, CategoryPath, FlatCategory, TaxonomyTree};
pub use tourism::{AreaCode, TourismRecord};
