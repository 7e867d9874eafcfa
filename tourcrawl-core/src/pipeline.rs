//! The collect pipeline: taxonomy walk → per-category listing fetch →
//! normalize → dedup.
//!
//! Fully sequential. Every unit of work that fails degrades to zero results
//! for that unit and the pipeline continues with its siblings; the only rate
//! control is the client's fixed post-call delay.

use crate::normalize::{Normalizer, dedup};
use crate::record::NormalizedRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::sync::Arc;
use tourcrawl_collector::client::ApiClient;
use tourcrawl_collector::taxonomy::{self, TaxonomyTree};
use tourcrawl_collector::tourism::{self, TourismRecord};
use tracing::info;

/// Options for configuring a collect run.
pub struct CollectOptions {
    /// How deep into the taxonomy to walk per branch (1..=3).
    pub depth: u8,
    /// Cap on the number of category paths fetched; `None` fetches all.
    /// Useful for smoke runs against the live API.
    pub limit: Option<usize>,
    pub show_progress: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            depth: 3,
            limit: None,
            show_progress: true,
        }
    }
}

/// Callback for reporting collect progress.
pub type CollectProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Everything a collect run produces.
pub struct CollectOutcome {
    /// The walked classification tree (for index dumps).
    pub tree: TaxonomyTree,
    /// Raw records grouped per category path, in walk order, for the
    /// per-category TSV dumps. Paths that yielded nothing are absent.
    pub by_category: Vec<(String, Vec<TourismRecord>)>,
    /// The normalized, deduplicated record set.
    pub records: Vec<NormalizedRecord>,
}

/// Execute a full collect run.
pub async fn execute_collect(
    client: &ApiClient,
    options: CollectOptions,
    progress_callback: Option<CollectProgressCallback>,
) -> CollectOutcome {
    let progress_bar = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Walking category taxonomy...");
        Some(pb)
    } else {
        None
    };

    let report = |msg: String| {
        if let Some(ref pb) = progress_bar {
            pb.set_message(msg.clone());
            pb.tick();
        }
        if let Some(ref callback) = progress_callback {
            callback(msg);
        }
    };

    let tree = taxonomy::walk_taxonomy(client).await;
    let mut paths = tree.paths(options.depth);
    if let Some(limit) = options.limit {
        paths.truncate(limit);
    }
    report(format!(
        "Taxonomy walked: {} nodes, {} category paths",
        tree.node_count(),
        paths.len()
    ));

    let mut by_category = Vec::new();
    let mut raw: Vec<TourismRecord> = Vec::new();
    // The same attraction appears under multiple category paths; its
    // content_id is the upstream identity, so keep the first sighting only.
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (idx, path) in paths.iter().enumerate() {
        let display_name = path.display_name();
        report(format!(
            "[{}/{}] {display_name}",
            idx + 1,
            paths.len()
        ));

        let records = tourism::fetch_for_category(client, path).await;
        if records.is_empty() {
            continue;
        }
        for record in &records {
            if seen_ids.insert(record.content_id.clone()) {
                raw.push(record.clone());
            }
        }
        by_category.push((display_name, records));
    }

    report(format!("Normalizing {} records...", raw.len()));
    let normalizer = Normalizer::new();
    let normalized = normalizer.normalize_all(&raw);
    let records = dedup(normalized);
    info!(
        "collect complete: {} raw, {} after normalize+dedup",
        raw.len(),
        records.len()
    );

    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!("Collect complete: {} records", records.len()));
    }

    CollectOutcome {
        tree,
        by_category,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourcrawl_collector::config::ApiConfig;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_PAGE: &str = "<response><body><items></items></body></response>";

    fn code_page(rows: &[(&str, &str)]) -> String {
        let mut body = String::from("<response><body><items>");
        for (code, name) in rows {
            body.push_str(&format!(
                "<item><code>{code}</code><name>{name}</name></item>"
            ));
        }
        body.push_str("</items></body></response>");
        body
    }

    fn listing_page(rows: &[(&str, &str, &str)]) -> String {
        let mut body = String::from("<response><body><items>");
        for (id, title, addr) in rows {
            body.push_str(&format!(
                "<item><contentid>{id}</contentid><title>{title}</title>\
                 <addr1>{addr}</addr1></item>"
            ));
        }
        body.push_str("</items></body></response>");
        body
    }

    async fn mount_empty_page2(server: &MockServer, endpoint: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("pageNo", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(server)
            .await;
    }

    /// One category, one listing page, a duplicate spread over two pages of
    /// the same category: the outcome holds one normalized record per
    /// distinct attraction.
    #[tokio::test]
    async fn test_execute_collect_end_to_end() {
        let mock_server = MockServer::start().await;

        // Taxonomy: single level-1 node with no children.
        Mock::given(method("GET"))
            .and(path("/lclsSystmCode2"))
            .and(query_param_is_missing("lclsSystm1"))
            .and(query_param("pageNo", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(code_page(&[("A01", "자연")])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lclsSystmCode2"))
            .and(query_param_is_missing("lclsSystm1"))
            .and(query_param("pageNo", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/lclsSystmCode2"))
            .and(query_param("lclsSystm1", "A01"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&mock_server)
            .await;

        // Listing for the single path (cat1=A01): two identical sites.
        Mock::given(method("GET"))
            .and(path("/areaBasedList2"))
            .and(query_param("cat1", "A01"))
            .and(query_param("pageNo", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[
                ("9", "정방폭포", "제주도 서귀포시 동홍동"),
                ("9", "정방폭포", "제주도 서귀포시 동홍동"),
            ])))
            .mount(&mock_server)
            .await;
        mount_empty_page2(&mock_server, "/areaBasedList2").await;

        let client = ApiClient::new(
            ApiConfig::new("test-key")
                .with_base_url(mock_server.uri())
                .with_delay_ms(0),
        );

        let options = CollectOptions {
            depth: 3,
            limit: None,
            show_progress: false,
        };
        let outcome = execute_collect(&client, options, None).await;

        assert_eq!(outcome.tree.level1.len(), 1);
        assert_eq!(outcome.by_category.len(), 1);
        assert_eq!(outcome.by_category[0].0, "자연");
        // Raw dump keeps both rows; the normalized set is deduplicated.
        assert_eq!(outcome.by_category[0].1.len(), 2);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].region, "제주도");
        assert_eq!(outcome.records[0].city, "서귀포시");
    }

    #[tokio::test]
    async fn test_execute_collect_empty_taxonomy() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lclsSystmCode2"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(
            ApiConfig::new("test-key")
                .with_base_url(mock_server.uri())
                .with_delay_ms(0),
        );

        let options = CollectOptions {
            show_progress: false,
            ..CollectOptions::default()
        };
        let outcome = execute_collect(&client, options, None).await;

        assert!(outcome.tree.is_empty());
        assert!(outcome.by_category.is_empty());
        assert!(outcome.records.is_empty());
    }
}
