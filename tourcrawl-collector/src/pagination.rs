//! Page-by-page accumulation over a listing endpoint.

use crate::client::ApiClient;
use crate::xml::Item;
use tracing::{debug, warn};

/// Fetch every page of `endpoint`, reusing `base_params` on each call with an
/// incrementing `pageNo` and the configured `numOfRows`.
///
/// Pagination ends at the first page that yields zero items; the API has no
/// explicit "last page" marker. A failure mid-loop aborts this call and
/// returns whatever was accumulated so far — best effort, logged, never
/// silently discarded. Each invocation restarts at page 1; there is no
/// persisted cursor.
pub async fn fetch_all(
    client: &ApiClient,
    endpoint: &str,
    base_params: &[(&str, String)],
) -> Vec<Item> {
    let mut all_items = Vec::new();
    let mut page: u32 = 1;

    loop {
        let mut params = base_params.to_vec();
        params.push(("numOfRows", client.config().page_size.to_string()));
        params.push(("pageNo", page.to_string()));

        match client.fetch(endpoint, &params).await {
            Ok(items) => {
                if items.is_empty() {
                    debug!("{endpoint}: page {page} empty, pagination complete");
                    break;
                }
                all_items.extend(items);
                page += 1;
            }
            Err(e) => {
                warn!(
                    "{endpoint}: page {page} failed ({e}); returning {} records collected so far",
                    all_items.len()
                );
                break;
            }
        }
    }

    all_items
}
