//! Tourism-site listing fetchers.

use crate::client::ApiClient;
use crate::pagination;
use crate::taxonomy::CategoryPath;
use crate::xml::Item;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// `contentTypeId` for tourist attractions, the only content type collected.
pub const CONTENT_TYPE_TOURIST_ATTRACTION: &str = "12";

/// One tourism site as returned by the listing endpoints. `content_id` is the
/// upstream identity: the same site reached through different category paths
/// is one logical entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourismRecord {
    pub content_id: String,
    pub title: String,
    pub address: String,
    pub area_code: String,
    pub sigungu_code: String,
    pub cat1: String,
    pub cat2: String,
    pub cat3: String,
    pub mapx: String,
    pub mapy: String,
    pub tel: String,
    pub zipcode: String,
    pub created_at: String,
    pub modified_at: String,
}

impl TourismRecord {
    /// Build a record from a parsed `<item>`. Items without a `contentid`
    /// cannot be deduplicated by identity and are dropped with a warning.
    pub fn from_item(item: &Item) -> Option<Self> {
        let content_id = item.text_or_empty("contentid");
        if content_id.is_empty() {
            warn!(
                "skipping listing item without contentid (title {:?})",
                item.text_or_empty("title")
            );
            return None;
        }
        Some(Self {
            content_id,
            title: item.text_or_empty("title"),
            address: item.text_or_empty("addr1"),
            area_code: item.text_or_empty("areacode"),
            sigungu_code: item.text_or_empty("sigungucode"),
            cat1: item.text_or_empty("cat1"),
            cat2: item.text_or_empty("cat2"),
            cat3: item.text_or_empty("cat3"),
            mapx: item.text_or_empty("mapx"),
            mapy: item.text_or_empty("mapy"),
            tel: item.text_or_empty("tel"),
            zipcode: item.text_or_empty("zipcode"),
            created_at: item.text_or_empty("createdtime"),
            modified_at: item.text_or_empty("modifiedtime"),
        })
    }
}

/// A province-level area code from `areaCode2`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaCode {
    pub code: String,
    pub name: String,
}

/// Fetch every tourist attraction tagged with the given category path.
///
/// The listing endpoint does not take `lclsSystm` codes; its filter is the
/// flat 3-slot `cat1/cat2/cat3` scheme. The hierarchical path is mapped onto
/// those slots level by level — an adapter between two distinct code systems,
/// not an equivalence. Returns raw records; dedup happens once after every
/// category path has been walked, because the same attraction appears under
/// multiple categories.
pub async fn fetch_for_category(client: &ApiClient, path: &CategoryPath) -> Vec<TourismRecord> {
    let mut params = vec![
        (
            "contentTypeId",
            CONTENT_TYPE_TOURIST_ATTRACTION.to_string(),
        ),
        ("cat1", path.l1_code.clone()),
    ];
    if let Some(l2) = &path.l2_code {
        params.push(("cat2", l2.clone()));
    }
    if let Some(l3) = &path.l3_code {
        params.push(("cat3", l3.clone()));
    }

    let items = pagination::fetch_all(client, "areaBasedList2", &params).await;
    let records: Vec<_> = items.iter().filter_map(TourismRecord::from_item).collect();
    info!(
        "category {}: {} records",
        path.display_name(),
        records.len()
    );
    records
}

/// Fetch the province/metropolitan-city code list.
pub async fn fetch_area_codes(client: &ApiClient) -> Vec<AreaCode> {
    let items = pagination::fetch_all(client, "areaCode2", &[]).await;
    items
        .iter()
        .filter_map(|item| {
            let code = item.text_or_empty("code");
            if code.is_empty() {
                return None;
            }
            Some(AreaCode {
                code,
                name: item.text_or_empty("name"),
            })
        })
        .collect()
}

/// Fetch the full synchronized attraction list for one area code.
pub async fn fetch_sync_for_area(client: &ApiClient, area_code: &str) -> Vec<TourismRecord> {
    let params = vec![
        ("areaCode", area_code.to_string()),
        (
            "contentTypeId",
            CONTENT_TYPE_TOURIST_ATTRACTION.to_string(),
        ),
    ];
    let items = pagination::fetch_all(client, "areaBasedSyncList2", &params).await;
    let records: Vec<_> = items.iter().filter_map(TourismRecord::from_item).collect();
    info!("area {area_code}: {} records", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::taxonomy::CategoryNode;
    use crate::xml::Item;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const EMPTY_PAGE: &str = "<response><body><items></items></body></response>";

    fn listing_page(rows: &[(&str, &str, &str)]) -> String {
        let mut body = String::from("<response><body><items>");
        for (id, title, addr) in rows {
            body.push_str(&format!(
                "<item><contentid>{id}</contentid><title>{title}</title><addr1>{addr}</addr1>\
                 <areacode>39</areacode><sigungucode>3</sigungucode>\
                 <cat1>A01</cat1><cat2>A0101</cat2><cat3>A01010400</cat3>\
                 <mapx>126.5</mapx><mapy>33.2</mapy>\
                 <createdtime>20100101000000</createdtime><modifiedtime>20240101000000</modifiedtime>\
                 </item>"
            ));
        }
        body.push_str("</items></body></response>");
        body
    }

    fn node(code: &str, name: &str, level: u8, parent: Option<&str>) -> CategoryNode {
        CategoryNode {
            code: code.into(),
            name: name.into(),
            level,
            parent_code: parent.map(str::to_string),
        }
    }

    fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::new(
            ApiConfig::new("test-key")
                .with_base_url(server.uri())
                .with_delay_ms(0),
        )
    }

    #[test]
    fn test_from_item_requires_contentid() {
        let ok = Item::from_pairs(&[("contentid", "1"), ("title", "폭포")]);
        assert!(TourismRecord::from_item(&ok).is_some());

        let missing = Item::from_pairs(&[("title", "폭포")]);
        assert!(TourismRecord::from_item(&missing).is_none());
    }

    #[test]
    fn test_from_item_maps_fields() {
        let item = Item::from_pairs(&[
            ("contentid", "264337"),
            ("title", "정방폭포"),
            ("addr1", "제주특별자치도 서귀포시"),
            ("areacode", "39"),
            ("sigungucode", "3"),
            ("cat1", "A01"),
            ("mapx", "126.57"),
            ("mapy", "33.24"),
            ("createdtime", "20100101000000"),
            ("modifiedtime", "20240101000000"),
        ]);
        let record = TourismRecord::from_item(&item).unwrap();
        assert_eq!(record.content_id, "264337");
        assert_eq!(record.title, "정방폭포");
        assert_eq!(record.address, "제주특별자치도 서귀포시");
        assert_eq!(record.area_code, "39");
        assert_eq!(record.cat1, "A01");
        assert_eq!(record.created_at, "20100101000000");
        // Absent tags fall back to empty strings.
        assert_eq!(record.tel, "");
        assert_eq!(record.zipcode, "");
    }

    /// A partial path maps onto cat1/cat2 and leaves cat3 unset.
    #[tokio::test]
    async fn test_fetch_for_category_maps_path_to_flat_slots() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/areaBasedList2"))
            .and(query_param("contentTypeId", "12"))
            .and(query_param("cat1", "A01"))
            .and(query_param("cat2", "A0101"))
            .and(query_param_is_missing("cat3"))
            .and(query_param("pageNo", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing_page(&[("1", "정방폭포", "서귀포시")])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/areaBasedList2"))
            .and(query_param("pageNo", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let l1 = node("A01", "자연", 1, None);
        let l2 = node("A0101", "자연관광지", 2, Some("A01"));
        let records = fetch_for_category(&client, &CategoryPath::mid(&l1, &l2)).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_id, "1");
    }

    #[tokio::test]
    async fn test_fetch_area_codes() {
        let mock_server = MockServer::start().await;

        let body = "<response><body><items>\
            <item><code>1</code><name>서울</name></item>\
            <item><code>39</code><name>제주도</name></item>\
            </items></body></response>";
        Mock::given(method("GET"))
            .and(path("/areaCode2"))
            .and(query_param("pageNo", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/areaCode2"))
            .and(query_param("pageNo", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let areas = fetch_area_codes(&client).await;
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[1].code, "39");
        assert_eq!(areas[1].name, "제주도");
    }

    #[tokio::test]
    async fn test_fetch_sync_for_area_filters_by_area() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/areaBasedSyncList2"))
            .and(query_param("areaCode", "39"))
            .and(query_param("contentTypeId", "12"))
            .and(query_param("pageNo", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing_page(&[("9", "성산일출봉", "서귀포시")])),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/areaBasedSyncList2"))
            .and(query_param("pageNo", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let records = fetch_sync_for_area(&client, "39").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "성산일출봉");
    }
}
