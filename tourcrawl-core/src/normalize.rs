//! Record normalization: category classification, address parsing,
//! transportation inference, validation and deduplication.

use crate::record::{Category, NormalizedRecord, Transportation};
use tourcrawl_collector::error::{CollectError, Result};
use tourcrawl_collector::extract::PageRecord;
use tourcrawl_collector::tourism::TourismRecord;
use std::collections::HashSet;
use tracing::warn;

/// Keyword table for the classifier. An array, not a map: ties between
/// categories resolve deterministically in this order.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 4] = [
    (
        Category::Nature,
        &["산", "바다", "해변", "강", "호수", "폭포", "계곡", "숲", "공원", "자연"],
    ),
    (
        Category::Heritage,
        &["궁", "절", "사찰", "유적", "박물관", "미술관", "문화재", "역사", "전통"],
    ),
    (
        Category::Activity,
        &["체험", "놀이", "레포츠", "스키", "수상", "등반", "래프팅", "패러글라이딩"],
    ),
    (
        Category::Festival,
        &["축제", "페스티벌", "행사", "이벤트", "마츠리"],
    ),
];

/// Province-level suffixes, longest first so 특별시 is reported before the
/// bare 시 would match.
const REGION_SUFFIXES: [&str; 5] = ["특별자치시", "특별시", "광역시", "시", "도"];
const CITY_SUFFIXES: [&str; 3] = ["군", "구", "시"];

const TRANSIT_KEYWORDS: [&str; 3] = ["역", "터미널", "정류장"];
const STATION_KEYWORD: &str = "역";

/// Keyword-scoring category classifier.
pub struct CategoryClassifier;

impl CategoryClassifier {
    /// Score each category by how many of its keywords appear in the
    /// lower-cased name+description; highest score wins, all-zero → `Other`.
    /// Pure function of its inputs: deterministic and idempotent.
    pub fn classify(name: &str, description: &str) -> Category {
        let text = format!("{name} {description}").to_lowercase();

        let mut best = Category::Other;
        let mut best_score = 0usize;
        for (category, keywords) in CATEGORY_KEYWORDS {
            let score = keywords.iter().filter(|k| text.contains(*k)).count();
            if score > best_score {
                best = category;
                best_score = score;
            }
        }
        best
    }
}

/// Suffix-heuristic address splitter.
pub struct AddressParser;

impl AddressParser {
    /// Split on whitespace; the region is the first token ending in a
    /// province suffix, the city the first later token ending in a
    /// district suffix. Only one of each is ever extracted, even when the
    /// address carries more administrative levels.
    pub fn parse(address: &str) -> (String, String) {
        let mut tokens = address.split_whitespace();

        let mut region = String::new();
        for token in tokens.by_ref() {
            if REGION_SUFFIXES.iter().any(|s| token.ends_with(s)) {
                region = token.to_string();
                break;
            }
        }

        let mut city = String::new();
        for token in tokens {
            if CITY_SUFFIXES.iter().any(|s| token.ends_with(s)) {
                city = token.to_string();
                break;
            }
        }

        (region, city)
    }
}

/// Keyword-presence transportation inference. A coarse heuristic over the
/// address text, not a lookup against real transit data.
pub struct TransportationChecker;

impl TransportationChecker {
    pub fn check(address: &str) -> Transportation {
        let mut transport = Transportation::default();

        if TRANSIT_KEYWORDS.iter().any(|k| address.contains(k)) {
            transport.public_transport = true;
            transport.bus = true;
        }
        if address.contains(STATION_KEYWORD) {
            transport.subway = true;
        }

        transport
    }
}

/// A record needs at least a non-blank name and address to be useful
/// downstream.
pub fn validate(name: &str, address: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CollectError::Validation("record has no name".to_string()));
    }
    if address.trim().is_empty() {
        return Err(CollectError::Validation(format!(
            "record {name:?} has no address"
        )));
    }
    Ok(())
}

/// Drop later records whose `name-address` composite key was already seen.
/// Exact, case-sensitive, order-preserving; the first occurrence wins.
pub fn dedup(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(format!("{}-{}", record.name, record.address)))
        .collect()
}

/// Derives normalized records from either raw source.
pub struct Normalizer {
    crawled_at: String,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            crawled_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn enrich(&self, mut record: NormalizedRecord) -> NormalizedRecord {
        record.category = CategoryClassifier::classify(&record.name, &record.description);
        let (region, city) = AddressParser::parse(&record.address);
        record.region = region;
        record.city = city;
        record.transportation = TransportationChecker::check(&record.address);
        record.crawled_at = self.crawled_at.clone();
        record
    }

    /// Normalize one API record. `Validation` failure if name or address is
    /// blank.
    pub fn normalize_tourism(&self, source: &TourismRecord) -> Result<NormalizedRecord> {
        validate(&source.title, &source.address)?;
        Ok(self.enrich(NormalizedRecord {
            content_id: source.content_id.clone(),
            name: source.title.clone(),
            address: source.address.clone(),
            latitude: source.mapy.clone(),
            longitude: source.mapx.clone(),
            contact: source.tel.clone(),
            zipcode: source.zipcode.clone(),
            area_code: source.area_code.clone(),
            sigungu_code: source.sigungu_code.clone(),
            created_at: source.created_at.clone(),
            modified_at: source.modified_at.clone(),
            ..NormalizedRecord::default()
        }))
    }

    /// Normalize one scraped page record.
    pub fn normalize_page(&self, source: &PageRecord) -> Result<NormalizedRecord> {
        validate(&source.name, &source.address)?;
        Ok(self.enrich(NormalizedRecord {
            name: source.name.clone(),
            description: source.description.clone(),
            address: source.address.clone(),
            contact: source.contact.clone(),
            website: source.website.clone(),
            source_url: source.source_url.clone(),
            ..NormalizedRecord::default()
        }))
    }

    /// Normalize a batch of API records. A record that fails validation is
    /// logged and skipped; it never aborts the batch.
    pub fn normalize_all(&self, sources: &[TourismRecord]) -> Vec<NormalizedRecord> {
        sources
            .iter()
            .filter_map(|source| match self.normalize_tourism(source) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("skipping record {}: {e}", source.content_id);
                    None
                }
            })
            .collect()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_nature() {
        let category = CategoryClassifier::classify("정방폭포", "바다로 떨어지는 폭포");
        assert_eq!(category, Category::Nature);
    }

    #[test]
    fn test_classify_heritage() {
        let category = CategoryClassifier::classify("경복궁", "조선 왕조의 법궁, 역사 유적");
        assert_eq!(category, Category::Heritage);
    }

    #[test]
    fn test_classify_unmatched_is_other() {
        assert_eq!(CategoryClassifier::classify("aaa", "bbb"), Category::Other);
        assert_eq!(CategoryClassifier::classify("", ""), Category::Other);
    }

    #[test]
    fn test_classify_deterministic_and_idempotent() {
        let first = CategoryClassifier::classify("한강 공원", "축제");
        let second = CategoryClassifier::classify("한강 공원", "축제");
        assert_eq!(first, second);
        // 강+공원 (2 Nature hits) beats 축제 (1 Festival hit).
        assert_eq!(first, Category::Nature);
    }

    #[test]
    fn test_classify_tie_prefers_table_order() {
        // One Nature keyword and one Heritage keyword: Nature is listed
        // first in the table, so it wins the tie.
        let category = CategoryClassifier::classify("산 박물관", "");
        assert_eq!(category, Category::Nature);
    }

    #[test]
    fn test_address_parse() {
        let (region, city) = AddressParser::parse("제주특별자치도 서귀포시 칠십리로214번길 37");
        assert_eq!(region, "제주특별자치도");
        assert_eq!(city, "서귀포시");
    }

    #[test]
    fn test_address_parse_metropolitan() {
        let (region, city) = AddressParser::parse("서울특별시 종로구 사직로 161");
        assert_eq!(region, "서울특별시");
        assert_eq!(city, "종로구");
    }

    #[test]
    fn test_address_parse_only_first_match_extracted() {
        // Two district tokens: only the first after the region is taken.
        let (region, city) = AddressParser::parse("경기도 수원시 팔달구 정조로");
        assert_eq!(region, "경기도");
        assert_eq!(city, "수원시");
    }

    #[test]
    fn test_address_parse_no_match() {
        let (region, city) = AddressParser::parse("somewhere else entirely");
        assert_eq!(region, "");
        assert_eq!(city, "");
    }

    #[test]
    fn test_transportation_station() {
        let transport = TransportationChecker::check("서울특별시 중구 서울역 앞");
        assert!(transport.subway);
        assert!(transport.public_transport);
        assert!(transport.bus);
        assert!(transport.parking);
    }

    #[test]
    fn test_transportation_terminal_without_station() {
        let transport = TransportationChecker::check("강원도 속초시 시외버스터미널 인근");
        assert!(!transport.subway);
        assert!(transport.public_transport);
        assert!(transport.bus);
    }

    #[test]
    fn test_transportation_none_matched() {
        let transport = TransportationChecker::check("전라남도 신안군 증도면");
        assert!(!transport.public_transport);
        assert!(!transport.subway);
        assert!(!transport.bus);
        assert!(transport.parking);
    }

    #[test]
    fn test_validate() {
        assert!(validate("정방폭포", "서귀포시").is_ok());
        assert!(matches!(
            validate("", "서귀포시"),
            Err(CollectError::Validation(_))
        ));
        assert!(matches!(
            validate("정방폭포", "   "),
            Err(CollectError::Validation(_))
        ));
    }

    fn named(name: &str, address: &str) -> NormalizedRecord {
        NormalizedRecord {
            name: name.to_string(),
            address: address.to_string(),
            ..NormalizedRecord::default()
        }
    }

    #[test]
    fn test_dedup_same_name_and_address() {
        let records = vec![named("폭포", "서귀포시"), named("폭포", "서귀포시")];
        let deduped = dedup(records);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn test_dedup_differing_address_kept_in_order() {
        let records = vec![named("폭포", "서귀포시"), named("폭포", "제주시")];
        let deduped = dedup(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].address, "서귀포시");
        assert_eq!(deduped[1].address, "제주시");
    }

    #[test]
    fn test_dedup_key_is_case_sensitive() {
        let records = vec![named("Falls", "Jeju"), named("falls", "Jeju")];
        assert_eq!(dedup(records).len(), 2);
    }

    #[test]
    fn test_normalize_tourism_record() {
        let source = TourismRecord {
            content_id: "264337".into(),
            title: "정방폭포".into(),
            address: "제주특별자치도 서귀포시 동홍동".into(),
            mapx: "126.57".into(),
            mapy: "33.24".into(),
            tel: "064-733-1530".into(),
            ..TourismRecord::default()
        };

        let normalizer = Normalizer::new();
        let record = normalizer.normalize_tourism(&source).unwrap();

        assert_eq!(record.content_id, "264337");
        assert_eq!(record.name, "정방폭포");
        assert_eq!(record.category, Category::Nature);
        assert_eq!(record.region, "제주특별자치도");
        assert_eq!(record.city, "서귀포시");
        assert_eq!(record.longitude, "126.57");
        assert_eq!(record.latitude, "33.24");
        assert_eq!(record.contact, "064-733-1530");
        assert!(!record.crawled_at.is_empty());
    }

    #[test]
    fn test_normalize_all_skips_invalid() {
        let valid = TourismRecord {
            content_id: "1".into(),
            title: "정방폭포".into(),
            address: "서귀포시".into(),
            ..TourismRecord::default()
        };
        let no_address = TourismRecord {
            content_id: "2".into(),
            title: "이름만".into(),
            ..TourismRecord::default()
        };

        let normalizer = Normalizer::new();
        let records = normalizer.normalize_all(&[valid, no_address]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_id, "1");
    }

    /// Identical records normalize and dedup down to one, with the region,
    /// city and subway flag derived from the address.
    #[test]
    fn test_normalize_then_dedup_end_to_end() {
        let source = TourismRecord {
            content_id: "9".into(),
            title: "Jeju Falls".into(),
            address: "제주도 서귀포시 서귀포역 인근".into(),
            ..TourismRecord::default()
        };

        let normalizer = Normalizer::new();
        let normalized = normalizer.normalize_all(&[source.clone(), source]);
        assert_eq!(normalized.len(), 2);

        let deduped = dedup(normalized);
        assert_eq!(deduped.len(), 1);

        let record = &deduped[0];
        assert_eq!(record.region, "제주도");
        assert_eq!(record.city, "서귀포시");
        assert!(record.transportation.subway);
        assert!(record.transportation.public_transport);
        assert!(record.transportation.bus);
    }

    #[test]
    fn test_normalize_page_record() {
        let source = PageRecord {
            name: "해운대 해변".into(),
            description: "부산의 대표 해변".into(),
            address: "부산광역시 해운대구 해운대해변로".into(),
            source_url: "https://example.com/haeundae".into(),
            ..PageRecord::default()
        };

        let normalizer = Normalizer::new();
        let record = normalizer.normalize_page(&source).unwrap();

        assert_eq!(record.category, Category::Nature);
        assert_eq!(record.region, "부산광역시");
        assert_eq!(record.city, "해운대구");
        assert_eq!(record.source_url, "https://example.com/haeundae");
        assert!(record.content_id.is_empty());
    }
}
