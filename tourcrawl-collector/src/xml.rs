//! XML response parsing for KorService2 endpoints.
//!
//! Every listing endpoint answers with the same envelope: a `<body>` holding
//! repeated `<item>` elements whose children are flat `tag → text` pairs.
//! The parser collects each `<item>` into an [`Item`] field map; an empty
//! item list is how the API signals the end of a paginated result set.

use crate::error::{CollectError, Result};
use std::collections::HashMap;

/// One `<item>` element, as a flat map of child-tag name to text content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    fields: HashMap<String, String>,
}

impl Item {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text of a child tag, or `""` when the tag is absent or empty.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Parse all `<item>` elements out of a response body.
///
/// Returns `CollectError::Parse` when the body is not well-formed XML.
/// A well-formed document without any `<item>` yields an empty vec.
pub fn parse_items(xml: &str) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut in_item = false;
    let mut current = Item::default();
    let mut current_tag = String::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    in_item = true;
                    current = Item::default();
                }
                current_tag = name;
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_item && current_tag != "item" {
                    let text = e
                        .unescape()
                        .map_err(|err| CollectError::Parse(format!("bad text content: {err}")))?
                        .trim()
                        .to_string();
                    if !text.is_empty() {
                        current.fields.insert(current_tag.clone(), text);
                    }
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" && in_item {
                    items.push(std::mem::take(&mut current));
                    in_item = false;
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(CollectError::Parse(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
    <response>
      <header><resultCode>0000</resultCode><resultMsg>OK</resultMsg></header>
      <body>
        <items>
          <item>
            <contentid>126508</contentid>
            <title>경복궁</title>
            <addr1>서울특별시 종로구 사직로 161</addr1>
            <areacode>1</areacode>
            <tel/>
          </item>
          <item>
            <contentid>264337</contentid>
            <title>정방폭포</title>
            <addr1>제주특별자치도 서귀포시 칠십리로214번길</addr1>
          </item>
        </items>
        <numOfRows>100</numOfRows>
        <pageNo>1</pageNo>
        <totalCount>2</totalCount>
      </body>
    </response>"#;

    #[test]
    fn test_parse_items() {
        let items = parse_items(LISTING_PAGE).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text("contentid"), Some("126508"));
        assert_eq!(items[0].text("title"), Some("경복궁"));
        assert_eq!(items[1].text_or_empty("addr1"), "제주특별자치도 서귀포시 칠십리로214번길");
        // Empty <tel/> carries no text at all.
        assert_eq!(items[0].text("tel"), None);
        assert_eq!(items[0].text_or_empty("tel"), "");
    }

    #[test]
    fn test_parse_no_items_is_empty_not_error() {
        let xml = r#"<response><body><items></items><totalCount>0</totalCount></body></response>"#;
        let items = parse_items(xml).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_malformed_is_error() {
        let result = parse_items("<response><body><item><code>A01</item></response>");
        assert!(matches!(result, Err(CollectError::Parse(_))));
    }

    #[test]
    fn test_parse_html_error_page_is_error() {
        // data.go.kr serves an HTML error page on some failures; it is not
        // well-formed XML and must surface as a parse error.
        let result = parse_items("<html><body><h1>OpenAPI_ServiceResponse</h1><br></body></html>");
        assert!(matches!(result, Err(CollectError::Parse(_))));
    }

    #[test]
    fn test_fields_outside_items_ignored() {
        let xml = r#"<response><body>
            <items><item><code>A01</code><name>자연</name><rnum>1</rnum></item></items>
            <numOfRows>100</numOfRows><pageNo>1</pageNo>
        </body></response>"#;
        let items = parse_items(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text("code"), Some("A01"));
        assert_eq!(items[0].text("name"), Some("자연"));
        assert_eq!(items[0].text("numOfRows"), None);
    }
}
