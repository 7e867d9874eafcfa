// Summary report generation over the collected record set

use crate::record::NormalizedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Bucket for records whose address yielded no region token.
const UNSPECIFIED_REGION: &str = "미지정";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total: usize,
    /// Per-category counts, keyed by the Korean category label.
    pub categories: BTreeMap<String, usize>,
    /// Per-region counts, keyed by the region token.
    pub regions: BTreeMap<String, usize>,
    pub generated_at: String,
}

/// Aggregate category and region counts over the deduplicated record set.
pub fn gather_summary(records: &[NormalizedRecord]) -> SummaryReport {
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    let mut regions: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        *categories
            .entry(record.category.as_str().to_string())
            .or_insert(0) += 1;

        let region = if record.region.is_empty() {
            UNSPECIFIED_REGION.to_string()
        } else {
            record.region.clone()
        };
        *regions.entry(region).or_insert(0) += 1;
    }

    SummaryReport {
        total: records.len(),
        categories,
        regions,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}

pub fn generate_text_report(report: &SummaryReport) -> String {
    let mut out = String::new();

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("            TOURCRAWL COLLECTION SUMMARY\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str(&format!("Generated:  {}\n", report.generated_at));
    out.push_str(&format!("Total:      {} records\n\n", report.total));

    out.push_str("By category:\n");
    for (category, count) in &report.categories {
        out.push_str(&format!("  {category}: {count}\n"));
    }
    out.push('\n');

    out.push_str("By region:\n");
    for (region, count) in &report.regions {
        out.push_str(&format!("  {region}: {count}\n"));
    }

    out.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out
}

pub fn generate_json_report(report: &SummaryReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
