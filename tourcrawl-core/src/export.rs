//! Flat-file persistence: CSV, JSON and per-category TSV dumps.
//!
//! The only fatal condition in the whole pipeline lives here: failing to
//! create the output directory or open an output file aborts the run.

use crate::record::NormalizedRecord;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tourcrawl_collector::taxonomy::{FlatCategory, TaxonomyTree};
use tourcrawl_collector::tourism::TourismRecord;
use tracing::info;

/// Byte-order mark written at the head of CSV exports so spreadsheet
/// applications pick up UTF-8.
pub const UTF8_BOM: &str = "\u{feff}";

/// Header of the per-category TSV dumps. Field order is part of the format.
pub const TSV_HEADER: &str = "contentid\ttitle\tareacode\taddr\tcreationtime\tmodifiedtime\tsigungucode\tcat1\tcat2\tcat3\tmapx\tmapy\ttel\tzipcode";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportFormat {
    Csv,
    Json,
    Tsv,
    All,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            "tsv" | "txt" => Some(ExportFormat::Tsv),
            "all" => Some(ExportFormat::All),
            _ => None,
        }
    }

    pub fn includes(&self, other: ExportFormat) -> bool {
        *self == ExportFormat::All || *self == other
    }
}

/// Strip characters that are invalid in file names on common filesystems.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

const CSV_COLUMNS: [&str; 22] = [
    "content_id",
    "name",
    "category",
    "address",
    "region",
    "city",
    "latitude",
    "longitude",
    "description",
    "contact",
    "website",
    "zipcode",
    "area_code",
    "sigungu_code",
    "created_at",
    "modified_at",
    "source_url",
    "crawled_at",
    "transport_public_transport",
    "transport_subway",
    "transport_bus",
    "transport_parking",
];

/// Render the normalized record set as CSV, transportation flags flattened
/// into `transport_*` columns.
pub fn render_csv(records: &[NormalizedRecord]) -> String {
    let mut out = String::from(UTF8_BOM);
    out.push_str(&CSV_COLUMNS.join(","));
    out.push('\n');

    for r in records {
        let row = [
            r.content_id.as_str(),
            r.name.as_str(),
            r.category.as_str(),
            r.address.as_str(),
            r.region.as_str(),
            r.city.as_str(),
            r.latitude.as_str(),
            r.longitude.as_str(),
            r.description.as_str(),
            r.contact.as_str(),
            r.website.as_str(),
            r.zipcode.as_str(),
            r.area_code.as_str(),
            r.sigungu_code.as_str(),
            r.created_at.as_str(),
            r.modified_at.as_str(),
            r.source_url.as_str(),
            r.crawled_at.as_str(),
            bool_str(r.transportation.public_transport),
            bool_str(r.transportation.subway),
            bool_str(r.transportation.bus),
            bool_str(r.transportation.parking),
        ];
        let escaped: Vec<String> = row.iter().map(|f| csv_escape(f)).collect();
        out.push_str(&escaped.join(","));
        out.push('\n');
    }

    out
}

/// Render the normalized record set as human-readable JSON. `serde_json`
/// leaves non-ASCII characters unescaped, which is what we want for Korean
/// text.
pub fn render_json(records: &[NormalizedRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

pub fn save_output(content: &str, path: &Path) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn write_records_csv(records: &[NormalizedRecord], path: &Path) -> io::Result<()> {
    save_output(&render_csv(records), path)?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn write_records_json(records: &[NormalizedRecord], path: &Path) -> io::Result<()> {
    let content = render_json(records).map_err(io::Error::other)?;
    save_output(&content, path)?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn tsv_row(r: &TourismRecord) -> String {
    [
        r.content_id.as_str(),
        r.title.as_str(),
        r.area_code.as_str(),
        r.address.as_str(),
        r.created_at.as_str(),
        r.modified_at.as_str(),
        r.sigungu_code.as_str(),
        r.cat1.as_str(),
        r.cat2.as_str(),
        r.cat3.as_str(),
        r.mapx.as_str(),
        r.mapy.as_str(),
        r.tel.as_str(),
        r.zipcode.as_str(),
    ]
    .join("\t")
}

/// Write one per-category raw dump: `<sanitized display name>.txt`, tab
/// separated, header first. Returns the path written.
pub fn write_category_dump(
    dir: &Path,
    display_name: &str,
    records: &[TourismRecord],
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.txt", sanitize_filename(display_name)));

    let mut out = String::from(TSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&tsv_row(record));
        out.push('\n');
    }

    save_output(&out, &path)?;
    Ok(path)
}

/// Write the classification level list plus the 1→2 and 1→2→3 index files.
pub fn write_taxonomy_index(dir: &Path, tree: &TaxonomyTree) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut depth1 = String::from("code,name\n");
    for node in &tree.level1 {
        depth1.push_str(&format!(
            "{},{}\n",
            csv_escape(&node.code),
            csv_escape(&node.name)
        ));
    }
    save_output(&depth1, &dir.join("classification_1depth.csv"))?;

    let mut index2 = String::from("l1_code,l1_name,l2_code,l2_name\n");
    let mut index3 = String::from("l1_code,l1_name,l2_code,l2_name,l3_code,l3_name\n");
    for l1 in &tree.level1 {
        for l2 in tree.children_of_l1(&l1.code) {
            index2.push_str(&format!(
                "{},{},{},{}\n",
                csv_escape(&l1.code),
                csv_escape(&l1.name),
                csv_escape(&l2.code),
                csv_escape(&l2.name)
            ));
            for l3 in tree.children_of_l2(&l1.code, &l2.code) {
                index3.push_str(&format!(
                    "{},{},{},{},{},{}\n",
                    csv_escape(&l1.code),
                    csv_escape(&l1.name),
                    csv_escape(&l2.code),
                    csv_escape(&l2.name),
                    csv_escape(&l3.code),
                    csv_escape(&l3.name)
                ));
            }
        }
    }
    save_output(&index2, &dir.join("index_2depth.csv"))?;
    save_output(&index3, &dir.join("index_3depth.csv"))?;

    info!("wrote taxonomy index files to {}", dir.display());
    Ok(())
}

/// Write the flat `cat1/cat2/cat3` code list as one TSV file.
pub fn write_flat_categories(dir: &Path, rows: &[FlatCategory]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("category_codes.txt");

    let mut out = String::from("cat1\tcat1_name\tcat2\tcat2_name\tcat3\tcat3_name\n");
    for row in rows {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            row.cat1, row.cat1_name, row.cat2, row.cat2_name, row.cat3, row.cat3_name
        ));
    }

    save_output(&out, &path)?;
    Ok(path)
}
