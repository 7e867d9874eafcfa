use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tourcrawl_collector::config::SERVICE_KEY_ENV;
use tourcrawl_collector::taxonomy;
use tourcrawl_collector::tourism;
use tourcrawl_collector::{ApiClient, ApiConfig};
use tourcrawl_core::export::{self, ExportFormat};
use tourcrawl_core::pipeline::{CollectOptions, CollectProgressCallback, execute_collect};
use tourcrawl_core::report;

// Helper functions for the collect/taxonomy/areas handlers

/// Resolve the API service key: explicit flag first, then the environment.
pub fn resolve_service_key(flag: Option<&str>) -> Result<String, String> {
    if let Some(key) = flag
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }
    match std::env::var(SERVICE_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(format!(
            "No service key: pass --service-key or set ${SERVICE_KEY_ENV}"
        )),
    }
}

/// Expand `~` in a user-supplied output directory.
pub fn expand_output_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Timestamp slug used in output file names, e.g. `20260807_153012`.
pub fn timestamp_slug() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn build_config(args: &ArgMatches) -> Result<ApiConfig, String> {
    let key = resolve_service_key(args.get_one::<String>("service-key").map(String::as_str))?;
    Ok(ApiConfig::new(key)
        .with_delay_ms(*args.get_one::<u64>("delay-ms").unwrap_or(&150))
        .with_page_size(*args.get_one::<u32>("page-size").unwrap_or(&100))
        .with_timeout(*args.get_one::<u64>("timeout").unwrap_or(&20)))
}

/// Creating the output directory is the one fatal condition of a run.
fn ensure_output_dir(dir: &Path) -> PathBuf {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!(
            "{} Cannot create output directory {}: {e}",
            "✗".red().bold(),
            dir.display()
        );
        std::process::exit(1);
    }
    dir.to_path_buf()
}

fn fatal_write(path: &Path, e: std::io::Error) -> ! {
    eprintln!(
        "{} Failed to write {}: {e}",
        "✗".red().bold(),
        path.display()
    );
    std::process::exit(1);
}

pub async fn handle_collect(args: &ArgMatches) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "✗".red().bold());
            std::process::exit(1);
        }
    };

    let format = args
        .get_one::<String>("format")
        .and_then(|s| ExportFormat::from_str(s))
        .unwrap_or(ExportFormat::All);
    let depth = *args.get_one::<u8>("depth").unwrap_or(&3);
    let limit = args.get_one::<usize>("limit").copied();
    let output_dir = ensure_output_dir(&expand_output_dir(
        args.get_one::<String>("output").map_or("crawled_data", String::as_str),
    ));

    println!("\n🧭 Collecting tourism records");
    println!("Output: {}", output_dir.display());
    println!("Depth: {depth}");
    if let Some(limit) = limit {
        println!("Limit: first {limit} category paths");
    }
    println!();

    let client = ApiClient::new(config);
    let options = CollectOptions {
        depth,
        limit,
        show_progress: true,
    };
    let progress_callback: CollectProgressCallback = Arc::new(|msg: String| {
        tracing::info!("{msg}");
    });

    let outcome = execute_collect(&client, options, Some(progress_callback)).await;

    println!("\n{} Collect complete!", "✓".green().bold());
    println!(
        "  {} category paths with data, {} unique records\n",
        outcome.by_category.len(),
        outcome.records.len()
    );

    let slug = timestamp_slug();

    if format.includes(ExportFormat::Csv) {
        let path = output_dir.join(format!("travel_data_{slug}.csv"));
        if let Err(e) = export::write_records_csv(&outcome.records, &path) {
            fatal_write(&path, e);
        }
        println!("  {} {}", "✓".green(), path.display());
    }

    if format.includes(ExportFormat::Json) {
        let path = output_dir.join(format!("travel_data_{slug}.json"));
        if let Err(e) = export::write_records_json(&outcome.records, &path) {
            fatal_write(&path, e);
        }
        println!("  {} {}", "✓".green(), path.display());
    }

    if format.includes(ExportFormat::Tsv) {
        let dump_dir = output_dir.join("categories");
        for (display_name, records) in &outcome.by_category {
            if let Err(e) = export::write_category_dump(&dump_dir, display_name, records) {
                fatal_write(&dump_dir, e);
            }
        }
        if let Err(e) = export::write_taxonomy_index(&dump_dir, &outcome.tree) {
            fatal_write(&dump_dir, e);
        }
        println!(
            "  {} {} ({} category dumps)",
            "✓".green(),
            dump_dir.display(),
            outcome.by_category.len()
        );
    }

    // Summary report: printed, and saved under reports/.
    let summary = report::gather_summary(&outcome.records);
    print!("\n{}", report::generate_text_report(&summary));

    let reports_dir = ensure_output_dir(&output_dir.join("reports"));
    let report_path = reports_dir.join(format!("crawling_report_{slug}.json"));
    match report::generate_json_report(&summary) {
        Ok(content) => {
            if let Err(e) = report::save_report(&content, &report_path) {
                fatal_write(&report_path, e);
            }
            println!("\n{} Report: {}", "✓".green(), report_path.display());
        }
        Err(e) => eprintln!("{} Could not render report: {e}", "✗".red()),
    }
}

pub async fn handle_taxonomy(args: &ArgMatches) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "✗".red().bold());
            std::process::exit(1);
        }
    };

    let scheme = args
        .get_one::<String>("scheme")
        .map_or("lcls", String::as_str)
        .to_string();
    let output_dir = ensure_output_dir(&expand_output_dir(
        args.get_one::<String>("output").map_or("crawled_data", String::as_str),
    ));

    let client = ApiClient::new(config);

    match scheme.as_str() {
        "flat" => {
            println!("\n🧭 Walking flat category codes (categoryCode2)\n");
            let rows = taxonomy::walk_flat_categories(&client).await;
            if rows.is_empty() {
                eprintln!("{} No category codes returned", "✗".red());
                std::process::exit(1);
            }
            match export::write_flat_categories(&output_dir, &rows) {
                Ok(path) => {
                    println!(
                        "{} {} rows written to {}",
                        "✓".green().bold(),
                        rows.len(),
                        path.display()
                    );
                }
                Err(e) => fatal_write(&output_dir, e),
            }
        }
        _ => {
            println!("\n🧭 Walking classification taxonomy (lclsSystmCode2)\n");
            let tree = taxonomy::walk_taxonomy(&client).await;
            if tree.is_empty() {
                eprintln!("{} No taxonomy codes returned", "✗".red());
                std::process::exit(1);
            }
            if let Err(e) = export::write_taxonomy_index(&output_dir, &tree) {
                fatal_write(&output_dir, e);
            }
            println!(
                "{} {} nodes ({} top-level) written to {}",
                "✓".green().bold(),
                tree.node_count(),
                tree.level1.len(),
                output_dir.display()
            );
        }
    }
}

pub async fn handle_areas(args: &ArgMatches) {
    let config = match build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "✗".red().bold());
            std::process::exit(1);
        }
    };

    let output_dir = ensure_output_dir(
        &expand_output_dir(
            args.get_one::<String>("output").map_or("crawled_data", String::as_str),
        )
        .join("areas"),
    );

    let client = ApiClient::new(config);

    println!("\n🧭 Fetching per-province attraction lists\n");
    let areas = tourism::fetch_area_codes(&client).await;
    if areas.is_empty() {
        eprintln!("{} No area codes returned", "✗".red());
        std::process::exit(1);
    }
    println!("{} provinces to process", areas.len());

    let mut counts: Vec<(String, usize)> = Vec::new();
    for area in &areas {
        println!("  [{}] {} ...", area.code, area.name);
        let records = tourism::fetch_sync_for_area(&client, &area.code).await;
        match export::write_category_dump(&output_dir, &area.name, &records) {
            Ok(_) => counts.push((area.name.clone(), records.len())),
            Err(e) => fatal_write(&output_dir, e),
        }
    }

    println!("\n{} All provinces written:", "✓".green().bold());
    for (name, count) in &counts {
        println!("  {name}: {count} records");
    }
}
