use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn api_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-k --"service-key" <KEY>)
            .required(false)
            .help("data.go.kr service key (falls back to $TOURCRAWL_SERVICE_KEY)"),
    )
    .arg(
        arg!(-o --"output" <DIR>)
            .required(false)
            .help("Directory to write output files into")
            .default_value("crawled_data"),
    )
    .arg(
        arg!(--"delay-ms" <MILLIS>)
            .required(false)
            .help("Fixed delay after every successful API call")
            .value_parser(clap::value_parser!(u64))
            .default_value("150"),
    )
    .arg(
        arg!(--"page-size" <ROWS>)
            .required(false)
            .help("numOfRows used when paginating listing endpoints")
            .value_parser(clap::value_parser!(u32))
            .default_value("100"),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("20"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("tourcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tourcrawl")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(api_args(
            command!("collect")
                .about(
                    "Walk the category taxonomy, fetch every tourism record per category, \
                normalize, deduplicate and write CSV/JSON/TSV output.",
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: csv, json, tsv, all")
                        .value_parser(["csv", "json", "tsv", "all"])
                        .default_value("all"),
                )
                .arg(
                    arg!(-d --"depth" <LEVELS>)
                        .required(false)
                        .help("How deep into the taxonomy to walk (1-3)")
                        .value_parser(clap::value_parser!(u8).range(1..=3))
                        .default_value("3"),
                )
                .arg(
                    arg!(-l --"limit" <COUNT>)
                        .required(false)
                        .help("Only fetch the first COUNT category paths (smoke runs)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        ))
        .subcommand(api_args(
            command!("taxonomy")
                .about("Dump the 3-level category code tree and its index files.")
                .arg(
                    arg!(-s --"scheme" <SCHEME>)
                        .required(false)
                        .help("Which category code system to walk: lcls (hierarchical) or flat (legacy cat1/cat2/cat3)")
                        .value_parser(["lcls", "flat"])
                        .default_value("lcls"),
                ),
        ))
        .subcommand(api_args(command!("areas").about(
            "Fetch the synchronized attraction list per province and write one TSV dump per area.",
        )))
}
