pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod report;

pub use export::ExportFormat;
pub use normalize::{AddressParser, CategoryClassifier, Normalizer, TransportationChecker, dedup};
pub use pipeline::{CollectOptions, CollectOutcome, execute_collect};
pub use record::{Category, NormalizedRecord, Transportation};
pub use report::{SummaryReport, gather_summary};

pub fn print_banner() {
    println!(
        r#"
 _                                          _
| |_ ___  _   _ _ __ ___ _ __ __ ___      _| |
| __/ _ \| | | | '__/ __| '__/ _` \ \ /\ / / |
| || (_) | |_| | | | (__| | | (_| |\ V  V /| |
 \__\___/ \__,_|_|  \___|_|  \__,_| \_/\_/ |_|

 Korean tourism metadata collector v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
