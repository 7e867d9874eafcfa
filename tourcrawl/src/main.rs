use commands::command_argument_builder;
use tourcrawl::handlers;
use tourcrawl_core::print_banner;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    match chosen_command.subcommand() {
        Some(("collect", primary_command)) => handlers::handle_collect(primary_command).await,
        Some(("taxonomy", primary_command)) => handlers::handle_taxonomy(primary_command).await,
        Some(("areas", primary_command)) => handlers::handle_areas(primary_command).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
