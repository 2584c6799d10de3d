use cai::cli::{init_tracing, load_config_or_exit, report_error};
use cai::command_router::CommandRouter;
use cai::llm_client::LlmClient;
use cai::prompts;
use cai::scaffold::OUTPUT_ROOT;
use clap::{Arg, Command};
use colored::Colorize;
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() {
    init_tracing();

    let matches = Command::new("cai-api")
        .about("Generates the source files of a REST API from a text specification")
        .long_about(format!(
            "Sends the specification to the configured model and writes the returned files below ./{}",
            OUTPUT_ROOT
        ))
        .disable_help_flag(true)
        .arg(Arg::new("specification")
            .help("The API specification")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .get_matches();

    let config = load_config_or_exit();

    let specification = matches
        .get_many::<String>("specification")
        .unwrap_or_default()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    info!("Specification: {:?}", specification);

    let mut client = LlmClient::from_config(&config);
    client.context(prompts::api_scaffold_instructions());

    let mut router = CommandRouter::new(client);
    let report = match router
        .process_scaffold_request(&specification, Path::new(OUTPUT_ROOT))
        .await
    {
        Ok(report) => report,
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    };

    for path in &report.written {
        println!("{} {}", "✓".green().bold(), path.display());
    }
    for (path, err) in &report.failed {
        eprintln!("{} {}: {:#}", "✗".red().bold(), path.display(), err);
    }

    if report.written.is_empty() && report.failed.is_empty() {
        eprintln!("{}", "The response contained no files.".yellow());
    }

    std::process::exit(if report.is_success() { 0 } else { 1 });
}
