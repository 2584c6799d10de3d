use cai::cli::{init_tracing, load_config_or_exit, report_error, split_quiet_flag};
use cai::command_router::CommandRouter;
use cai::llm_client::LlmClient;
use cai::{prompts, system_info};
use clap::{Arg, ArgAction, Command};
use tracing::info;

#[tokio::main]
async fn main() {
    init_tracing();

    let matches = Command::new("cai")
        .about("Turns a natural-language request into a shell script and runs it")
        .disable_help_flag(true)
        .arg(Arg::new("quiet")
            .short('q')
            .long("quiet")
            .help("Run the generated script without preview or confirmation")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("request")
            .help("What the script should do")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .get_matches();

    let config = load_config_or_exit();

    let words: Vec<String> = matches
        .get_many::<String>("request")
        .unwrap_or_default()
        .cloned()
        .collect();
    let (quiet_in_request, request) = split_quiet_flag(&words);
    let quiet = matches.get_flag("quiet") || quiet_in_request;

    info!("Request: {:?} (quiet: {})", request, quiet);

    let mut client = LlmClient::from_config(&config);
    client.context(prompts::script_instructions(&system_info::os_description()));

    let mut router = CommandRouter::new(client);
    let code = match router.process_script_request(&request, quiet).await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            1
        }
    };

    std::process::exit(code);
}
