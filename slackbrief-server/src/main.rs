use clap::Parser;
use slackbrief_server::{McpServer, ServerSettings, ToolRegistry, init_tracing};
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    name = "slackbrief-server",
    version,
    about = "MCP stdio server exposing Slack and US weather tools"
)]
struct Args {
    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_BASE")]
    slack_api_base: Option<String>,
    /// National Weather Service API base URL
    #[arg(long, env = "NWS_API_BASE")]
    nws_api_base: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing();
    debug!(?args, "CLI arguments parsed");

    let settings = match ServerSettings::from_env() {
        Ok(settings) => settings
            .with_slack_api_base(args.slack_api_base)
            .with_nws_api_base(args.nws_api_base),
        Err(err) => {
            error!(error = %err, "Cannot start server");
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        slack_api = %settings.slack_api_base,
        nws_api = %settings.nws_api_base,
        "Starting slackbrief-server"
    );

    let server = McpServer::new(ToolRegistry::from_settings(&settings));
    match server.serve(tokio::io::stdin(), tokio::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Server stopped on I/O error");
            ExitCode::FAILURE
        }
    }
}
