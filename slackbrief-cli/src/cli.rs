use clap::Parser;
use slackbrief_core::config::{AppConfig, ConfigError, ServerConfig};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(
    name = "slackbrief",
    version,
    about = "Summarize a Slack channel on a schedule using an MCP tool server"
)]
pub struct Cli {
    /// Minutes to wait between runs (integer or decimal, 0 or more)
    #[arg(value_name = "DELAY_MINUTES", value_parser = parse_delay)]
    pub delay: f64,
    /// Client configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,
    /// Channel to summarize
    #[arg(long, env = "SLACKBRIEF_CHANNEL")]
    pub channel: Option<String>,
    /// Tool server executable or script (.py runs under python, .js under node)
    #[arg(long, value_name = "PATH", env = "SLACKBRIEF_SERVER")]
    pub server: Option<String>,
    /// Run once and exit
    #[arg(long, conflicts_with = "runs")]
    pub once: bool,
    /// Stop after this many runs
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub runs: Option<u64>,
}

impl Cli {
    /// `None` means run until interrupted.
    pub fn max_runs(&self) -> Option<usize> {
        if self.once {
            return Some(1);
        }
        self.runs.map(|runs| usize::try_from(runs).unwrap_or(usize::MAX))
    }

    /// Load the config file, apply command-line overrides, and check that a
    /// channel and a server are known.
    pub fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig::load(self.config.as_deref().map(Path::new))?
            .with_channel(self.channel.clone())
            .with_server(
                self.server
                    .as_deref()
                    .filter(|path| !path.trim().is_empty())
                    .map(ServerConfig::from_script_path),
            );
        config.require_channel()?;
        config.require_server()?;
        Ok(config)
    }
}

fn parse_delay(value: &str) -> Result<f64, String> {
    let minutes: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of minutes"))?;
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(format!("'{value}' must be a finite number of minutes, 0 or more"));
    }
    Ok(minutes)
}
