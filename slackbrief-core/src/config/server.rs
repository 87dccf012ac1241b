use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// How to launch the MCP tool server.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawServer {
    #[serde(default)]
    name: Option<String>,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
}

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let command = PathBuf::from(expand(&raw.command));
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| server_name_for(&command));

        Self {
            name,
            command,
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env: raw.env,
            workdir: raw.workdir.map(|d| PathBuf::from(expand(&d))),
        }
    }
}

impl ServerConfig {
    /// Build a launch config from a server path.
    ///
    /// `.py` scripts run under `python`, `.js` scripts under `node`; anything
    /// else is executed directly.
    pub fn from_script_path(path: &str) -> Self {
        let expanded = expand(path.trim());
        let script = PathBuf::from(&expanded);
        let interpreter = match script.extension().and_then(|ext| ext.to_str()) {
            Some("py") => Some("python"),
            Some("js") => Some("node"),
            _ => None,
        };

        let (command, args) = match interpreter {
            Some(interpreter) => (PathBuf::from(interpreter), vec![expanded]),
            None => (script.clone(), Vec::new()),
        };

        Self {
            name: server_name_for(&script),
            command,
            args,
            env: HashMap::new(),
            workdir: None,
        }
    }
}

fn server_name_for(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("mcp-server")
        .to_string()
}
