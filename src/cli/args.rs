use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::config::{ClientConfig, ENV_STATE_DIR};

pub const USAGE: &str = "Usage:
  clinica [--api <url>] [--state-dir <dir>] [--ephemeral] <command> [args...]
  clinica [--api <url>] [--state-dir <dir>] [--ephemeral] --repl

Flags:
  --api <url>          Booking API base URL (env CLINICA_API_URL, default http://192.168.1.10:8000)
  --state-dir <dir>    Directory holding session.json and client.json (env CLINICA_STATE_DIR, default .clinica)
  --ephemeral          Keep the session in memory only
  --repl               Read commands from stdin
  -h, --help           Show this help

Commands:
  login <email> <password>
  logout
  whoami
  dashboard
  appointments confirm|cancel|delete <id>
  appointments edit <id> --date <rfc3339> [--status <pending|confirmed|canceled>]
  book <treatment-id> <rfc3339>
  groups
  treatments [filter]
  treatment-edit <id> <name> <description> <price> <duration-minutes>
  equipment [filter]
  equipment-edit <id> <name> <description> <available|maintenance>
  feedback [--read]
  feedback-toggle <id>
  feedback-delete <id>
  profile-edit <name> <email> [phone] [address]
  help
  quit | exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl Display for UsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.0) }
}

impl std::error::Error for UsageError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub api: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub ephemeral: bool,
    pub repl: bool,
    pub help: bool,
    /// Command words after the flags.
    pub command: Vec<String>,
}

impl Invocation {
    /// Environment and config file first, then the flags on top.
    pub fn resolve_config<F: Fn(&str) -> Option<String>>(&self, lookup: F) -> ClientConfig {
        let state_dir = self.state_dir.as_ref().map(|p| p.to_string_lossy().to_string());
        let mut cfg = ClientConfig::from_lookup(|k| {
            if k == ENV_STATE_DIR && state_dir.is_some() { state_dir.clone() } else { lookup(k) }
        });
        if let Some(api) = &self.api {
            cfg.base_url = api.clone();
        }
        cfg
    }
}

/// Parse leading flags; the first non-flag word starts the command.
pub fn parse_args(args: &[String]) -> Result<Invocation, UsageError> {
    let mut inv = Invocation::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                let v = args.get(i + 1).ok_or_else(|| UsageError("--api requires a URL".into()))?;
                inv.api = Some(v.clone());
                i += 2;
            }
            "--state-dir" => {
                let v = args.get(i + 1).ok_or_else(|| UsageError("--state-dir requires a directory".into()))?;
                inv.state_dir = Some(PathBuf::from(v));
                i += 2;
            }
            "--ephemeral" => { inv.ephemeral = true; i += 1; }
            "--repl" => { inv.repl = true; i += 1; }
            "-h" | "--help" => { inv.help = true; i += 1; }
            flag if flag.starts_with("--") && inv.command.is_empty() => {
                return Err(UsageError(format!("unrecognized flag: {}", flag)));
            }
            _ => {
                inv.command = args[i..].to_vec();
                break;
            }
        }
    }
    if inv.repl && !inv.command.is_empty() {
        return Err(UsageError("--repl takes no command".into()));
    }
    if !inv.repl && !inv.help && inv.command.is_empty() {
        return Err(UsageError("no command given".into()));
    }
    Ok(inv)
}
