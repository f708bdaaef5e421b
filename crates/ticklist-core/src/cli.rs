use std::ffi::OsString;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

/// `--rc KEY=VALUE`; an `rc.` prefix on the key is allowed and dropped
/// later by `Config::apply_overrides`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcOverride {
    pub key: String,
    pub value: String,
}

impl RcOverride {
    pub fn into_pair(self) -> (String, String) {
        (self.key, self.value)
    }
}

impl std::str::FromStr for RcOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(anyhow!("expected KEY=VALUE, got: {s}")),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ticklist",
    version,
    about = "ticklist: a terminal to-do list with a completion overlay",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<RcOverride>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<RcOverride>,

    #[arg(long = "ticklistrc", global = true)]
    pub ticklistrc: Option<PathBuf>,

    /// Log destination for the terminal UI.
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive terminal UI (default).
    Tui,
    /// Replay line-based commands from FILE, or stdin when omitted.
    Script { file: Option<PathBuf> },
}

fn default_level(verbose: u8, quiet: u8) -> &'static str {
    if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    }
}

fn env_filter(verbose: u8, quiet: u8) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))
}

/// Logs to stderr; used by the scripted front-end.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet)?)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Logs to `path` through a non-blocking appender. The terminal UI owns
/// stdout/stderr, so nothing may be written there while it runs. Keep the
/// returned guard alive until shutdown or buffered lines are lost.
pub fn init_file_tracing(verbose: u8, quiet: u8, path: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("log file path has no file name: {}", path.display()))?;

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet)?)
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(guard)
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of the
/// argument list before clap sees it. The binary name is never treated as an
/// override.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut pre = PreprocessedArgs {
        cleaned_args: Vec::with_capacity(raw.len()),
        rc_overrides: Vec::new(),
    };

    for (idx, arg) in raw.iter().enumerate() {
        match (idx, positional_override(arg)) {
            (1.., Some((key, value))) => {
                debug!(key = %key, value = %value, "captured positional rc override");
                pre.rc_overrides.push((key, value));
            }
            _ => pre.cleaned_args.push(arg.clone()),
        }
    }

    Ok(pre)
}

fn positional_override(arg: &OsString) -> Option<(String, String)> {
    let text = arg.to_str()?;
    let rest = text.strip_prefix("rc.")?;
    let (key, value) = rest.split_once('=').or_else(|| rest.split_once(':'))?;
    Some((format!("rc.{key}"), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&os(&[
            "ticklist",
            "rc.overlay.delay=3",
            "script",
            "rc.color:off",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, os(&["ticklist", "script"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.overlay.delay".to_string(), "3".to_string()),
                ("rc.color".to_string(), "off".to_string()),
            ]
        );
    }

    #[test]
    fn parses_script_subcommand_with_globals() {
        let cli = GlobalCli::parse_from(os(&[
            "ticklist",
            "script",
            "demo.txt",
            "-vv",
            "--rc",
            "overlay.rearm=stack",
        ]));
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command,
            Some(Command::Script {
                file: Some(PathBuf::from("demo.txt"))
            })
        );
        assert_eq!(cli.rc_overrides[0].key, "overlay.rearm");
        assert_eq!(cli.rc_overrides[0].value, "stack");
    }

    #[test]
    fn no_subcommand_means_default() {
        let cli = GlobalCli::parse_from(os(&["ticklist"]));
        assert_eq!(cli.command, None);
        assert_eq!(default_level(cli.verbose, cli.quiet), "warn");
    }

    #[test]
    fn bare_rc_word_and_binary_name_are_kept() {
        let pre = preprocess_args(&os(&["rc.x=1", "rc.color", "tui"])).expect("preprocess");
        assert_eq!(pre.cleaned_args, os(&["rc.x=1", "rc.color", "tui"]));
        assert!(pre.rc_overrides.is_empty());
    }

    #[test]
    fn rc_override_requires_key_and_equals() {
        assert!("color".parse::<RcOverride>().is_err());
        assert!(" =on".parse::<RcOverride>().is_err());
        assert_eq!(
            "rc.color = off".parse::<RcOverride>().expect("parse").into_pair(),
            ("rc.color".to_string(), "off".to_string())
        );
    }
}
