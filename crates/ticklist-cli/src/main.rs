use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader};

use anyhow::Context;
use clap::Parser;
use ticklist_core::cli::{self, Command, GlobalCli, RcOverride};
use ticklist_core::config::{self, Config};
use ticklist_core::render::Renderer;
use ticklist_core::script::ScriptSession;
use tracing::{debug, info};

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let cli = GlobalCli::parse_from(pre.cleaned_args);
    let command = cli.command.clone().unwrap_or(Command::Tui);

    let mut cfg = Config::load(cli.ticklistrc.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .iter()
            .cloned()
            .chain(cli.rc_overrides.iter().cloned().map(RcOverride::into_pair)),
    );

    // The terminal UI cannot share stderr with the log, so it gets a file.
    let _guard = match &command {
        Command::Tui => {
            let log_file = config::resolve_log_file(&cfg, cli.log_file.as_deref())?;
            Some(cli::init_file_tracing(cli.verbose, cli.quiet, &log_file)?)
        }
        Command::Script { .. } => {
            cli::init_tracing(cli.verbose, cli.quiet)?;
            None
        }
    };

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        ?command,
        "starting ticklist"
    );
    debug!(
        rc_overrides = ?pre.rc_overrides,
        loaded_files = ?cfg.loaded_files,
        "configuration loaded"
    );

    let settings = cfg
        .overlay_settings()
        .context("invalid overlay configuration")?;

    match command {
        Command::Tui => ticklist_tui::run_tui(settings)?,
        Command::Script { file } => {
            let renderer = Renderer::new(&cfg)?;
            let mut session = ScriptSession::new(settings, renderer);
            let mut out = io::stdout().lock();
            match file {
                Some(path) => {
                    let reader = File::open(&path)
                        .with_context(|| format!("failed to open script {}", path.display()))?;
                    session.run(BufReader::new(reader), &mut out)?;
                }
                None => session.run(io::stdin().lock(), &mut out)?,
            }
        }
    }

    info!("done");
    Ok(())
}
