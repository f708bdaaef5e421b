//! Line-driven front-end over [`Board`].
//!
//! Each line is one user action. Time only moves on `wait`, so a script
//! produces the same output every run.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, instrument};

use crate::board::{Board, Toggle};
use crate::overlay::{Overlay, OverlaySettings};
use crate::render::Renderer;
use crate::task::TaskId;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "type", "submit", "add", "toggle", "delete", "wait", "list", "overlay", "input", "export",
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Type(String),
    Submit,
    Add(String),
    Toggle(TaskId),
    Delete(TaskId),
    Wait(Duration),
    List,
    Overlay,
    Input,
    Export,
}

impl ScriptCommand {
    /// `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };

        let cmd = match word {
            "type" => ScriptCommand::Type(rest.to_string()),
            "add" => ScriptCommand::Add(rest.to_string()),
            "submit" => no_args(word, rest, ScriptCommand::Submit)?,
            "list" => no_args(word, rest, ScriptCommand::List)?,
            "overlay" => no_args(word, rest, ScriptCommand::Overlay)?,
            "input" => no_args(word, rest, ScriptCommand::Input)?,
            "export" => no_args(word, rest, ScriptCommand::Export)?,
            "toggle" => ScriptCommand::Toggle(parse_id(word, rest)?),
            "delete" => ScriptCommand::Delete(parse_id(word, rest)?),
            "wait" => ScriptCommand::Wait(parse_wait(rest)?),
            other => {
                return Err(anyhow!(
                    "unknown command: {other} (expected one of {})",
                    known_command_names().join(", ")
                ));
            }
        };

        Ok(Some(cmd))
    }
}

fn no_args(word: &str, rest: &str, cmd: ScriptCommand) -> anyhow::Result<ScriptCommand> {
    if rest.trim().is_empty() {
        Ok(cmd)
    } else {
        Err(anyhow!("{word} takes no arguments"))
    }
}

fn parse_id(word: &str, rest: &str) -> anyhow::Result<TaskId> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(anyhow!("{word} needs a task id"));
    }
    rest.parse::<TaskId>()
        .map_err(|e| anyhow!("{word}: invalid task id {rest:?}: {e}"))
}

fn parse_wait(rest: &str) -> anyhow::Result<Duration> {
    let rest = rest.trim();
    let secs: f64 = rest
        .parse()
        .map_err(|e| anyhow!("wait: invalid seconds {rest:?}: {e}"))?;
    if secs < 0.0 {
        return Err(anyhow!("wait: seconds cannot be negative"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| anyhow!("wait: {e}"))
}

/// A board driven by a virtual clock.
#[derive(Debug)]
pub struct ScriptSession {
    board: Board,
    settings: OverlaySettings,
    renderer: Renderer,
    origin: Instant,
    wall_origin: DateTime<Utc>,
    elapsed: Duration,
    /// Always `origin + elapsed`; `wait` only commits a step that fits.
    now: Instant,
}

impl ScriptSession {
    pub fn new(settings: OverlaySettings, renderer: Renderer) -> Self {
        let origin = Instant::now();
        Self {
            board: Board::new(Overlay::from_settings(&settings)),
            settings,
            renderer,
            origin,
            wall_origin: Utc::now(),
            elapsed: Duration::ZERO,
            now: origin,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn wall_now(&self) -> DateTime<Utc> {
        TimeDelta::from_std(self.elapsed)
            .ok()
            .and_then(|offset| self.wall_origin.checked_add_signed(offset))
            .unwrap_or(self.wall_origin)
    }

    #[instrument(skip(self, input, out))]
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        for (line_num, line) in input.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read line {}", line_num + 1))?;
            let Some(cmd) = ScriptCommand::parse(&line)
                .with_context(|| format!("line {}: {}", line_num + 1, line.trim()))?
            else {
                continue;
            };
            debug!(line = line_num + 1, ?cmd, "executing script command");
            self.execute(cmd, out)
                .with_context(|| format!("line {}: {}", line_num + 1, line.trim()))?;
        }
        info!(tasks = self.board.tasks().len(), "script finished");
        Ok(())
    }

    pub fn execute<W: Write>(&mut self, cmd: ScriptCommand, out: &mut W) -> anyhow::Result<()> {
        let now = self.now;
        match cmd {
            ScriptCommand::Type(text) => self.board.set_input(text),
            ScriptCommand::Submit => self.submit(out)?,
            ScriptCommand::Add(text) => {
                self.board.set_input(text);
                self.submit(out)?;
            }
            ScriptCommand::Toggle(id) => match self.board.toggle(id, now) {
                Toggle::NotFound => writeln!(out, "no task {id}")?,
                Toggle::Reopened => writeln!(out, "reopened {id}")?,
                Toggle::Completed(_) => {
                    writeln!(out, "completed {id}")?;
                    writeln!(
                        out,
                        "overlay: {} ({})",
                        self.settings.title, self.settings.attribution
                    )?;
                }
            },
            ScriptCommand::Delete(id) => match self.board.delete(id) {
                Some(task) => writeln!(out, "deleted {id}: {}", task.text)?,
                None => writeln!(out, "no task {id}")?,
            },
            ScriptCommand::Wait(step) => {
                let elapsed = self
                    .elapsed
                    .checked_add(step)
                    .ok_or_else(|| anyhow!("wait: duration out of range"))?;
                let now = self
                    .origin
                    .checked_add(elapsed)
                    .ok_or_else(|| anyhow!("wait: duration out of range"))?;
                self.elapsed = elapsed;
                self.now = now;
                if self.board.tick(now) > 0 && !self.board.overlay().is_visible() {
                    writeln!(out, "overlay hidden")?;
                }
            }
            ScriptCommand::List => self.renderer.write_task_table(out, self.board.tasks())?,
            ScriptCommand::Overlay => {
                let overlay = self.board.overlay();
                match overlay.remaining(now) {
                    Some(left) => writeln!(
                        out,
                        "overlay: visible ({}s left)",
                        left.as_secs_f64().ceil() as u64
                    )?,
                    None if overlay.is_visible() => writeln!(out, "overlay: visible")?,
                    None => writeln!(out, "overlay: hidden")?,
                }
            }
            ScriptCommand::Input => writeln!(out, "input: {:?}", self.board.input())?,
            ScriptCommand::Export => {
                let json = serde_json::to_string_pretty(self.board.tasks())
                    .context("failed to serialize tasks")?;
                writeln!(out, "{json}")?;
            }
        }
        Ok(())
    }

    fn submit<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let wall_now = self.wall_now();
        match self.board.submit(wall_now) {
            Ok(Some(id)) => {
                let text = self.board.get(id).map(|t| t.text.as_str()).unwrap_or_default();
                writeln!(out, "added {id}: {text}")?;
            }
            Ok(None) => writeln!(out, "nothing to add")?,
            Err(err) => writeln!(out, "alert: {err}")?,
        }
        Ok(())
    }
}
