use std::io::{self, IsTerminal, Write};

use chrono::Local;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::Task;

const HEADERS: [&str; 4] = ["ID", "Done", "Added", "Task"];
const DIM_STRIKE: &str = "2;9";
const YELLOW: &str = "33";
const GREEN: &str = "32";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self::with_color(
            cfg.color()? && io::stdout().is_terminal(),
        ))
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    #[tracing::instrument(skip(self, out, tasks), fields(count = tasks.len()))]
    pub fn write_task_table<W: Write>(&self, out: &mut W, tasks: &[Task]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "no tasks")?;
            return Ok(());
        }

        let rows: Vec<[String; 4]> = tasks
            .iter()
            .map(|task| {
                let done = if task.completed {
                    self.paint("✓", GREEN)
                } else {
                    String::new()
                };
                let text = if task.completed {
                    self.paint(&task.text, DIM_STRIKE)
                } else {
                    task.text.clone()
                };
                [
                    self.paint(&task.id.to_string(), YELLOW),
                    done,
                    task.entry
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                    text,
                ]
            })
            .collect();

        write_table(out, &HEADERS, &rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Pads every column but the last to its widest visible cell. Task text
/// goes last so it is never followed by trailing blanks.
fn write_table<W: Write, const N: usize>(
    writer: &mut W,
    headers: &[&str; N],
    rows: &[[String; N]],
) -> anyhow::Result<()> {
    let mut widths = headers.map(|h| UnicodeWidthStr::width(h));
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let rule = widths.map(|w| "-".repeat(w));
    write_row(writer, &widths, headers.iter().copied())?;
    write_row(writer, &widths, rule.iter().map(String::as_str))?;
    for row in rows {
        write_row(writer, &widths, row.iter().map(String::as_str))?;
    }
    Ok(())
}

fn write_row<'a, W: Write>(
    writer: &mut W,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> anyhow::Result<()> {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.zip(widths).enumerate() {
        line.push_str(cell);
        if idx + 1 < widths.len() {
            let pad = width.saturating_sub(visible_width(cell)) + 1;
            line.extend(std::iter::repeat_n(' ', pad));
        }
    }
    writeln!(writer, "{line}")?;
    Ok(())
}

/// Display width with SGR escape sequences (`ESC ... m`) skipped.
fn visible_width(cell: &str) -> usize {
    let mut width = 0;
    let mut rest = cell;
    while let Some(start) = rest.find('\x1b') {
        width += UnicodeWidthStr::width(&rest[..start]);
        rest = match rest[start..].find('m') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        };
    }
    width + UnicodeWidthStr::width(rest)
}
