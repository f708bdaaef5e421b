//! Terminal setup, the event loop, and teardown.
//!
//! The loop polls for input with a short timeout so overlay hides fire on
//! time even when no key is pressed.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ticklist_core::OverlaySettings;
use tracing::{info, instrument};

use crate::app::App;
use crate::view;

const TICK: Duration = Duration::from_millis(100);

#[instrument(skip_all, fields(delay_ms = settings.delay.as_millis() as u64, policy = settings.policy.as_str()))]
pub fn run_tui(settings: OverlaySettings) -> anyhow::Result<()> {
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("terminal UI started");
    let mut app = App::new(settings);
    let result = run_loop(&mut terminal, &mut app);

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    disable_raw_mode()?;

    info!(tasks = app.board().tasks().len(), "terminal UI stopped");
    result
}

/// Leaves raw mode and the alternate screen before the default hook prints,
/// so a panic message lands on a usable terminal.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);
        terminal.draw(|frame| view::draw(frame, app, now))?;

        if app.should_quit() {
            return Ok(());
        }

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key(key, Instant::now());
        }
    }
}
