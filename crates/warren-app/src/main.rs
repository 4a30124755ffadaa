//! warren -- a terminal gopher client.
//!
//! hjkl or arrows to move, Enter to open, h to go back, o to enter an
//! address, q to quit. Run with an optional start address:
//! `warren gopher://gopher.floodgap.com/1`.

mod input;
mod open;
mod prompts;
mod ui;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use warren_core::{Config, NetFetcher, Selector, Session};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.start_url.clone());
    let mut start = Selector::parse_uri(&addr)
        .with_context(|| format!("cannot open start address '{addr}'"))?;
    start.display = "Start".into();

    // "Open externally" needs somewhere to put transient downloads.
    let (download_dir, ephemeral) = match &config.download_dir {
        Some(dir) => (dir.clone(), false),
        None => (
            std::env::temp_dir().join(format!("warren-{}", std::process::id())),
            true,
        ),
    };
    fs::create_dir_all(&download_dir)
        .with_context(|| format!("creating download dir {}", download_dir.display()))?;

    let fetcher = NetFetcher::with_timeouts(config.connect_timeout(), config.read_timeout());
    let mut session = Session::new(Box::new(fetcher), download_dir.clone());
    session.start(start);

    let outcome = run(&mut session);

    if ephemeral {
        let _ = fs::remove_dir_all(&download_dir);
    }
    outcome
}

fn load_config() -> Result<Config> {
    let path = std::env::var_os("WARREN_CONFIG")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/warren.toml"))
        });
    match path {
        Some(path) => {
            Config::load(&path).with_context(|| format!("loading {}", path.display()))
        },
        None => Ok(Config::default()),
    }
}

/// Puts the terminal into raw mode + alternate screen and restores it
/// on every exit path, including panics.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("terminal raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, crossterm::cursor::Hide)
            .context("alternate screen")?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), crossterm::cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn run(session: &mut Session) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut out = io::stdout();

    loop {
        session.resolve();

        let (width, height) = terminal::size().context("terminal size")?;
        let viewport = height.saturating_sub(1) as usize;
        session.set_page_step((viewport / 2).max(1));
        {
            let snap = session.snapshot();
            ui::draw(&mut out, &snap, width, height)?;
        }

        match event::read().context("reading input")? {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                match input::map_key(key) {
                    Some(input::Action::Quit) => {
                        let mut term_ui = prompts::TermUi::new(&mut out, width, height);
                        if term_ui.confirm("Really quit?")? {
                            return Ok(());
                        }
                    },
                    Some(input::Action::Redraw) => continue,
                    Some(input::Action::Command(command)) => {
                        let mut term_ui = prompts::TermUi::new(&mut out, width, height);
                        session.dispatch(command, &mut term_ui);
                    },
                    None => {},
                }
            },
            // Resize falls through to the next redraw.
            _ => {},
        }
    }
}
