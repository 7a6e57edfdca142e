//! Full-screen terminal log viewer.
//!
//! Owns the terminal for its lifetime: raw mode and the alternate screen are
//! entered on start and always restored, including on error paths.

pub mod render;
pub mod view;

use std::io::{self, Stdout, Write};
use std::sync::Arc;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
};
use futures_util::StreamExt;
use logrelay_core::{LogFollower, LogSink};
use tracing::debug;

use view::{LogView, ViewAction};

/// Restores the terminal when dropped.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Nothing useful can be done if restoring fails during drop.
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
        let _ = self.out.flush();
    }
}

/// Run the viewer until the user quits.
///
/// `title` is shown in the top bar. Entries are pulled from `sink` as they
/// are appended; `max_lines` mirrors the sink's retention.
pub async fn run(sink: Arc<LogSink>, title: String, max_lines: Option<usize>) -> io::Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut follower = LogFollower::from_start(sink);
    let mut view = LogView::new(max_lines);

    view.extend(follower.try_batch().into_iter().map(|e| e.text));

    loop {
        render::draw(&mut guard.out, &mut view, &title, size()?)?;

        tokio::select! {
            batch = follower.next_batch() => match batch {
                Some(entries) => view.extend(entries.into_iter().map(|e| e.text)),
                None => break,
            },
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if view.handle_key(key) == ViewAction::Quit {
                        debug!("quit requested");
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
        }
    }

    Ok(())
}
