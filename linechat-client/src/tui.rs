/// Terminal lifecycle and event pump for the client UI
use std::io::{self, Stderr};

use anyhow::Result;
use crossterm::{
    event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::CrosstermBackend;

/// Terminal events the application cares about
#[derive(Debug)]
pub(crate) enum Event {
    Key(KeyEvent),
    Resize,
}

/// Wraps the terminal in raw mode plus the alternate screen, and pumps
/// crossterm's event stream. The UI renders on stderr so stdout stays
/// clean.
pub(crate) struct Tui {
    terminal: ratatui::Terminal<CrosstermBackend<Stderr>>,
    events: EventStream,
}

impl Tui {
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: ratatui::Terminal::new(CrosstermBackend::new(io::stderr()))?,
            events: EventStream::new(),
        })
    }

    pub fn enter(&mut self) -> Result<()> {
        enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen)?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        crossterm::execute!(io::stderr(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }

    /// Next event of interest; `None` once the event stream ends
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.events.next().await? {
                Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    return Some(Event::Key(key));
                }
                Ok(CrosstermEvent::Resize(_, _)) => return Some(Event::Resize),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
