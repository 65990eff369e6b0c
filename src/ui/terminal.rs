use {
    super::{layout::render_layout, RenderOutcome, Renderer},
    crate::{aggregator::Leaderboard, ingestion::IngestStats},
    crossterm::event::{self, Event, KeyCode},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{io::Stdout, time::Duration},
};

/// Full-screen ratatui view of the ranking
///
/// Keyboard input is polled without blocking on every render, so quitting
/// takes effect at the next render tick.
pub struct TuiRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TuiRenderer {
    pub fn new() -> std::io::Result<Self> {
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;

        crossterm::terminal::enable_raw_mode()?;

        // Alternate screen keeps stderr logs out of the view
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;

        terminal.clear()?;

        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn quit_requested() -> std::io::Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    _ => {}
                }
            }
        }
        Ok(false)
    }
}

impl Renderer for TuiRenderer {
    fn render(&mut self, board: &Leaderboard, stats: &IngestStats) -> std::io::Result<RenderOutcome> {
        if Self::quit_requested()? {
            return Ok(RenderOutcome::Quit);
        }

        self.terminal.draw(|f| {
            let area = f.size();
            render_layout(f, area, board, stats);
        })?;

        Ok(RenderOutcome::Continue)
    }

    fn shutdown(&mut self) -> std::io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for TuiRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}
