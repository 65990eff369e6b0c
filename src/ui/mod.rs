//! Rendering of the live ranking
//!
//! The ingest loop calls a `Renderer` at most once per render interval.

pub mod layout;
pub mod renderer;
pub mod terminal;

pub use renderer::{ConsoleRenderer, JsonLinesRenderer};
pub use terminal::TuiRenderer;

use crate::{aggregator::Leaderboard, ingestion::IngestStats};

/// Whether the ingest loop should keep going after a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Continue,
    Quit,
}

pub trait Renderer: Send {
    fn render(&mut self, board: &Leaderboard, stats: &IngestStats) -> std::io::Result<RenderOutcome>;

    /// Restore the output device before exit
    fn shutdown(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
