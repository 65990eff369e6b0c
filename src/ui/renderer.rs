// Plain-output renderers and formatting utilities shared with the TUI

use {
    super::{RenderOutcome, Renderer},
    crate::{aggregator::Leaderboard, ingestion::IngestStats},
    std::io::Write,
};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Format a ranking line as `count : snippet`
pub fn format_row(count: usize, snippet: &str) -> String {
    format!("{} : {}", count, snippet)
}

/// Format a Unix timestamp as wall-clock UTC time
pub fn format_timestamp(timestamp: i64) -> String {
    use chrono::DateTime;
    use chrono::Utc;

    if let Some(dt) = DateTime::<Utc>::from_timestamp(timestamp, 0) {
        dt.format("%H:%M:%S").to_string()
    } else {
        "N/A".to_string()
    }
}

/// Clears the screen and prints one `count : snippet` line per original
pub struct ConsoleRenderer<W> {
    out: W,
    clear: bool,
}

impl ConsoleRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), true)
    }
}

impl<W: Write + Send> ConsoleRenderer<W> {
    pub fn new(out: W, clear: bool) -> Self {
        Self { out, clear }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for ConsoleRenderer<W> {
    fn render(&mut self, board: &Leaderboard, _stats: &IngestStats) -> std::io::Result<RenderOutcome> {
        if self.clear {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        for row in &board.rows {
            writeln!(self.out, "{}", format_row(row.count, &row.snippet))?;
        }
        self.out.flush()?;
        Ok(RenderOutcome::Continue)
    }
}

/// Emits each leaderboard as one JSON line (for piping into other tools)
pub struct JsonLinesRenderer<W> {
    out: W,
}

impl JsonLinesRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, board: &Leaderboard, _stats: &IngestStats) -> std::io::Result<RenderOutcome> {
        serde_json::to_writer(&mut self.out, board)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(RenderOutcome::Continue)
    }
}
