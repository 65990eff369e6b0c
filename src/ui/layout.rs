use {
    super::renderer::format_timestamp,
    crate::{aggregator::Leaderboard, ingestion::IngestStats},
    ratatui::{
        layout::{Constraint, Layout as RatLayout, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Paragraph, Row, Table},
        Frame,
    },
};

/// Render the main UI layout
pub fn render_layout(f: &mut Frame, area: Rect, board: &Leaderboard, stats: &IngestStats) {
    let chunks = RatLayout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Ranking
            Constraint::Length(3), // Footer/Status
        ])
        .split(area);

    render_header(f, chunks[0], board);
    render_ranking_table(f, chunks[1], board);
    render_footer(f, chunks[2], board, stats);
}

fn render_header(f: &mut Frame, area: Rect, board: &Leaderboard) {
    let header = Block::default()
        .borders(Borders::ALL)
        .title("Top Retweets");

    let text = vec![
        Line::from(vec![
            Span::styled("Top Retweets", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(format!(" - last {} min, as of {} UTC", board.window_minutes, format_timestamp(board.generated_at))),
        ]),
        Line::from(vec![Span::raw("Press 'q' or Esc to quit")]),
    ];

    f.render_widget(Paragraph::new(text).block(header), area);
}

fn render_ranking_table(f: &mut Frame, area: Rect, board: &Leaderboard) {
    let header = Row::new(vec!["#", "Retweets", "Tweet"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = board
        .rows
        .iter()
        .map(|row| {
            let color = if row.rank == 1 { Color::Green } else { Color::White };
            Row::new(vec![row.rank.to_string(), row.count.to_string(), row.snippet.clone()])
                .style(Style::default().fg(color))
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Rank
        Constraint::Length(10), // Count
        Constraint::Min(20),    // Snippet
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Most Retweeted"));

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect, board: &Leaderboard, stats: &IngestStats) {
    let text = vec![Line::from(vec![
        Span::styled("Live: ", Style::default().fg(Color::Green)),
        Span::raw(format!("{} records / {} retweets", board.live_records, board.live_retweets)),
        Span::raw(" | "),
        Span::styled("Frames: ", Style::default().fg(Color::Cyan)),
        Span::raw(stats.frames.to_string()),
        Span::raw(" | "),
        Span::styled("Stored: ", Style::default().fg(Color::Cyan)),
        Span::raw(stats.stored.to_string()),
        Span::raw(" | "),
        Span::styled("Dropped: ", Style::default().fg(Color::Red)),
        Span::raw(stats.dropped().to_string()),
    ])];

    let footer = Block::default().borders(Borders::ALL).title("Status");

    f.render_widget(Paragraph::new(text).block(footer), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::LeaderboardRow;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_layout_renders_rows() {
        let board = Leaderboard {
            generated_at: 1_704_067_230,
            window_minutes: 5,
            live_records: 2,
            live_retweets: 1,
            rows: vec![LeaderboardRow {
                rank: 1,
                original_id: "100".to_string(),
                count: 1,
                snippet: "hello".to_string(),
            }],
        };
        let stats = IngestStats::default();

        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_layout(f, area, &board, &stats);
            })
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let content: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("hello"));
        assert!(content.contains("last 5 min"));
    }
}
