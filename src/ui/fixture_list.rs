//! Fixture list screen rendering
//!
//! Renders the main view: a header with data freshness, the fixture list,
//! an error line when the last refresh failed, and a footer with key hints.
//! A failed refresh never blanks fixtures that were already on screen.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::fixtures::{Fixture, FixtureStatus};

/// Color for a fixture's status label
fn status_color(status: &FixtureStatus) -> Color {
    match status {
        FixtureStatus::Scheduled => Color::Gray,
        FixtureStatus::Live => Color::Green,
        FixtureStatus::Finished => Color::Blue,
        FixtureStatus::Postponed => Color::Red,
    }
}

/// Human-readable age of the last successful refresh
fn age_display(last_fetched: Option<DateTime<Utc>>) -> String {
    let Some(at) = last_fetched else {
        return "never".to_string();
    };
    let minutes = Utc::now().signed_duration_since(at).num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else {
        format!("{}h ago", minutes / 60)
    }
}

/// Renders the fixture list view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let has_error = app.snapshot.error.is_some();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(if has_error { 1 } else { 0 }),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    if has_error {
        render_error(frame, app, chunks[2]);
    }
    render_footer(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "Matchday",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  updated "),
        Span::styled(
            age_display(app.snapshot.last_fetched),
            Style::default().fg(Color::Gray),
        ),
    ];
    if app.snapshot.is_refreshing {
        spans.push(Span::styled(
            "  refreshing...",
            Style::default().fg(Color::Yellow),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    if app.snapshot.fixtures.is_empty() {
        let empty = Paragraph::new("No fixtures to show")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .snapshot
        .fixtures
        .iter()
        .map(|fixture| ListItem::new(fixture_line(fixture)))
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

/// One row: kickoff, teams, score column, status label.
fn fixture_line(fixture: &Fixture) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{:<16}", fixture.kickoff_display()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(format!(
            "{} {} {}",
            fixture.home_team,
            fixture.score_display(),
            fixture.away_team
        )),
        Span::raw("  "),
        Span::styled(
            fixture.status.label(),
            Style::default().fg(status_color(&fixture.status)),
        ),
    ];
    if let Some(ref competition) = fixture.competition {
        spans.push(Span::styled(
            format!("  {}", competition),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_error(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.snapshot.error.as_deref().unwrap_or("");
    let error = Paragraph::new(Span::styled(
        format!("! {}", message),
        Style::default().fg(Color::Red),
    ));
    frame.render_widget(error, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Span::styled(
        " q quit | r refresh | f force refresh | ? help",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::FixturesState;
    use ratatui::{backend::TestBackend, Terminal};

    fn fixture(id: &str, home: &str, away: &str) -> Fixture {
        Fixture {
            id: id.to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            kickoff: "2026-08-08T19:30:00Z".parse().unwrap(),
            competition: None,
            venue: None,
            status: Default::default(),
            home_score: None,
            away_score: None,
        }
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_fixture_rows() {
        let mut app = App::new();
        app.apply_snapshot(FixturesState {
            fixtures: vec![fixture("f-1", "Harbour City", "Northgate United")],
            last_fetched: Some(Utc::now()),
            ..Default::default()
        });

        let content = render_to_string(&app);
        assert!(content.contains("Harbour City"));
        assert!(content.contains("Northgate United"));
        assert!(content.contains("just now"));
    }

    #[test]
    fn test_renders_error_line_with_fixtures_still_visible() {
        let mut app = App::new();
        app.apply_snapshot(FixturesState {
            fixtures: vec![fixture("f-1", "Albion", "Rovers")],
            error: Some("HTTP 500 from fixtures endpoint".to_string()),
            last_fetched: Some(Utc::now()),
            ..Default::default()
        });

        let content = render_to_string(&app);
        assert!(content.contains("Albion"), "Error must not blank fixtures");
        assert!(content.contains("500"));
    }

    #[test]
    fn test_renders_refreshing_indicator() {
        let mut app = App::new();
        app.apply_snapshot(FixturesState {
            fixtures: vec![fixture("f-1", "A", "B")],
            is_refreshing: true,
            last_fetched: Some(Utc::now()),
            ..Default::default()
        });

        let content = render_to_string(&app);
        assert!(content.contains("refreshing"));
    }

    #[test]
    fn test_renders_empty_message() {
        let mut app = App::new();
        app.apply_snapshot(FixturesState {
            last_fetched: Some(Utc::now()),
            ..Default::default()
        });

        let content = render_to_string(&app);
        assert!(content.contains("No fixtures to show"));
    }

    #[test]
    fn test_age_display_formats() {
        assert_eq!(age_display(None), "never");
        assert_eq!(age_display(Some(Utc::now())), "just now");
        assert_eq!(
            age_display(Some(Utc::now() - chrono::Duration::minutes(5))),
            "5m ago"
        );
        assert_eq!(
            age_display(Some(Utc::now() - chrono::Duration::hours(3))),
            "3h ago"
        );
    }
}
