use browseql_core::dispatcher::ResultSource;
use browseql_core::query_input::{QUERY_PLACEHOLDER, QUERY_PROMPT};
use browseql_core::session::{Mode, Overlay, ResultView, Session};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;

/// Presentation styles, handed to [`render`] by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub title: Style,
    pub selected: Style,
    pub grid_header: Style,
    pub error: Style,
    pub muted: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Indexed(205))
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Indexed(212))
                .add_modifier(Modifier::BOLD),
            grid_header: Style::default()
                .fg(Color::Indexed(255))
                .add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
        }
    }
}

pub fn render(frame: &mut Frame<'_>, session: &Session, theme: &Theme, database_label: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], session, theme, database_label);

    match session.overlay() {
        Overlay::Loading => render_message(
            frame,
            chunks[1],
            vec![Line::from("Loading..."), Line::from(""), Line::from("Press q to quit")],
        ),
        Overlay::Error(message) => render_message(
            frame,
            chunks[1],
            vec![
                Line::from(Span::styled(format!("Error: {message}"), theme.error)),
                Line::from(""),
                Line::from("Press any other key to dismiss • q or Ctrl+C to quit"),
            ],
        ),
        Overlay::None => match session.mode() {
            Mode::Tables => render_tables(frame, chunks[1], session, theme),
            Mode::Data(view) => render_data(frame, chunks[1], view, theme),
            Mode::Query => render_query(frame, chunks[1], session, theme),
        },
    }

    render_footer(frame, chunks[2], session);
}

fn render_header(
    frame: &mut Frame<'_>,
    area: Rect,
    session: &Session,
    theme: &Theme,
    database_label: &str,
) {
    let status = match session.overlay() {
        Overlay::None => "ready",
        Overlay::Loading => "loading",
        Overlay::Error(_) => "error",
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" BrowseQL ", theme.title),
        Span::raw(" | "),
        Span::raw(format!("DB: {database_label}")),
        Span::raw(" | "),
        Span::raw(format!("Mode: {}", session.mode().name())),
        Span::raw(" | "),
        Span::raw(format!("Status: {status}")),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_message(frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'_>>) {
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn render_tables(frame: &mut Frame<'_>, area: Rect, session: &Session, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Database Tables", theme.title));

    if session.tables().is_empty() {
        let body = Paragraph::new(vec![
            Line::from("No tables found in this database."),
            Line::from(""),
            Line::from(Span::styled("Press : to run a query", theme.muted)),
        ])
        .block(block);
        frame.render_widget(body, area);
        return;
    }

    let visible = usize::from(area.height.saturating_sub(2)).max(1);
    let window_start = session.cursor().saturating_sub(visible - 1);
    let lines = session
        .tables()
        .iter()
        .enumerate()
        .skip(window_start)
        .take(visible)
        .map(|(index, table)| {
            if index == session.cursor() {
                Line::from(Span::styled(format!("> {table}"), theme.selected))
            } else {
                Line::from(format!("  {table}"))
            }
        })
        .collect::<Vec<_>>();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_data(frame: &mut Frame<'_>, area: Rect, view: &ResultView, theme: &Theme) {
    let title = match view.source() {
        ResultSource::Table(name) => format!("Table: {name}"),
        ResultSource::Statement(sql) => format!("Query: {sql}"),
    };
    let height = usize::from(area.height.saturating_sub(2));
    let offset = view.viewport_offset();

    // Grid line 1 is the header row.
    let lines = view
        .visible_lines(height)
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if offset + index == 1 {
                Line::from(Span::styled(line.as_str(), theme.grid_header))
            } else {
                Line::from(line.as_str())
            }
        })
        .collect::<Vec<_>>();

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, theme.title)),
    );
    frame.render_widget(body, area);
}

fn render_query(frame: &mut Frame<'_>, area: Rect, session: &Session, theme: &Theme) {
    let input = session.query();
    let input_line = if input.is_empty() {
        Line::from(vec![
            Span::raw(QUERY_PROMPT),
            Span::styled(QUERY_PLACEHOLDER, theme.muted),
        ])
    } else {
        Line::from(vec![Span::raw(QUERY_PROMPT), Span::raw(input.text())])
    };

    let body = Paragraph::new(vec![input_line]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled("Query Editor", theme.title)),
    );
    frame.render_widget(body, area);

    let prompt_width = u16::try_from(QUERY_PROMPT.chars().count()).unwrap_or(u16::MAX);
    let cursor = u16::try_from(input.cursor()).unwrap_or(u16::MAX);
    let x = area
        .x
        .saturating_add(1)
        .saturating_add(prompt_width)
        .saturating_add(cursor)
        .min(area.right().saturating_sub(2));
    frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, session: &Session) {
    let help = match session.mode() {
        Mode::Tables => "↑/k ↓/j: Navigate • Enter: Select • :: Query • r: Reload • q: Quit",
        Mode::Data(_) => {
            "↑↓: Scroll • PgUp/PgDn: Page • g/G: Top/Bottom • r: Refresh • Esc: Back • q: Quit"
        }
        Mode::Query => "Enter: Run • Esc: Back • Ctrl+U: Clear • Ctrl+C: Quit",
    };

    let detail = match session.mode() {
        Mode::Tables => format!("{} table(s)", session.tables().len()),
        Mode::Data(view) => format!(
            "{} row(s) × {} column(s) • line {}",
            view.rows().len(),
            view.headers().len(),
            view.viewport_offset() + 1
        ),
        Mode::Query => format!("{} character(s)", session.query().char_len()),
    };

    let footer = Paragraph::new(Line::from(vec![Span::raw(help), Span::raw("  |  "), Span::raw(detail)]))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
