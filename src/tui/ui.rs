//! Stateless rendering of the application state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::model::{Cell, ChatMessage, ChatRole, GameSnapshot, GameStatus, Mark};
use crate::session::resolve_winner;

use super::app::{App, Focus, Screen};

/// Renders one frame of the whole application.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // banner
            Constraint::Min(13),   // board and side panels
            Constraint::Length(1), // key help
        ])
        .split(area);

    draw_title(frame, chunks[0], app);
    draw_banner(frame, chunks[1], app);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(chunks[2]);

    draw_board_panel(frame, main[0], app);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main[1]);

    draw_scoreboard(frame, sidebar[0], app);
    draw_chat(frame, sidebar[1], app);

    draw_help(frame, chunks[3], app);

    if app.screen() == Screen::Login {
        draw_login(frame, area, app);
    }
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.username().is_empty() {
        "Tic-Tac-Toe".to_string()
    } else {
        format!("Tic-Tac-Toe  |  playing as {}", app.username())
    };
    let widget = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

/// Transient errors take the line; otherwise the persistent configuration
/// notice is shown for as long as the client is unconfigured.
fn draw_banner(frame: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if let Some(text) = app.banner().text() {
        (text.to_string(), Style::default().fg(Color::Red))
    } else if !app.is_configured() {
        (
            "Missing configuration: set --server-url or TTT_API_BASE_URL".to_string(),
            Style::default().fg(Color::Yellow),
        )
    } else {
        return;
    };
    let widget = Paragraph::new(text).style(style).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn draw_board_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Board").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(game) = app.session().snapshot() else {
        let text = if !app.is_configured() {
            "Backend not configured"
        } else if app.session().is_busy() {
            "Starting game..."
        } else {
            "Press 'n' to start a new game"
        };
        let widget = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(widget, center_rect(inner, inner.width, 1));
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(11)])
        .split(inner);

    let status = Paragraph::new(status_line(game))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    frame.render_widget(status, chunks[0]);

    draw_grid(frame, chunks[1], app, game);
}

fn draw_grid(frame: &mut Frame, area: Rect, app: &App, game: &GameSnapshot) {
    let grid = center_rect(area, 23, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(grid);

    for row in 0..3 {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(7),
                Constraint::Length(1),
                Constraint::Length(7),
                Constraint::Length(1),
                Constraint::Length(7),
            ])
            .split(rows[row * 2]);
        for col in 0..3 {
            draw_cell(frame, cols[col * 2], app, game, row * 3 + col);
        }
        if row < 2 {
            let sep = Paragraph::new("-----------------------")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(sep, rows[row * 2 + 1]);
        }
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, app: &App, game: &GameSnapshot, index: usize) {
    let (symbol, base_style) = match game.board.get(index) {
        Some(Cell::Taken(Mark::X)) => (
            "X".to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Some(Cell::Taken(Mark::O)) => (
            "O".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        _ => (
            (index + 1).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let selected = app.focus() == Focus::Board && app.cursor() == index;
    let style = if selected {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let lines = vec![
        Line::default(),
        Line::from(Span::styled(symbol, style)),
        Line::default(),
    ];
    let widget = Paragraph::new(lines)
        .style(if selected {
            Style::default().bg(Color::White)
        } else {
            Style::default()
        })
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn status_line(game: &GameSnapshot) -> String {
    match game.status {
        GameStatus::InProgress => format!(
            "{}'s turn ({})",
            game.players.name(game.current_player),
            game.current_player
        ),
        GameStatus::Draw => "Draw. No winner.".to_string(),
        GameStatus::XWon | GameStatus::OWon => match resolve_winner(game) {
            Some(winner) => format!("{} wins!", winner),
            None => "Game over".to_string(),
        },
    }
}

fn draw_scoreboard(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title("Scoreboard").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !app.is_configured() {
        let widget = Paragraph::new("Backend not configured")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(widget, inner);
        return;
    }
    if let Some(message) = app.scoreboard_error() {
        let widget = Paragraph::new(format!("Error: {message}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(widget, inner);
        return;
    }
    if app.scores().is_empty() {
        let widget =
            Paragraph::new("No scores yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(widget, inner);
        return;
    }

    let lines: Vec<Line> = app
        .scores()
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            let is_me = entry.username.eq_ignore_ascii_case(app.username());
            let style = if is_me {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{:>2}. {:<16} {:>5}", rank + 1, entry.username, entry.score),
                style,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_chat(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.focus() == Focus::Chat {
        "Chat (typing)"
    } else {
        "Chat"
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let lines = chat_lines(
        app.chat().messages(),
        chunks[0].width as usize,
        chunks[0].height as usize,
    );
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    let prompt = if !app.is_configured() {
        "Backend not configured".to_string()
    } else if app.chat().is_sending() {
        "Sending...".to_string()
    } else {
        format!("> {}", app.chat_input())
    };
    let input = Paragraph::new(prompt).style(Style::default().fg(Color::White));
    frame.render_widget(input, chunks[1]);
}

/// Builds the visible tail of the transcript.
///
/// Messages are wrapped to the panel width up front and the last `height`
/// display lines are kept, so a long older message cannot push the newest
/// one below the panel. An oversized newest message shows its tail.
fn chat_lines(messages: &[ChatMessage], width: usize, height: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in messages {
        let (prefix, prefix_style, text_style) = match message.role {
            ChatRole::System => (
                String::new(),
                Style::default(),
                Style::default().fg(Color::DarkGray),
            ),
            ChatRole::User => (
                format!("{}: ", message.username.as_deref().unwrap_or("You")),
                Style::default().fg(Color::Green),
                Style::default(),
            ),
            ChatRole::Assistant => (
                "AI: ".to_string(),
                Style::default().fg(Color::Magenta),
                Style::default(),
            ),
        };
        let first_width = width.saturating_sub(prefix.chars().count()).max(1);
        let mut chunks = chunk_chars(&message.text, first_width, width).into_iter();

        let mut spans = Vec::new();
        if !prefix.is_empty() {
            spans.push(Span::styled(prefix, prefix_style));
        }
        spans.push(Span::styled(chunks.next().unwrap_or_default(), text_style));
        lines.push(Line::from(spans));
        for chunk in chunks {
            lines.push(Line::from(Span::styled(chunk, text_style)));
        }
    }
    let start = lines.len().saturating_sub(height.max(1));
    lines.split_off(start)
}

/// Splits `text` into display lines by character count: the first line takes
/// up to `first` characters (room left after a name prefix), the rest up to
/// `rest`. Always yields at least one line.
fn chunk_chars(text: &str, first: usize, rest: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    let mut cap = first.max(1);
    for c in text.chars() {
        if count == cap {
            out.push(std::mem::take(&mut current));
            count = 0;
            cap = rest.max(1);
        }
        current.push(c);
        count += 1;
    }
    out.push(current);
    out
}

fn draw_help(frame: &mut Frame, area: Rect, app: &App) {
    let text = match (app.screen(), app.focus()) {
        (Screen::Login, _) => "type a name, Enter to continue",
        (Screen::Game, Focus::Board) => {
            "q quit | n new game | u change user | arrows+Enter or 1-9 move | Tab chat"
        }
        (Screen::Game, Focus::Chat) => "Enter send | Tab/Esc back to board",
    };
    let widget = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn draw_login(frame: &mut Frame, area: Rect, app: &App) {
    let overlay = center_rect(area, 44, 7);
    frame.render_widget(Clear, overlay);

    let block = Block::default().title("Welcome").borders(Borders::ALL);
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines = vec![
        Line::from("Enter a display name to play"),
        Line::default(),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(
                app.login_input().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(area.height.saturating_sub(height) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Length(area.width.saturating_sub(width) / 2),
        ])
        .split(vert[1])[1]
}
