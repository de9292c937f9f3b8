//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never mutate
//! state or return effects.

use authgate_core::session::{AuthAction, SessionState};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::state::AppState;

/// Spinner frames for the loading view.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Ticks per spinner frame.
const SPINNER_SPEED_DIVISOR: usize = 2;

const CARD_WIDTH: u16 = 64;
const CARD_HEIGHT: u16 = 14;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let card = centered(area, CARD_WIDTH, CARD_HEIGHT);

    frame.render_widget(Clear, card);
    let border_color = if app.session.loading() {
        Color::DarkGray
    } else {
        Color::Magenta
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" authgate ")
        .title_style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, card);

    let inner = Rect::new(
        card.x + 2,
        card.y + 1,
        card.width.saturating_sub(4),
        card.height.saturating_sub(2),
    );

    let lines = if app.session.loading() {
        loading_lines(app.spinner_frame)
    } else {
        session_lines(app)
    };
    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

/// Centers a `width` x `height` rect in `area`, shrinking to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn loading_lines(spinner_frame: usize) -> Vec<Line<'static>> {
    let spinner_idx = (spinner_frame / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len();
    vec![
        Line::from(""),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(SPINNER_FRAMES[spinner_idx], Style::default().fg(Color::Cyan)),
            Span::styled(" Loading...", Style::default().fg(Color::Gray)),
        ]),
    ]
}

fn session_lines(app: &AppState) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Sign in with your {} account.", app.provider_name),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];

    match app.session.current_state() {
        SessionState::Authenticated(identity) => {
            lines.push(Line::from(Span::styled(
                "You are logged in!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(vec![
                Span::styled("Welcome, ", Style::default().fg(Color::White)),
                Span::styled(
                    identity.username.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("!", Style::default().fg(Color::White)),
            ]));
            lines.push(Line::from(""));
            lines.push(button("Log out", Color::Red));
        }
        // Initializing never reaches here: the gate is still engaged.
        SessionState::Unauthenticated | SessionState::Initializing => {
            lines.push(Line::from(Span::styled(
                "You are not logged in.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(""));
            lines.push(button(
                &format!("Log in with {}", app.provider_name),
                Color::Blue,
            ));
        }
    }

    lines.push(Line::from(""));
    if let Some(action) = app.pending {
        lines.push(Line::from(Span::styled(
            pending_message(action, &app.provider_name),
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(failure) = &app.last_failure {
        lines.push(Line::from(Span::styled(
            failure.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(hints(app.available_action()));
    lines
}

fn button(label: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        format!("[ {label} ]"),
        Style::default()
            .fg(Color::White)
            .bg(color)
            .add_modifier(Modifier::BOLD),
    ))
}

fn pending_message(action: AuthAction, provider: &str) -> String {
    match action {
        AuthAction::Login => format!("Redirecting to {provider} to sign in..."),
        AuthAction::Logout => format!("Signing out of {provider}..."),
    }
}

fn hints(action: Option<AuthAction>) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(action) = action {
        let label = match action {
            AuthAction::Login => " log in",
            AuthAction::Logout => " log out",
        };
        spans.push(Span::styled("Enter", Style::default().fg(Color::Magenta)));
        spans.push(Span::styled(label, Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Magenta)));
    spans.push(Span::styled(" quit", Style::default().fg(Color::DarkGray)));
    Line::from(spans)
}
