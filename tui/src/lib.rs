//! TUI rendering for Keygate using ratatui.

mod input;
mod theme;

pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use keygate_engine::{
    App, OtpSubmissionFlow, PIN_LENGTH, PinSubmissionFlow, Screen, StatusKind, SubmissionState,
    ValidationError,
};

const CARD_WIDTH: u16 = 46;
const CARD_HEIGHT: u16 = 13;
const OTP_PLACEHOLDER: &str = "******";

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Card
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let card = centered(chunks[0], CARD_WIDTH, CARD_HEIGHT);
    let mut lines = match app.screen() {
        Screen::Pin(flow) => pin_lines(flow, &palette, &glyphs),
        Screen::Otp(flow) => otp_lines(flow, &palette, &glyphs),
    };
    lines.push(Line::from(""));
    lines.push(button_line(app, &palette));

    let body = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(palette.bg_border))
            .padding(Padding::vertical(1))
            .title(Line::from(Span::styled(" Keygate ", styles::title(&palette))).centered()),
    );
    frame.render_widget(body, card);

    draw_status_bar(frame, app, chunks[1], &palette, &glyphs);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn pin_lines(flow: &PinSubmissionFlow, palette: &Palette, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let input = flow.input();
    let editable = !flow.state().is_busy();

    let mut slots: Vec<Span<'static>> = Vec::with_capacity(PIN_LENGTH * 2);
    for (index, slot) in input.slots().iter().enumerate() {
        if index > 0 {
            slots.push(Span::raw("  "));
        }
        let focused = editable && index == input.focus();
        let glyph = if slot.is_some() {
            glyphs.mask
        } else {
            glyphs.empty_slot
        };
        slots.push(Span::styled(
            format!("[ {glyph} ]"),
            styles::slot(palette, focused),
        ));
    }

    vec![
        Line::from(Span::styled(
            "Enter PIN to continue",
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(""),
        Line::from(slots),
        Line::from(""),
        field_error_line(flow.field_error(), palette, glyphs),
    ]
}

fn otp_lines(flow: &OtpSubmissionFlow, palette: &Palette, glyphs: &Glyphs) -> Vec<Line<'static>> {
    let input = flow.input();
    let code = if input.is_empty() {
        Span::styled(OTP_PLACEHOLDER, Style::default().fg(palette.text_muted))
    } else {
        Span::styled(
            input.as_str().to_string(),
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )
    };

    vec![
        Line::from(Span::styled(
            "Confirm Sign In",
            Style::default()
                .fg(palette.text_primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "We sent you a code by text message",
            Style::default().fg(palette.text_secondary),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Code  ", Style::default().fg(palette.text_muted)),
            code,
        ]),
        Line::from(""),
        field_error_line(flow.field_error(), palette, glyphs),
    ]
}

fn field_error_line(
    error: Option<ValidationError>,
    palette: &Palette,
    glyphs: &Glyphs,
) -> Line<'static> {
    match error {
        Some(err) => Line::from(Span::styled(
            format!("{} {}", glyphs.error, err.reason()),
            styles::field_error(palette),
        )),
        None => Line::from(""),
    }
}

fn button_line(app: &App, palette: &Palette) -> Line<'static> {
    let screen = app.screen();
    let state = screen.state();
    let label = screen.submit_label();

    let mut spans = Vec::with_capacity(2);
    if matches!(state, SubmissionState::Dispatching) {
        let spinner = spinner_frame(app.tick_count(), app.ui_options());
        spans.push(Span::styled(
            format!("{spinner} "),
            Style::default().fg(palette.primary),
        ));
    }
    spans.push(Span::styled(
        format!("  {label}  "),
        styles::button(palette, !state.is_busy()),
    ));
    Line::from(spans)
}

fn draw_status_bar(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let (status_text, status_style) = match (app.status_message(), app.status_kind()) {
        (Some(msg), Some(StatusKind::Error)) => (
            format!("{} {msg}", glyphs.error),
            Style::default().fg(palette.error),
        ),
        (Some(msg), _) => (
            format!("{} {msg}", glyphs.ok),
            Style::default().fg(palette.success),
        ),
        (None, _) => (String::new(), Style::default()),
    };

    let hints = match app.screen() {
        Screen::Pin(_) => "Enter submit | Left/Right move | Esc quit",
        Screen::Otp(_) => "Enter submit | Esc back | Ctrl-C quit",
    };

    let [left, right] = Layout::horizontal([Constraint::Min(1), Constraint::Length(44)])
        .areas(area);

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(status_text, status_style),
    ]));
    frame.render_widget(status, left);

    let hint = Paragraph::new(Line::from(Span::styled(hints, styles::key_hint(palette))))
        .alignment(Alignment::Right);
    frame.render_widget(hint, right);
}
