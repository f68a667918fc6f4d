//! Pure view functions.
//!
//! Everything here takes `&AppState`, draws into a ratatui `Frame`, and
//! never mutates state. Lines carry inline markup, which is turned into
//! styled spans at draw time.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;
use vuut_core::markup::{MarkupStyle, segments};
use vuut_core::text::tail_columns;

use crate::state::{AppState, UiConfig};

/// Rows of text in the input region.
const INPUT_LINES: u16 = 1;

/// The three fixed screen regions, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub modal: Rect,
    pub output: Rect,
    pub input: Rect,
}

fn border_size(enabled: bool) -> u16 {
    if enabled { 2 } else { 0 }
}

fn block(enabled: bool) -> Block<'static> {
    if enabled {
        Block::default().borders(Borders::ALL)
    } else {
        Block::default()
    }
}

/// Splits `area` into modal, output, and input regions.
pub fn layout(area: Rect, config: &UiConfig, modal_lines: usize) -> Regions {
    let modal_height =
        u16::try_from(modal_lines).unwrap_or(u16::MAX).saturating_add(border_size(config.modal_border));
    let input_height = INPUT_LINES + border_size(config.input_border);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(modal_height),
            Constraint::Min(1),
            Constraint::Length(input_height),
        ])
        .split(area);

    Regions {
        modal: chunks[0],
        output: chunks[1],
        input: chunks[2],
    }
}

/// Inner (border-free) size of the output region for a terminal size.
///
/// This is the wrap width and visible height every page is sized to.
pub fn output_size(width: u16, height: u16, config: &UiConfig, modal_lines: usize) -> (usize, usize) {
    let regions = layout(Rect::new(0, 0, width, height), config, modal_lines);
    let inner = block(config.output_border).inner(regions.output);
    (usize::from(inner.width), usize::from(inner.height))
}

/// Renders the whole UI.
pub fn render(app: &AppState, frame: &mut Frame) {
    let regions = layout(frame.area(), &app.config, app.modal.len());
    render_modal(app, frame, regions.modal);
    render_output(app, frame, regions.output);
    render_input(app, frame, regions.input);
}

fn render_modal(app: &AppState, frame: &mut Frame, area: Rect) {
    let block = block(app.config.modal_border);
    let inner = block.inner(area);

    let lines: Vec<Line<'static>> = if usize::from(inner.height) < app.modal.len() {
        vec![styled_line(&format!(
            "<r>Cannot render modal : Too many lines ({})<r>",
            app.modal.len()
        ))]
    } else {
        let width = usize::from(inner.width);
        app.modal
            .lines()
            .iter()
            .map(|line| styled_line(&line.render(width)))
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_output(app: &AppState, frame: &mut Frame, area: Rect) {
    // Lines are already wrapped to the region width; no Paragraph wrap.
    let lines: Vec<Line<'static>> = app
        .pages
        .focused()
        .map(|page| {
            page.viewport()
                .visible()
                .iter()
                .map(|line| styled_line(line))
                .collect()
        })
        .unwrap_or_default();

    frame.render_widget(Paragraph::new(lines).block(block(app.config.output_border)), area);
}

fn render_input(app: &AppState, frame: &mut Frame, area: Rect) {
    let block = block(app.config.input_border);
    let inner = block.inner(area);
    // One column stays free for the cursor.
    let shown = tail_columns(&app.input.buffer, usize::from(inner.width.saturating_sub(1)));

    frame.render_widget(Paragraph::new(shown.to_string()).block(block), area);

    if inner.width > 0 && inner.height > 0 {
        let offset = u16::try_from(shown.width()).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

/// Converts a marked-up line into styled spans.
pub fn styled_line(raw: &str) -> Line<'static> {
    let spans: Vec<Span<'static>> = segments(raw)
        .into_iter()
        .map(|segment| Span::styled(segment.text, style_for(segment.style)))
        .collect();
    Line::from(spans)
}

fn style_for(style: Option<MarkupStyle>) -> Style {
    let base = Style::default();
    match style {
        None => base,
        Some(MarkupStyle::Bold) => base.add_modifier(Modifier::BOLD),
        Some(MarkupStyle::Dim) => base.add_modifier(Modifier::DIM),
        Some(MarkupStyle::Reverse) => base.add_modifier(Modifier::REVERSED),
        Some(MarkupStyle::Underline) => base.add_modifier(Modifier::UNDERLINED),
        Some(MarkupStyle::Green) => base.fg(Color::Green),
        Some(MarkupStyle::Red) => base.fg(Color::Red),
        Some(MarkupStyle::Yellow) => base.fg(Color::Yellow),
    }
}
