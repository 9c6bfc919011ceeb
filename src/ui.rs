use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
    },
};

use crate::domain::RVConfig;
use crate::formatting;
use crate::model::UIData;
use crate::theme;

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const STATUS_LINE_HEIGHT: usize = 1;
pub const SCROLLBAR_WIDTH: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

pub struct TableUI {
    config: RVConfig,
}

impl TableUI {
    pub fn new(config: &RVConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn draw(&self, data: &UIData, frame: &mut Frame) {
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(STATUS_LINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.draw_table(data, table_area, frame);
        self.draw_scrollbar(data, table_area, frame);
        self.draw_status_line(data, status_area, frame);

        if let Some(prompt) = &data.confirm {
            Self::draw_confirm(prompt, frame);
        }
        if data.show_popup {
            Self::draw_popup(&data.popup_message, frame);
        }
    }

    fn draw_table(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        let header_style = Style::default()
            .bg(theme::DARK_BLUE)
            .fg(theme::WHITE)
            .add_modifier(Modifier::BOLD);
        let header = Row::new(data.headers.iter().cloned()).style(header_style);

        let rows = data.rows.iter().enumerate().map(|(i, r)| {
            let mut style = Style::default();
            if r.marked {
                style = style.fg(theme::ORANGE);
            }
            if i == data.selected {
                style = style.bg(theme::TURQUOISE).fg(theme::DARK_BLUE);
            }
            Row::new(r.cells.iter().cloned()).style(style)
        });

        let widths = data
            .widths
            .iter()
            .map(|&w| Constraint::Length(w))
            .collect::<Vec<Constraint>>();

        let table = Table::new(rows, widths).header(header).column_spacing(1);
        frame.render_widget(table, area);
    }

    fn draw_scrollbar(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        if data.nvisible == 0 {
            return;
        }
        let mut state = ScrollbarState::new(data.nvisible).position(data.abs_selected);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        frame.render_stateful_widget(scrollbar, area, &mut state);
    }

    fn draw_status_line(&self, data: &UIData, area: Rect, frame: &mut Frame) {
        if data.active_input {
            // Filter prompt with a live cursor.
            let line = Line::from(vec![
                Span::styled("/", Style::default().fg(theme::TURQUOISE)),
                Span::raw(data.cmdinput.text.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + 1 + data.cmdinput.cursor as u16;
            frame.set_cursor_position(Position::new(x.min(area.right()), area.y));
            return;
        }

        let elapsed = data.last_status_message_update.elapsed().as_millis() as u64;
        let text = status_text(
            &data.status_message,
            elapsed,
            self.config.status_message_timeout,
            &data.name,
            data.nvisible,
            data.ntotal,
            &data.query,
        );
        let line = Line::from(Span::styled(text, Style::default().fg(theme::TURQUOISE)));
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_confirm(prompt: &str, frame: &mut Frame) {
        let area = Self::centered_rect(prompt.len() as u16 + 4, 3, frame.area());
        let block = Block::bordered()
            .title(" confirm ")
            .border_style(Style::default().fg(theme::ORANGE));
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(prompt.to_string()).centered().block(block),
            area,
        );
    }

    fn draw_popup(message: &str, frame: &mut Frame) {
        let height = message.lines().count() as u16 + 2;
        let width = message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let area = Self::centered_rect(width, height, frame.area());
        let block = Block::bordered()
            .title(" help ")
            .border_style(Style::default().fg(theme::TURQUOISE));
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(message.to_string()).block(block), area);
    }

    fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
        let width = width.min(outer.width);
        let height = height.min(outer.height);
        Rect {
            x: outer.x + (outer.width - width) / 2,
            y: outer.y + (outer.height - height) / 2,
            width,
            height,
        }
    }
}

/// Picks the status line content: a transient message while it is still
/// fresh, otherwise the default row-count readout.
fn status_text(
    message: &str,
    elapsed_ms: u64,
    timeout_ms: u64,
    name: &str,
    nvisible: usize,
    ntotal: usize,
    query: &str,
) -> String {
    if !message.is_empty() && elapsed_ms < timeout_ms {
        return message.to_string();
    }
    let mut text = format!(
        "{}  {} / {} rows",
        name,
        formatting::thousands(nvisible),
        formatting::thousands(ntotal),
    );
    if !query.is_empty() {
        text.push_str(&format!("  filtered by \"{}\"", query));
    }
    text
}
