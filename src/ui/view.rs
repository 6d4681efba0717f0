//! Screen layout and status formatting

use super::DisplayState;
use crate::chart::{Container, TerminalSurface, ViewportSize};
use crate::feed::ReadyState;
use chrono::{DateTime, Local, Utc};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const TITLE: &str = "ProTrader NSE";
const SUBTITLE: &str = "NIFTY 50 Live Tick Data";
const WATERMARK: &str = "NIFTY 50";
const FOOTER_SOURCE: &str = "Data provided by NSE (Simulated Tick Stream via Official API Polling)";
const FOOTER_LINK: &str = "Real-time connection";

const PANEL_BG: Color = Color::Rgb(0x26, 0x26, 0x26);
const BORDER: Color = Color::Rgb(0x40, 0x40, 0x40);
const MUTED: Color = Color::Rgb(0x9c, 0xa3, 0xaf);

/// Screen regions for a given terminal area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub header: Rect,
    pub panel: Rect,
    /// Where the chart surface is drawn
    pub chart: Rect,
    pub footer: Rect,
}

pub fn regions(area: Rect) -> Regions {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let panel = outer[1];
    let chart = panel_block().inner(panel);
    Regions {
        header: outer[0],
        panel,
        chart,
        footer: outer[2],
    }
}

/// Container the chart surface is bound to for a viewport size
pub fn chart_container(size: ViewportSize) -> Container {
    let chart = regions(Rect::new(0, 0, size.width, size.height)).chart;
    Container::new(chart.width as u32, chart.height as u32)
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("{:.2}", p),
        None => "Loading...".to_string(),
    }
}

pub fn format_clock(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(t) => t.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

pub fn badge_style(state: ReadyState) -> Style {
    let style = if state.is_open() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    style.add_modifier(Modifier::BOLD)
}

fn badge_text(state: ReadyState) -> String {
    let icon = if state.is_open() { "●" } else { "○" };
    format!(" {} {} ", icon, state.label())
}

fn panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(PANEL_BG))
}

/// Draw the whole screen
pub fn draw(
    frame: &mut Frame,
    display: &DisplayState,
    ready_state: ReadyState,
    chart: Option<&TerminalSurface>,
) {
    let regions = regions(frame.area());

    draw_header(frame, regions.header, display, ready_state);

    frame.render_widget(panel_block(), regions.panel);
    if let Some(surface) = chart {
        frame.render_widget(surface, regions.chart);
    }
    let watermark = Rect {
        x: regions.chart.x.saturating_add(1),
        height: regions.chart.height.min(1),
        width: regions.chart.width.saturating_sub(1),
        ..regions.chart
    };
    frame.render_widget(
        Paragraph::new(WATERMARK).style(
            Style::default()
                .fg(Color::Rgb(0x40, 0x40, 0x40))
                .add_modifier(Modifier::BOLD),
        ),
        watermark,
    );

    draw_footer(frame, regions.footer);
}

fn draw_header(frame: &mut Frame, area: Rect, display: &DisplayState, ready_state: ReadyState) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(PANEL_BG));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(42)].as_ref())
        .split(inner);

    let title = vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(MUTED))),
    ];
    frame.render_widget(Paragraph::new(title), columns[0]);

    let status = vec![
        Line::from(vec![
            Span::styled(
                format_price(display.last_price),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(badge_text(ready_state), badge_style(ready_state)),
        ]),
        Line::from(Span::styled(
            format!("updated {}", format_clock(display.last_update)),
            Style::default().fg(MUTED),
        )),
    ];
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Right),
        columns[1],
    );
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let style = Style::default().fg(Color::Gray).bg(PANEL_BG);
    frame.render_widget(
        Paragraph::new(format!(" {}", FOOTER_SOURCE)).style(style),
        area,
    );
    frame.render_widget(
        Paragraph::new(format!("~ {} ", FOOTER_LINK))
            .style(style)
            .alignment(Alignment::Right),
        Rect {
            x: area.x + area.width.saturating_sub(FOOTER_LINK.len() as u16 + 3),
            width: area.width.min(FOOTER_LINK.len() as u16 + 3),
            ..area
        },
    );
}
