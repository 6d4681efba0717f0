//! Terminal chart engine (ratatui)

use super::{
    AreaSeries, AreaSeriesOptions, ChartEngine, ChartError, ChartOptions, ChartOptionsPatch,
    ChartSurface, Color, Container, SeriesId, SeriesPoint, SurfaceState, TimeScaleOptions,
    UpsertKind,
};
use chrono::{Local, TimeZone};
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color as TermColor, Style};
use ratatui::symbols::Marker;
use ratatui::text::Line;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph, Widget};

/// Engine producing [`TerminalSurface`]s
#[derive(Debug, Clone)]
pub struct TerminalEngine {
    max_points: usize,
}

impl TerminalEngine {
    pub fn new(max_points: usize) -> Self {
        Self { max_points }
    }
}

impl ChartEngine for TerminalEngine {
    type Surface = TerminalSurface;

    fn create_surface(
        &mut self,
        container: Container,
        options: ChartOptions,
    ) -> Result<TerminalSurface, ChartError> {
        if container.width == 0 || container.height == 0 {
            return Err(ChartError::Engine(format!(
                "container has no area ({}x{})",
                container.width, container.height
            )));
        }
        Ok(TerminalSurface {
            state: SurfaceState::new(container, options, self.max_points),
        })
    }
}

/// Surface drawn into a terminal frame
///
/// Rendering is clipped to the configured width and height.
#[derive(Debug)]
pub struct TerminalSurface {
    state: SurfaceState,
}

impl TerminalSurface {
    pub fn series(&self) -> &[AreaSeries] {
        &self.state.series
    }
}

impl ChartSurface for TerminalSurface {
    fn add_area_series(&mut self, options: AreaSeriesOptions) -> Result<SeriesId, ChartError> {
        Ok(self.state.add_area_series(options))
    }

    fn update(&mut self, series: SeriesId, point: SeriesPoint) -> Result<UpsertKind, ChartError> {
        self.state.update(series, point)
    }

    fn apply_options(&mut self, patch: &ChartOptionsPatch) -> Result<(), ChartError> {
        self.state.apply_options(patch);
        Ok(())
    }

    fn options(&self) -> &ChartOptions {
        &self.state.options
    }

    fn remove(self) {}
}

impl Widget for &TerminalSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let options = &self.state.options;
        let area = Rect {
            width: area.width.min(clamp_u16(options.width)),
            height: area.height.min(clamp_u16(options.height)),
            ..area
        };

        let background = options.layout.background;
        let base = Style::default()
            .bg(term_color(background))
            .fg(term_color(options.layout.text_color));
        Block::default().style(base).render(area, buf);

        let Some(series) = self.state.series.first() else {
            return;
        };
        if series.data.is_empty() {
            Paragraph::new("Waiting for ticks...")
                .style(base)
                .alignment(Alignment::Center)
                .render(centered_line(area), buf);
            return;
        }

        let data = series.data.to_xy();
        let (x_min, x_max) = x_bounds(&data);
        let (y_min, y_max) = y_bounds(&data);

        let fill = term_color(series.options.top_color.over(background));
        let line = term_color(series.options.line_color.over(background));
        let grid = Style::default().fg(term_color(options.grid.horz_lines));

        let datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(fill))
                .data(&data),
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(line))
                .data(&data),
        ];

        Chart::new(datasets)
            .style(base)
            .x_axis(
                Axis::default()
                    .style(grid)
                    .bounds([x_min, x_max])
                    .labels(time_labels(x_min, x_max, options.time_scale)),
            )
            .y_axis(
                Axis::default()
                    .style(grid)
                    .bounds([y_min, y_max])
                    .labels(value_labels(y_min, y_max)),
            )
            .render(area, buf);
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb(color.r, color.g, color.b)
}

fn clamp_u16(v: u32) -> u16 {
    v.min(u16::MAX as u32) as u16
}

fn centered_line(area: Rect) -> Rect {
    Rect {
        y: area.y + area.height / 2,
        height: area.height.min(1),
        ..area
    }
}

fn x_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let mut x_max = points.last().map(|p| p.0).unwrap_or(x_min + 1.0);
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    (x_min, x_max)
}

fn y_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, y) in points {
        min = min.min(*y);
        max = max.max(*y);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if max <= min {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

fn time_label(secs: f64, scale: TimeScaleOptions) -> String {
    let format = match (scale.time_visible, scale.seconds_visible) {
        (true, true) => "%H:%M:%S",
        (true, false) => "%H:%M",
        (false, _) => "%d %b",
    };
    match Local.timestamp_opt(secs as i64, 0).single() {
        Some(t) => t.format(format).to_string(),
        None => String::new(),
    }
}

fn time_labels(min: f64, max: f64, scale: TimeScaleOptions) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(time_label(min, scale)),
        Line::from(time_label(mid, scale)),
        Line::from(time_label(max, scale)),
    ]
}

fn value_labels(min: f64, max: f64) -> Vec<Line<'static>> {
    let mid = (min + max) / 2.0;
    vec![
        Line::from(format!("{min:.2}")),
        Line::from(format!("{mid:.2}")),
        Line::from(format!("{max:.2}")),
    ]
}
