//! ---
//! ems_section: "12-gui-setup-wizard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Terminal rendering of the reading card and chart panels."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::f64::consts::TAU;

use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
};
use ratatui::Frame;
use twin_sim::Metric;

use crate::dashboard::{ChartSeries, TelemetryDashboard};

const CARD_TITLE: &str = "Real-time Device Data";
const LINE_DATASET: &str = "Real-time Data";
const BAR_DATASET: &str = "Device Stats";
const LINE_COLOR: Color = Color::Rgb(75, 192, 192);
const PIE_RESOLUTION: usize = 160;

pub fn metric_color(metric: Metric) -> Color {
    match metric {
        Metric::Voltage => Color::Red,
        Metric::Current => Color::Blue,
        Metric::Power => Color::Green,
        Metric::Energy => Color::Magenta,
    }
}

pub fn draw_ui(frame: &mut Frame, dashboard: &TelemetryDashboard) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_header(frame, layout[0], dashboard.title());
    draw_card(frame, layout[1], dashboard);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[2]);
    let upper = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(charts[0]);
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(charts[1]);

    let series = dashboard.series();
    draw_line_chart(frame, upper[0], series);
    draw_bar_chart(frame, upper[1], series);
    draw_pie_chart(frame, lower[1], series);
    draw_footer(frame, layout[3], dashboard);
}

fn draw_header(frame: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(Line::from(Span::styled(
        title.to_owned(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

/// `Voltage: 231.42 V` style text for one metric.
pub fn field_text(metric: Metric, formatted: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}:", metric.label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} {}", formatted, metric.unit())),
    ])
}

fn draw_card(frame: &mut Frame, area: Rect, dashboard: &TelemetryDashboard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(CARD_TITLE)
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);
    let reading = &dashboard.snapshot().reading;
    for (metric, column) in Metric::ALL.iter().zip(columns.iter()) {
        let field = Paragraph::new(field_text(*metric, &reading.formatted(*metric)))
            .alignment(Alignment::Center);
        frame.render_widget(field, *column);
    }
}

fn panel(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
}

fn draw_line_chart(frame: &mut Frame, area: Rect, series: &ChartSeries) {
    let points = series.indexed();
    let top = (series.max() * 1.1).max(1.0);
    let dataset = Dataset::default()
        .name(LINE_DATASET)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(LINE_COLOR))
        .data(&points);
    let x_labels: Vec<Span> = series.labels().into_iter().map(Span::raw).collect();
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", top / 2.0)),
        Span::raw(format!("{:.0}", top)),
    ];
    let chart = Chart::new(vec![dataset])
        .block(panel("Line Chart"))
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len().saturating_sub(1)) as f64])
                .labels(x_labels),
        )
        .y_axis(Axis::default().bounds([0.0, top]).labels(y_labels));
    frame.render_widget(chart, area);
}

fn draw_bar_chart(frame: &mut Frame, area: Rect, series: &ChartSeries) {
    let bars: Vec<Bar> = series
        .points()
        .iter()
        .map(|(metric, value)| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format!("{value:.2}"))
                .label(Line::from(metric.label()))
                .style(Style::default().fg(metric_color(*metric)))
        })
        .collect();
    let inner_width = area.width.saturating_sub(2);
    let gap = 1u16;
    let bar_width = (inner_width.saturating_sub(gap * 3) / 4).max(1);
    let chart = BarChart::default()
        .block(panel("Bar Chart"))
        .bar_width(bar_width)
        .bar_gap(gap)
        .data(
            BarGroup::default()
                .label(Line::from(BAR_DATASET))
                .bars(&bars),
        );
    frame.render_widget(chart, area);
}

/// Sample points of a unit disc grouped by sector. Sectors follow `shares`
/// clockwise from twelve o'clock; every group is empty when all shares are
/// zero.
pub fn pie_sectors(shares: &[f64; 4], resolution: usize) -> [Vec<(f64, f64)>; 4] {
    let mut sectors: [Vec<(f64, f64)>; 4] = Default::default();
    if shares.iter().sum::<f64>() <= 0.0 || resolution == 0 {
        return sectors;
    }
    let mut bounds = [0.0_f64; 4];
    let mut acc = 0.0_f64;
    for (bound, share) in bounds.iter_mut().zip(shares) {
        acc += share;
        *bound = acc * TAU;
    }
    let step = 2.0 / resolution as f64;
    for row in 0..=resolution {
        let y = -1.0 + row as f64 * step;
        for col in 0..=resolution {
            let x = -1.0 + col as f64 * step;
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = x.atan2(y).rem_euclid(TAU);
            let idx = bounds
                .iter()
                .position(|bound| angle < *bound)
                .unwrap_or(sectors.len() - 1);
            sectors[idx].push((x, y));
        }
    }
    sectors
}

fn draw_pie_chart(frame: &mut Frame, area: Rect, series: &ChartSeries) {
    let block = panel("Pie Chart");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(22)])
        .split(inner);

    let shares = series.shares();
    let sectors = pie_sectors(&shares, PIE_RESOLUTION);
    // Terminal cells are roughly twice as tall as wide.
    let plot = columns[0];
    let x_extent = if plot.height > 0 {
        1.1 * f64::from(plot.width) / (2.0 * f64::from(plot.height))
    } else {
        1.1
    };
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-x_extent.max(1.1), x_extent.max(1.1)])
        .y_bounds([-1.1, 1.1])
        .paint(|ctx| {
            for ((metric, _), coords) in series.points().iter().zip(sectors.iter()) {
                ctx.draw(&Points {
                    coords,
                    color: metric_color(*metric),
                });
            }
        });
    frame.render_widget(canvas, plot);

    let legend: Vec<Line> = series
        .points()
        .iter()
        .zip(shares.iter())
        .map(|((metric, _), share)| {
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(metric_color(*metric))),
                Span::raw(format!("{:<8}{:>6.2}%", metric.label(), share * 100.0)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), columns[1]);
}

fn draw_footer(frame: &mut Frame, area: Rect, dashboard: &TelemetryDashboard) {
    let snapshot = dashboard.snapshot();
    let updated = snapshot.captured_at.with_timezone(&Local).format("%H:%M:%S");
    let state = if dashboard.is_ticking() { "live" } else { "stopped" };
    let footer = Paragraph::new(format!(
        "tick {}  updated {}  ticker {}  q/Esc quit",
        snapshot.tick, updated, state
    ))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, area);
}
