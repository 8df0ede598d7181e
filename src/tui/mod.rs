//! Ratatui-based terminal dashboard.
//!
//! Layout: a header with the two KPIs, a sidebar with the prediction inputs,
//! result and hourly forecast, and a 2x2 grid of aggregate charts.
//!
//! Every frame recomputes the aggregates from the loaded dataset. A failed
//! prediction only updates the status line; the charts keep rendering.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::{info, warn};

use crate::app::pipeline::{DashboardContext, DashboardView, initial_request};
use crate::domain::{AggregateView, ChartStyle, DashboardConfig, GroupKey, PredictionRequest, PredictionResult};
use crate::error::AppError;
use crate::report::{fmt_key, fmt_mean, format_prediction, format_request};

mod plotters_chart;

use plotters_chart::{TrafficChart, series_bounds};

const FIELD_COUNT: usize = 5;

/// Start the dashboard. Returns when the user quits.
pub fn run(ctx: &DashboardContext, config: &DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(ctx, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    ctx: &'a DashboardContext,
    request: PredictionRequest,
    years: Vec<i32>,
    junctions: Vec<i64>,
    selected_field: usize,
    prediction: Option<PredictionResult>,
    forecast: Vec<(f64, f64)>,
    status: String,
}

impl<'a> App<'a> {
    fn new(ctx: &'a DashboardContext, config: &DashboardConfig) -> Self {
        let view = ctx.build_view();
        let request = initial_request(config, &view);
        Self {
            ctx,
            request,
            years: view.years,
            junctions: view.junctions,
            selected_field: 0,
            prediction: None,
            forecast: Vec::new(),
            status: "Select inputs, then press Enter to predict.".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        info!("dashboard closed");
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter | KeyCode::Char('p') => self.run_prediction(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i64) {
        let req = &mut self.request;
        match self.selected_field {
            0 => req.hour = step_clamped(req.hour, delta, 0, 23),
            1 => req.day = step_clamped(req.day, delta, 1, 31),
            2 => req.month = step_clamped(req.month, delta, 1, 12),
            3 => req.year = step_choice(&self.years, req.year, delta),
            4 => req.junction = step_choice(&self.junctions, req.junction, delta),
            _ => return,
        }
        // A new selection invalidates the last result until the user predicts again.
        self.prediction = None;
        self.forecast.clear();
        self.status = format_request(&self.request);
    }

    fn run_prediction(&mut self) {
        match self.ctx.predict(&self.request) {
            Ok(result) => {
                self.forecast = match self.ctx.predictor.predict_hourly_profile(&self.request) {
                    Ok(profile) => profile.into_iter().map(|(h, v)| (f64::from(h), v)).collect(),
                    Err(err) => {
                        warn!(error = %err, request = ?self.request, "hourly forecast failed");
                        Vec::new()
                    }
                };
                self.status = format_prediction(&result);
                self.prediction = Some(result);
            }
            Err(err) => {
                warn!(error = %err, request = ?self.request, "prediction failed");
                self.prediction = None;
                self.forecast.clear();
                self.status = format!("Prediction failed: {err}");
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        // Aggregates are rebuilt on every frame; nothing is cached.
        let view = self.ctx.build_view();

        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0], &view);
        self.draw_body(frame, chunks[1], &view);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let title = Line::from(Span::styled(
            "AI-Based Smart Traffic Signal Optimization Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);

        let kpis = Line::from(vec![
            Span::styled("Total Traffic: ", Style::default().fg(Color::Gray)),
            Span::styled(
                view.summary.total_vehicles.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled("Average Traffic: ", Style::default().fg(Color::Gray)),
            Span::styled(fmt_mean(view.summary.mean_vehicles), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(
                    "   | records: {} | model: {}",
                    view.summary.n_records,
                    self.ctx.predictor.describe()
                ),
                Style::default().fg(Color::Gray),
            ),
        ])
        .alignment(Alignment::Center);

        let p = Paragraph::new(Text::from(vec![title, kpis])).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(38), Constraint::Min(0)])
            .split(area);

        self.draw_sidebar(frame, cols[0]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cols[1]);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);

        let cells = [top[0], top[1], bottom[0], bottom[1]];
        for (key, cell) in GroupKey::ALL.iter().zip(cells) {
            if let Some(aggregate) = view.view(*key) {
                draw_aggregate_chart(frame, cell, aggregate);
            }
        }
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let req = &self.request;
        let items = vec![
            ListItem::new(format!("Hour     ◂ {:>4} ▸", req.hour)),
            ListItem::new(format!("Day      ◂ {:>4} ▸", req.day)),
            ListItem::new(format!("Month    ◂ {:>4} ▸", req.month)),
            ListItem::new(format!("Year     ◂ {:>4} ▸", req.year)),
            ListItem::new(format!("Junction ◂ {:>4} ▸", req.junction)),
        ];

        let list = List::new(items)
            .block(Block::default().title("Traffic Prediction").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let result = match &self.prediction {
            Some(result) => Paragraph::new(format_prediction(result))
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            None => Paragraph::new("Press Enter to predict").style(Style::default().fg(Color::Gray)),
        };
        frame.render_widget(result.block(Block::default().borders(Borders::ALL)), chunks[1]);

        let block = Block::default().title("Hourly forecast").borders(Borders::ALL);
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);
        frame.render_widget(Clear, inner);

        let Some((x_bounds, y_bounds)) = series_bounds(&self.forecast) else {
            return;
        };
        frame.render_widget(
            TrafficChart {
                series: &self.forecast,
                style: ChartStyle::Line,
                color: RGBColor(0, 255, 0),
                x_bounds,
                y_bounds,
                x_label: "hour",
                y_label: "vehicles",
                fmt_x: fmt_axis_key,
                fmt_y: fmt_axis_count,
            },
            inner,
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter predict  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_aggregate_chart(frame: &mut ratatui::Frame<'_>, area: Rect, aggregate: &AggregateView) {
    let block = Block::default().title(aggregate.key.title()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let series = aggregate.points();
    let Some((x_bounds, y_bounds)) = series_bounds(&series) else {
        let msg = Paragraph::new("No records.").style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    };

    let widget = TrafficChart {
        series: &series,
        style: aggregate.key.chart_style(),
        color: chart_color(aggregate.key),
        x_bounds,
        y_bounds,
        x_label: aggregate.key.label(),
        y_label: "vehicles",
        fmt_x: fmt_axis_key,
        fmt_y: fmt_axis_count,
    };
    frame.render_widget(widget, inner);

    // Month names don't fit the axis; list the top month under the chart instead.
    if aggregate.key == GroupKey::Month && inner.height > 1 {
        if let Some((month, _)) = aggregate.iter().max_by_key(|&(_, v)| v) {
            let label = Paragraph::new(format!("peak: {}", fmt_key(GroupKey::Month, month)))
                .alignment(Alignment::Right)
                .style(Style::default().fg(Color::Gray));
            let rect = Rect {
                y: inner.y + inner.height - 1,
                height: 1,
                ..inner
            };
            frame.render_widget(label, rect);
        }
    }
}

fn chart_color(key: GroupKey) -> RGBColor {
    match key {
        GroupKey::Junction => RGBColor(0, 255, 255),
        GroupKey::Month => RGBColor(80, 160, 255),
        GroupKey::Day => RGBColor(255, 200, 0),
        GroupKey::Year => RGBColor(255, 0, 255),
    }
}

fn step_clamped(value: u32, delta: i64, min: u32, max: u32) -> u32 {
    (i64::from(value) + delta).clamp(i64::from(min), i64::from(max)) as u32
}

/// Move to the neighbouring entry of a sorted choice list, stopping at the ends.
fn step_choice<T: Copy + PartialEq>(choices: &[T], current: T, delta: i64) -> T {
    let Some(pos) = choices.iter().position(|c| *c == current) else {
        return choices.first().copied().unwrap_or(current);
    };
    let next = (pos as i64 + delta).clamp(0, choices.len() as i64 - 1) as usize;
    choices[next]
}

fn fmt_axis_key(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_count(v: f64) -> String {
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if a >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::data::TrafficDataset;
    use crate::models::Predictor;

    const DATA: &str = "DateTime,Junction,Vehicles\n\
                        2016-03-01 08:00:00,1,12\n\
                        2017-03-01 09:00:00,2,7\n";

    fn context(model_json: &str) -> DashboardContext {
        DashboardContext {
            dataset: TrafficDataset::from_reader(DATA.as_bytes()).unwrap(),
            predictor: Predictor::from_reader(model_json.as_bytes()).unwrap(),
        }
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            data_path: PathBuf::from("traffic.csv"),
            model_path: PathBuf::from("traffic_model.json"),
            initial: PredictionRequest { hour: 10, day: 15, month: 6, year: 0, junction: 0 },
        }
    }

    #[test]
    fn failed_prediction_only_touches_the_status_line() {
        let ctx = context(
            r#"{"format":"traffic-model","version":1,"n_features":4,
                "model":{"kind":"linear","intercept":0.0,"coefficients":[1,1,1,1]}}"#,
        );
        let mut app = App::new(&ctx, &config());
        app.run_prediction();

        assert!(app.prediction.is_none());
        assert!(app.forecast.is_empty());
        assert!(app.status.starts_with("Prediction failed"), "{}", app.status);
        assert_eq!(ctx.build_view().views.len(), 4);
        assert!(!app.handle_key(KeyCode::Down));
    }

    #[test]
    fn successful_prediction_fills_result_and_forecast() {
        let ctx = context(
            r#"{"format":"traffic-model","version":1,"n_features":5,
                "model":{"kind":"linear","intercept":40.0,"coefficients":[0.5,0,0,0,0]}}"#,
        );
        let mut app = App::new(&ctx, &config());
        assert_eq!((app.request.year, app.request.junction), (2016, 1));

        assert!(!app.handle_key(KeyCode::Enter));
        assert_eq!(app.prediction.map(|p| p.display_value()), Some(45));
        assert_eq!(app.forecast.len(), 24);
        assert_eq!(app.status, "Predicted Traffic: 45");

        // Moving to the junction field and changing it clears the stale result.
        app.selected_field = 4;
        app.adjust_field(1);
        assert_eq!(app.request.junction, 2);
        assert!(app.prediction.is_none());
        assert!(app.forecast.is_empty());
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let ctx = context(
            r#"{"format":"traffic-model","version":1,"n_features":5,
                "model":{"kind":"linear","intercept":1.0,"coefficients":[0,0,0,0,0]}}"#,
        );
        let mut app = App::new(&ctx, &config());
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }

    #[test]
    fn sliders_stop_at_their_ends() {
        assert_eq!(step_clamped(23, 1, 0, 23), 23);
        assert_eq!(step_clamped(1, -1, 1, 31), 1);
        assert_eq!(step_clamped(6, 1, 1, 12), 7);
    }

    #[test]
    fn choices_walk_the_sorted_list() {
        let years = [2015, 2016, 2017];
        assert_eq!(step_choice(&years, 2015, 1), 2016);
        assert_eq!(step_choice(&years, 2017, 1), 2017);
        assert_eq!(step_choice(&years, 2015, -1), 2015);
        assert_eq!(step_choice(&years, 1999, 1), 2015);
    }

    #[test]
    fn axis_counts_are_compact() {
        assert_eq!(fmt_axis_count(950.0), "950");
        assert_eq!(fmt_axis_count(125_000.0), "125k");
        assert_eq!(fmt_axis_count(2_400_000.0), "2.4M");
    }
}
