//! Plotters-powered chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::ChartStyle;

/// Half-width of a bar, in key units.
const BAR_HALF_WIDTH: f64 = 0.35;

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call; `render()`
/// only draws.
pub struct TrafficChart<'a> {
    /// `(key, value)` pairs in ascending key order.
    pub series: &'a [(f64, f64)],
    pub style: ChartStyle,
    pub color: RGBColor,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for TrafficChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            match self.style {
                ChartStyle::Bar => {
                    chart.draw_series(self.series.iter().map(|&(x, y)| {
                        Rectangle::new(
                            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, y)],
                            self.color.filled(),
                        )
                    }))?;
                }
                ChartStyle::Line => {
                    chart.draw_series(LineSeries::new(self.series.iter().copied(), &self.color))?;
                    // `Circle` radii are mis-scaled by the ratatui backend; a white
                    // pixel reads as a clean marker instead.
                    chart.draw_series(self.series.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Padded bounds for a keyed series: half a key of room on each side, values
/// from zero (or 10% below a negative minimum) to 10% above the maximum.
pub fn series_bounds(series: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    let (first, last) = (series.first()?, series.last()?);
    let x_bounds = [first.0 - 0.5, last.0 + 0.5];

    let (y_min, y_max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    let y_bottom = if y_min.is_finite() && y_min < 0.0 { y_min * 1.1 } else { 0.0 };
    let y_top = if y_max.is_finite() && y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    Some((x_bounds, [y_bottom, y_top]))
}
