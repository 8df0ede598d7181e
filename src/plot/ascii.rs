//! ASCII plotting of aggregate views for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - bar views: `#` columns
//! - line views: `o` at each group, `-` segments between them

use crate::domain::{AggregateView, ChartStyle};

/// Render one aggregate view in the style its group key calls for.
pub fn render_ascii_chart(view: &AggregateView, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    let Some(y_max) = view.max_value().filter(|&m| m > 0) else {
        out.push_str(&format!("Plot: {} (no data)\n", view.key.label()));
        return out;
    };

    let keys: Vec<i64> = view.iter().map(|(k, _)| k).collect();
    let (k_min, k_max) = (keys[0], keys[keys.len() - 1]);

    let mut grid = vec![vec![' '; width]; height];
    match view.key.chart_style() {
        ChartStyle::Bar => draw_bars(&mut grid, view, k_min, k_max, y_max),
        ChartStyle::Line => draw_polyline(&mut grid, view, k_min, k_max, y_max),
    }

    out.push_str(&format!(
        "Plot: {}=[{k_min}, {k_max}] | vehicles=[0, {y_max}]\n",
        view.key.label()
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn draw_bars(grid: &mut [Vec<char>], view: &AggregateView, k_min: i64, k_max: i64, y_max: u64) {
    let height = grid.len();
    let width = grid[0].len();
    for (k, v) in view.iter() {
        let x = map_x(k, k_min, k_max, width);
        let top = map_y(v, y_max, height);
        for row in grid.iter_mut().skip(top) {
            row[x] = '#';
        }
    }
}

fn draw_polyline(grid: &mut [Vec<char>], view: &AggregateView, k_min: i64, k_max: i64, y_max: u64) {
    let height = grid.len();
    let width = grid[0].len();

    let cells: Vec<(usize, usize)> = view
        .iter()
        .map(|(k, v)| (map_x(k, k_min, k_max, width), map_y(v, y_max, height)))
        .collect();

    for pair in cells.windows(2) {
        draw_line(grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '-');
    }
    // Markers last so they overwrite line segments.
    for &(x, y) in &cells {
        grid[y][x] = 'o';
    }
}

fn map_x(k: i64, k_min: i64, k_max: i64, width: usize) -> usize {
    if k_max == k_min {
        return 0;
    }
    let u = ((k - k_min) as f64 / (k_max - k_min) as f64).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(v: u64, y_max: u64, height: usize) -> usize {
    let u = (v as f64 / y_max as f64).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
