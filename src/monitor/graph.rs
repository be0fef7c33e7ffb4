//! Block-character latency chart.
//!
//! The chart is rasterized into a grid of [`Cell`]s first and only turned
//! into colored text at the end, so the geometry can be checked without
//! terminal escape codes.

use crate::monitor::constants::{
    PLOT_MIN_HEIGHT, PLOT_MIN_WIDTH, PLOT_MIN_Y_UPPER_MS, PLOT_Y_HEADROOM,
};
use colored::*;

/// Width of the y-axis label gutter, including the axis line
pub const LABEL_GUTTER: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Bar,
    Failure,
}

/// Upper limit of the y-axis.
///
/// Grows past the configured reference so the largest latency keeps some
/// headroom, and never drops below the minimum range.
pub fn y_axis_upper(plot_values: &[f64], graph_y_max: f64) -> f64 {
    let data_max = plot_values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(0.0, f64::max);
    let candidate = if data_max > 0.0 {
        data_max * PLOT_Y_HEADROOM
    } else {
        graph_y_max
    };
    graph_y_max.max(candidate).max(PLOT_MIN_Y_UPPER_MS)
}

/// `count` evenly spaced tick values from zero to `upper`
pub fn y_ticks(upper: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![0.0, upper];
    }
    let step = upper / (count - 1) as f64;
    (0..count).map(|i| i as f64 * step).collect()
}

/// One plotted column: the tallest latency in its bucket, and whether any
/// probe in the bucket failed
#[derive(Debug, Clone, Copy, PartialEq)]
struct Column {
    value: f64,
    failed: bool,
}

/// Fold the samples into at most `width` columns, oldest on the left
fn bucket(plot_values: &[f64], failure_indices: &[usize], width: usize) -> Vec<Column> {
    let len = plot_values.len();
    let columns = len.min(width);
    (0..columns)
        .map(|c| {
            let start = c * len / columns;
            let end = ((c + 1) * len / columns).max(start + 1);
            Column {
                value: plot_values[start..end].iter().copied().fold(0.0, f64::max),
                failed: failure_indices.iter().any(|i| (start..end).contains(i)),
            }
        })
        .collect()
}

/// Rasterized chart with its axis scale
#[derive(Debug, Clone)]
pub struct Chart {
    /// Rows top to bottom
    rows: Vec<Vec<Cell>>,
    upper: f64,
    ticks: Vec<f64>,
}

impl Chart {
    pub fn rasterize(
        plot_values: &[f64],
        failure_indices: &[usize],
        graph_y_max: f64,
        y_tick_count: usize,
        width: usize,
        height: usize,
    ) -> Self {
        let width = width.max(PLOT_MIN_WIDTH);
        let height = height.max(PLOT_MIN_HEIGHT);
        let upper = y_axis_upper(plot_values, graph_y_max);

        let mut rows = vec![vec![Cell::Empty; width]; height];
        for (x, column) in bucket(plot_values, failure_indices, width).iter().enumerate() {
            let filled = ((column.value / upper) * height as f64).round() as usize;
            for level in 0..filled.min(height) {
                rows[height - 1 - level][x] = Cell::Bar;
            }
            if column.failed && filled == 0 {
                rows[height - 1][x] = Cell::Failure;
            }
        }

        Self {
            rows,
            upper,
            ticks: y_ticks(upper, y_tick_count),
        }
    }

    fn height(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Row that carries the label for `tick`
    fn tick_row(&self, tick: f64) -> usize {
        let last = self.height() - 1;
        let from_bottom = ((tick / self.upper) * last as f64).round() as usize;
        last - from_bottom.min(last)
    }

    /// Colored text lines: y-axis labels, the plot and the x-axis
    pub fn to_lines(&self) -> Vec<String> {
        let mut labels = vec![None; self.height()];
        for &tick in &self.ticks {
            labels[self.tick_row(tick)] = Some(tick);
        }

        let mut lines = Vec::with_capacity(self.height() + 1);
        for (row, label) in self.rows.iter().zip(labels) {
            let gutter = match label {
                Some(tick) => format!("{:>7.0} ┤", tick),
                None => format!("{:>8}│", ""),
            };
            let body: String = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => " ".to_string(),
                    Cell::Bar => "█".cyan().to_string(),
                    Cell::Failure => "x".red().bold().to_string(),
                })
                .collect();
            lines.push(format!("{}{}", gutter.dimmed(), body));
        }

        let width = self.rows.first().map_or(0, Vec::len);
        let axis = format!("{:>8}└{}", "", "─".repeat(width));
        lines.push(axis.dimmed().to_string());
        lines
    }

    /// Total width of a rendered line, gutter included
    pub fn rendered_width(&self) -> usize {
        LABEL_GUTTER + self.rows.first().map_or(0, Vec::len)
    }
}
