use typemaster::time_series::WpmSeries;

/// Axis bounds for the results chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    /// Seconds
    pub x_max: f64,
    /// WPM, rounded up to a multiple of ten
    pub y_max: f64,
}

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn chart_bounds(series: &WpmSeries, elapsed_seconds: u32) -> ChartBounds {
    let last = series.points().last().map(|p| p.t).unwrap_or(0.0);
    let x_max = last.max(elapsed_seconds as f64).max(1.0);
    let y_max = ((series.peak() / 10.0).ceil() * 10.0).max(10.0);

    ChartBounds { x_max, y_max }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
