#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Live WPM sampled at most once per elapsed whole second.
///
/// Later samples in the same second replace earlier ones, so the series holds
/// the value as of the last input in each second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WpmSeries {
    points: Vec<TimeSeriesPoint>,
}

impl WpmSeries {
    pub fn record(&mut self, elapsed_secs: f64, wpm: f64) {
        let bucket = elapsed_secs.ceil().max(1.0);
        match self.points.last_mut() {
            Some(last) if last.t == bucket => last.wpm = wpm,
            Some(last) if last.t > bucket => {}
            _ => self.points.push(TimeSeriesPoint::new(bucket, wpm)),
        }
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.wpm).fold(0.0, f64::max)
    }
}
