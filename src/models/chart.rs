//! Chart series models

/// A single data point on a rate chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub index: u32,
    pub value: f64,
}

/// A labelled sequence of points, sorted ascending by index
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(label: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.index);
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest and highest value, or `None` for an empty series
    pub fn value_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let min = self.points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}
