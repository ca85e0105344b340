use plotters::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use crate::models::Series;
use crate::services::exchange_service::ExchangeSnapshot;

/// Rendering errors
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Render task failed: {0}")]
    Background(String),
}

/// One line of the chart with its legend label and color
#[derive(Debug, Clone)]
pub struct ChartLine {
    pub series: Series,
    pub color: RGBColor,
}

/// Two series sharing one index axis, ready to be drawn
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub title: String,
    pub y_desc: String,
    pub lines: Vec<ChartLine>,
    /// Axis label for each index
    pub labels: Vec<String>,
}

impl ChartRequest {
    /// Source rates in blue, target rates in red
    pub fn from_snapshot(snapshot: &ExchangeSnapshot) -> Self {
        let y_desc = match &snapshot.base {
            Some(base) => format!("Units per 1 {}", base),
            None => "Rate".to_string(),
        };

        Self {
            title: format!("{} ({})", snapshot.pair, snapshot.interval),
            y_desc,
            lines: vec![
                ChartLine { series: snapshot.source_series.clone(), color: BLUE },
                ChartLine { series: snapshot.target_series.clone(), color: RED },
            ],
            labels: snapshot.labels.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Y axis bounds covering every line, padded by 10%
    pub fn value_range(&self) -> (f64, f64) {
        let bounds = self
            .lines
            .iter()
            .filter_map(|line| line.series.value_range())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));

        let Some((min_value, max_value)) = bounds else {
            return (0.0, 1.0);
        };

        let value_range = (max_value - min_value).max(1e-8);
        let padding = (value_range * 0.1).max(max_value.abs() * 0.01);
        ((min_value - padding).max(0.0), max_value + padding)
    }

    /// Number of index slots on the x axis
    pub fn index_span(&self) -> u32 {
        let highest_point = self
            .lines
            .iter()
            .flat_map(|line| line.series.points.iter().map(|p| p.index + 1))
            .max()
            .unwrap_or(0);
        (self.labels.len() as u32).max(highest_point).max(2)
    }
}

/// Draws a chart request somewhere
pub trait ChartRenderer: Send + Sync {
    fn render(&self, request: &ChartRequest) -> Result<(), ChartError>;
}

/// Writes charts as PNG files
pub struct PngChartRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl PngChartRenderer {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, request: &ChartRequest) -> Result<(), ChartError> {
        let backend = BitMapBackend::new(&self.path, (self.width, self.height));
        let root = backend.into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| ChartError::Drawing(format!("Failed to fill canvas: {}", e)))?;

        let (y_min, y_max) = request.value_range();
        let x_max = request.index_span() - 1;

        let mut chart = ChartBuilder::on(&root)
            .caption(&request.title, ("sans-serif", 32.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0u32..x_max, y_min..y_max)
            .map_err(|e| ChartError::Drawing(format!("Failed to build chart: {}", e)))?;

        let labels = &request.labels;
        let label_formatter = |index: &u32| labels.get(*index as usize).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(&request.y_desc)
            .x_labels(labels.len().clamp(2, 10))
            .x_label_formatter(&label_formatter)
            .draw()
            .map_err(|e| ChartError::Drawing(format!("Failed to draw mesh: {}", e)))?;

        for line in &request.lines {
            let color = line.color;
            let points: Vec<(u32, f64)> = line.series.points.iter().map(|p| (p.index, p.value)).collect();

            chart
                .draw_series(LineSeries::new(points.clone(), &color))
                .map_err(|e| ChartError::Drawing(format!("Failed to draw line: {}", e)))?
                .label(line.series.label.clone())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
                .map_err(|e| ChartError::Drawing(format!("Failed to draw points: {}", e)))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| ChartError::Drawing(format!("Failed to draw legend: {}", e)))?;

        root.present()
            .map_err(|e| ChartError::Drawing(format!("Failed to render chart: {}", e)))?;

        Ok(())
    }
}

/// Render off the async runtime threads
pub async fn render_in_background(
    renderer: Arc<dyn ChartRenderer>,
    request: ChartRequest,
) -> Result<(), ChartError> {
    tokio::task::spawn_blocking(move || renderer.render(&request))
        .await
        .map_err(|e| ChartError::Background(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesPoint;
    use std::sync::Mutex;

    fn line(label: &str, values: &[(u32, f64)], color: RGBColor) -> ChartLine {
        let points = values
            .iter()
            .map(|&(index, value)| SeriesPoint { index, value })
            .collect();
        ChartLine { series: Series::new(label, points), color }
    }

    fn request(lines: Vec<ChartLine>, labels: usize) -> ChartRequest {
        ChartRequest {
            title: "USD/GBP (week)".to_string(),
            y_desc: "Rate".to_string(),
            lines,
            labels: (0..labels).map(|i| format!("2024-01-0{}", i + 1)).collect(),
        }
    }

    #[test]
    fn test_value_range_spans_both_lines() {
        let request = request(
            vec![
                line("USD", &[(0, 1.0), (1, 1.0)], BLUE),
                line("GBP", &[(0, 0.8), (1, 0.79)], RED),
            ],
            2,
        );

        let (y_min, y_max) = request.value_range();
        assert!(y_min < 0.79 && y_min >= 0.0);
        assert!(y_max > 1.0);
    }

    #[test]
    fn test_empty_request_has_default_axes() {
        let request = request(vec![line("USD", &[], BLUE), line("GBP", &[], RED)], 0);

        assert_eq!(request.value_range(), (0.0, 1.0));
        assert_eq!(request.index_span(), 2);
    }

    #[test]
    fn test_index_span_covers_labels_and_points() {
        assert_eq!(request(vec![line("USD", &[(0, 1.0)], BLUE)], 7).index_span(), 7);
        assert_eq!(request(vec![line("USD", &[(9, 1.0)], BLUE)], 3).index_span(), 10);
    }

    struct RecordingRenderer {
        titles: Mutex<Vec<String>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, request: &ChartRequest) -> Result<(), ChartError> {
            self.titles.lock().unwrap().push(request.title.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_render_in_background_hands_request_to_renderer() {
        let renderer = Arc::new(RecordingRenderer { titles: Mutex::new(Vec::new()) });

        render_in_background(renderer.clone(), request(Vec::new(), 0)).await.unwrap();

        assert_eq!(*renderer.titles.lock().unwrap(), vec!["USD/GBP (week)".to_string()]);
    }
}
