/// A simple text table for terminal output
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.len()).collect();
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Add a row to the table. Cells beyond the header count are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, col) in row.iter().enumerate() {
            if i < self.col_widths.len() {
                self.col_widths[i] = self.col_widths[i].max(col.chars().count());
            }
        }

        self.rows.push(row);
    }

    /// Render the table with a header separator
    pub fn render(&self) -> String {
        let mut output = String::new();

        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        output
    }

    /// Render a single row with proper spacing
    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = self
            .col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let col = row.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", col, width = width)
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    /// Render a separator line
    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}
