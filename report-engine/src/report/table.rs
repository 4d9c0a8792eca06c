use crate::report::error::ParseError;
use std::collections::HashMap;

/// Cell text pandas reads as a missing value
fn is_missing(cell: &str) -> bool {
    matches!(
        cell.trim(),
        "" | "NA" | "N/A" | "NaN" | "nan" | "null" | "NULL" | "None"
    )
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

/// Column total: numeric when every present cell is a number, otherwise the
/// concatenated raw text
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Number(f64),
    Text(String),
}

impl Aggregate {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Aggregate::Number(n) => Some(*n),
            Aggregate::Text(_) => None,
        }
    }
}

/// Decoded CSV dataset
///
/// Cells keep their raw text; numeric interpretation happens per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_bytes(text.as_bytes())
    }

    /// Parse CSV bytes with a header row
    ///
    /// Blank lines are skipped, short rows are padded with empty cells and
    /// duplicate header names get `.1`, `.2` suffixes.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if raw_headers.is_empty() || (raw_headers.len() == 1 && raw_headers[0].is_empty()) {
            return Err(ParseError::Empty);
        }
        let headers = dedupe_headers(raw_headers);
        let width = headers.len();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            if record.len() > width {
                return Err(ParseError::RaggedRow {
                    line: idx + 2,
                    expected: width,
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Index of the column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Lower-cased column name to index; later duplicates win
    pub fn lowercase_index(&self) -> HashMap<String, usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.to_lowercase(), idx))
            .collect()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn map_column<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(idx) {
                let updated = f(cell.as_str());
                *cell = updated;
            }
        }
    }

    fn present_cells(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx))
            .map(String::as_str)
            .filter(|cell| !is_missing(cell))
    }

    /// Numeric values of a column, or None when any present cell is not a number
    /// or the column has no present cells
    pub fn numeric_values(&self, idx: usize) -> Option<Vec<f64>> {
        let values: Option<Vec<f64>> = self.present_cells(idx).map(parse_number).collect();
        values.filter(|v| !v.is_empty())
    }

    /// Indices of numeric columns in header order
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.headers.len())
            .filter(|&idx| self.numeric_values(idx).is_some())
            .collect()
    }

    /// Column total, skipping missing cells
    pub fn sum(&self, idx: usize) -> Aggregate {
        if self.present_cells(idx).next().is_none() {
            return Aggregate::Number(0.0);
        }
        match self.numeric_values(idx) {
            Some(values) => Aggregate::Number(values.iter().sum()),
            None => Aggregate::Text(self.present_cells(idx).collect::<String>()),
        }
    }

    /// Column mean, None for empty or non-numeric columns
    pub fn mean(&self, idx: usize) -> Option<f64> {
        let values = self.numeric_values(idx)?;
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    pub fn min(&self, idx: usize) -> Option<f64> {
        self.numeric_values(idx)?.into_iter().reduce(f64::min)
    }

    pub fn max(&self, idx: usize) -> Option<f64> {
        self.numeric_values(idx)?.into_iter().reduce(f64::max)
    }

    /// Serialize back to comma-delimited text with a header row
    pub fn to_csv(&self) -> String {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        // Writing into a Vec cannot fail
        let _ = writer.write_record(&self.headers);
        for row in &self.rows {
            let _ = writer.write_record(row);
        }

        match writer.into_inner() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }
}

fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());

    for name in raw {
        let mut candidate = name.clone();
        while headers.contains(&candidate) {
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{}.{}", name, count);
        }
        headers.push(candidate);
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES: &str = "Region,Revenue,Leads,ClosedDeals\nWest,100,10,2\nEast,200,20,5\n";

    #[test]
    fn test_parse_counts() {
        let table = Table::parse(SALES).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.headers()[3], "ClosedDeals");
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(Table::parse(""), Err(ParseError::Empty)));
    }

    #[test]
    fn test_parse_rejects_rows_wider_than_header() {
        let result = Table::parse("a,b\n1,2,3\n");
        assert!(matches!(
            result,
            Err(ParseError::RaggedRow {
                line: 2,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_short_rows_are_padded_and_blank_lines_skipped() {
        let table = Table::parse("a,b,c\n1,2\n\n4,5,6\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_duplicate_headers_are_made_unique() {
        let table = Table::parse("A,A,B,A\n1,2,3,4\n").unwrap();
        assert_eq!(table.headers(), &["A", "A.1", "B", "A.2"]);
    }

    #[test]
    fn test_numeric_columns_and_stats() {
        let table = Table::parse(SALES).unwrap();
        assert_eq!(table.numeric_columns(), vec![1, 2, 3]);
        assert_eq!(table.sum(1), Aggregate::Number(300.0));
        assert_eq!(table.mean(2), Some(15.0));
        assert_eq!(table.min(3), Some(2.0));
        assert_eq!(table.max(3), Some(5.0));
        assert_eq!(table.mean(0), None);
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        let table = Table::parse("x\n1\n\nNA\n3\n").unwrap();
        assert_eq!(table.sum(0), Aggregate::Number(4.0));
        assert_eq!(table.mean(0), Some(2.0));
    }

    #[test]
    fn test_text_column_sum_is_concatenation() {
        let table = Table::parse("x\nab\ncd\n").unwrap();
        assert_eq!(table.sum(0), Aggregate::Text("abcd".to_string()));
    }

    #[test]
    fn test_to_csv_round_trips_quoting() {
        let text = "name,note\nA,\"hello, world\"\n";
        let table = Table::parse(text).unwrap();
        assert_eq!(table.to_csv(), text);
    }

    #[test]
    fn test_head_keeps_headers() {
        let table = Table::parse(SALES).unwrap().head(1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.to_csv(), "Region,Revenue,Leads,ClosedDeals\nWest,100,10,2\n");
    }
}
