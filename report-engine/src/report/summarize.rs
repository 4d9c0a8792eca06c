use crate::report::error::ParseError;
use crate::report::kind::InputKind;
use crate::report::table::Table;
use tracing::debug;

/// Rows copied verbatim into the CSV digest
const SAMPLE_ROWS: usize = 3;

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Bounded-length digest of ingested data
///
/// The result never exceeds `max_chars` characters. Parse failures fall back
/// to truncating the raw text.
pub fn summarize(text: &str, kind: InputKind, max_chars: usize) -> String {
    let digest = match kind {
        InputKind::Csv => csv_digest(text),
        InputKind::Json => json_digest(text),
        InputKind::Text => return truncate_chars(text, max_chars),
    };

    match digest {
        Ok(digest) => truncate_chars(&digest, max_chars),
        Err(e) => {
            debug!("Summarization fell back to truncation: {}", e);
            truncate_chars(text, max_chars)
        }
    }
}

fn csv_digest(text: &str) -> Result<String, ParseError> {
    let table = Table::parse(text)?;

    let mut lines = vec![
        "[CSV Summary]".to_string(),
        format!(
            "Rows: {}, Columns: {}",
            table.row_count(),
            table.column_count()
        ),
        format!("Columns: {}", table.headers().join(", ")),
    ];

    let numeric = table.numeric_columns();
    if !numeric.is_empty() {
        lines.push("Numeric overview (mean/min/max):".to_string());
        lines.push(numeric_overview(&table, &numeric));
    }

    lines.push(format!("Sample (first {} rows):", SAMPLE_ROWS));
    lines.push(table.head(SAMPLE_ROWS).to_csv());

    Ok(lines.join("\n"))
}

/// mean/min/max block, one column per numeric field
fn numeric_overview(table: &Table, numeric: &[usize]) -> String {
    let names: Vec<&str> = numeric
        .iter()
        .map(|&idx| table.headers()[idx].as_str())
        .collect();
    let mut block = format!(",{}\n", names.join(","));
    let stats: [(&str, fn(&Table, usize) -> Option<f64>); 3] =
        [("mean", Table::mean), ("min", Table::min), ("max", Table::max)];

    for (label, stat) in stats {
        block.push_str(label);
        for &idx in numeric {
            block.push(',');
            if let Some(value) = stat(table, idx) {
                block.push_str(&format_stat(value));
            }
        }
        block.push('\n');
    }

    block
}

/// Float text the way the summary block shows statistics: whole numbers keep
/// one decimal place
fn format_stat(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn json_digest(text: &str) -> Result<String, ParseError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    Ok(serde_json::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALES: &str = "Region,Revenue,Leads\nWest,100,10\nEast,200,20\nNorth,300,30\nSouth,400,40\n";

    #[test]
    fn test_csv_digest_layout() {
        let out = summarize(SALES, InputKind::Csv, 10_000);
        let expected = "[CSV Summary]\n\
            Rows: 4, Columns: 3\n\
            Columns: Region, Revenue, Leads\n\
            Numeric overview (mean/min/max):\n\
            ,Revenue,Leads\n\
            mean,250.0,25.0\n\
            min,100.0,10.0\n\
            max,400.0,40.0\n\
            \n\
            Sample (first 3 rows):\n\
            Region,Revenue,Leads\n\
            West,100,10\n\
            East,200,20\n\
            North,300,30\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_csv_without_numeric_columns_skips_overview() {
        let out = summarize("Name\nA\nB\n", InputKind::Csv, 10_000);
        assert!(!out.contains("Numeric overview"));
        assert!(out.contains("Rows: 2, Columns: 1"));
    }

    #[test]
    fn test_fractional_stats_keep_precision() {
        assert_eq!(format_stat(2.5), "2.5");
        assert_eq!(format_stat(7.0), "7.0");
        assert_eq!(format_stat(1.0 / 3.0), "0.3333333333333333");
    }

    #[test]
    fn test_json_is_compacted() {
        let out = summarize("{\n  \"a\": [1, 2],\n  \"b\": \"x y\"\n}", InputKind::Json, 100);
        assert_eq!(out, r#"{"a":[1,2],"b":"x y"}"#);
    }

    #[test]
    fn test_bad_input_falls_back_to_truncation() {
        assert_eq!(summarize("{not json", InputKind::Json, 4), "{not");
        assert_eq!(summarize("a,b\n1,2,3\n", InputKind::Csv, 3), "a,b");
    }

    #[test]
    fn test_output_never_exceeds_max_chars() {
        let inputs = [
            (SALES, InputKind::Csv),
            (r#"{"k": "₹₹₹₹₹₹₹₹"}"#, InputKind::Json),
            ("नमस्ते दुनिया, plain text", InputKind::Text),
            ("", InputKind::Csv),
        ];
        for (text, kind) in inputs {
            for max in [0, 1, 5, 17, 64, 1200] {
                let out = summarize(text, kind, max);
                assert!(
                    out.chars().count() <= max,
                    "{:?} digest of {} chars exceeds {}",
                    kind,
                    out.chars().count(),
                    max
                );
            }
        }
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("₹123", 2), "₹1");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }
}
