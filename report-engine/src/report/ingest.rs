use crate::report::error::ParseError;
use crate::report::kind::InputKind;
use crate::report::table::Table;
use tracing::info;

/// Convert uploaded file content into normalized text
///
/// # Arguments
/// * `bytes` - Raw file content
/// * `kind` - Declared input kind
/// * `sample_rows` - For CSV, keep only the first N rows when positive
///
/// # Returns
/// Canonical CSV, pretty-printed JSON or best-effort decoded text.
/// The plain-text path never fails.
pub fn ingest(bytes: &[u8], kind: InputKind, sample_rows: Option<usize>) -> Result<String, ParseError> {
    match kind {
        InputKind::Csv => {
            let mut table = Table::parse_bytes(bytes)?;
            if let Some(n) = sample_rows.filter(|&n| n > 0) {
                table = table.head(n);
            }
            info!(
                "Ingested CSV with {} rows and {} columns",
                table.row_count(),
                table.column_count()
            );
            Ok(table.to_csv())
        }
        InputKind::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            Ok(serde_json::to_string_pretty(&value)?)
        }
        InputKind::Text => Ok(decode_lossy(bytes)),
    }
}

/// Decode UTF-8, dropping undecodable bytes
fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => rest = &after[len..],
                    // truncated sequence at the end of input
                    None => break,
                }
            }
        }
    }
    out
}
