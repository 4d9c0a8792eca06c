use crate::report::kind::ReportKind;
use crate::report::table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Column whose values get localized
pub const REGION_COLUMN: &str = "Region";

/// Locale-specific names for the four compass regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionMapping {
    pub west: String,
    pub east: String,
    pub north: String,
    pub south: String,
}

impl Default for RegionMapping {
    fn default() -> Self {
        Self {
            west: "Maharashtra".to_string(),
            east: "West Bengal".to_string(),
            north: "Delhi".to_string(),
            south: "Karnataka".to_string(),
        }
    }
}

impl RegionMapping {
    /// Target label for an exact source label
    pub fn lookup(&self, label: &str) -> Option<&str> {
        match label {
            "West" => Some(self.west.as_str()),
            "East" => Some(self.east.as_str()),
            "North" => Some(self.north.as_str()),
            "South" => Some(self.south.as_str()),
            _ => None,
        }
    }

    /// Override the target for one source label (case-insensitive).
    /// Returns false for labels outside the four regions.
    pub fn set(&mut self, label: &str, target: &str) -> bool {
        let slot = match label.trim().to_lowercase().as_str() {
            "west" => &mut self.west,
            "east" => &mut self.east,
            "north" => &mut self.north,
            "south" => &mut self.south,
            _ => return false,
        };
        *slot = target.trim().to_string();
        true
    }
}

/// Replace sales `Region` values using the mapping
///
/// Input that is not parseable CSV, lacks a `Region` column or belongs to
/// another report type comes back unchanged.
pub fn localize_regions(csv_text: &str, kind: ReportKind, mapping: &RegionMapping) -> String {
    if kind != ReportKind::Sales {
        return csv_text.to_string();
    }

    let mut table = match Table::parse(csv_text) {
        Ok(table) => table,
        Err(e) => {
            debug!("Skipping region localization: {}", e);
            return csv_text.to_string();
        }
    };

    let Some(idx) = table.column_index(REGION_COLUMN) else {
        return csv_text.to_string();
    };

    table.map_column(idx, |value| {
        mapping
            .lookup(value)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    });
    table.to_csv()
}
