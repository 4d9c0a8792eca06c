use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Report domains supported by the prompt pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Sales,
    Hr,
    Finance,
    Support,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Sales,
        ReportKind::Hr,
        ReportKind::Finance,
        ReportKind::Support,
    ];

    /// Human-readable report title
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportKind::Sales => "Sales Performance Report",
            ReportKind::Hr => "HR Hiring Summary",
            ReportKind::Finance => "Financial KPI Snapshot",
            ReportKind::Support => "Customer Support Report",
        }
    }

    /// File name of the template inside the templates directory
    pub fn template_file(&self) -> &'static str {
        match self {
            ReportKind::Sales => "sales_report.json",
            ReportKind::Hr => "hr_hiring_summary.json",
            ReportKind::Finance => "finance_kpi_snapshot.json",
            ReportKind::Support => "support_report.json",
        }
    }

    /// Placeholder that receives the data digest in this domain's user prompt
    pub fn data_key(&self) -> &'static str {
        match self {
            ReportKind::Sales => "sales_data",
            ReportKind::Hr => "hr_data",
            ReportKind::Finance => "finance_data",
            ReportKind::Support => "support_data",
        }
    }

    /// Short identifier used on the command line
    pub fn id(&self) -> &'static str {
        match self {
            ReportKind::Sales => "sales",
            ReportKind::Hr => "hr",
            ReportKind::Finance => "finance",
            ReportKind::Support => "support",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    /// Accepts the short id or the display name (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.id() == wanted || kind.display_name().to_lowercase() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unsupported report type: {}. Expected one of: sales, hr, finance, support",
                    s
                )
            })
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Declared kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Csv,
    Json,
    Text,
}

impl InputKind {
    /// Infers the kind from a file extension; anything unknown is plain text
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("csv") => InputKind::Csv,
            Some("json") => InputKind::Json,
            _ => InputKind::Text,
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Unsupported input type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_from_id_and_display_name() {
        assert_eq!("sales".parse::<ReportKind>(), Ok(ReportKind::Sales));
        assert_eq!(
            "Financial KPI Snapshot".parse::<ReportKind>(),
            Ok(ReportKind::Finance)
        );
        assert_eq!("HR".parse::<ReportKind>(), Ok(ReportKind::Hr));
        assert!("marketing".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_input_kind_from_path() {
        assert_eq!(InputKind::from_path(Path::new("data.CSV")), InputKind::Csv);
        assert_eq!(InputKind::from_path(Path::new("a/b.json")), InputKind::Json);
        assert_eq!(InputKind::from_path(Path::new("notes.md")), InputKind::Text);
        assert_eq!(InputKind::from_path(Path::new("noext")), InputKind::Text);
    }
}
