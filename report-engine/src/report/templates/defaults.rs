//! Report templates bundled into the binary
//!
//! Used when no templates directory is configured.
use crate::report::kind::ReportKind;

pub const SALES_REPORT: &str = include_str!("../../../templates/sales_report.json");

pub const HR_HIRING_SUMMARY: &str = include_str!("../../../templates/hr_hiring_summary.json");

pub const FINANCE_KPI_SNAPSHOT: &str =
    include_str!("../../../templates/finance_kpi_snapshot.json");

pub const SUPPORT_REPORT: &str = include_str!("../../../templates/support_report.json");

/// Get a built-in template by file name (e.g. "sales_report.json")
pub fn get_builtin_template(file_name: &str) -> Option<&'static str> {
    match file_name {
        "sales_report.json" => Some(SALES_REPORT),
        "hr_hiring_summary.json" => Some(HR_HIRING_SUMMARY),
        "finance_kpi_snapshot.json" => Some(FINANCE_KPI_SNAPSHOT),
        "support_report.json" => Some(SUPPORT_REPORT),
        _ => None,
    }
}

/// Built-in template content for a report kind
pub fn builtin_for(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Sales => SALES_REPORT,
        ReportKind::Hr => HR_HIRING_SUMMARY,
        ReportKind::Finance => FINANCE_KPI_SNAPSHOT,
        ReportKind::Support => SUPPORT_REPORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_valid_json() {
        for kind in ReportKind::ALL {
            let result = serde_json::from_str::<serde_json::Value>(builtin_for(kind));
            assert!(
                result.is_ok(),
                "Built-in template '{}' contains invalid JSON: {:?}",
                kind.template_file(),
                result.err()
            );
        }
    }

    #[test]
    fn test_get_builtin_template() {
        for kind in ReportKind::ALL {
            assert!(get_builtin_template(kind.template_file()).is_some());
        }
        assert!(get_builtin_template("nonexistent.json").is_none());
    }

    #[test]
    fn test_builtin_user_prompt_mentions_data_key() {
        for kind in ReportKind::ALL {
            let placeholder = format!("{{{}}}", kind.data_key());
            assert!(
                builtin_for(kind).contains(&placeholder),
                "{} template lacks {}",
                kind,
                placeholder
            );
        }
    }
}
