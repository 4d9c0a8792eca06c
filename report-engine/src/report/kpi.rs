use crate::report::kind::ReportKind;
use crate::report::table::{Aggregate, Table};
use std::collections::HashMap;
use tracing::{debug, info};

/// Response-time columns for support reports, in lookup order
const RESPONSE_TIME_ALIASES: [&str; 3] = ["avgresponsetime(min)", "avgresponsetime", "response_time"];

/// Ordered (label, formatted value) rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiTable {
    rows: Vec<(String, String)>,
}

impl KpiTable {
    pub fn push(&mut self, label: &str, value: String) {
        self.rows.push((label.to_string(), value));
    }

    pub fn rows(&self) -> &[(String, String)] {
        &self.rows
    }

    /// Fallback table of row and column counts
    pub fn counts(table: Option<&Table>) -> Self {
        let (rows, columns) = match table {
            Some(t) => (t.row_count().to_string(), t.column_count().to_string()),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        let mut kpis = KpiTable::default();
        kpis.push("Rows", rows);
        kpis.push("Columns", columns);
        kpis
    }

    pub fn to_markdown(&self) -> String {
        let mut lines = vec!["| KPI | Value |".to_string(), "|---|---|".to_string()];
        for (label, value) in &self.rows {
            lines.push(format!("| {} | {} |", label, value));
        }
        lines.join("\n")
    }
}

/// Number formatting preferences for KPI values
#[derive(Debug, Clone, Default)]
pub struct NumberFormat {
    pub currency_symbol: Option<String>,
    /// Indian digit grouping (12,34,567) instead of thousands grouping
    pub locale_grouping: bool,
}

impl NumberFormat {
    /// Rounded, grouped and currency-prefixed number
    pub fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        // integral floats print exactly, so no integer cast can saturate
        let rounded = value.round_ties_even();
        let digits = format!("{:.0}", rounded.abs());
        let grouped = if self.locale_grouping {
            group_indian(&digits)
        } else {
            group_thousands(&digits)
        };
        let sign = if rounded < 0.0 { "-" } else { "" };
        match self.currency_symbol.as_deref().filter(|s| !s.is_empty()) {
            Some(symbol) => format!("{}{}{}", symbol, sign, grouped),
            None => format!("{}{}", sign, grouped),
        }
    }

    /// Non-numeric totals keep their literal text
    pub fn format(&self, value: &Aggregate) -> String {
        match value {
            Aggregate::Number(n) => self.format_number(*n),
            Aggregate::Text(s) => s.clone(),
        }
    }
}

/// Indian numbering of an unsigned digit string: last three digits, then
/// groups of two
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        digits.to_string()
    } else {
        let (rest, last3) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut rest = rest;
        while rest.len() > 2 {
            let (head, tail) = rest.split_at(rest.len() - 2);
            parts.insert(0, tail);
            rest = head;
        }
        if !rest.is_empty() {
            parts.insert(0, rest);
        }
        parts.push(last3);
        parts.join(",")
    }
}

/// Standard thousands grouping of an unsigned digit string
pub fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn percent(numerator: &Aggregate, denominator: &Aggregate) -> Option<String> {
    let num = numerator.as_number()?;
    let den = denominator.as_number().filter(|d| *d != 0.0)?;
    Some(format!("{:.1}%", num / den * 100.0))
}

/// Case-insensitive lookup of every required column
fn required_columns(
    index: &HashMap<String, usize>,
    names: &[&str],
) -> Option<Vec<usize>> {
    names.iter().map(|name| index.get(*name).copied()).collect()
}

fn sales_kpis(table: &Table, fmt: &NumberFormat) -> Option<KpiTable> {
    let cols = required_columns(&table.lowercase_index(), &["revenue", "leads", "closeddeals"])?;
    let revenue = table.sum(cols[0]);
    let leads = table.sum(cols[1]);
    let deals = table.sum(cols[2]);

    let mut kpis = KpiTable::default();
    kpis.push("Total Revenue", fmt.format(&revenue));
    if let Some(conversion) = percent(&deals, &leads) {
        kpis.push("Lead→Deal Conversion %", conversion);
    }
    kpis.push("Total Leads", fmt.format(&leads));
    kpis.push("Total Closed Deals", fmt.format(&deals));
    Some(kpis)
}

fn hr_kpis(table: &Table, fmt: &NumberFormat) -> Option<KpiTable> {
    let cols = required_columns(&table.lowercase_index(), &["hires", "attrition"])?;
    let hires = table.sum(cols[0]);
    let attrition = table.sum(cols[1]);

    let mut kpis = KpiTable::default();
    kpis.push("Total Hires", fmt.format(&hires));
    kpis.push("Total Attrition", fmt.format(&attrition));
    if let Some(rate) = percent(&attrition, &hires) {
        kpis.push("Attrition Rate %", rate);
    }
    Some(kpis)
}

fn finance_kpis(table: &Table, fmt: &NumberFormat) -> Option<KpiTable> {
    let cols = required_columns(&table.lowercase_index(), &["revenue", "costs", "profit"])?;
    let revenue = table.sum(cols[0]);
    let costs = table.sum(cols[1]);
    let profit = table.sum(cols[2]);

    let mut kpis = KpiTable::default();
    kpis.push("Total Revenue", fmt.format(&revenue));
    kpis.push("Total Costs", fmt.format(&costs));
    kpis.push("Total Profit", fmt.format(&profit));
    if let Some(margin) = percent(&profit, &revenue) {
        kpis.push("Profit Margin %", margin);
    }
    Some(kpis)
}

fn support_kpis(table: &Table, fmt: &NumberFormat) -> Option<KpiTable> {
    let index = table.lowercase_index();
    let cols = required_columns(&index, &["ticketsraised", "ticketsresolved"])?;
    let raised = table.sum(cols[0]);
    let resolved = table.sum(cols[1]);

    // only the first alias present is consulted
    let avg_response = RESPONSE_TIME_ALIASES
        .iter()
        .find_map(|alias| index.get(*alias))
        .and_then(|&idx| table.mean(idx));

    let mut kpis = KpiTable::default();
    kpis.push("Tickets Raised", fmt.format(&raised));
    kpis.push("Tickets Resolved", fmt.format(&resolved));
    if let Some(rate) = percent(&resolved, &raised) {
        kpis.push("Resolution Rate %", rate);
    }
    if let Some(minutes) = avg_response {
        kpis.push("Avg Response Time (min)", format!("{:.0}", minutes));
    }
    Some(kpis)
}

/// Domain KPIs for a report kind, None when required columns are missing
pub fn compute_kpis(kind: ReportKind, table: &Table, fmt: &NumberFormat) -> Option<KpiTable> {
    match kind {
        ReportKind::Sales => sales_kpis(table, fmt),
        ReportKind::Hr => hr_kpis(table, fmt),
        ReportKind::Finance => finance_kpis(table, fmt),
        ReportKind::Support => support_kpis(table, fmt),
    }
}

/// Markdown KPI table for CSV data
///
/// Always returns a non-empty table: missing columns fall back to row and
/// column counts, unparseable CSV to `N/A` counts.
pub fn build_kpi_table(
    csv_text: &str,
    kind: ReportKind,
    currency_symbol: Option<&str>,
    use_locale_grouping: bool,
) -> String {
    let fmt = NumberFormat {
        currency_symbol: currency_symbol.map(str::to_string),
        locale_grouping: use_locale_grouping,
    };

    let kpis = match Table::parse(csv_text) {
        Ok(table) => match compute_kpis(kind, &table, &fmt) {
            Some(kpis) => {
                info!("Computed {} KPIs for {}", kpis.rows().len(), kind);
                kpis
            }
            None => {
                debug!("Required KPI columns missing for {}, using counts", kind);
                KpiTable::counts(Some(&table))
            }
        },
        Err(e) => {
            debug!("KPI table fell back to N/A: {}", e);
            KpiTable::counts(None)
        }
    };

    kpis.to_markdown()
}
