use crate::report::kind::{InputKind, ReportKind};
use crate::report::kpi::build_kpi_table;
use crate::report::localize::{localize_regions, RegionMapping};
use crate::report::render::{render, PromptPair, RenderingContext};
use crate::report::summarize::summarize;
use crate::report::templates::Template;
use tracing::info;

pub const DEFAULT_SUMMARIZE_CHARS: usize = 1200;
pub const DEFAULT_CURRENCY: &str = "₹";

/// Sales figures are always reported in rupees with Indian grouping
const SALES_CURRENCY_HINT: &str = "Currency: INR (₹)";

/// Everything needed to turn ingested data into a prompt
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub input_kind: InputKind,
    pub audience_role: String,
    /// Output of `ingest`
    pub data_text: String,
    pub timeframe: Option<String>,
    pub extra_vars: RenderingContext,
    pub summarize: bool,
    pub summarize_chars: usize,
    pub region_mapping: RegionMapping,
}

/// Pipeline output, shown to the user before any generation call
#[derive(Debug, Clone)]
pub struct PreparedReport {
    pub prompt: PromptPair,
    /// Data text after localization, shown as the input preview
    pub data_text: String,
    /// Text bound to the template's data placeholder
    pub digest: String,
    pub kpi_table: Option<String>,
    pub estimated_tokens: usize,
}

/// Very rough heuristic: ~4 chars per token, never below 1
pub fn estimate_tokens(texts: &[&str]) -> usize {
    let total_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
    (total_chars / 4).max(1)
}

/// Extra template variables a report kind always carries
pub fn extra_vars_for(kind: ReportKind, currency: Option<&str>) -> RenderingContext {
    let mut vars = RenderingContext::new();
    if kind == ReportKind::Finance {
        vars.insert(
            "currency".to_string(),
            currency.unwrap_or(DEFAULT_CURRENCY).to_string(),
        );
    }
    vars
}

/// Currency symbol and grouping used for a report's KPI table
fn kpi_number_style(request: &ReportRequest) -> (Option<&str>, bool) {
    match request.kind {
        ReportKind::Sales => (Some(DEFAULT_CURRENCY), true),
        ReportKind::Finance => (request.extra_vars.get("currency").map(String::as_str), false),
        ReportKind::Hr | ReportKind::Support => (None, false),
    }
}

/// Localize, summarize, attach KPIs and render the prompt
pub fn prepare(template: &Template, request: &ReportRequest) -> PreparedReport {
    let is_csv = request.input_kind == InputKind::Csv;

    let data_text = if is_csv {
        localize_regions(&request.data_text, request.kind, &request.region_mapping)
    } else {
        request.data_text.clone()
    };

    let mut digest = if request.summarize {
        summarize(&data_text, request.input_kind, request.summarize_chars)
    } else {
        data_text.clone()
    };

    let kpi_table = if is_csv {
        let (currency, locale_grouping) = kpi_number_style(request);
        let table = build_kpi_table(&data_text, request.kind, currency, locale_grouping);
        digest = format!("{}\n\n[KPI Table]\n{}", digest, table);
        Some(table)
    } else {
        None
    };

    if is_csv && request.kind == ReportKind::Sales {
        digest = format!("{}\n\n{}", SALES_CURRENCY_HINT, digest);
    }

    let prompt = render(
        template,
        &request.audience_role,
        &digest,
        request.timeframe.as_deref(),
        Some(&request.extra_vars),
    );
    let estimated_tokens = estimate_tokens(&[&prompt.system, &prompt.user]);
    info!(
        "Prepared {} prompt: ~{} tokens",
        request.kind, estimated_tokens
    );

    PreparedReport {
        prompt,
        data_text,
        digest,
        kpi_table,
        estimated_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::templates::TemplateStore;

    fn request(kind: ReportKind, input_kind: InputKind, data: &str) -> ReportRequest {
        ReportRequest {
            kind,
            input_kind,
            audience_role: "CEO".to_string(),
            data_text: data.to_string(),
            timeframe: None,
            extra_vars: extra_vars_for(kind, None),
            summarize: true,
            summarize_chars: DEFAULT_SUMMARIZE_CHARS,
            region_mapping: RegionMapping::default(),
        }
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(&[]), 1);
        assert_eq!(estimate_tokens(&["abcd", "efgh"]), 2);
        assert_eq!(estimate_tokens(&["abc"]), 1);
    }

    #[test]
    fn test_sales_csv_pipeline() {
        let template = TemplateStore::builtin().load(ReportKind::Sales).unwrap();
        let csv = "Region,Revenue,Leads,ClosedDeals\nWest,100000,10,2\nSouth,200000,20,5\n";
        let prepared = prepare(&template, &request(ReportKind::Sales, InputKind::Csv, csv));

        assert!(prepared.digest.starts_with("Currency: INR (₹)\n\n[CSV Summary]"));
        assert!(prepared.data_text.contains("Maharashtra"));
        assert!(prepared.data_text.contains("Karnataka"));
        let kpis = prepared.kpi_table.as_deref().unwrap();
        assert!(kpis.contains("| Total Revenue | ₹3,00,000 |"));
        assert!(kpis.contains("| Total Leads | ₹30 |"));
        assert!(prepared.prompt.user.contains("[KPI Table]"));
        assert!(prepared.prompt.user.contains("last quarter"));
        assert!(prepared.prompt.user.contains("CEO"));
        assert!(prepared.estimated_tokens > 1);
    }

    #[test]
    fn test_finance_uses_currency_variable() {
        let template = TemplateStore::builtin().load(ReportKind::Finance).unwrap();
        let mut req = request(
            ReportKind::Finance,
            InputKind::Csv,
            "Revenue,Costs,Profit\n1000000,600000,400000\n",
        );
        req.extra_vars = extra_vars_for(ReportKind::Finance, Some("$"));
        req.timeframe = Some("FY2024".to_string());

        let prepared = prepare(&template, &req);
        let kpis = prepared.kpi_table.unwrap();
        assert!(kpis.contains("| Total Revenue | $1,000,000 |"));
        assert!(kpis.contains("| Profit Margin % | 40.0% |"));
        assert!(prepared.prompt.user.contains("Express all amounts in $"));
        assert!(prepared.prompt.user.contains("FY2024"));
    }

    #[test]
    fn test_json_input_has_no_kpi_table() {
        let template = TemplateStore::builtin().load(ReportKind::Support).unwrap();
        let prepared = prepare(
            &template,
            &request(ReportKind::Support, InputKind::Json, "{\n  \"tickets\": 12\n}"),
        );
        assert!(prepared.kpi_table.is_none());
        assert_eq!(prepared.digest, r#"{"tickets":12}"#);
        assert!(prepared.prompt.user.contains(r#"{"tickets":12}"#));
    }

    #[test]
    fn test_summarize_off_keeps_raw_text() {
        let template = TemplateStore::builtin().load(ReportKind::Hr).unwrap();
        let mut req = request(ReportKind::Hr, InputKind::Text, "Hired 4 engineers.");
        req.summarize = false;
        let prepared = prepare(&template, &req);
        assert_eq!(prepared.digest, "Hired 4 engineers.");
    }
}
