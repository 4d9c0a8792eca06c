use crate::config::{api_key_from_env, ReportConfig};
use crate::report::error::ProviderError;
use crate::report::ingest::ingest;
use crate::report::kind::{InputKind, ReportKind};
use crate::report::llm_client::{generate_report, GenerationParams, LLMProvider};
use crate::report::output::{clean_llm_markdown_output, write_report, DEFAULT_REPORT_FILE};
use crate::report::pipeline::{extra_vars_for, prepare, PreparedReport, ReportRequest};
use crate::report::table::Table;
use crate::report::templates::TemplateStore;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

/// Rows shown in the input preview
const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Parser)]
#[command(
    name = "report-pack",
    version,
    about = "Generate executive-style reports from CSV/JSON/Text using prompt templates"
)]
pub struct Cli {
    /// Preferences file (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read templates from this directory instead of the built-in ones
    #[arg(long, global = true)]
    pub templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available report templates
    Templates,
    /// Render the prompt without calling a provider
    Preview(PromptArgs),
    /// Render the prompt and generate the report
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
pub struct PromptArgs {
    /// Report type: sales, hr, finance or support
    #[arg(long, short)]
    pub report: ReportKind,

    /// Data file to ground the report in
    #[arg(long, short)]
    pub input: PathBuf,

    /// Input type: csv, json or text (inferred from the extension when omitted)
    #[arg(long)]
    pub kind: Option<InputKind>,

    /// Who the report is written for (CEO, Manager, Analyst, CFO, CHRO, Support Manager)
    #[arg(long, default_value = "CEO")]
    pub audience: String,

    #[arg(long)]
    pub timeframe: Option<String>,

    /// Currency symbol/code for finance reports
    #[arg(long)]
    pub currency: Option<String>,

    /// Send the full input instead of a local summary
    #[arg(long)]
    pub no_summarize: bool,

    #[arg(long)]
    pub summarize_chars: Option<usize>,

    /// CSV: sample the first N rows
    #[arg(long)]
    pub sample_rows: Option<usize>,

    /// Region label override, e.g. --region West=Gujarat
    #[arg(long = "region", value_parser = parse_region)]
    pub regions: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// gemini, openrouter or preview
    #[arg(long)]
    pub provider: Option<LLMProvider>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// API key (defaults to GEMINI_API_KEY / OPENROUTER_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Where to write the generated report
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    pub out: PathBuf,

    /// Show raw API payload/response
    #[arg(long)]
    pub debug: bool,
}

fn parse_region(s: &str) -> Result<(String, String), String> {
    let (label, target) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=NAME, got '{}'", s))?;
    Ok((label.trim().to_string(), target.trim().to_string()))
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = ReportConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.templates_dir {
        config.templates_dir = Some(dir);
    }

    let store = match &config.templates_dir {
        Some(dir) => TemplateStore::from_dir(dir),
        None => TemplateStore::builtin(),
    };

    match cli.command {
        Command::Templates => {
            list_templates(&store);
            Ok(())
        }
        Command::Preview(args) => {
            let (config, prepared) = prepare_from_args(&store, config, &args)?;
            print_prepared(&prepared, config.max_tokens);
            Ok(())
        }
        Command::Generate(args) => generate(&store, config, args).await,
    }
}

fn list_templates(store: &TemplateStore) {
    for info in store.list() {
        println!("{:<8} {:<28} {}", info.kind.id(), info.file_name, info.name);
        if !info.description.is_empty() {
            println!("         {}", info.description);
        }
    }
}

/// Apply command-line overrides, read the input and run the pipeline
fn prepare_from_args(
    store: &TemplateStore,
    mut config: ReportConfig,
    args: &PromptArgs,
) -> Result<(ReportConfig, PreparedReport)> {
    if args.no_summarize {
        config.summarize = false;
    }
    if let Some(chars) = args.summarize_chars {
        config.summarize_chars = chars;
    }
    if let Some(rows) = args.sample_rows {
        config.sample_rows = rows;
    }
    for (label, target) in &args.regions {
        if !config.regions.set(label, target) {
            warn!("Ignoring unknown region '{}'", label);
        }
    }
    let config = config.clamped();

    let template = store.load(args.report)?;

    let input_kind = args
        .kind
        .unwrap_or_else(|| InputKind::from_path(&args.input));
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read input file: {}", args.input.display()))?;
    let sample_rows = (input_kind == InputKind::Csv).then_some(config.sample_rows);
    let data_text = ingest(&bytes, input_kind, sample_rows)
        .with_context(|| format!("Failed to ingest {}", args.input.display()))?;

    let request = ReportRequest {
        kind: args.report,
        input_kind,
        audience_role: args.audience.clone(),
        data_text,
        timeframe: args.timeframe.clone(),
        extra_vars: extra_vars_for(args.report, args.currency.as_deref()),
        summarize: config.summarize,
        summarize_chars: config.summarize_chars,
        region_mapping: config.regions.clone(),
    };

    let prepared = prepare(&template, &request);
    Ok((config, prepared))
}

fn print_prepared(prepared: &PreparedReport, max_tokens: u32) {
    let preview = match Table::parse(&prepared.data_text) {
        Ok(table) if prepared.kpi_table.is_some() => table.head(PREVIEW_ROWS).to_csv(),
        _ => prepared.data_text.clone(),
    };

    println!("=== Input Preview ===\n{}", preview.trim_end());
    println!("\n=== System ===\n{}", prepared.prompt.system);
    println!("\n=== User ===\n{}", prepared.prompt.user);
    println!(
        "\nEstimated prompt tokens: ~{} | Max response tokens: {}",
        prepared.estimated_tokens, max_tokens
    );
}

async fn generate(store: &TemplateStore, mut config: ReportConfig, args: GenerateArgs) -> Result<()> {
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    if let Some(model) = args.model.clone() {
        config.model = Some(model);
    }
    if let Some(temperature) = args.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        config.max_tokens = max_tokens;
    }
    config.debug |= args.debug;

    let (config, prepared) = prepare_from_args(store, config, &args.prompt)?;
    print_prepared(&prepared, config.max_tokens);

    let provider = config.provider;
    let params = GenerationParams {
        model: config.model_for(provider),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        api_key: args.api_key.clone().or_else(|| api_key_from_env(provider)),
        debug: config.debug,
    };

    let client = reqwest::Client::new();
    match generate_report(&client, provider, &prepared.prompt, &params).await {
        Ok(content) => {
            let report = clean_llm_markdown_output(&content);
            println!("\n=== Generated Report ===\n{}", report);
            write_report(&args.out, &report)
                .with_context(|| format!("Failed to write report to {}", args.out.display()))?;
            info!("Report saved to {}", args.out.display());
            Ok(())
        }
        Err(ProviderError::PreviewOnly) => {
            println!("\nPreview only: copy the rendered prompt above into your chosen web UI (e.g., ChatGPT/Gemini).");
            Ok(())
        }
        Err(e) => {
            eprintln!("\nCopy the rendered prompt above into your chosen web UI (e.g., ChatGPT/Gemini).");
            bail!("Generation failed: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_region() {
        assert_eq!(
            parse_region("West = Gujarat"),
            Ok(("West".to_string(), "Gujarat".to_string()))
        );
        assert!(parse_region("West").is_err());
    }

    #[test]
    fn test_cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "report-pack",
            "generate",
            "--report",
            "finance",
            "--input",
            "data.csv",
            "--provider",
            "openrouter",
            "--currency",
            "$",
            "--region",
            "West=Gujarat",
        ])
        .unwrap();

        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.prompt.report, ReportKind::Finance);
                assert_eq!(args.provider, Some(LLMProvider::OpenRouter));
                assert_eq!(args.prompt.currency.as_deref(), Some("$"));
                assert_eq!(args.out, PathBuf::from(DEFAULT_REPORT_FILE));
                assert_eq!(args.prompt.regions.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_prepare_from_args_samples_and_localizes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sales.csv");
        std::fs::write(
            &input,
            "Region,Revenue,Leads,ClosedDeals\nWest,100,10,2\nEast,200,20,5\nNorth,300,30,6\n",
        )
        .unwrap();

        let args = PromptArgs {
            report: ReportKind::Sales,
            input,
            kind: None,
            audience: "Manager".to_string(),
            timeframe: Some("March".to_string()),
            currency: None,
            no_summarize: true,
            summarize_chars: None,
            sample_rows: Some(2),
            regions: vec![("East".to_string(), "Odisha".to_string())],
        };

        let (config, prepared) =
            prepare_from_args(&TemplateStore::builtin(), ReportConfig::default(), &args).unwrap();

        assert_eq!(config.sample_rows, 2);
        assert!(prepared.data_text.contains("Odisha"));
        assert!(!prepared.data_text.contains("North"));
        assert!(prepared.prompt.user.contains("March"));
        assert!(prepared.prompt.user.contains("Manager"));
        assert!(prepared
            .kpi_table
            .as_deref()
            .unwrap()
            .contains("| Total Revenue | ₹300 |"));
    }

    #[test]
    fn test_prepare_from_args_missing_input_is_error() {
        let args = PromptArgs {
            report: ReportKind::Hr,
            input: PathBuf::from("/nonexistent/data.csv"),
            kind: None,
            audience: "CHRO".to_string(),
            timeframe: None,
            currency: None,
            no_summarize: false,
            summarize_chars: None,
            sample_rows: None,
            regions: Vec::new(),
        };
        assert!(prepare_from_args(&TemplateStore::builtin(), ReportConfig::default(), &args).is_err());
    }
}
