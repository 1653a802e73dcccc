//! KORA CLI — headless report runs and offline inspection.
//!
//! Commands:
//! - `report` — run the full pipeline for one company, print a summary, optionally export
//! - `chart` — derive chart series from a saved raw-data JSON and write them as CSV
//! - `chat` — ask one question against a saved report context
//! - `config` — print the effective configuration as TOML

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kora_core::domain::{Analysis, Payload};
use kora_core::view::{build_chart, ChartView};
use kora_core::{ChartMode, CollectedData, CompanyRef, PipelineState};
use kora_runner::{
    write_report, ChatSession, ClientConfig, HttpBackend, LoadingConfig, PipelineEvent,
    ReportPipeline, ReportSink, RunSummary, RunToken, SaveOutcome, StepOutcome,
};

#[derive(Parser)]
#[command(name = "kora", about = "KORA CLI — AI investment report generation")]
struct Cli {
    /// Path to a TOML client config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL; overrides the config file and KORA_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the report pipeline for one company.
    Report {
        /// Company name (e.g., 삼성전자).
        name: String,

        /// Six-digit ticker (e.g., 005930).
        ticker: String,

        /// DART corporation code.
        #[arg(long)]
        corp_code: Option<String>,

        /// Market label. Defaults to KOSPI.
        #[arg(long)]
        market: Option<String>,

        /// Free-text request answered in its own section.
        #[arg(long)]
        request: Option<String>,

        /// Write a markdown report into this directory.
        #[arg(long)]
        export: Option<PathBuf>,

        /// Save the raw collected data and analysis JSON into this directory.
        #[arg(long)]
        save_raw: Option<PathBuf>,
    },
    /// Derive chart series from saved raw data and write them as CSV.
    Chart {
        /// Raw collected-data JSON (as written by `report --save-raw`).
        data: PathBuf,

        /// Chart mode: 1y or forecast.
        #[arg(long, default_value = "1y")]
        mode: ChartMode,

        /// Analysis JSON supplying the forecast path.
        #[arg(long)]
        analysis: Option<PathBuf>,

        /// Output CSV. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Ask one question about a saved report.
    Chat {
        /// The question.
        message: String,

        /// File holding the report context (as written by `report --save-raw`).
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Print the effective configuration.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(cli.config.as_deref(), cli.base_url.as_deref())?;

    match cli.command {
        Commands::Report {
            name,
            ticker,
            corp_code,
            market,
            request,
            export,
            save_raw,
        } => {
            let mut company = CompanyRef::new(name, ticker);
            if let Some(code) = corp_code {
                company = company.with_corp_code(code);
            }
            if let Some(market) = market {
                company = company.with_market(market);
            }
            if let Some(text) = request {
                company = company.with_request_text(text);
            }
            run_report(config, company, export.as_deref(), save_raw.as_deref())
        }
        Commands::Chart {
            data,
            mode,
            analysis,
            output,
        } => run_chart(&data, mode, analysis.as_deref(), output.as_deref()),
        Commands::Chat { message, context } => run_chat(config, &message, context.as_deref()),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(path)?;
    if let Some(url) = base_url {
        config.set_base_url(url)?;
    }
    Ok(config)
}

/// Progress lines on stderr; the summary goes to stdout.
struct LogSink;

impl ReportSink for LogSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StateChanged(PipelineState::Loading(stage)) => {
                info!(stage = stage.label(), percent = stage.percent(), "stage");
            }
            PipelineEvent::AnalysisSkipped { reason } => warn!(%reason, "analysis skipped"),
            PipelineEvent::CreditsUpdated { remaining } => info!(remaining, "credits"),
            PipelineEvent::Alert { message } => warn!("{message}"),
            _ => {}
        }
    }
}

fn run_report(
    config: ClientConfig,
    company: CompanyRef,
    export: Option<&Path>,
    save_raw: Option<&Path>,
) -> Result<()> {
    let backend = HttpBackend::new(config).context("building HTTP client")?;
    let mut pipeline = ReportPipeline::new(
        Arc::new(backend),
        Arc::new(LogSink),
        LoadingConfig::instant(),
    );

    let summary = pipeline
        .run(company, &RunToken::new())
        .context("report pipeline failed")?;
    print_summary(&summary, &pipeline);

    if let Some(dir) = save_raw {
        save_raw_files(dir, &pipeline)?;
    }
    if let Some(dir) = export {
        let path = write_report(dir, &pipeline, chrono::Local::now().naive_local())?;
        println!("Report exported to: {}", path.display());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, pipeline: &ReportPipeline) {
    println!("=== {} ===", summary.company);
    if let Some(base) = pipeline.base_facts() {
        println!("Price:      {} ({})", base.price.current, base.price.change);
        println!("PER / PBR:  {} / {}", base.valuation.per, base.valuation.pbr);
        for warning in &base.data_warnings {
            println!("Warning:    {warning}");
        }
    }
    match pipeline.analysis_view() {
        Some(a) => {
            println!("Fair price: {} ({})", a.fair_price, a.valuation.label());
            println!("Score:      {} / 100, grade {}", a.score_text, a.grade);
            println!("Opinion:    {}", a.opinion);
        }
        None => println!("Analysis:   {}", outcome_text(&summary.analysis)),
    }
    if let Some(answer) = pipeline.answer() {
        println!("Answer:     {answer}");
    }
    let save = match &summary.save {
        SaveOutcome::Saved {
            credits_remaining: Some(c),
        } => format!("saved ({c:.0} credits left)"),
        SaveOutcome::Saved { .. } => "saved".to_string(),
        SaveOutcome::Failed(e) => format!("failed: {e}"),
        SaveOutcome::AlreadySaved => "already saved this session".to_string(),
    };
    println!("Save:       {save}");
    println!(
        "Chart:      {}",
        if summary.chart_rendered { "rendered" } else { "no price data" }
    );
    println!("Elapsed:    {:.1}s", summary.elapsed.as_secs_f64());
}

fn outcome_text(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Completed => "completed".to_string(),
        StepOutcome::Failed(e) => format!("failed: {e}"),
    }
}

fn save_raw_files(dir: &Path, pipeline: &ReportPipeline) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    if let Some(data) = pipeline.report_data() {
        write_json(&dir.join("data.json"), data.raw())?;
    }
    if let Some(analysis) = pipeline.analysis() {
        write_json(&dir.join("analysis.json"), analysis.raw())?;
    }
    let context_path = dir.join("context.json");
    std::fs::write(&context_path, pipeline.report_context())
        .with_context(|| format!("writing {}", context_path.display()))?;
    println!("Raw data saved to: {}", dir.display());
    Ok(())
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn run_chart(
    data_path: &Path,
    mode: ChartMode,
    analysis_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let data: Payload<CollectedData> = Payload::from_raw(read_json(data_path)?)
        .with_context(|| format!("{} is not collected report data", data_path.display()))?;
    let analysis: Option<Payload<Analysis>> = analysis_path
        .map(|p| -> Result<_> {
            Payload::from_raw(read_json(p)?)
                .with_context(|| format!("{} is not an analysis", p.display()))
        })
        .transpose()?;

    let forecast = analysis.as_ref().map(|a| &a.price_forecast);
    let Some(view) = build_chart(mode, data.price_history(), forecast) else {
        bail!("no price history to chart in {}", data_path.display());
    };

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_chart_csv(file, &view)?;
            println!("{} points written to: {}", view.len(), path.display());
        }
        None => write_chart_csv(io::stdout().lock(), &view)?,
    }
    Ok(())
}

/// One row per label; missing values are left empty.
fn write_chart_csv<W: Write>(out: W, view: &ChartView) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["label".to_string()];
    header.extend(view.series.iter().map(|s| s.label.clone()));
    writer.write_record(&header)?;

    for (i, label) in view.labels.iter().enumerate() {
        let mut row = vec![label.clone()];
        row.extend(view.series.iter().map(|s| {
            s.values
                .get(i)
                .copied()
                .flatten()
                .map(|v| format!("{v:.2}"))
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn run_chat(config: ClientConfig, message: &str, context: Option<&Path>) -> Result<()> {
    let report_context = match context {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => String::new(),
    };
    let backend = HttpBackend::new(config).context("building HTTP client")?;
    let mut session = ChatSession::new(report_context);
    match session.send(&backend, message) {
        Some(reply) => println!("{}", reply.text),
        None => bail!("message is empty"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_core::view::{ChartSeries, SeriesKind};

    #[test]
    fn chart_csv_leaves_gaps_empty() {
        // GIVEN: a two-point chart where the forecast only covers the second point
        let view = ChartView {
            mode: ChartMode::Forecast,
            labels: vec!["2024-01".into(), "2024-02".into()],
            series: vec![
                ChartSeries {
                    label: "월평균".into(),
                    kind: SeriesKind::Close,
                    values: vec![Some(100.0), Some(110.5)],
                },
                ChartSeries {
                    label: "AI 예측".into(),
                    kind: SeriesKind::Forecast,
                    values: vec![None, Some(110.5)],
                },
            ],
            show_disclaimer: true,
        };

        // WHEN: writing CSV
        let mut out = Vec::new();
        write_chart_csv(&mut out, &view).unwrap();

        // THEN: header plus one row per label, blank where there is no value
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "label,월평균,AI 예측");
        assert_eq!(lines[1], "2024-01,100.00,");
        assert_eq!(lines[2], "2024-02,110.50,110.50");
    }

    #[test]
    fn base_url_flag_overrides_config() {
        let config = load_config(None, Some("https://kora.example.com")).unwrap();
        assert_eq!(config.base_url, "https://kora.example.com");
    }

    #[test]
    fn invalid_base_url_flag_is_rejected() {
        assert!(load_config(None, Some("not-a-url")).is_err());
    }

    #[test]
    fn chart_command_writes_csv_file() {
        // GIVEN: saved raw data with three closes
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(
            &data,
            serde_json::json!({
                "krx": {"price_history": [
                    {"date": "2024-01-02", "close": 100},
                    {"date": "2024-01-03", "close": 102},
                    {"date": "2024-01-04", "close": 101}
                ]}
            })
            .to_string(),
        )
        .unwrap();
        let out = dir.path().join("chart.csv");

        // WHEN: the 1y chart is derived
        run_chart(&data, ChartMode::OneYear, None, Some(&out)).unwrap();

        // THEN: one header plus three rows
        let csv = std::fs::read_to_string(&out).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("label,"));
    }

    #[test]
    fn chart_command_rejects_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        std::fs::write(&data, "{}").unwrap();
        assert!(run_chart(&data, ChartMode::OneYear, None, None).is_err());
    }
}
