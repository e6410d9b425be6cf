use clap::Args;
use gets_readiness::analysis::{AnalysisContext, Questionnaire, ReadinessAnalyzer, ReadinessReport};
use gets_readiness::error::AppError;
use gets_readiness::ingest::{IngestError, SampleImporter, SourceFormat};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// JSON or CSV invoice sample to analyze
    pub(crate) file: PathBuf,
    /// Country label recorded in the report metadata
    #[arg(long)]
    pub(crate) country: Option<String>,
    /// ERP label recorded in the report metadata
    #[arg(long)]
    pub(crate) erp: Option<String>,
    /// The integration can receive webhooks
    #[arg(long)]
    pub(crate) webhooks: bool,
    /// A sandbox environment is available for testing
    #[arg(long)]
    pub(crate) sandbox_env: bool,
    /// Failed submissions are retried automatically
    #[arg(long)]
    pub(crate) retries: bool,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let report = analyze_file(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn analyze_file(args: &AnalyzeArgs) -> Result<ReadinessReport, AppError> {
    let format = detect_format(&args.file).ok_or(IngestError::UnsupportedFormat)?;
    let analyzer = ReadinessAnalyzer::default();
    let imported = SampleImporter::new(analyzer.config().max_rows).from_path(&args.file, format)?;

    let questionnaire = Questionnaire {
        webhooks: args.webhooks,
        sandbox_env: args.sandbox_env,
        retries: args.retries,
    };
    let context = AnalysisContext::new(args.country.clone(), args.erp.clone());
    let report = analyzer.analyze(
        &imported.sample,
        imported.rows_parsed,
        &questionnaire,
        &context,
    );

    info!(
        file = %args.file.display(),
        rows_parsed = imported.rows_parsed,
        overall = report.scores.overall,
        "sample analyzed"
    );

    Ok(report)
}

fn detect_format(path: &Path) -> Option<SourceFormat> {
    let guessed = mime_guess::from_path(path).first();
    SourceFormat::detect(
        path.file_name().and_then(|name| name.to_str()),
        guessed.as_ref().map(|mime| mime.essence_str()),
    )
}
