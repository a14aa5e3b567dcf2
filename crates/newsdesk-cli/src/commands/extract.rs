//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chrono::{Local, NaiveDate};
use newsdesk_content::{html, ContentFetcher};
use newsdesk_domain::{ContentRef, ContentSource, ProviderError, ProviderKind};
use newsdesk_extractor::{ArticleReport, ExtractionPipeline, ExtractorError};
use newsdesk_llm::ProviderRegistry;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};

type Outcome = std::result::Result<ArticleReport, ExtractorError>;

/// Per-invocation settings shared by every article.
#[derive(Debug, Clone)]
struct ExtractionJob {
    fields: Vec<String>,
    provider: ProviderKind,
    received_on: NaiveDate,
    jobs: usize,
    limit: Duration,
}

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let references = resolve_references(&args)?;
    let job = ExtractionJob {
        fields: requested_fields(&args, config),
        provider: args.provider.map(ProviderKind::from).unwrap_or(config.settings.default_provider),
        received_on: args.received_date.unwrap_or_else(|| Local::now().date_naive()),
        jobs: args.jobs.max(1),
        limit: config.extractor.extraction_timeout() + Duration::from_secs(config.content.timeout_secs),
    };

    let pipeline = Arc::new(ExtractionPipeline::new(
        ProviderRegistry::from_settings(&config.providers),
        config.extractor.clone(),
    )?);
    let source: Arc<dyn ContentSource> = Arc::new(ContentFetcher::new(&config.content)?);

    info!(
        "Extracting {} field(s) from {} article(s) with {}",
        job.fields.len(),
        references.len(),
        job.provider
    );
    let results = run_extractions(&pipeline, &source, references, &job)?;
    report_results(results, formatter)
}

/// Article references named on the command line.
fn resolve_references(args: &ExtractArgs) -> Result<Vec<ContentRef>> {
    if let Some(path) = &args.file {
        return Ok(vec![read_document(path)?]);
    }
    if args.urls.is_empty() {
        return Err(CliError::InvalidInput("give --url or --file".to_string()));
    }
    Ok(args.urls.iter().map(ContentRef::url).collect())
}

/// Read a local article; HTML files are reduced to their text.
fn read_document(path: &Path) -> Result<ContentRef> {
    let raw = fs::read_to_string(path)?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    let text = if is_html { html::page_text(&raw).text } else { raw };
    Ok(ContentRef::document(name, text))
}

fn requested_fields(args: &ExtractArgs, config: &Config) -> Vec<String> {
    let fields: Vec<String> = args
        .fields
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        config.extractor.default_fields.clone()
    } else {
        fields
    }
}

/// Process every reference on tokio's blocking pool, at most `job.jobs` at a
/// time. Results come back in input order.
fn run_extractions(
    pipeline: &Arc<ExtractionPipeline>,
    source: &Arc<dyn ContentSource>,
    references: Vec<ContentRef>,
    job: &ExtractionJob,
) -> Result<Vec<(ContentRef, Outcome)>> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    let mut results = runtime.block_on(async {
        let permits = Arc::new(Semaphore::new(job.jobs));
        let mut tasks = JoinSet::new();

        for (index, reference) in references.into_iter().enumerate() {
            let pipeline = Arc::clone(pipeline);
            let source = Arc::clone(source);
            let permits = Arc::clone(&permits);
            let job = job.clone();

            tasks.spawn(async move {
                let permit = permits.acquire_owned().await;
                let task_ref = reference.clone();
                // The permit lives as long as the blocking call, even past a timeout
                let work = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    pipeline.extract_article(
                        source.as_ref(),
                        &task_ref,
                        &job.fields,
                        job.provider,
                        Some(job.received_on),
                    )
                });

                let outcome = match timeout(job.limit, work).await {
                    Ok(joined) => joined.map_err(ExtractorError::from).and_then(|r| r),
                    Err(_) => Err(ExtractorError::Provider(ProviderError::Timeout)),
                };
                (index, reference, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!("Extraction task failed: {}", e),
            }
        }
        results
    });
    // Timed-out blocking calls are left to finish on their own
    runtime.shutdown_background();

    results.sort_by_key(|(index, _, _)| *index);
    Ok(results
        .into_iter()
        .map(|(_, reference, outcome)| (reference, outcome))
        .collect())
}

fn report_results(results: Vec<(ContentRef, Outcome)>, formatter: &Formatter) -> Result<()> {
    let total = results.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = 0;

    for (reference, outcome) in results {
        match outcome {
            Ok(report) => reports.push(report),
            Err(e) => {
                failed += 1;
                eprintln!("{}", formatter.error(&format!("{}: {}", reference, e)));
            }
        }
    }

    if !reports.is_empty() {
        println!("{}", formatter.format_reports(&reports)?);
    }
    if failed > 0 {
        return Err(CliError::ExtractionFailed { failed, total });
    }
    Ok(())
}
