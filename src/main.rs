mod cli;

use cli::Args;
use depvis_import::config::{
    discover_config, load_config_from_path, ConfigFile, DEFAULT_STORE_PATH,
};
use depvis_import::prelude::*;
use depvis_import::shared::error::ExitCode;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let args = Args::parse_args();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        for cause in e.chain().skip(1) {
            eprintln!("\nCaused by: {}", cause);
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

/// `--verbose` forces debug; otherwise `RUST_LOG` applies, falling back to info
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let mut options = config.import_options();
    if args.compensate_on_failure {
        options.compensate_on_failure = true;
    }
    let store_path = args
        .store
        .clone()
        .or_else(|| config.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

    // Read input before touching the store
    let document = FileSystemReader::new().read_sbom(&args.sbom)?;
    let store = InMemoryGraphStore::load(&store_path)?;

    // Create adapters (Dependency Injection)
    let osv_client = match config.osv_api_url.as_deref() {
        Some(url) => OsvClient::with_api_url(url)?,
        None => OsvClient::new()?,
    };
    let feed = CachingVulnerabilityFeed::new(osv_client);
    let progress_reporter = StderrProgressReporter::new();

    let use_case = ImportSbomUseCase::new(store, feed, progress_reporter).with_options(options);

    let cancellation = CancellationToken::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling import");
            interrupt.cancel();
        }
    });

    let mut builder = ImportRequest::builder()
        .document(document)
        .skip_vulnerabilities(args.skip_vulnerabilities)
        .cancellation(cancellation);
    if let Some(name) = args.project_name {
        builder = builder.project_name(name);
    }
    if let Some(id) = args.project_id {
        builder = builder.project_id(id);
    }
    if let Some(version) = args.project_version {
        builder = builder.project_version(version);
    }
    let request = builder.build()?;

    let result = use_case.execute(request).await;

    // Partial writes of a failed import are kept as well
    let saved = use_case.store().save(&store_path);
    if let (Err(save_error), Err(_)) = (&saved, &result) {
        tracing::error!(error = %save_error, "failed to save store snapshot");
    }
    let report = result?;
    saved?;

    print_summary(&report, &store_path);
    Ok(())
}

fn load_config(args: &Args) -> Result<ConfigFile> {
    match args.config.as_deref() {
        Some(path) => load_config_from_path(path),
        None => Ok(discover_config(&std::env::current_dir()?)?.unwrap_or_default()),
    }
}

fn print_summary(report: &ImportReport, store_path: &Path) {
    println!(
        "{} {} {}",
        "✅ Imported".green().bold(),
        report.project.name.bold(),
        report.project_version.version
    );
    println!("   Project id:          {}", report.project.id);
    println!("   Project version id:  {}", report.project_version.id);
    if report.project_created {
        println!("   {}", "New project created".cyan());
    }
    if !report.replaced_versions.is_empty() {
        println!(
            "   Replaced {} earlier import(s) of this version",
            report.replaced_versions.len()
        );
    }
    println!("   Components:          {}", report.components_created);
    println!(
        "   Dependency edges:    {} (from {} declaration(s))",
        report.relationships_created, report.dependency_links
    );

    let linked = report.vulnerabilities_linked();
    if linked > 0 {
        println!(
            "   Vulnerabilities:     {} linked, {} new",
            linked.red().bold(),
            report.vulnerabilities_created()
        );
    } else {
        println!("   Vulnerabilities:     {}", "none linked".green());
    }

    for warning in &report.warnings {
        println!("   {} {}", "⚠️ ".yellow(), warning.yellow());
    }
    for outcome in report.enrichment.iter().filter(|o| o.status.is_failure()) {
        if let EnrichmentStatus::FeedFailed(reason) | EnrichmentStatus::PersistFailed(reason) =
            &outcome.status
        {
            println!("     {} {}: {}", "-".dimmed(), outcome.purl, reason.dimmed());
        }
    }

    println!("   Store:               {}", store_path.display());
}
