// src/main.rs
use anyhow::{bail, Context};
use clap::Parser;
use doc_ingest::cli::{BatchArgs, Cli, Command, IngestArgs};
use doc_ingest::utils::batch::ingest_directory;
use doc_ingest::utils::input::read_input;
use doc_ingest::{DocumentProcessor, InMemoryGateway, PersistenceGateway, ProcessorConfig};
use log::info;
use std::fs;
use std::sync::Arc;

type Processor = DocumentProcessor<Arc<InMemoryGateway>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = match &cli.config {
        Some(path) => ProcessorConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    let gateway = Arc::new(InMemoryGateway::open());
    let processor = DocumentProcessor::new(Arc::clone(&gateway), config);

    let outcome = match cli.command {
        Command::Ingest(args) => run_ingest(&processor, args),
        Command::Batch(args) => run_batch(&processor, args),
    };

    gateway.close()?;
    outcome
}

fn run_ingest(processor: &Processor, args: IngestArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.file, processor.config().mmap_threshold_bytes)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (document_id, failure) =
        match processor.process_document_as(&filename, args.content_type.as_deref(), &bytes) {
            Ok(id) => (id, None),
            Err(e) => match e.document_id {
                Some(id) => (id, Some(e)),
                None => return Err(e.into()),
            },
        };

    let view = processor.fetch(document_id)?;
    let json = serde_json::to_string_pretty(&view)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!("Document view saved to {}", path.display());
        }
        None => println!("{}", json),
    }

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn run_batch(processor: &Processor, args: BatchArgs) -> anyhow::Result<()> {
    let outcomes = ingest_directory(&args.dir, processor)?;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(id) => println!("processed\t{}\t{}", id, outcome.path.display()),
            Err(e) => {
                failed += 1;
                println!("error\t-\t{}\t{}", outcome.path.display(), error_chain(e));
            }
        }
    }

    let stats = processor.gateway().stats()?;
    println!(
        "total\t{} documents\t{} sections\t{} contents",
        stats.total_documents, stats.total_sections, stats.total_contents
    );

    if failed > 0 {
        bail!("{} of {} documents failed", failed, outcomes.len());
    }
    Ok(())
}

/// `outer: cause: root cause` on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
