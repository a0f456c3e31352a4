use crate::error::ProcessingError;
use crate::gateway::PersistenceGateway;
use crate::model::DocumentId;
use crate::utils::document_processor::DocumentProcessor;
use crate::utils::input::read_input;
use log::{debug, error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("failed to build worker pool: {0}")]
    Pool(String),
}

/// Result of ingesting one file of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<DocumentId, BatchError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Ingest every accepted file directly inside `input_dir`.
///
/// Documents are processed in parallel, one orchestrator call per file; a
/// failing file does not stop the others. Outcomes are sorted by path.
pub fn ingest_directory<G, P>(
    input_dir: P,
    processor: &DocumentProcessor<G>,
) -> Result<Vec<BatchOutcome>, BatchError>
where
    G: PersistenceGateway,
    P: AsRef<Path>,
{
    let input_path = input_dir.as_ref();
    info!("Starting to process documents from: {}", input_path.display());

    let files = collect_files(input_path, processor)?;
    info!("Found {} processable files", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(processor.config().batch_workers)
        .build()
        .map_err(|e| BatchError::Pool(e.to_string()))?;

    let outcomes: Vec<BatchOutcome> = pool.install(|| {
        files
            .par_iter()
            .map(|path| BatchOutcome {
                path: path.clone(),
                result: process_file(path, processor),
            })
            .collect()
    });

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(
        "Completed batch: {} processed, {} failed",
        outcomes.len() - failed,
        failed
    );
    Ok(outcomes)
}

fn collect_files<G: PersistenceGateway>(
    input_path: &Path,
    processor: &DocumentProcessor<G>,
) -> Result<Vec<PathBuf>, BatchError> {
    let read_err = |source: std::io::Error| BatchError::Read {
        path: input_path.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(input_path).map_err(read_err)? {
        let file_path = entry.map_err(read_err)?.path();
        if !file_path.is_file() {
            debug!("Skipping non-file entry: {:?}", file_path.file_name());
            continue;
        }

        let accepted = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| processor.config().accepts_extension(ext));
        if accepted {
            files.push(file_path);
        } else {
            debug!("Skipping non-processable file: {}", file_path.display());
        }
    }

    files.sort();
    Ok(files)
}

fn process_file<G: PersistenceGateway>(
    path: &Path,
    processor: &DocumentProcessor<G>,
) -> Result<DocumentId, BatchError> {
    let bytes = read_input(path, processor.config().mmap_threshold_bytes).map_err(|source| {
        BatchError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    processor.process_document(&filename, &bytes).map_err(|e| {
        error!("Failed to process {}: {}", path.display(), e);
        BatchError::from(e)
    })
}
