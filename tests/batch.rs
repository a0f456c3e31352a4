mod common;

use common::{docx, heading, paragraph, pdf};
use doc_ingest::utils::batch::{ingest_directory, BatchError};
use doc_ingest::{
    DocumentProcessor, DocumentStats, DocumentStatus, InMemoryGateway, PersistenceGateway,
    ProcessorConfig,
};
use std::fs;

#[test]
fn batch_processes_accepted_files_and_tolerates_failures() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "alpha").unwrap();
    fs::write(
        dir.path().join("b.docx"),
        docx(&[heading("Heading1", "Title"), paragraph("body")].concat()),
    )
    .unwrap();
    fs::write(dir.path().join("c.pdf"), pdf(&["page"])).unwrap();
    fs::write(dir.path().join("d.txt"), [0xffu8, 0xfe]).unwrap();
    fs::write(dir.path().join("skip.xyz"), "ignored").unwrap();
    fs::create_dir(dir.path().join("nested.txt")).unwrap();

    let config = ProcessorConfig {
        batch_workers: 2,
        ..ProcessorConfig::default()
    };
    let processor = DocumentProcessor::new(InMemoryGateway::open(), config);
    let outcomes = ingest_directory(dir.path(), &processor).unwrap();

    let names: Vec<String> = outcomes
        .iter()
        .map(|o| o.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.docx", "c.pdf", "d.txt"]);

    for outcome in &outcomes[..3] {
        let id = *outcome.result.as_ref().unwrap();
        let view = processor.fetch(id).unwrap();
        assert_eq!(view.document.status, DocumentStatus::Processed);
        assert!(!view.contents.is_empty());
    }

    match &outcomes[3].result {
        Err(BatchError::Processing(e)) => {
            let view = processor.fetch(e.document_id.unwrap()).unwrap();
            assert_eq!(view.document.status, DocumentStatus::Error);
        }
        other => panic!("expected processing failure, got {:?}", other),
    }

    // the failed text file keeps its default section but no content
    assert_eq!(
        processor.gateway().stats().unwrap(),
        DocumentStats {
            total_documents: 4,
            total_sections: 4,
            total_contents: 3,
        }
    );
}

#[test]
fn batch_missing_directory_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let processor = DocumentProcessor::new(InMemoryGateway::open(), ProcessorConfig::default());

    let err = ingest_directory(dir.path().join("absent"), &processor).unwrap_err();
    assert!(matches!(err, BatchError::Read { .. }));
}
