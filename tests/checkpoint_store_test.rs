//! Integration tests for the file checkpoint store driven by the runner
//!
//! These tests verify that:
//! - Committed watermarks survive between runs through the checkpoint file
//! - A damaged checkpoint file stops the run instead of restarting from zero
//! - The store factory picks the backend from the configured location

mod common;

use common::{settings, MemoryMover};
use highwater::adapters::checkpoint::{
    create_watermark_store, CheckpointLocation, FileWatermarkStore, WatermarkStore,
};
use highwater::config::HighwaterConfig;
use highwater::core::extract::{ExtractionRunner, RunOutcome, RunStage};
use highwater::core::state::{Watermark, WatermarkValue};
use highwater::domain::SourceId;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;
use test_case::test_case;

fn checkpoint_file(dir: &TempDir) -> PathBuf {
    dir.path().join("max_id").join("public.sales.csv")
}

#[tokio::test]
async fn test_watermark_persists_across_runs() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileWatermarkStore::new(dir.path()));
    let mover = Arc::new(MemoryMover::with_integer_keys(&[1, 2, 3]));

    let first = ExtractionRunner::new(settings("salesid"), store.clone(), mover.clone())
        .run()
        .await;
    assert!(first.is_successful());
    assert_eq!(
        std::fs::read_to_string(checkpoint_file(&dir)).unwrap(),
        "max_id,table_name\n3,public.sales\n"
    );

    // A fresh store instance reads what the previous run committed
    let reopened = Arc::new(FileWatermarkStore::new(dir.path()));
    let second = ExtractionRunner::new(settings("salesid"), reopened, mover.clone())
        .run()
        .await;
    assert!(matches!(second.outcome, RunOutcome::NoNewData { .. }));
    assert_eq!(second.starting_watermark, Some(WatermarkValue::Integer(3)));
    assert_eq!(mover.persisted().len(), 1);
}

#[test_case("" ; "empty file")]
#[test_case("max_id,table_name\n" ; "header only")]
#[test_case("id,name\n5,public.sales\n" ; "wrong header")]
#[test_case("max_id,table_name\nabc,public.sales\n" ; "unparseable value")]
#[test_case("max_id,table_name\n5,public.orders\n" ; "other table")]
#[tokio::test]
async fn test_corrupt_checkpoint_file_fails_run(content: &str) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("max_id")).unwrap();
    std::fs::write(checkpoint_file(&dir), content).unwrap();

    let store = Arc::new(FileWatermarkStore::new(dir.path()));
    let mover = Arc::new(MemoryMover::with_integer_keys(&[1]));

    let summary = ExtractionRunner::new(settings("salesid"), store, mover.clone())
        .run()
        .await;

    match &summary.outcome {
        RunOutcome::Failed { stage, cause } => {
            assert_eq!(*stage, RunStage::LoadWatermark);
            assert!(cause.is_checkpoint_corrupt(), "unexpected cause: {cause}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(summary.exit_code(), 3);
    assert_eq!(mover.extract_calls.load(Ordering::SeqCst), 0);

    // The damaged file is left for inspection
    assert_eq!(std::fs::read_to_string(checkpoint_file(&dir)).unwrap(), content);
}

#[tokio::test]
async fn test_timestamp_checkpoint_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let store = FileWatermarkStore::new(dir.path());
    let source = SourceId::new("public.sales").unwrap();
    let value = WatermarkValue::parse("2024-03-05T14:30:15.250Z").unwrap();

    store
        .write(&Watermark::new(source.clone(), value.clone()))
        .await
        .unwrap();

    assert_eq!(store.read(&source).await.unwrap().value, value);
}

#[tokio::test]
async fn test_factory_uses_local_store_for_paths() {
    let dir = TempDir::new().unwrap();
    let mut config = HighwaterConfig::default();
    config.checkpoint.location = dir.path().to_string_lossy().into_owned();

    let store = create_watermark_store(&config).await.unwrap();
    let source = SourceId::new("public.sales").unwrap();

    assert_eq!(
        store.location(&source),
        checkpoint_file(&dir).display().to_string()
    );
    assert!(store.read(&source).await.unwrap().is_initial());
}

#[test]
fn test_checkpoint_location_parsing() {
    assert_eq!(
        CheckpointLocation::parse("s3a://bucket/checkpoints/").unwrap(),
        CheckpointLocation::S3 {
            bucket: "bucket".to_string(),
            prefix: "checkpoints".to_string()
        }
    );
    assert!(matches!(
        CheckpointLocation::parse("/var/lib/highwater").unwrap(),
        CheckpointLocation::Local(_)
    ));
}
