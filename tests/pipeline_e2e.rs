//! End-to-end comparison tests over mock services.

mod common;

use std::sync::Arc;
use std::time::Duration;

use collide::completion::MockCompletion;
use collide::orchestrator::WorkerPool;
use collide::pipeline::{MatchType, PipelineConfig, Report, Verdict};
use collide::store::{DocumentStore, ProcessStatus};
use collide::vectordb::ScriptedIndex;

use common::fixtures::{PipelineBuilder, TEN_TOKEN_PAGE, survey_pages, unrelated_pages};

async fn completed_report(pipeline: &common::fixtures::TestPipeline, task_id: u64) -> Report {
    let task = pipeline.store.task(task_id).await.expect("task exists");
    assert_eq!(task.status, ProcessStatus::Completed);
    serde_json::from_value(task.result.expect("completed task has a result"))
        .expect("result should be a report")
}

#[tokio::test]
async fn test_unrelated_documents_have_no_matches() {
    let pipeline = PipelineBuilder::new()
        .document("survey.pdf", survey_pages())
        .document("ledgers.pdf", unrelated_pages())
        .completion(MockCompletion::new("No meaningful overlap."))
        .build()
        .await;

    let source = pipeline.ingested("survey.pdf").await;
    let target = pipeline.ingested("ledgers.pdf").await;
    let task = pipeline
        .orchestrator
        .create_task(source, target)
        .await
        .unwrap();

    let status = pipeline.orchestrator.run(task.id).await.unwrap();
    assert_eq!(status, ProcessStatus::Completed);

    let report = completed_report(&pipeline, task.id).await;
    assert!(report.matches.is_empty());
    assert_eq!(report.summary.total_score, 0.0);
    assert_eq!(report.summary.suspicious_chunks, 0);
    assert_eq!(report.summary.total_chunks, 1);
    assert_eq!(report.summary.verdict, Verdict::LowRisk);
    assert!(report.mask_check.is_none());
    assert_eq!(report.final_opinion, "No meaningful overlap.");
}

#[tokio::test]
async fn test_identical_documents_are_fully_verbatim() {
    let pipeline = PipelineBuilder::new()
        .document("original.pdf", survey_pages())
        .document("resubmitted.pdf", survey_pages())
        .config(PipelineConfig {
            chunk_window: 500,
            chunk_overlap: 100,
            ..PipelineConfig::default()
        })
        .build()
        .await;

    let source = pipeline.ingested("original.pdf").await;
    let target = pipeline.ingested("resubmitted.pdf").await;
    let task = pipeline
        .orchestrator
        .create_task(source, target)
        .await
        .unwrap();
    pipeline.orchestrator.run(task.id).await.unwrap();

    let report = completed_report(&pipeline, task.id).await;
    assert!(report.summary.total_chunks >= survey_pages().len());
    assert_eq!(report.summary.suspicious_chunks, report.summary.total_chunks);
    assert_eq!(report.summary.total_score, 100.0);
    assert_eq!(report.summary.verdict, Verdict::HighRisk);
    assert_eq!(report.matches.len(), report.summary.total_chunks);

    for (i, record) in report.matches.iter().enumerate() {
        assert_eq!(record.id, i);
        assert_eq!(record.match_type, MatchType::Verbatim);
        assert_eq!(record.score, 100.0);
        assert_eq!(record.target_text, record.source_text);
        assert_eq!(record.target_page, record.source_page);
    }

    let pages: Vec<u32> = report.matches.iter().map(|m| m.target_page).collect();
    let mut sorted = pages.clone();
    sorted.sort_unstable();
    assert_eq!(pages, sorted, "matches keep document order");
}

#[tokio::test]
async fn test_target_without_text_fails_task() {
    let pipeline = PipelineBuilder::new()
        .document("survey.pdf", survey_pages())
        .document("scanned.pdf", ["", "   ", "p. 3"])
        .build()
        .await;

    let source = pipeline.ingested("survey.pdf").await;
    let target = pipeline.ingested("scanned.pdf").await;
    let task = pipeline
        .orchestrator
        .create_task(source, target)
        .await
        .unwrap();

    let status = pipeline.orchestrator.run(task.id).await.unwrap();
    assert_eq!(status, ProcessStatus::Failed);

    let stored = pipeline.store.task(task.id).await.unwrap();
    let result = stored.result.expect("failed task records its error");
    let message = result["error"].as_str().expect("error message is a string");
    assert!(!message.is_empty());
    assert!(result.get("matches").is_none());
}

#[tokio::test]
async fn test_masking_keeps_stable_match_robust() {
    let index = Arc::new(ScriptedIndex::new().with_hit(TEN_TOKEN_PAGE, 1, 0.05));
    let pipeline = PipelineBuilder::new()
        .document("source.pdf", [TEN_TOKEN_PAGE])
        .document("target.pdf", [TEN_TOKEN_PAGE])
        .index(index.clone())
        .config(PipelineConfig {
            mask_runs: 3,
            mask_ratio: 0.5,
            robust_retention: 0.8,
            ..PipelineConfig::default()
        })
        .build()
        .await;

    let source = pipeline.ingested("source.pdf").await;
    let target = pipeline.ingested("target.pdf").await;
    let task = pipeline
        .orchestrator
        .create_task(source, target)
        .await
        .unwrap();
    pipeline.orchestrator.run(task.id).await.unwrap();

    let report = completed_report(&pipeline, task.id).await;
    assert_eq!(report.matches.len(), 1);
    let record = &report.matches[0];
    assert_eq!(record.score, 95.0);
    assert_eq!(record.mask_runs, 3);
    assert_eq!(record.mask_ratio, 0.5);
    let masked = record.masked_avg_score.expect("masked trials found the hit");
    assert!((masked - record.score).abs() < 1e-9);

    let check = report.mask_check.expect("robustness summary present");
    assert_eq!(check.total_hits, 1);
    assert_eq!(check.robust_hits, 1);
    assert_eq!(check.runs, 3);

    // one classification query plus one per trial
    assert_eq!(index.query_count(), 4);
}

#[tokio::test]
async fn test_worker_pool_runs_submitted_tasks() {
    let pipeline = PipelineBuilder::new()
        .document("original.pdf", survey_pages())
        .document("copy.pdf", survey_pages())
        .document("ledgers.pdf", unrelated_pages())
        .build()
        .await;

    let source = pipeline.ingested("original.pdf").await;
    let copy = pipeline.ingested("copy.pdf").await;
    let unrelated = pipeline.ingested("ledgers.pdf").await;

    let pool = WorkerPool::start(pipeline.orchestrator.clone(), 2);
    let mut task_ids = Vec::new();
    for target in [copy, unrelated] {
        let task = pipeline
            .orchestrator
            .create_task(source, target)
            .await
            .unwrap();
        pool.submit(task.id).unwrap();
        task_ids.push(task.id);
    }

    let mut verdicts = Vec::new();
    for task_id in &task_ids {
        let task = pipeline
            .orchestrator
            .wait_for_terminal(*task_id, Duration::from_millis(10), Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(task.status, ProcessStatus::Completed);
        verdicts.push(completed_report(&pipeline, *task_id).await.summary.verdict);
    }
    pool.shutdown().await;

    assert_eq!(verdicts, vec![Verdict::HighRisk, Verdict::LowRisk]);
    assert!(pipeline.completion.call_count() >= 4);
}
