//! Orchestrator Tests
//!
//! End-to-end job runs against the mock engine.

use std::time::Duration;

use pretty_assertions::assert_eq;
use test_case::test_case;

use slowverb::engine::{FailAt, MockEngine};
use slowverb::orchestrator::PROCESSING_STATUS;
use slowverb::{EffectParameters, ProcessingError, ProcessingOrchestrator};

fn params(tempo: f64, pitch: i32, reverb: u8) -> EffectParameters {
    EffectParameters::new(tempo, pitch, reverb).unwrap()
}

/// Run one job and collect every progress update
async fn run_collecting(
    engine: &MockEngine,
    file_name: &str,
    params: &EffectParameters,
) -> (Result<slowverb::OutputArtifact, ProcessingError>, Vec<(u8, String)>) {
    let orchestrator = ProcessingOrchestrator::new(engine);
    let mut updates = Vec::new();
    let result = orchestrator
        .run(b"RIFF....WAVE".to_vec(), file_name, params, |p: u8, s: &str| {
            updates.push((p, s.to_string()))
        })
        .await;
    (result, updates)
}

// === Progress ===

#[tokio::test]
async fn test_progress_timeline() {
    let engine = MockEngine::new().with_progress(vec![0.0, 0.5, 1.0]);
    let (result, updates) = run_collecting(&engine, "song.wav", &params(0.8, 0, 50)).await;
    assert!(result.is_ok());

    assert_eq!(
        updates,
        vec![
            (5, "Reading audio file...".to_string()),
            (15, "Preparing audio filters...".to_string()),
            (20, "Applying effects...".to_string()),
            (20, PROCESSING_STATUS.to_string()),
            (55, PROCESSING_STATUS.to_string()),
            (95, PROCESSING_STATUS.to_string()),
            (95, "Finalizing...".to_string()),
            (100, "Complete!".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_progress_is_non_decreasing() {
    let engine = MockEngine::new().with_progress(vec![0.9, 0.1, 0.4, 2.0, 0.3]);
    let (result, updates) = run_collecting(&engine, "song.wav", &params(1.2, 2, 15)).await;
    assert!(result.is_ok());

    let percents: Vec<u8> = updates.iter().map(|(p, _)| *p).collect();
    assert!(
        percents.windows(2).all(|w| w[0] <= w[1]),
        "progress went backwards: {:?}",
        percents
    );
    assert!(percents[..percents.len() - 1].iter().all(|p| *p <= 95));
    assert_eq!(updates.last(), Some(&(100, "Complete!".to_string())));
}

#[tokio::test]
async fn test_no_engine_progress() {
    let engine = MockEngine::new().with_progress(Vec::new());
    let (result, updates) = run_collecting(&engine, "song.wav", &params(1.0, 0, 0)).await;
    assert!(result.is_ok());
    let percents: Vec<u8> = updates.iter().map(|(p, _)| *p).collect();
    assert_eq!(percents, vec![5, 15, 20, 95, 100]);
}

// === Output ===

#[tokio::test]
async fn test_artifact() {
    let engine = MockEngine::new();
    let (result, _) = run_collecting(&engine, "Late Night.FLAC", &params(0.75, -3, 70)).await;
    let artifact = result.unwrap();

    assert_eq!(artifact.file_name, "Late Night_slowed_pitch_down_reverb.mp3");
    assert_eq!(artifact.mime_type, "audio/mp3");
    assert_eq!(artifact.data, b"RIFF....WAVE".to_vec());

    let executed = engine.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(
        executed[0],
        vec![
            "-i",
            "input_audio.flac",
            "-filter:a",
            "asetrate=37084,aresample=44100,atempo=0.75,aecho=0.8:0.826:61|92|134:0.45|0.33|0.24",
            "-y",
            "output_audio.mp3",
        ]
    );
}

#[tokio::test]
async fn test_artifact_written_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let engine = MockEngine::new();
    let (result, _) = run_collecting(&engine, "song.wav", &params(0.8, 0, 50)).await;

    let path = result.unwrap().write_to_dir(dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("song_slowed_reverb.mp3"));
    assert_eq!(std::fs::read(path).unwrap(), b"RIFF....WAVE".to_vec());
}

// === Failures ===

#[test_case(FailAt::StageInput ; "staging input")]
#[test_case(FailAt::Execute ; "executing")]
#[test_case(FailAt::ReadOutput ; "reading output")]
#[tokio::test]
async fn test_failure_is_generic_and_cleans_up_once(fail_at: FailAt) {
    let engine = MockEngine::new().failing_at(fail_at);
    let (result, updates) = run_collecting(&engine, "song.wav", &params(0.8, -2, 50)).await;

    let err = result.unwrap_err();
    assert_eq!(err, ProcessingError);
    assert_eq!(
        err.to_string(),
        "Failed to process audio. Please try a different file."
    );

    assert_eq!(engine.deleted(), vec!["input_audio.wav", "output_audio.mp3"]);
    assert!(engine.resource_names().is_empty());
    assert!(!updates.iter().any(|(p, _)| *p == 100));
    assert_eq!(engine.subscriber_count(), 0);
}

#[tokio::test]
async fn test_missing_output_fails() {
    let engine = MockEngine::new().without_output();
    let (result, _) = run_collecting(&engine, "song.wav", &params(0.8, 0, 0)).await;
    assert_eq!(result.unwrap_err(), ProcessingError);
    assert_eq!(engine.deleted().len(), 2);
}

#[tokio::test]
async fn test_execute_timeout() {
    let engine = MockEngine::new().with_execute_delay(Duration::from_secs(60));
    let orchestrator = ProcessingOrchestrator::new(&engine)
        .with_execute_timeout(Some(Duration::from_millis(25)));

    let result = orchestrator
        .run(vec![0], "song.wav", &params(0.8, 0, 0), |_: u8, _: &str| {})
        .await;

    assert_eq!(result.unwrap_err(), ProcessingError);
    assert!(engine.resource_names().is_empty());
}

// === Engine reuse ===

#[tokio::test]
async fn test_sequential_jobs_do_not_accumulate_listeners() {
    let engine = MockEngine::new().with_progress(vec![0.5]);

    for (i, file) in ["a.wav", "b.mp3", "c.ogg"].iter().enumerate() {
        let (result, updates) = run_collecting(&engine, file, &params(1.35, 4, 25)).await;
        assert!(result.is_ok(), "job {} failed", i);
        assert_eq!(engine.subscriber_count(), 0);

        // each job sees only its own engine progress
        let engine_updates = updates
            .iter()
            .filter(|(_, s)| s == PROCESSING_STATUS)
            .count();
        assert_eq!(engine_updates, 1);
    }

    assert_eq!(engine.executed().len(), 3);
    assert!(engine.resource_names().is_empty());
}

#[tokio::test]
async fn test_failed_job_then_new_job() {
    let failing = MockEngine::new().failing_at(FailAt::Execute);
    let (first, _) = run_collecting(&failing, "song.wav", &params(0.8, 0, 50)).await;
    assert!(first.is_err());

    let engine = MockEngine::new();
    let (second, _) = run_collecting(&engine, "song.wav", &params(0.8, 0, 50)).await;
    assert_eq!(second.unwrap().file_name, "song_slowed_reverb.mp3");
}
