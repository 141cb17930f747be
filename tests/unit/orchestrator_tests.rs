/*!
 * Tests for the translation orchestrator through its public API
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use subtitle_translator::errors::TranslationError;
use subtitle_translator::providers::mock::MockTranslator;
use subtitle_translator::translation::{
    ConcurrencyMode, ConcurrencySettings, RunControl, TranslationEvent, TranslationOrchestrator, TranslationStatus,
};

use crate::common::numbered_file;

fn orchestrator(translator: &MockTranslator, settings: ConcurrencySettings) -> Arc<TranslationOrchestrator> {
    crate::common::init_test_logger();
    Arc::new(TranslationOrchestrator::new(Arc::new(translator.clone()), settings))
}

/// Drain everything currently queued on the event channel
fn drain(events: &mut tokio::sync::broadcast::Receiver<TranslationEvent>) -> Vec<TranslationEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

#[tokio::test]
async fn test_pauseAndResume_duringSequentialRun_shouldHoldThenFinish() {
    let translator = MockTranslator::working().with_delay(15);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(1, 1, 0));
    let mut events = orchestrator.subscribe();

    let runner = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move { runner.translate_file(numbered_file(6), "en", "fr").await });

    loop {
        if let Ok(TranslationEvent::Progress(progress)) = events.recv().await {
            if progress.completed >= 2 {
                break;
            }
        }
    }
    assert!(orchestrator.pause());
    assert_eq!(orchestrator.status(), TranslationStatus::Paused);

    // Let the in-flight request settle, then make sure nothing new starts
    tokio::time::sleep(Duration::from_millis(60)).await;
    let held = translator.request_count();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(translator.request_count(), held);
    assert!(held < 6);

    assert!(orchestrator.resume());
    let file = handle.await.unwrap().unwrap();

    assert_eq!(translator.request_count(), 6);
    assert_eq!(file.translated_count(), 6);
    assert_eq!(orchestrator.status(), TranslationStatus::Completed);

    let statuses: Vec<TranslationStatus> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            TranslationEvent::Status(status) => Some(status),
            TranslationEvent::Progress(_) => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![TranslationStatus::Paused, TranslationStatus::Running, TranslationStatus::Completed]
    );
}

#[tokio::test]
async fn test_cancel_whilePaused_shouldEndWithCancelled() {
    let translator = MockTranslator::working().with_delay(10);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(2, 2, 0));
    let mut events = orchestrator.subscribe();

    let runner = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move { runner.translate_file(numbered_file(20), "en", "fr").await });

    while events.recv().await != Ok(TranslationEvent::Status(TranslationStatus::Running)) {}
    orchestrator.pause();
    orchestrator.cancel();

    let result = handle.await.unwrap();
    assert!(result.as_ref().is_err_and(TranslationError::is_cancelled));
    assert_eq!(orchestrator.status(), TranslationStatus::Cancelled);
    assert!(translator.request_count() < 20);
}

#[tokio::test]
async fn test_cancelThenPauseAndResume_shouldStillEndWithCancelled() {
    let translator = MockTranslator::working().with_delay(10);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(1, 1, 0));
    let mut events = orchestrator.subscribe();

    let runner = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move { runner.translate_file(numbered_file(20), "en", "fr").await });

    while events.recv().await != Ok(TranslationEvent::Status(TranslationStatus::Running)) {}
    orchestrator.cancel();
    assert!(!orchestrator.pause());
    orchestrator.resume();

    let result = handle.await.unwrap();
    assert!(result.as_ref().is_err_and(TranslationError::is_cancelled));
    assert_eq!(orchestrator.status(), TranslationStatus::Cancelled);
    assert!(translator.request_count() < 20);
}

#[tokio::test]
async fn test_sharedControl_shouldCancelFromAnotherHandle() {
    let translator = MockTranslator::working().with_delay(10);
    let control = RunControl::default();
    let orchestrator = Arc::new(
        TranslationOrchestrator::new(Arc::new(translator.clone()), ConcurrencySettings::custom(1, 1, 0))
            .with_control(control.clone()),
    );
    let mut events = control.subscribe();

    let runner = Arc::clone(&orchestrator);
    let handle = tokio::spawn(async move { runner.translate_file(numbered_file(10), "en", "fr").await });

    while events.recv().await != Ok(TranslationEvent::Status(TranslationStatus::Running)) {}
    control.cancel();

    assert!(matches!(handle.await.unwrap(), Err(TranslationError::Cancelled)));
    assert_eq!(control.status(), TranslationStatus::Cancelled);
}

#[tokio::test]
async fn test_concurrentRun_shouldNeverExceedMaxConcurrent() {
    let translator = MockTranslator::working().with_delay(10);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(3, 8, 0));

    let file = orchestrator.translate_file(numbered_file(16), "en", "ja").await.unwrap();

    assert_eq!(translator.max_in_flight(), 3);
    for (index, entry) in file.entries.iter().enumerate() {
        assert_eq!(entry.translated_text.as_deref(), Some(format!("[ja] Line {}", index + 1).as_str()));
    }
}

#[tokio::test]
async fn test_concurrentRun_shouldReportProgressPerBatch() {
    let translator = MockTranslator::working();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(2, 3, 0));
    let mut events = orchestrator.subscribe();

    orchestrator.translate_file(numbered_file(7), "en", "fr").await.unwrap();

    let completed: Vec<usize> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            TranslationEvent::Progress(progress) => Some(progress.completed),
            TranslationEvent::Status(_) => None,
        })
        .collect();
    assert_eq!(completed, vec![0, 3, 6, 7]);
}

#[tokio::test]
async fn test_sequentialRun_shouldDelayBetweenEntriesOnly() {
    let translator = MockTranslator::working();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(1, 1, 40));

    let started = Instant::now();
    orchestrator.translate_file(numbered_file(3), "en", "fr").await.unwrap();

    // Two gaps for three entries
    assert!(started.elapsed() >= Duration::from_millis(80));
}

#[tokio::test]
async fn test_intermittentFailures_shouldFallBackAndRecordErrors() {
    let translator = MockTranslator::intermittent(3);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(1, 1, 0));
    let mut events = orchestrator.subscribe();

    let file = orchestrator.translate_file(numbered_file(6), "en", "fr").await.unwrap();

    assert_eq!(file.entries[2].translated_text.as_deref(), Some("Line 3"));
    assert_eq!(file.entries[5].translated_text.as_deref(), Some("Line 6"));
    assert_eq!(file.entries[0].translated_text.as_deref(), Some("[fr] Line 1"));

    let last = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            TranslationEvent::Progress(progress) => Some(progress),
            TranslationEvent::Status(_) => None,
        })
        .last()
        .unwrap();
    assert_eq!(last.errors.len(), 2);
    assert!(last.errors[0].starts_with("entry 3:"));
    assert!(last.errors[1].starts_with("entry 6:"));
    assert!(last.is_complete());
}

#[tokio::test]
async fn test_everyEntryFailing_shouldStillComplete() {
    let translator = MockTranslator::failing();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::preset(ConcurrencyMode::High));

    let file = orchestrator.translate_file(numbered_file(10), "en", "fr").await.unwrap();

    assert!(file.entries.iter().all(|e| e.translated_text.as_deref() == Some(e.text.as_str())));
    assert_eq!(orchestrator.status(), TranslationStatus::Completed);
}

#[tokio::test]
async fn test_translation_shouldLeaveSourceTextUntouched() {
    let translator = MockTranslator::working();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(1, 1, 0));

    let file = orchestrator.translate_file(numbered_file(2), "en", "fr").await.unwrap();

    assert_eq!(file.entries[0].text, "Line 1");
    assert_eq!(file.entries[0].original_text, "Line 1");
    assert_eq!(file.entries[0].translated_text.as_deref(), Some("[fr] Line 1"));
}

#[tokio::test]
async fn test_emptyFile_shouldCompleteWithoutRequests() {
    let translator = MockTranslator::working();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::default());

    let file = orchestrator.translate_file(numbered_file(0), "en", "fr").await.unwrap();

    assert!(file.entries.is_empty());
    assert_eq!(translator.request_count(), 0);
    assert_eq!(orchestrator.status(), TranslationStatus::Completed);
}

#[tokio::test]
async fn test_contextWindow_shouldUseNeighborsInConcurrentMode() {
    let translator = MockTranslator::working();
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(4, 4, 0));

    orchestrator.translate_file(numbered_file(3), "en", "fr").await.unwrap();

    let mut requests = translator.requests();
    requests.sort_by(|a, b| a.text.cmp(&b.text));
    assert_eq!(requests[2].context.as_deref(), Some("Previous: \"Line 2\""));
    assert_eq!(requests[1].context.as_deref(), Some("Previous: \"Line 1\"\nNext: \"Line 3\""));
}

#[test]
fn test_translateTexts_shouldBlankFailedItemsInOrder() {
    let translator = MockTranslator::working().failing_on(["two"]);
    let orchestrator = orchestrator(&translator, ConcurrencySettings::custom(2, 2, 5));
    let texts: Vec<String> = ["one", "two", "three"].iter().map(|s| s.to_string()).collect();

    let results = tokio_test::block_on(orchestrator.translate_texts(&texts, "en", "it"));

    assert_eq!(results, vec!["[it] one".to_string(), String::new(), "[it] three".to_string()]);
    assert!(translator.requests().iter().all(|request| request.context.is_none()));
}
