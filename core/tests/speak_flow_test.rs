/// End-to-end speak flow against a recording backend
mod common;

use common::{orchestrator, RecordingBackend};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use vocalize_core::SpeakRequest;

#[tokio::test]
async fn dramatic_emotion_resolves_to_bad_news() {
    let backend = Arc::new(RecordingBackend::default());
    let orchestrator = orchestrator(backend.clone()).await;

    assert_eq!(orchestrator.resolve_voice(Some("dramatic"), None), 2);
    assert_eq!(orchestrator.resolve_voice(Some("cheerful"), None), 1);
    assert_eq!(orchestrator.resolve_voice(None, Some("albert")), 0);
    assert_eq!(orchestrator.resolve_voice(None, None), 0);
}

#[tokio::test]
async fn cheerful_speech_is_faster() {
    let backend = Arc::new(RecordingBackend::default());
    let orchestrator = orchestrator(backend.clone()).await;

    let result = orchestrator
        .speak(SpeakRequest::new("Great job!").emotion("cheerful"))
        .await;

    assert_eq!(
        result,
        "🗣️ Spoke: 'Great job!' (emotion: cheerful, rate: 169 wpm, engine: recording)"
    );
    let played = backend.last().unwrap();
    assert_eq!(played.rate, 169);
    assert_eq!(played.voice.unwrap().name, "Good News");
}

#[tokio::test]
async fn calm_speech_is_slower_and_clamped() {
    let backend = Arc::new(RecordingBackend::default());
    let orchestrator = orchestrator(backend.clone()).await;

    let result = orchestrator
        .speak(SpeakRequest::new("Breathe").emotion("calm").rate(50))
        .await;
    assert!(result.contains("rate: 50 wpm"), "{}", result);

    let result = orchestrator
        .speak(SpeakRequest::new("Alert").emotion("dramatic").rate(400))
        .await;
    assert!(result.contains("rate: 400 wpm"), "{}", result);
}

#[tokio::test]
async fn empty_text_never_plays() {
    let backend = Arc::new(RecordingBackend::default());
    let orchestrator = orchestrator(backend.clone()).await;

    let result = orchestrator.speak(SpeakRequest::new("")).await;
    assert_eq!(result, "❌ Error: Text cannot be empty");
    assert_eq!(backend.plays.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_voice_falls_back_to_emotion() {
    let backend = Arc::new(RecordingBackend::default());
    let orchestrator = orchestrator(backend.clone()).await;

    let result = orchestrator
        .speak(SpeakRequest::new("Hi").voice("Nonexistent").emotion("dramatic"))
        .await;
    assert!(result.contains("voice: Bad News"), "{}", result);
}

#[tokio::test]
async fn concurrent_speaks_never_overlap() {
    const N: usize = 8;
    let backend = Arc::new(RecordingBackend::with_delay(Duration::from_millis(10)));
    let orchestrator = orchestrator(backend.clone()).await;

    let mut handles = Vec::new();
    for i in 0..N {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            orchestrator
                .speak(SpeakRequest::new(format!("line {}", i)))
                .await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.starts_with("🗣️ Spoke:"), "{}", result);
    }

    assert_eq!(backend.plays.load(Ordering::SeqCst), N);
    assert!(!backend.overlapped.load(Ordering::SeqCst));
}

#[tokio::test]
async fn playback_timeout_is_reported() {
    let backend = Arc::new(RecordingBackend::with_delay(Duration::from_secs(5)));
    let orchestrator = vocalize_core::SpeakOrchestrator::initialize(
        Some(backend as Arc<dyn vocalize_core::AudioBackend>),
        vocalize_core::RateConfig::default(),
    )
    .await
    .with_playback_timeout(Some(Duration::from_millis(20)));

    let result = orchestrator.speak(SpeakRequest::new("slow")).await;
    assert_eq!(
        result,
        "❌ Error speaking text: playback timed out after 20 ms"
    );
}
