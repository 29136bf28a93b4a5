#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vocalize_core::{
    AudioBackend, BackendError, EmotionTable, PlaybackRequest, Platform, RateConfig,
    SpeakOrchestrator, VoiceDescriptor,
};

/// Backend that records every play call and flags overlapping playback.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<PlaybackRequest>>,
    pub plays: AtomicUsize,
    pub overlapped: AtomicBool,
    playing: AtomicBool,
    pub delay: Duration,
}

impl RecordingBackend {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Option<PlaybackRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AudioBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn emotion_table(&self) -> EmotionTable {
        EmotionTable::for_platform(Platform::MacOs)
    }

    async fn voices(&self) -> Result<Vec<VoiceDescriptor>, BackendError> {
        Ok(["Albert", "Good News", "Bad News"]
            .iter()
            .map(|n| VoiceDescriptor::new(*n, format!("com.apple.speech.{}", n)))
            .collect())
    }

    async fn play(&self, request: &PlaybackRequest) -> Result<(), BackendError> {
        if self.playing.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.calls.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }
}

pub async fn orchestrator(backend: Arc<RecordingBackend>) -> Arc<SpeakOrchestrator> {
    let backend: Arc<dyn AudioBackend> = backend;
    Arc::new(SpeakOrchestrator::initialize(Some(backend), RateConfig::default()).await)
}
