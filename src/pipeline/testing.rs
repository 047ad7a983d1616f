use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::common::{Frame, PoseLandmarks};
use crate::detector::LandmarkDetector;
use crate::error::AppError;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    DetectStart(u64),
    DetectEnd(u64),
    Rendered(u64),
}

/// Answers from a fixed script indexed by source frame, logging every call.
pub(crate) struct ScriptedDetector {
    script: Vec<Option<PoseLandmarks>>,
    events: Arc<Mutex<Vec<Event>>>,
    in_flight: AtomicBool,
    fail_at: Option<u64>,
}

impl ScriptedDetector {
    pub(crate) fn new(script: Vec<Option<PoseLandmarks>>) -> Self {
        Self {
            script,
            events: Arc::new(Mutex::new(Vec::new())),
            in_flight: AtomicBool::new(false),
            fail_at: None,
        }
    }

    pub(crate) fn failing_at(mut self, sequence: u64) -> Self {
        self.fail_at = Some(sequence);
        self
    }

    pub(crate) fn events(&self) -> Arc<Mutex<Vec<Event>>> {
        Arc::clone(&self.events)
    }
}

#[async_trait]
impl LandmarkDetector for ScriptedDetector {
    async fn detect(&self, frame: &Frame) -> Result<Option<PoseLandmarks>, AppError> {
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "detector invoked while a previous call was in flight"
        );
        self.events
            .lock()
            .unwrap()
            .push(Event::DetectStart(frame.sequence()));

        tokio::task::yield_now().await;

        self.events
            .lock()
            .unwrap()
            .push(Event::DetectEnd(frame.sequence()));
        self.in_flight.store(false, Ordering::SeqCst);

        if self.fail_at == Some(frame.sequence()) {
            return Err(AppError::Detector("inference crashed".to_string()));
        }
        Ok(self
            .script
            .get(frame.sequence() as usize)
            .cloned()
            .flatten())
    }

    fn name(&self) -> &'static str {
        "ScriptedDetector"
    }
}
