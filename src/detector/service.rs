use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{Frame, PoseLandmarks};
use crate::detector::LandmarkDetector;
use crate::error::AppError;
use futures::Future;
use futures::task::Context;
use futures::task::Poll;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower::util::BoxService;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};

/// Adapts a `LandmarkDetector` into a tower service over shared frames.
#[derive(Clone)]
pub struct DetectorService {
    inner: Arc<dyn LandmarkDetector>,
}

impl DetectorService {
    pub fn new(inner: Arc<dyn LandmarkDetector>) -> Self {
        Self { inner }
    }
}

impl Service<Arc<Frame>> for DetectorService {
    type Response = Option<PoseLandmarks>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, frame: Arc<Frame>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let pose = inner.detect(&frame).await?;
            Ok(pose)
        })
    }
}

pub struct DetectorBuilder {
    detector: Arc<dyn LandmarkDetector>,
    timeout: Option<Duration>,
}

impl DetectorBuilder {
    pub fn new(detector: Arc<dyn LandmarkDetector>) -> Self {
        Self {
            detector,
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> DetectorHandle {
        let name = self.detector.name();
        // at most one inference in flight, whatever the caller does
        let service = ServiceBuilder::new()
            .concurrency_limit(1)
            .option_layer(self.timeout.map(TimeoutLayer::new))
            .service(DetectorService::new(self.detector));

        DetectorHandle {
            name,
            timeout: self.timeout,
            service: BoxService::new(service),
        }
    }
}

/// The composed detector service the scheduler awaits once per frame.
pub struct DetectorHandle {
    name: &'static str,
    timeout: Option<Duration>,
    service: BoxService<Arc<Frame>, Option<PoseLandmarks>, BoxError>,
}

impl DetectorHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn detect(&mut self, frame: Arc<Frame>) -> Result<Option<PoseLandmarks>, AppError> {
        let timeout = self.timeout;
        let service = self
            .service
            .ready()
            .await
            .map_err(|e| into_app_error(e, timeout))?;
        service
            .call(frame)
            .await
            .map_err(|e| into_app_error(e, timeout))
    }
}

fn into_app_error(err: BoxError, timeout: Option<Duration>) -> AppError {
    if err.is::<Elapsed>() {
        return AppError::DetectorTimeout(timeout.unwrap_or_default());
    }
    match err.downcast::<AppError>() {
        Ok(app_error) => *app_error,
        Err(other) => AppError::Detector(other.to_string()),
    }
}
