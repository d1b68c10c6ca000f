//! Background task that answers validation requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scenario_core::{AstNode, NodeEvaluation};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ValidationRequest, ValidationResponse};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation timed out after {0:?}")]
    Timeout(Duration),

    #[error("validation service failed: {0}")]
    Failed(String),
}

/// Produces a shape-mirroring evaluation for a submitted formula.
#[async_trait]
pub trait ValidationService: Send + Sync {
    async fn validate(&self, node: &AstNode) -> Result<NodeEvaluation, ServiceError>;
}

/// Drains validation requests and forwards responses in arrival order.
pub struct ValidationWorker<V> {
    service: Arc<V>,
    requests: UnboundedReceiver<ValidationRequest>,
    responses: UnboundedSender<ValidationResponse>,
    shutdown: Arc<Notify>,
    timeout: Duration,
}

/// Channels and task of a spawned [`ValidationWorker`].
pub struct ValidationHandle {
    pub requests: UnboundedSender<ValidationRequest>,
    pub responses: UnboundedReceiver<ValidationResponse>,
    pub shutdown: Arc<Notify>,
    pub task: JoinHandle<()>,
}

impl ValidationHandle {
    /// Stop the worker and wait for it to exit.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            warn!(error = %e, "validation worker task failed");
        }
    }
}

impl<V: ValidationService + 'static> ValidationWorker<V> {
    pub fn new(
        service: Arc<V>,
        requests: UnboundedReceiver<ValidationRequest>,
        responses: UnboundedSender<ValidationResponse>,
        shutdown: Arc<Notify>,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            requests,
            responses,
            shutdown,
            timeout,
        }
    }

    /// Create the channels and run a worker on the current tokio runtime.
    pub fn spawn(service: Arc<V>, timeout: Duration) -> ValidationHandle {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());

        let worker = Self::new(service, request_rx, response_tx, shutdown.clone(), timeout);
        let task = tokio::spawn(worker.run());

        ValidationHandle {
            requests: request_tx,
            responses: response_rx,
            shutdown,
            task,
        }
    }

    /// Run until the request channel closes or shutdown is notified.
    pub async fn run(mut self) {
        info!(timeout_ms = self.timeout.as_millis() as u64, "validation worker started");
        loop {
            tokio::select! {
                request = self.requests.recv() => {
                    match request {
                        Some(request) => self.handle(request).await,
                        None => {
                            info!("validation request channel closed");
                            break;
                        }
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("validation worker shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, request: ValidationRequest) {
        let revision = request.revision;
        let evaluation = match tokio::time::timeout(self.timeout, self.service.validate(&request.node)).await {
            Ok(Ok(evaluation)) => evaluation,
            Ok(Err(e)) => {
                warn!(revision, error = %e, "validation failed");
                return;
            }
            Err(_) => {
                warn!(revision, error = %ServiceError::Timeout(self.timeout), "validation failed");
                return;
            }
        };

        debug!(revision, errors = evaluation.error_count(), "validation finished");
        if self.responses.send(ValidationResponse { revision, evaluation }).is_err() {
            debug!(revision, "response receiver dropped");
        }
    }
}
