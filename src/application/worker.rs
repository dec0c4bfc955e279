//! Background worker
//!
//! Runs provider and executor calls on a tokio runtime so the UI loop never
//! blocks on subprocess or network I/O. Every call is bounded by a
//! caller-supplied budget, and every outcome (success, failure, timeout,
//! panic) comes back as a [`WorkerEvent`] on a channel the UI loop drains.
//! Cancellation is advisory: a timed-out call keeps running, its result is
//! simply never delivered.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::{
    ActionError, ActionResult, Generation, LoadCompletion, LoadError, LoadRequest,
    PreparedAction, ResourceProvider, RootSource, RootsCompletion,
};
use crate::error::{CloudscopeError, CloudscopeResult};

/// A finished action, tagged with the generation it was issued under.
#[derive(Debug, Clone)]
pub struct ActionCompletion {
    pub generation: Generation,
    pub action: &'static str,
    pub target: String,
    pub result: ActionResult,
}

#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Roots(RootsCompletion),
    Load(LoadCompletion),
    Action(ActionCompletion),
}

pub struct Worker {
    runtime: Runtime,
    tx: UnboundedSender<WorkerEvent>,
    rx: UnboundedReceiver<WorkerEvent>,
    in_flight: usize,
}

impl Worker {
    pub fn new() -> CloudscopeResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("cloudscope-worker")
            .enable_all()
            .build()
            .map_err(|e| CloudscopeError::Runtime(e.to_string()))?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            tx,
            rx,
            in_flight: 0,
        })
    }

    /// Calls issued and not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn_roots(
        &mut self,
        generation: Generation,
        source: Arc<dyn RootSource>,
        budget: Duration,
    ) {
        tracing::debug!(%generation, "listing roots");
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result = bounded(budget, async move { source.roots().await }).await;
            let _ = tx.send(WorkerEvent::Roots(RootsCompletion { generation, result }));
        });
    }

    pub fn spawn_load(
        &mut self,
        request: LoadRequest,
        provider: Option<Arc<dyn ResourceProvider>>,
        budget: Duration,
    ) {
        tracing::debug!(
            node = %request.node,
            kind = %request.target.kind,
            label = %request.target.label,
            generation = %request.generation,
            "loading children"
        );
        let tx = self.tx.clone();
        self.in_flight += 1;

        let Some(provider) = provider else {
            let result = Err(LoadError::NoProvider(request.target.kind));
            let _ = tx.send(WorkerEvent::Load(LoadCompletion::for_request(&request, result)));
            return;
        };

        self.runtime.spawn(async move {
            let target = request.target.clone();
            let result = bounded(budget, async move { provider.children(&target).await }).await;
            let _ = tx.send(WorkerEvent::Load(LoadCompletion::for_request(&request, result)));
        });
    }

    pub fn spawn_action(
        &mut self,
        generation: Generation,
        prepared: PreparedAction,
        budget: Duration,
    ) {
        let action = prepared.spec.name;
        let target = prepared.request.target.label.clone();
        tracing::info!(action, target = %target, %generation, "dispatching action");
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result: ActionResult = bounded(budget, prepared.execute()).await.into();
            let _ = tx.send(WorkerEvent::Action(ActionCompletion {
                generation,
                action,
                target,
                result,
            }));
        });
    }

    /// Non-blocking poll, for the UI loop.
    pub fn try_recv(&mut self) -> Option<WorkerEvent> {
        let event = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Block for at most `wait` until the next event arrives.
    pub fn recv_timeout(&mut self, wait: Duration) -> Option<WorkerEvent> {
        let rx = &mut self.rx;
        let event = self
            .runtime
            .block_on(async { tokio::time::timeout(wait, rx.recv()).await.ok().flatten() })?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }
}

/// Errors a bounded call can end with when the call itself never answers.
trait Interrupted {
    fn timed_out(budget: Duration) -> Self;
    fn panicked(message: String) -> Self;
}

impl Interrupted for LoadError {
    fn timed_out(budget: Duration) -> Self {
        LoadError::Timeout(budget)
    }

    fn panicked(message: String) -> Self {
        LoadError::CommandFailed(message)
    }
}

impl Interrupted for ActionError {
    fn timed_out(budget: Duration) -> Self {
        ActionError::Timeout(budget)
    }

    fn panicked(message: String) -> Self {
        ActionError::CommandFailed(message)
    }
}

/// Run `fut` as its own task under `budget`. A panic or timeout becomes an
/// error of the call's own type like any other failure.
async fn bounded<T, E, F>(budget: Duration, fut: F) -> Result<T, E>
where
    T: Send + 'static,
    E: Interrupted + Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    let handle = tokio::spawn(fut);
    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(E::panicked(format!("background task failed: {join}"))),
        Err(_) => Err(E::timed_out(budget)),
    }
}
