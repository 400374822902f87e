//! # Controller Loop
//!
//! Every controller in the storefront runs the same event loop: take a command from a
//! handle, take the outcome of background work it started, or react to its quiet period
//! elapsing. [`ControllerRunner`] writes that loop *once*; a type implementing
//! [`Controller`] only supplies the reactions.
//!
//! ```text
//!   handle ──command──▶ ┌──────────────────┐ ──snapshot──▶ watch receivers
//!                       │ ControllerRunner │
//!   spawned work ─────▶ │   + Controller   │ ──spawn──▶ catalog calls
//!                       └──────────────────┘
//! ```
//!
//! Reactions get a [`ControllerRuntime`]: the injected context, the debouncer, the
//! attempt tracker, and the channels for publishing snapshots and reporting outcomes.
//! Background work started with [`ControllerRuntime::spawn`] reports back through the
//! loop, so state is only ever touched from the controller's own task.

use crate::clients::CatalogApi;
use crate::framework::{AttemptTracker, ControllerContext, Debouncer};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// The reactions of one kind of controller.
///
/// Reactions are synchronous: anything slow is spawned through the runtime and comes
/// back later as an [`Controller::Outcome`].
pub trait Controller: Send + Sized + 'static {
    /// Requests sent by the handle, each carrying its own responder.
    type Command: Send + 'static;
    /// Results of spawned work.
    type Outcome: Send + 'static;
    /// Whole state published to observers.
    type Snapshot: Clone + Send + Sync + 'static;

    /// Used in log lines.
    const NAME: &'static str;

    fn snapshot(&self) -> Self::Snapshot;

    /// Called once, before the first event.
    fn on_start(&mut self, _runtime: &mut ControllerRuntime<Self>) {}

    fn on_command(&mut self, command: Self::Command, runtime: &mut ControllerRuntime<Self>);

    fn on_outcome(&mut self, outcome: Self::Outcome, runtime: &mut ControllerRuntime<Self>);

    /// Called when the debouncer's deadline passes.
    fn on_quiet_period(&mut self, _runtime: &mut ControllerRuntime<Self>) {}
}

/// What a [`Controller`] may use while reacting to an event.
pub struct ControllerRuntime<C: Controller> {
    context: ControllerContext,
    outcomes: mpsc::Sender<C::Outcome>,
    snapshot: watch::Sender<C::Snapshot>,
    pub debouncer: Debouncer,
    /// Children of the context's shutdown token.
    pub attempts: AttemptTracker,
}

impl<C: Controller> ControllerRuntime<C> {
    pub fn api(&self) -> Arc<dyn CatalogApi> {
        Arc::clone(&self.context.api)
    }

    pub fn publish(&self, snapshot: C::Snapshot) {
        self.snapshot.send_replace(snapshot);
    }

    /// Runs `work` as its own task; its result is delivered to [`Controller::on_outcome`].
    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = C::Outcome> + Send + 'static,
    {
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            // The loop is gone when this fails; nobody is left to care.
            let _ = outcomes.send(outcome).await;
        });
    }
}

enum Event<C: Controller> {
    Command(C::Command),
    Outcome(C::Outcome),
    QuietPeriodElapsed,
}

/// The server half of a controller: owns the state and drives the loop.
pub struct ControllerRunner<C: Controller> {
    controller: C,
    receiver: mpsc::Receiver<C::Command>,
    outcome_tx: mpsc::Sender<C::Outcome>,
    outcome_rx: mpsc::Receiver<C::Outcome>,
    snapshot: watch::Sender<C::Snapshot>,
    quiet_period: Duration,
}

impl<C: Controller> ControllerRunner<C> {
    /// Returns the runner plus the two ends a handle needs.
    pub fn new(
        controller: C,
        capacity: usize,
    ) -> (Self, mpsc::Sender<C::Command>, watch::Receiver<C::Snapshot>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let (outcome_tx, outcome_rx) = mpsc::channel(capacity);
        let (snapshot, snapshot_rx) = watch::channel(controller.snapshot());

        let runner = Self {
            controller,
            receiver,
            outcome_tx,
            outcome_rx,
            snapshot,
            quiet_period: Duration::ZERO,
        };
        (runner, sender, snapshot_rx)
    }

    /// Sets the quiet period used by the runtime's debouncer.
    pub fn with_debounce(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Runs until every handle is dropped or the context shuts down.
    ///
    /// On exit the in-flight attempt is cancelled.
    pub async fn run(self, context: ControllerContext) {
        let Self {
            mut controller,
            mut receiver,
            outcome_tx,
            mut outcome_rx,
            snapshot,
            quiet_period,
        } = self;

        info!(controller = C::NAME, "Controller started");
        let shutdown = context.shutdown.clone();
        let mut runtime = ControllerRuntime {
            attempts: AttemptTracker::with_parent(shutdown.clone()),
            debouncer: Debouncer::new(quiet_period),
            context,
            outcomes: outcome_tx,
            snapshot,
        };
        controller.on_start(&mut runtime);

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = receiver.recv() => match command {
                    Some(command) => Event::<C>::Command(command),
                    None => break,
                },
                Some(outcome) = outcome_rx.recv() => Event::Outcome(outcome),
                _ = runtime.debouncer.elapsed() => Event::QuietPeriodElapsed,
            };

            match event {
                Event::Command(command) => controller.on_command(command, &mut runtime),
                Event::Outcome(outcome) => controller.on_outcome(outcome, &mut runtime),
                Event::QuietPeriodElapsed => controller.on_quiet_period(&mut runtime),
            }
        }

        runtime.attempts.supersede();
        info!(controller = C::NAME, "Controller stopped");
    }
}
