//! # Tag Picker
//!
//! Debounces the tag search box, keeps the latest result list, and turns selected
//! tag ids back into [`TagRef`]s for the search filter.
//!
//! Lookups here are ancillary: a failed search keeps the previous results and a
//! failed id lookup just leaves that tag out. Both are logged.

use crate::clients::{CatalogApi, CatalogError};
use crate::config::StorefrontConfig;
use crate::framework::{
    request, Attempt, Controller, ControllerContext, ControllerRunner, ControllerRuntime,
    FrameworkError, Response,
};
use crate::model::{TagId, TagRef};
use crate::query::TagSearchQuery;
use crate::tags::TagError;
use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument, warn};

/// Where the picker is in its debounce / search cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPhase {
    /// Not started yet.
    #[default]
    Idle,
    /// Waiting out the quiet period after the last keystroke.
    Scheduled,
    Searching,
    /// The search for `text` has answered. On failure the previous results stay.
    Settled,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSnapshot {
    pub phase: TagPhase,
    /// Current contents of the search box.
    pub text: String,
    /// Results of the last successful search.
    pub results: Vec<TagRef>,
}

#[derive(Debug)]
pub(crate) enum TagCommand {
    SetText {
        text: String,
        respond_to: Response<()>,
    },
    Select {
        ids: Vec<TagId>,
        respond_to: Response<Vec<TagRef>>,
    },
}

pub(crate) struct SearchOutcome {
    attempt: Attempt,
    result: Result<Vec<TagRef>, CatalogError>,
}

struct TagSearch {
    state: TagSnapshot,
    limit: u32,
}

/// The actor half of the tag picker.
pub struct TagPicker {
    runner: ControllerRunner<TagSearch>,
}

impl TagPicker {
    pub fn new(config: &StorefrontConfig) -> (Self, TagHandle) {
        let search = TagSearch {
            state: TagSnapshot::default(),
            limit: config.tag_search_limit,
        };
        let (runner, sender, snapshot) = ControllerRunner::new(search, config.channel_capacity);
        let picker = Self {
            runner: runner.with_debounce(config.tag_search_debounce()),
        };
        (picker, TagHandle { sender, snapshot })
    }

    /// Runs until every handle is dropped or the context shuts down. The empty
    /// search is scheduled at start so the picker opens with suggestions.
    pub async fn run(self, context: ControllerContext) {
        self.runner.run(context).await
    }
}

type Runtime = ControllerRuntime<TagSearch>;

impl Controller for TagSearch {
    type Command = TagCommand;
    type Outcome = SearchOutcome;
    type Snapshot = TagSnapshot;

    const NAME: &'static str = "tags";

    fn snapshot(&self) -> TagSnapshot {
        self.state.clone()
    }

    fn on_start(&mut self, runtime: &mut Runtime) {
        self.schedule(runtime);
    }

    fn on_command(&mut self, command: TagCommand, runtime: &mut Runtime) {
        match command {
            TagCommand::SetText { text, respond_to } => {
                if runtime.attempts.supersede() {
                    debug!("Cancelled in-flight tag search");
                }
                self.state.text = text;
                self.schedule(runtime);
                let _ = respond_to.send(());
            }
            TagCommand::Select { ids, respond_to } => {
                let known = self.state.results.clone();
                let api = runtime.api();
                tokio::spawn(async move {
                    let resolved = resolve_tags(api.as_ref(), &known, &ids).await;
                    let _ = respond_to.send(resolved);
                });
            }
        }
    }

    fn on_quiet_period(&mut self, runtime: &mut Runtime) {
        let query = TagSearchQuery::by_name(self.state.text.clone(), self.limit);
        let attempt = runtime.attempts.begin();
        debug!(attempt = attempt.id(), ?query, "Searching tags");
        self.state.phase = TagPhase::Searching;
        runtime.publish(self.snapshot());

        let api = runtime.api();
        runtime.spawn(async move {
            let result = api.search_tags(&query, attempt.token()).await;
            SearchOutcome { attempt, result }
        });
    }

    fn on_outcome(&mut self, outcome: SearchOutcome, runtime: &mut Runtime) {
        if !runtime.attempts.is_current(&outcome.attempt) {
            debug!(attempt = outcome.attempt.id(), "Discarding superseded tag search");
            return;
        }
        runtime.attempts.finish(&outcome.attempt);
        self.state.phase = TagPhase::Settled;

        match outcome.result {
            Ok(tags) => {
                debug!(count = tags.len(), "Tag search settled");
                self.state.results = tags;
            }
            Err(e) => warn!(text = %self.state.text, error = %e, "Tag search failed"),
        }
        runtime.publish(self.snapshot());
    }
}

impl TagSearch {
    fn schedule(&mut self, runtime: &mut Runtime) {
        runtime.debouncer.schedule();
        self.state.phase = TagPhase::Scheduled;
        runtime.publish(self.snapshot());
    }
}

/// Resolves `ids` in order: from `known` when present, else by lookup.
/// Ids whose lookup fails are left out.
pub async fn resolve_tags(api: &dyn CatalogApi, known: &[TagRef], ids: &[TagId]) -> Vec<TagRef> {
    let mut resolved = Vec::with_capacity(ids.len());
    for &id in ids {
        if let Some(tag) = known.iter().find(|t| t.id == id) {
            resolved.push(tag.clone());
            continue;
        }
        match api.tag(id).await {
            Ok(tag) => resolved.push(tag),
            Err(e) => warn!(tag_id = %id, error = %e, "Tag lookup failed"),
        }
    }
    resolved
}

/// Client half of the tag picker.
#[derive(Clone)]
pub struct TagHandle {
    sender: mpsc::Sender<TagCommand>,
    snapshot: watch::Receiver<TagSnapshot>,
}

impl TagHandle {
    /// Updates the search box; the search runs after the quiet period.
    #[instrument(skip(self))]
    pub async fn set_text(&self, text: &str) -> Result<(), TagError> {
        let text = text.to_string();
        request(&self.sender, |respond_to| TagCommand::SetText { text, respond_to }).await?;
        Ok(())
    }

    /// Resolves the selected ids into tags. Returns after every lookup finished.
    #[instrument(skip(self))]
    pub async fn select(&self, ids: Vec<TagId>) -> Result<Vec<TagRef>, TagError> {
        Ok(request(&self.sender, |respond_to| TagCommand::Select { ids, respond_to }).await?)
    }

    pub fn snapshot(&self) -> TagSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TagSnapshot> {
        self.snapshot.clone()
    }

    /// Waits until the search for the current text has answered, including any
    /// quiet period still running.
    pub async fn wait_for_results(&self) -> Result<TagSnapshot, TagError> {
        let mut updates = self.snapshot.clone();
        let settled = updates
            .wait_for(|s| s.phase == TagPhase::Settled)
            .await
            .map_err(|_| FrameworkError::ControllerDropped)?;
        Ok(settled.clone())
    }
}
