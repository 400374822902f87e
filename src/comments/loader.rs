//! # Comment Loader
//!
//! One [`CommentLoader`] serves the comment section of whichever product is open.
//! A session starts with [`CommentHandle::open`]: the loader fetches the page count,
//! then page 1. Further pages are pulled one at a time when the UI reports that the
//! sentinel at the bottom of the list became visible.
//!
//! ```text
//! Closed ──open──▶ Initializing ──▶ AwaitingVisibility ◀──┐
//!                       │                 │ visible        │ page ok, more left
//!                       │                 ▼                │ or page failed
//!                       │              Fetching ───────────┘
//!                       │                 │ last page ok
//!                       └── no pages ───▶ Exhausted
//! ```
//!
//! The sentinel is hidden while a page is in flight, so repeated visibility signals
//! cannot request the same page twice. Opening another product supersedes the
//! session; answers that belong to the old session are dropped on arrival.

use crate::clients::CatalogError;
use crate::comments::CommentHandle;
use crate::config::StorefrontConfig;
use crate::framework::{
    Attempt, Controller, ControllerContext, ControllerRunner, ControllerRuntime, Response,
};
use crate::model::{CommentWithUser, ProductId};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPhase {
    /// No product open.
    Closed,
    Initializing,
    AwaitingVisibility,
    Fetching,
    /// Every page is loaded; visibility signals are ignored.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentSnapshot {
    pub product_id: Option<ProductId>,
    pub phase: CommentPhase,
    /// Loaded comments, page 1 first, server order within a page.
    pub items: Vec<CommentWithUser>,
    /// Last page appended to `items` (0 before page 1 lands).
    pub current_page: u32,
    pub total_pages: u32,
    pub loading: bool,
    /// Whether the UI should render the load-more sentinel.
    pub sentinel_visible: bool,
}

impl CommentSnapshot {
    fn closed() -> Self {
        Self {
            product_id: None,
            phase: CommentPhase::Closed,
            items: Vec::new(),
            current_page: 0,
            total_pages: 0,
            loading: false,
            sentinel_visible: false,
        }
    }

    fn initializing(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            phase: CommentPhase::Initializing,
            loading: true,
            ..Self::closed()
        }
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Neither initializing nor fetching.
    pub fn is_idle(&self) -> bool {
        !matches!(
            self.phase,
            CommentPhase::Initializing | CommentPhase::Fetching
        )
    }
}

#[derive(Debug)]
pub(crate) enum CommentCommand {
    Open {
        product_id: ProductId,
        respond_to: Response<()>,
    },
    SentinelVisible {
        respond_to: Response<bool>,
    },
    Close {
        respond_to: Response<()>,
    },
}

enum Loaded {
    /// Page count, then page 1 when there is one.
    Initial(Result<(u32, Result<Vec<CommentWithUser>, CatalogError>), CatalogError>),
    Page {
        page: u32,
        result: Result<Vec<CommentWithUser>, CatalogError>,
    },
}

pub(crate) struct LoadOutcome {
    session: Attempt,
    product_id: ProductId,
    loaded: Loaded,
}

/// The state and reactions of the comment section.
pub(crate) struct CommentSessions {
    state: CommentSnapshot,
    session: Option<Attempt>,
}

/// The actor half of the comment section.
pub struct CommentLoader {
    runner: ControllerRunner<CommentSessions>,
}

impl CommentLoader {
    pub fn new(config: &StorefrontConfig) -> (Self, CommentHandle) {
        let sessions = CommentSessions {
            state: CommentSnapshot::closed(),
            session: None,
        };
        let (runner, sender, snapshot) = ControllerRunner::new(sessions, config.channel_capacity);
        (Self { runner }, CommentHandle::new(sender, snapshot))
    }

    pub async fn run(self, context: ControllerContext) {
        self.runner.run(context).await
    }
}

type Runtime = ControllerRuntime<CommentSessions>;

impl Controller for CommentSessions {
    type Command = CommentCommand;
    type Outcome = LoadOutcome;
    type Snapshot = CommentSnapshot;

    const NAME: &'static str = "comments";

    fn snapshot(&self) -> CommentSnapshot {
        self.state.clone()
    }

    fn on_command(&mut self, command: CommentCommand, runtime: &mut Runtime) {
        match command {
            CommentCommand::Open {
                product_id,
                respond_to,
            } => {
                self.open(product_id, runtime);
                let _ = respond_to.send(());
            }
            CommentCommand::SentinelVisible { respond_to } => {
                let triggered = self.on_sentinel_visible(runtime);
                let _ = respond_to.send(triggered);
            }
            CommentCommand::Close { respond_to } => {
                if runtime.attempts.supersede() {
                    debug!(product_id = ?self.state.product_id, "Comment session closed");
                }
                self.session = None;
                self.state = CommentSnapshot::closed();
                runtime.publish(self.snapshot());
                let _ = respond_to.send(());
            }
        }
    }

    fn on_outcome(&mut self, outcome: LoadOutcome, runtime: &mut Runtime) {
        let LoadOutcome {
            session,
            product_id,
            loaded,
        } = outcome;
        if !runtime.attempts.is_current(&session) {
            debug!(%product_id, session = session.id(), "Discarding result of closed session");
            return;
        }

        match loaded {
            Loaded::Initial(Ok((pages, first))) => {
                self.state.total_pages = pages;
                match first {
                    Ok(items) if pages > 0 => {
                        info!(%product_id, pages, count = items.len(), "Comments loaded");
                        self.state.items = items;
                        self.state.current_page = 1;
                    }
                    Ok(_) => debug!(%product_id, "Product has no comments"),
                    Err(e) => warn!(%product_id, page = 1, error = %e, "Comment page failed"),
                }
                self.settle();
            }
            Loaded::Initial(Err(e)) => {
                warn!(%product_id, error = %e, "Comment page count failed");
                self.state.total_pages = 0;
                self.settle();
            }
            Loaded::Page { page, result } => {
                match result {
                    Ok(items) if page == self.state.current_page + 1 => {
                        debug!(%product_id, page, count = items.len(), "Comment page appended");
                        self.state.items.extend(items);
                        self.state.current_page = page;
                    }
                    Ok(_) => debug!(%product_id, page, "Discarding out-of-order page"),
                    Err(e) => warn!(%product_id, page, error = %e, "Comment page failed"),
                }
                self.settle();
            }
        }
        runtime.publish(self.snapshot());
    }
}

impl CommentSessions {
    fn open(&mut self, product_id: ProductId, runtime: &mut Runtime) {
        let session = runtime.attempts.begin();
        info!(%product_id, session = session.id(), "Opening comments");
        self.session = Some(session.clone());
        self.state = CommentSnapshot::initializing(product_id);
        runtime.publish(self.snapshot());

        let api = runtime.api();
        runtime.spawn(async move {
            let loaded = match api.comment_pages(product_id).await {
                Ok(0) => Ok((0, Ok(Vec::new()))),
                Ok(pages) => Ok((pages, api.product_comments(product_id, 1).await)),
                Err(e) => Err(e),
            };
            LoadOutcome {
                session,
                product_id,
                loaded: Loaded::Initial(loaded),
            }
        });
    }

    /// Starts the next page when the sentinel is armed and pages remain.
    fn on_sentinel_visible(&mut self, runtime: &mut Runtime) -> bool {
        let ready = self.state.phase == CommentPhase::AwaitingVisibility
            && self.state.sentinel_visible
            && self.state.has_more();
        let (Some(session), Some(product_id), true) =
            (self.session.clone(), self.state.product_id, ready)
        else {
            debug!(phase = ?self.state.phase, "Sentinel signal ignored");
            return false;
        };

        let page = self.state.current_page + 1;
        debug!(%product_id, page, "Fetching comment page");
        self.state.sentinel_visible = false;
        self.state.loading = true;
        self.state.phase = CommentPhase::Fetching;
        runtime.publish(self.snapshot());

        let api = runtime.api();
        runtime.spawn(async move {
            let result = api.product_comments(product_id, page).await;
            LoadOutcome {
                session,
                product_id,
                loaded: Loaded::Page { page, result },
            }
        });
        true
    }

    /// Re-arms the sentinel when pages remain, else exhausts the session.
    fn settle(&mut self) {
        self.state.loading = false;
        if self.state.has_more() {
            self.state.phase = CommentPhase::AwaitingVisibility;
            self.state.sentinel_visible = true;
        } else {
            self.state.phase = CommentPhase::Exhausted;
            self.state.sentinel_visible = false;
        }
    }
}
