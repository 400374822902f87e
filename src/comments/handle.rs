use crate::comments::loader::CommentCommand;
use crate::comments::{CommentError, CommentSnapshot};
use crate::framework::{request, FrameworkError};
use crate::model::ProductId;
use tokio::sync::{mpsc, watch};
use tracing::instrument;

/// Client half of the comment loader.
#[derive(Clone)]
pub struct CommentHandle {
    sender: mpsc::Sender<CommentCommand>,
    snapshot: watch::Receiver<CommentSnapshot>,
}

impl CommentHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<CommentCommand>,
        snapshot: watch::Receiver<CommentSnapshot>,
    ) -> Self {
        Self { sender, snapshot }
    }

    /// Starts a session for `product_id`, dropping whatever was loaded before.
    #[instrument(skip(self))]
    pub async fn open(&self, product_id: ProductId) -> Result<(), CommentError> {
        request(&self.sender, |respond_to| CommentCommand::Open {
            product_id,
            respond_to,
        })
        .await?;
        Ok(())
    }

    /// Reports that the load-more sentinel scrolled into view.
    ///
    /// Returns `true` if this started a page fetch.
    pub async fn sentinel_visible(&self) -> Result<bool, CommentError> {
        Ok(request(&self.sender, |respond_to| CommentCommand::SentinelVisible { respond_to }).await?)
    }

    pub async fn close(&self) -> Result<(), CommentError> {
        request(&self.sender, |respond_to| CommentCommand::Close { respond_to }).await?;
        Ok(())
    }

    pub fn snapshot(&self) -> CommentSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CommentSnapshot> {
        self.snapshot.clone()
    }

    /// Waits until nothing is loading.
    pub async fn wait_until_idle(&self) -> Result<CommentSnapshot, CommentError> {
        let mut updates = self.snapshot.clone();
        let idle = updates
            .wait_for(|s| s.is_idle())
            .await
            .map_err(|_| FrameworkError::ControllerDropped)?;
        Ok(idle.clone())
    }
}
