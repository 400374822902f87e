//! # Request / Acknowledge
//!
//! Every command a handle sends carries a oneshot sender; the controller answers
//! on it once the command has been applied to its state.

use crate::framework::error::FrameworkError;
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel carried by commands.
pub type Response<T> = oneshot::Sender<T>;

/// Sends a command built by `make` and waits for the controller's answer.
///
/// # Errors
///
/// - [`FrameworkError::ControllerClosed`] if the controller task has stopped receiving.
/// - [`FrameworkError::ControllerDropped`] if the controller dropped the responder
///   without answering (for example, it shut down mid-request).
pub async fn request<M, R>(
    sender: &mpsc::Sender<M>,
    make: impl FnOnce(Response<R>) -> M,
) -> Result<R, FrameworkError> {
    let (respond_to, response) = oneshot::channel();
    sender
        .send(make(respond_to))
        .await
        .map_err(|_| FrameworkError::ControllerClosed)?;
    response.await.map_err(|_| FrameworkError::ControllerDropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Echo {
        Say { text: String, respond_to: Response<String> },
    }

    #[tokio::test]
    async fn test_request_round_trip() {
        let (sender, mut receiver) = mpsc::channel::<Echo>(4);
        let server = tokio::spawn(async move {
            while let Some(Echo::Say { text, respond_to }) = receiver.recv().await {
                let _ = respond_to.send(text.to_uppercase());
            }
        });

        let answer = request(&sender, |respond_to| Echo::Say {
            text: "panel".into(),
            respond_to,
        })
        .await
        .unwrap();
        assert_eq!(answer, "PANEL");

        drop(sender);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_request_to_closed_controller() {
        let (sender, receiver) = mpsc::channel::<Echo>(4);
        drop(receiver);

        let result = request(&sender, |respond_to| Echo::Say {
            text: "x".into(),
            respond_to,
        })
        .await;
        assert_eq!(result, Err(FrameworkError::ControllerClosed));
    }

    #[tokio::test]
    async fn test_request_dropped_responder() {
        let (sender, mut receiver) = mpsc::channel::<Echo>(4);
        tokio::spawn(async move {
            // Swallow the command without answering.
            let _ = receiver.recv().await;
        });

        let result = request(&sender, |respond_to| Echo::Say {
            text: "x".into(),
            respond_to,
        })
        .await;
        assert_eq!(result, Err(FrameworkError::ControllerDropped));
    }
}
