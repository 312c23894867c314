use async_trait::async_trait;
use trekka_shared::Notification;

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget fan-out to in-app, email and push channels.
///
/// Callers log failures and carry on; a notifier error never fails the
/// operation that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Drops every notification. Used when no broker is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        tracing::debug!("Dropping {} notification (no broker configured)", notification.kind());
        Ok(())
    }
}
