//! Shared open/closed flag for the store creation modal.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable handle to one modal's visibility.
///
/// Every clone reads and writes the same flag; the last write wins and is
/// visible to all clones immediately. Components that only need to react to
/// changes can [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct ModalVisibility {
    tx: Arc<watch::Sender<bool>>,
}

impl ModalVisibility {
    /// Create a closed modal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn open(&self) {
        self.set(true);
    }

    pub fn close(&self) {
        self.set(false);
    }

    pub fn is_open(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    fn set(&self, open: bool) {
        // send_replace works without live receivers
        self.tx.send_replace(open);
    }
}

impl Default for ModalVisibility {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        assert!(!ModalVisibility::new().is_open());
    }

    #[test]
    fn test_open_then_close() {
        let modal = ModalVisibility::new();
        modal.open();
        assert!(modal.is_open());
        modal.open();
        assert!(modal.is_open());
        modal.close();
        assert!(!modal.is_open());
    }

    #[test]
    fn test_clones_share_state() {
        let modal = ModalVisibility::new();
        let selector_handle = modal.clone();
        selector_handle.open();
        assert!(modal.is_open());
        modal.close();
        assert!(!selector_handle.is_open());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let modal = ModalVisibility::new();
        let mut rx = modal.subscribe();
        assert!(!*rx.borrow_and_update());

        modal.open();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}
