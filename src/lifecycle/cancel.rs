//! Cancellation signals for in-flight calls.

use tokio_util::sync::CancellationToken;

/// Cloneable cancellation signal.
///
/// Every clone observes the same state. Once triggered it stays triggered.
/// A [`child`](Self::child) is triggered with its parent but can also be
/// triggered alone, leaving the parent and its other children untouched.
#[derive(Clone, Debug, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

impl Cancellation {
    /// Create a new, untriggered root signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal scoped to one worker, triggered when this one is.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    /// Trigger this signal and every child of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the signal is triggered.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let cancel = Cancellation::new();
        let waiter = cancel.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!cancel.is_cancelled());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_resolves_immediately() {
        let cancel = Cancellation::new();
        cancel.cancel();
        tokio::time::timeout(Duration::from_millis(100), cancel.cancelled())
            .await
            .expect("should resolve at once");
    }

    #[test]
    fn test_child_cancel_leaves_siblings_and_parent() {
        let root = Cancellation::new();
        let first = root.child();
        let second = root.child();

        first.cancel();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!root.is_cancelled());

        let later = root.child();
        assert!(!later.is_cancelled());
    }

    #[tokio::test]
    async fn test_root_cancel_reaches_children() {
        let root = Cancellation::new();
        let child = root.child();
        let grandchild = child.child();

        root.cancel();
        assert!(child.is_cancelled());
        tokio::time::timeout(Duration::from_millis(100), grandchild.cancelled())
            .await
            .expect("grandchild should observe root");
        assert!(root.child().is_cancelled());
    }
}
