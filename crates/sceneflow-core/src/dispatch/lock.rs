//! Per-conversation serialization.
//!
//! Events of one conversation are dispatched strictly one after another;
//! events of different conversations never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use sceneflow_types::conversation::PeerId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutex per conversation.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: DashMap<PeerId, Arc<Mutex<()>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other event of `peer` is in flight.
    ///
    /// The returned guard releases the conversation when dropped.
    pub async fn acquire(&self, peer: &PeerId) -> ConversationGuard<'_> {
        let lock = self.locks.entry(peer.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        ConversationGuard {
            locks: self,
            peer: peer.clone(),
            guard: Some(guard),
        }
    }

    /// Number of conversations currently holding or waiting on a lock.
    pub fn active(&self) -> usize {
        self.locks.len()
    }

    fn release(&self, peer: &PeerId) {
        // Only the map's own reference left: nobody holds or awaits this lock.
        self.locks
            .remove_if(peer, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Exclusive hold on one conversation.
pub struct ConversationGuard<'a> {
    locks: &'a ConversationLocks,
    peer: PeerId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.peer);
    }
}

impl std::fmt::Debug for ConversationGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationGuard")
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_lock_pruned_after_release() {
        let locks = ConversationLocks::new();
        let peer = PeerId::from("1");

        let guard = locks.acquire(&peer).await;
        assert_eq!(locks.active(), 1);
        drop(guard);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_same_conversation_waits() {
        let locks = ConversationLocks::new();
        let peer = PeerId::from("1");

        let guard = locks.acquire(&peer).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&peer)).await;
        assert!(second.is_err(), "second acquire must block while the first is held");

        drop(guard);
        let _again = locks.acquire(&peer).await;
        assert_eq!(locks.active(), 1);
    }

    #[tokio::test]
    async fn test_other_conversations_do_not_wait() {
        let locks = ConversationLocks::new();
        let _first = locks.acquire(&PeerId::from("1")).await;

        let other = tokio::time::timeout(Duration::from_millis(20), locks.acquire(&PeerId::from("2"))).await;
        assert!(other.is_ok());
    }
}
