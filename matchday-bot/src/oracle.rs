use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Answers whether a user is subscribed to the channel that gates the bot.
#[async_trait::async_trait]
pub trait SubscriptionOracle: Send + Sync {
    async fn is_subscribed(&self, user_id: u64) -> bool;
}

#[async_trait::async_trait]
impl<T: SubscriptionOracle + ?Sized> SubscriptionOracle for Arc<T> {
    async fn is_subscribed(&self, user_id: u64) -> bool {
        (**self).is_subscribed(user_id).await
    }
}

/// Lets everyone in.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait::async_trait]
impl SubscriptionOracle for AllowAll {
    async fn is_subscribed(&self, _user_id: u64) -> bool {
        true
    }
}

/// Known subscribers; the set can change while the bot runs.
#[derive(Debug, Default)]
pub struct AllowList {
    subscribers: RwLock<HashSet<u64>>,
}

impl AllowList {
    pub fn new(subscribers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            subscribers: RwLock::new(subscribers.into_iter().collect()),
        }
    }

    pub async fn subscribe(&self, user_id: u64) {
        self.subscribers.write().await.insert(user_id);
    }

    pub async fn unsubscribe(&self, user_id: u64) {
        self.subscribers.write().await.remove(&user_id);
    }
}

#[async_trait::async_trait]
impl SubscriptionOracle for AllowList {
    async fn is_subscribed(&self, user_id: u64) -> bool {
        self.subscribers.read().await.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allow_list_tracks_changes() {
        let list = AllowList::new([1, 2]);
        assert!(list.is_subscribed(1).await);
        assert!(!list.is_subscribed(3).await);
        list.subscribe(3).await;
        list.unsubscribe(1).await;
        assert!(list.is_subscribed(3).await);
        assert!(!list.is_subscribed(1).await);
        assert!(AllowAll.is_subscribed(42).await);
    }
}
