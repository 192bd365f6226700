//! UE Dialogue Table (C2): one entry per signaling dialogue with a UE, keyed
//! by (link, connection-id).

use async_std::sync::Mutex as AsyncMutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use sua::{ConnId, LinkId};

struct UeCtxInner {
    conn_id: ConnId,
    /// The link this dialogue is currently reachable on. `None` once the
    /// association has been invalidated - the context is not removed from
    /// the table at that point, only marked unreachable; the host is
    /// expected to release it explicitly afterwards (see
    /// `IuAdaptor::release_dialogue`).
    link: RwLock<Option<LinkId>>,
    /// Opaque host state, e.g. a pointer into MM/GMM context. Borrowed by
    /// reference when handed to host callbacks; the host must clone out
    /// anything it wants to retain.
    host_slot: AsyncMutex<Option<Box<dyn Any + Send + Sync>>>,
}

/// A handle to one UE dialogue. Cheaply `Clone`-able; identity is the
/// (creation link, conn_id) pair baked in at `allocate` time.
#[derive(Clone)]
pub struct UeCtx {
    created_link: LinkId,
    inner: Arc<UeCtxInner>,
}

impl UeCtx {
    fn new(link: LinkId, conn_id: ConnId) -> Self {
        UeCtx {
            created_link: link,
            inner: Arc::new(UeCtxInner {
                conn_id,
                link: RwLock::new(Some(link)),
                host_slot: AsyncMutex::new(None),
            }),
        }
    }

    pub fn conn_id(&self) -> ConnId {
        self.inner.conn_id
    }

    /// The link this dialogue was created on - stable identity, used as the
    /// table key even after the current link is cleared.
    pub fn created_link(&self) -> LinkId {
        self.created_link
    }

    /// The link this dialogue is currently reachable on, or `None` if it has
    /// been invalidated.
    pub fn current_link(&self) -> Option<LinkId> {
        *self.inner.link.read().expect("UeCtx link lock poisoned")
    }

    pub(crate) fn clear_link(&self) {
        *self.inner.link.write().expect("UeCtx link lock poisoned") = None;
    }

    pub async fn set_host_state(&self, state: Box<dyn Any + Send + Sync>) {
        *self.inner.host_slot.lock().await = Some(state);
    }

    pub async fn with_host_state<R>(&self, f: impl FnOnce(Option<&(dyn Any + Send + Sync)>) -> R) -> R {
        let guard = self.inner.host_slot.lock().await;
        f(guard.as_deref())
    }
}

impl std::fmt::Debug for UeCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UeCtx")
            .field("created_link", &self.created_link)
            .field("conn_id", &self.inner.conn_id)
            .field("current_link", &self.current_link())
            .finish()
    }
}

#[derive(Default)]
pub struct UeTable {
    by_key: async_std::sync::Mutex<HashMap<(LinkId, ConnId), UeCtx>>,
}

impl UeTable {
    pub fn new() -> Self {
        UeTable::default()
    }

    /// Allocate a new context for (link, conn_id) and insert it. No
    /// deduplication check is performed - the caller (C1, on N-CONNECT)
    /// guarantees conn_id uniqueness per link.
    pub async fn allocate(&self, link: LinkId, conn_id: ConnId) -> UeCtx {
        let ctx = UeCtx::new(link, conn_id);
        self.by_key.lock().await.insert((link, conn_id), ctx.clone());
        ctx
    }

    pub async fn find(&self, link: LinkId, conn_id: ConnId) -> Option<UeCtx> {
        self.by_key.lock().await.get(&(link, conn_id)).cloned()
    }

    /// All dialogues whose *creation* link matches `link` - used by
    /// `link_invalidate` to find every context to notify, independent of
    /// whether their `current_link` has already been cleared.
    pub async fn iter_by_link(&self, link: LinkId) -> Vec<UeCtx> {
        self.by_key
            .lock()
            .await
            .iter()
            .filter(|((l, _), _)| *l == link)
            .map(|(_, ctx)| ctx.clone())
            .collect()
    }

    pub async fn remove(&self, ctx: &UeCtx) {
        self.by_key
            .lock()
            .await
            .remove(&(ctx.created_link(), ctx.conn_id()));
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.by_key.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn allocate_and_find() {
        let table = UeTable::new();
        let link = LinkId::new();
        let ctx = table.allocate(link, ConnId(42)).await;
        assert_eq!(ctx.conn_id(), ConnId(42));
        let found = table.find(link, ConnId(42)).await.unwrap();
        assert_eq!(found.conn_id(), ConnId(42));
        assert!(table.find(link, ConnId(43)).await.is_none());
    }

    #[async_std::test]
    async fn iter_by_link_and_remove() {
        let table = UeTable::new();
        let link1 = LinkId::new();
        let link2 = LinkId::new();
        table.allocate(link1, ConnId(1)).await;
        table.allocate(link1, ConnId(2)).await;
        let other = table.allocate(link2, ConnId(1)).await;

        assert_eq!(table.iter_by_link(link1).await.len(), 2);
        assert_eq!(table.iter_by_link(link2).await.len(), 1);

        table.remove(&other).await;
        assert_eq!(table.len().await, 2);
    }

    #[async_std::test]
    async fn clearing_link_does_not_remove_from_table() {
        let table = UeTable::new();
        let link = LinkId::new();
        let ctx = table.allocate(link, ConnId(1)).await;
        ctx.clear_link();
        assert!(ctx.current_link().is_none());
        assert_eq!(table.len().await, 1);
    }
}
