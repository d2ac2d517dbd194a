//! Remote service abstraction.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use todo_codec::Item;
use todo_sync_protocol::{ElementResponse, Endpoint, ItemNetworkModel, ListResponse};

/// The remote todo list service.
///
/// Every call carries the last revision the caller has observed; the
/// service may reject writes made against a stale revision. Implementations
/// must abort any in-flight request when the returned future is dropped.
#[async_trait]
pub trait RemoteService: Send + Sync + 'static {
    /// Fetches the full list.
    async fn list(&self, revision: i64) -> SyncResult<ListResponse>;

    /// Replaces the full list.
    async fn update(&self, revision: i64, list: Vec<ItemNetworkModel>)
        -> SyncResult<ListResponse>;

    /// Fetches one item.
    async fn get(&self, revision: i64, id: &str) -> SyncResult<ElementResponse>;

    /// Creates one item.
    async fn add(&self, revision: i64, element: ItemNetworkModel) -> SyncResult<ElementResponse>;

    /// Replaces one item.
    async fn edit(&self, revision: i64, element: ItemNetworkModel)
        -> SyncResult<ElementResponse>;

    /// Deletes one item.
    async fn remove(&self, revision: i64, id: &str) -> SyncResult<ElementResponse>;
}

/// An in-memory remote service for testing.
///
/// Behaves like the real service: every successful write bumps the
/// revision, and writes sent with a stale revision are rejected with
/// HTTP 400. Failures can be injected per call.
#[derive(Debug, Default)]
pub struct MockRemote {
    inner: Mutex<MockRemoteInner>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    items: Vec<ItemNetworkModel>,
    revision: i64,
    failures_remaining: u32,
    offline: bool,
    ignore_revision: bool,
    calls: HashMap<String, u32>,
}

impl MockRemote {
    /// Creates an empty remote at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a remote holding `items`, attributed to `device_id`.
    pub fn with_items(items: &[Item], device_id: &str) -> Self {
        let remote = Self::new();
        remote.inner.lock().items = items
            .iter()
            .map(|item| ItemNetworkModel::from_item(item, device_id))
            .collect();
        remote
    }

    /// Creates a remote holding raw wire records.
    pub fn with_models(items: Vec<ItemNetworkModel>) -> Self {
        let remote = Self::new();
        remote.inner.lock().items = items;
        remote
    }

    /// Makes the next `count` calls fail with a retryable transport error.
    pub fn fail_next(&self, count: u32) {
        self.inner.lock().failures_remaining = count;
    }

    /// Makes every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// Accepts writes regardless of the revision they carry.
    pub fn set_ignore_revision(&self, ignore: bool) {
        self.inner.lock().ignore_revision = ignore;
    }

    /// Forces the remote revision, as if another client had written.
    pub fn set_revision(&self, revision: i64) {
        self.inner.lock().revision = revision;
    }

    /// Current remote revision.
    pub fn revision(&self) -> i64 {
        self.inner.lock().revision
    }

    /// Snapshot of the remote list.
    pub fn items(&self) -> Vec<ItemNetworkModel> {
        self.inner.lock().items.clone()
    }

    /// Returns the remote copy of `id`.
    pub fn item(&self, id: &str) -> Option<ItemNetworkModel> {
        self.inner.lock().items.iter().find(|i| i.id == id).cloned()
    }

    /// Number of calls made to the endpoint with `method`, e.g. `"PATCH"`.
    pub fn calls(&self, method: &str) -> u32 {
        self.inner.lock().calls.get(method).copied().unwrap_or(0)
    }

    /// Total number of calls made.
    pub fn total_calls(&self) -> u32 {
        self.inner.lock().calls.values().sum()
    }

    /// Records the call and applies injected failures and revision checks.
    fn begin(
        &self,
        endpoint: &Endpoint,
        revision: i64,
    ) -> SyncResult<parking_lot::MutexGuard<'_, MockRemoteInner>> {
        let mut inner = self.inner.lock();
        *inner
            .calls
            .entry(endpoint.method().as_str().to_string())
            .or_default() += 1;

        if inner.offline {
            return Err(SyncError::transport_retryable("remote offline"));
        }
        if inner.failures_remaining > 0 {
            inner.failures_remaining -= 1;
            return Err(SyncError::transport_retryable("injected failure"));
        }

        let is_write = !matches!(endpoint, Endpoint::List | Endpoint::Get(_));
        if is_write && !inner.ignore_revision && revision != inner.revision {
            return Err(SyncError::Http {
                status: 400,
                body: format!(
                    "unsynchronized data: expected revision {}, got {revision}",
                    inner.revision
                ),
            });
        }
        Ok(inner)
    }
}

fn not_found(id: &str) -> SyncError {
    SyncError::Http {
        status: 404,
        body: format!("no item {id}"),
    }
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn list(&self, revision: i64) -> SyncResult<ListResponse> {
        let inner = self.begin(&Endpoint::List, revision)?;
        Ok(ListResponse::ok(inner.items.clone(), inner.revision))
    }

    async fn update(
        &self,
        revision: i64,
        list: Vec<ItemNetworkModel>,
    ) -> SyncResult<ListResponse> {
        let mut inner = self.begin(&Endpoint::Update, revision)?;
        inner.items = list;
        inner.revision += 1;
        Ok(ListResponse::ok(inner.items.clone(), inner.revision))
    }

    async fn get(&self, revision: i64, id: &str) -> SyncResult<ElementResponse> {
        let inner = self.begin(&Endpoint::Get(id.to_string()), revision)?;
        let element = inner
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))?;
        Ok(ElementResponse::ok(element, inner.revision))
    }

    async fn add(&self, revision: i64, element: ItemNetworkModel) -> SyncResult<ElementResponse> {
        let mut inner = self.begin(&Endpoint::Add, revision)?;
        if inner.items.iter().any(|i| i.id == element.id) {
            return Err(SyncError::Http {
                status: 400,
                body: format!("duplicate item {}", element.id),
            });
        }
        inner.items.push(element.clone());
        inner.revision += 1;
        Ok(ElementResponse::ok(element, inner.revision))
    }

    async fn edit(
        &self,
        revision: i64,
        element: ItemNetworkModel,
    ) -> SyncResult<ElementResponse> {
        let mut inner = self.begin(&Endpoint::Edit(element.id.clone()), revision)?;
        let slot = inner
            .items
            .iter_mut()
            .find(|i| i.id == element.id)
            .ok_or_else(|| not_found(&element.id))?;
        *slot = element.clone();
        inner.revision += 1;
        Ok(ElementResponse::ok(element, inner.revision))
    }

    async fn remove(&self, revision: i64, id: &str) -> SyncResult<ElementResponse> {
        let mut inner = self.begin(&Endpoint::Remove(id.to_string()), revision)?;
        let index = inner
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| not_found(id))?;
        let element = inner.items.remove(index);
        inner.revision += 1;
        Ok(ElementResponse::ok(element, inner.revision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_codec::Timestamp;

    fn model(id: &str) -> ItemNetworkModel {
        let item = Item::new(id, "text", Timestamp::from_secs(1).unwrap());
        ItemNetworkModel::from_item(&item, "test")
    }

    #[tokio::test]
    async fn writes_bump_revision() {
        let remote = MockRemote::new();
        let response = remote.add(0, model("a")).await.unwrap();
        assert_eq!(response.revision, 1);

        let response = remote.edit(1, model("a")).await.unwrap();
        assert_eq!(response.revision, 2);

        let list = remote.list(0).await.unwrap();
        assert_eq!(list.revision, 2);
        assert_eq!(list.list.len(), 1);

        remote.remove(2, "a").await.unwrap();
        assert!(remote.items().is_empty());
        assert_eq!(remote.revision(), 3);
    }

    #[tokio::test]
    async fn stale_revision_is_rejected() {
        let remote = MockRemote::new();
        remote.set_revision(5);

        let err = remote.add(4, model("a")).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.is_retryable());
        assert!(remote.items().is_empty());

        remote.set_ignore_revision(true);
        remote.add(0, model("a")).await.unwrap();
    }

    #[tokio::test]
    async fn missing_items_are_404() {
        let remote = MockRemote::new();
        let err = remote.get(0, "nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_retryable());
        assert!(remote.remove(0, "nope").await.is_err());
    }

    #[tokio::test]
    async fn injected_failures() {
        let remote = MockRemote::new();
        remote.fail_next(2);
        assert!(remote.list(0).await.is_err());
        assert!(remote.list(0).await.is_err());
        assert!(remote.list(0).await.is_ok());
        assert_eq!(remote.calls("GET"), 3);

        remote.set_offline(true);
        assert!(matches!(
            remote.list(0).await,
            Err(SyncError::Transport {
                retryable: true,
                ..
            })
        ));
        assert_eq!(remote.total_calls(), 4);
    }
}
