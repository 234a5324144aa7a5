//! Sequential batch publisher.
//!
//! Items are published one awaited call at a time. Fail-fast is the stated
//! batch policy: the first failed item stops the batch and the remaining
//! items are never attempted — a transport or auth fault on one item would
//! fail them all anyway. The flip side is that one malformed item masks
//! valid updates behind it in iteration order; callers see the skipped
//! count in the report.

use tracing::{error, info};

use searchbridge_shared::{ExternalItem, SearchBridgeError};

use crate::client::IndexClient;

// ---------------------------------------------------------------------------
// Progress observer
// ---------------------------------------------------------------------------

/// Callbacks for per-item publish lifecycle events.
pub trait LoadProgress: Send + Sync {
    /// An item is about to be sent.
    fn item_started(&self, id: &str, current: usize, total: usize);
    /// The replace call succeeded.
    fn item_published(&self, id: &str);
    /// The replace call failed; the batch stops after this.
    fn item_failed(&self, id: &str, message: &str, inner: Option<&str>);
}

/// No-op progress sink for headless/test usage.
pub struct SilentLoad;

impl LoadProgress for SilentLoad {
    fn item_started(&self, _id: &str, _current: usize, _total: usize) {}
    fn item_published(&self, _id: &str) {}
    fn item_failed(&self, _id: &str, _message: &str, _inner: Option<&str>) {}
}

// ---------------------------------------------------------------------------
// LoadReport
// ---------------------------------------------------------------------------

/// The item that stopped the batch.
#[derive(Debug, Clone)]
pub struct FailedItem {
    pub id: String,
    /// The service's human-readable message.
    pub message: String,
    /// Nested diagnostic message, when the service provided one.
    pub inner: Option<String>,
}

/// Outcome of a batch publish.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Ids published successfully, in order.
    pub published: Vec<String>,
    /// The first failure, if any.
    pub failed: Option<FailedItem>,
    /// Items never attempted because the batch stopped early.
    pub skipped: usize,
}

impl LoadReport {
    /// Whether the batch stopped before the last item.
    pub fn aborted(&self) -> bool {
        self.failed.is_some()
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Publish `items` in order through `client`, one awaited call at a time.
///
/// Failure is reported in the returned [`LoadReport`], not raised: the
/// pipeline ends after reporting rather than propagating an error past its
/// boundary.
pub async fn load(
    client: &dyn IndexClient,
    items: &[ExternalItem],
    progress: &dyn LoadProgress,
) -> LoadReport {
    let total = items.len();
    let mut report = LoadReport::default();

    for (i, item) in items.iter().enumerate() {
        progress.item_started(&item.id, i + 1, total);
        info!(id = %item.id, "publishing item");

        match client.replace_item(item).await {
            Ok(()) => {
                info!(id = %item.id, "published");
                progress.item_published(&item.id);
                report.published.push(item.id.clone());
            }
            Err(e) => {
                let failed = failed_item(&item.id, e);
                error!(id = %failed.id, "failed to publish: {}", failed.message);
                if let Some(inner) = &failed.inner {
                    error!(id = %failed.id, "{inner}");
                }
                progress.item_failed(&failed.id, &failed.message, failed.inner.as_deref());
                report.skipped = total - (i + 1);
                report.failed = Some(failed);
                break;
            }
        }
    }

    report
}

fn failed_item(id: &str, err: SearchBridgeError) -> FailedItem {
    match err {
        SearchBridgeError::Publish { id, message, inner } => FailedItem { id, message, inner },
        other => FailedItem {
            id: id.to_string(),
            message: other.to_string(),
            inner: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use searchbridge_shared::{AclEntry, ItemContent, ItemProperties, Result};
    use std::sync::Mutex;

    fn item(id: &str) -> ExternalItem {
        ExternalItem {
            id: id.into(),
            properties: ItemProperties {
                title: id.into(),
                description: String::new(),
                url: format!("https://example.com/{id}"),
                icon_url: "https://example.com/icon.png".into(),
            },
            content: ItemContent::text("text"),
            acl: vec![AclEntry::everyone()],
        }
    }

    /// Records every attempted id; fails on a designated one.
    struct FakeClient {
        fail_on: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeClient {
        fn new(fail_on: Option<&str>) -> Self {
            Self {
                fail_on: fail_on.map(String::from),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl IndexClient for FakeClient {
        async fn replace_item(&self, item: &ExternalItem) -> Result<()> {
            self.calls.lock().expect("lock").push(item.id.clone());
            if self.fail_on.as_deref() == Some(item.id.as_str()) {
                return Err(SearchBridgeError::Publish {
                    id: item.id.clone(),
                    message: "Invalid request".into(),
                    inner: Some("schema mismatch".into()),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn publishes_all_items_in_order() {
        let client = FakeClient::new(None);
        let items = vec![item("a"), item("b"), item("c")];

        let report = load(&client, &items, &SilentLoad).await;

        assert_eq!(report.published, vec!["a", "b", "c"]);
        assert!(!report.aborted());
        assert_eq!(report.skipped, 0);
        assert_eq!(client.calls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn first_failure_stops_the_batch() {
        let client = FakeClient::new(Some("b"));
        let items = vec![item("a"), item("b"), item("c")];

        let report = load(&client, &items, &SilentLoad).await;

        // `a` published, `b` attempted and failed, `c` never attempted.
        assert_eq!(report.published, vec!["a"]);
        assert_eq!(client.calls(), vec!["a", "b"]);
        assert_eq!(report.skipped, 1);

        let failed = report.failed.expect("failure recorded");
        assert_eq!(failed.id, "b");
        assert_eq!(failed.message, "Invalid request");
        assert_eq!(failed.inner.as_deref(), Some("schema mismatch"));
    }

    #[tokio::test]
    async fn empty_batch_is_a_clean_run() {
        let client = FakeClient::new(None);
        let report = load(&client, &[], &SilentLoad).await;

        assert!(report.published.is_empty());
        assert!(!report.aborted());
    }
}
