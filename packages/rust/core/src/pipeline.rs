//! End-to-end sync pipeline: extract → transform → load.
//!
//! One batch pass, no state across runs. Extraction failures abort before
//! any publish; a publish failure stops the batch and is reported in the
//! result rather than raised.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};
use url::Url;

use searchbridge_extract::{ExtractOptions, SourceDocument};
use searchbridge_publish::{FailedItem, IndexClient, LoadProgress};
use searchbridge_shared::{AclRuleConfig, AppConfig, ExternalItem, Result, SearchBridgeError};

use crate::acl::AclPolicy;
use crate::transform;

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Configuration for a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Content root holding the markdown sources.
    pub content_root: PathBuf,
    /// Base URL the relative document paths resolve against.
    pub base_url: Url,
    /// Icon URL stamped onto every item.
    pub icon_url: String,
    /// Ordered ACL override rules.
    pub acl_rules: Vec<AclRuleConfig>,
}

impl SyncConfig {
    /// Build a run config from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.docs.base_url).map_err(|e| {
            SearchBridgeError::validation(format!(
                "invalid docs.base_url '{}': {e}",
                config.docs.base_url
            ))
        })?;

        Ok(Self {
            content_root: PathBuf::from(&config.content.root),
            base_url,
            icon_url: config.docs.icon_url.clone(),
            acl_rules: config.acl_rules.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callbacks for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when an item is about to be published.
    fn item_started(&self, id: &str, current: usize, total: usize);
    /// Called when an item's replace call succeeded.
    fn item_published(&self, id: &str);
    /// Called when an item's replace call failed (the batch stops after this).
    fn item_failed(&self, id: &str, message: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &SyncResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item_started(&self, _id: &str, _current: usize, _total: usize) {}
    fn item_published(&self, _id: &str) {}
    fn item_failed(&self, _id: &str, _message: &str) {}
    fn done(&self, _result: &SyncResult) {}
}

// ---------------------------------------------------------------------------
// SyncResult
// ---------------------------------------------------------------------------

/// Outcome of a sync run.
#[derive(Debug)]
pub struct SyncResult {
    /// Number of documents extracted (equals items transformed).
    pub documents: usize,
    /// Items published before the batch ended.
    pub published: usize,
    /// Items never attempted because the batch stopped early.
    pub skipped: usize,
    /// The failure that stopped the batch, if any.
    pub failed: Option<FailedItem>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl SyncResult {
    /// Whether the batch stopped before the last item.
    pub fn aborted(&self) -> bool {
        self.failed.is_some()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Extract and transform without publishing.
///
/// Shared by `sync` and the dry-run path; useful for inspecting exactly
/// what would be sent.
pub fn assemble_items(config: &SyncConfig) -> Result<Vec<ExternalItem>> {
    let documents = extract_documents(config)?;
    let policy = AclPolicy::from_config(&config.acl_rules);
    Ok(transform::transform(&documents, &policy))
}

/// Run the full pipeline against the remote index.
///
/// Extraction is all-or-nothing: any failure propagates before a single
/// publish happens. Publish failures do not propagate — they end the batch
/// and are reported in the returned [`SyncResult`].
#[instrument(skip_all, fields(root = %config.content_root.display()))]
pub async fn sync(
    config: &SyncConfig,
    client: &dyn IndexClient,
    progress: &dyn ProgressReporter,
) -> Result<SyncResult> {
    let start = Instant::now();

    progress.phase("Extracting documents");
    let documents = extract_documents(config)?;
    info!(count = documents.len(), "documents extracted");

    progress.phase("Transforming items");
    let policy = AclPolicy::from_config(&config.acl_rules);
    let items = transform::transform(&documents, &policy);

    progress.phase("Publishing items");
    let adapter = PipelineLoadProgress { inner: progress };
    let report = searchbridge_publish::load(client, &items, &adapter).await;

    let result = SyncResult {
        documents: documents.len(),
        published: report.published.len(),
        skipped: report.skipped,
        failed: report.failed,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        documents = result.documents,
        published = result.published,
        skipped = result.skipped,
        aborted = result.aborted(),
        elapsed_ms = result.elapsed.as_millis(),
        "sync complete"
    );

    Ok(result)
}

fn extract_documents(config: &SyncConfig) -> Result<Vec<SourceDocument>> {
    let opts = ExtractOptions {
        base_url: config.base_url.clone(),
        icon_url: config.icon_url.clone(),
    };
    searchbridge_extract::extract(&config.content_root, &opts)
}

// ---------------------------------------------------------------------------
// Loader progress adapter
// ---------------------------------------------------------------------------

/// Adapts a `ProgressReporter` to the loader's `LoadProgress` interface.
struct PipelineLoadProgress<'a> {
    inner: &'a dyn ProgressReporter,
}

impl LoadProgress for PipelineLoadProgress<'_> {
    fn item_started(&self, id: &str, current: usize, total: usize) {
        self.inner.item_started(id, current, total);
    }

    fn item_published(&self, id: &str) {
        self.inner.item_published(id);
    }

    fn item_failed(&self, id: &str, message: &str, _inner: Option<&str>) {
        self.inner.item_failed(id, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use searchbridge_shared::AppConfig;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

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
                    inner: None,
                });
            }
            Ok(())
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write file");
    }

    fn sync_config(root: &Path) -> SyncConfig {
        let mut config = SyncConfig::from_app_config(&AppConfig::default()).expect("config");
        config.content_root = root.to_path_buf();
        config
    }

    #[tokio::test]
    async fn sync_publishes_every_document() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.md", "---\ntitle: A\n---\nAlpha\n");
        write(dir.path(), "b.md", "---\ntitle: B\n---\nBeta\n");

        let client = FakeClient::new(None);
        let result = sync(&sync_config(dir.path()), &client, &SilentProgress)
            .await
            .expect("sync");

        assert_eq!(result.documents, 2);
        assert_eq!(result.published, 2);
        assert!(!result.aborted());
        assert_eq!(client.calls(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn publish_failure_stops_the_batch_in_order() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.md", "# A\n");
        write(dir.path(), "b.md", "# B\n");
        write(dir.path(), "c.md", "# C\n");

        let client = FakeClient::new(Some("b"));
        let result = sync(&sync_config(dir.path()), &client, &SilentProgress)
            .await
            .expect("sync");

        // `a` published, `b` attempted and failed, `c` never attempted.
        assert_eq!(client.calls(), vec!["a", "b"]);
        assert_eq!(result.published, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed.expect("failure").id, "b");
    }

    #[tokio::test]
    async fn extraction_failure_aborts_before_any_publish() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "bad.md", "---\ntitle: [unbalanced\n---\nBody\n");

        let client = FakeClient::new(None);
        let err = sync(&sync_config(dir.path()), &client, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchBridgeError::Extract { .. }));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn assemble_items_applies_default_acl_overrides() {
        let dir = TempDir::new().expect("tempdir");
        write(
            dir.path(),
            "kb/use-the-api.md",
            "---\ntitle: Use the API\n---\n# Use the API\n\nSee [docs](x).\n",
        );
        write(dir.path(), "kb/overview.md", "# Overview\n");

        let items = assemble_items(&sync_config(dir.path())).expect("assemble");

        // Sorted extraction order: overview before use-the-api.
        assert_eq!(items[0].id, "kb__overview");
        assert_eq!(items[0].acl, vec![searchbridge_shared::AclEntry::everyone()]);

        let item = &items[1];
        assert_eq!(item.id, "kb__use-the-api");
        assert_eq!(item.properties.title, "Use the API");
        assert_eq!(
            item.properties.url,
            "https://learn.microsoft.com/graph/kb/use-the-api"
        );
        assert!(item.content.value.contains("Use the API See docs"));
        assert_eq!(
            item.acl,
            vec![searchbridge_shared::AclEntry::user(
                "2e75bd61-7a32-44aa-b8a7-ff051804df25"
            )]
        );
    }

    #[test]
    fn assemble_items_twice_is_identical() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.md", "---\ntitle: A\n---\nAlpha\n");
        write(dir.path(), "kb/b.md", "# B\n");

        let config = sync_config(dir.path());
        assert_eq!(
            assemble_items(&config).expect("first"),
            assemble_items(&config).expect("second")
        );
    }
}
