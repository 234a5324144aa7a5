//! Document → external item mapping.
//!
//! A pure, total, order-preserving function: item `i` corresponds to
//! document `i`, no I/O happens, and no well-formed document can fail to
//! map. Determinism matters — the derived id addresses the remote item, so
//! re-running the pipeline must overwrite rather than duplicate.

use searchbridge_extract::SourceDocument;
use searchbridge_shared::{ExternalItem, ItemContent, ItemProperties};

use crate::acl::AclPolicy;

/// Path separator replacement used in item identifiers.
const ID_SEPARATOR: &str = "__";

/// Markdown extension stripped from identifiers and URLs.
const MARKDOWN_EXT: &str = ".md";

/// Derive the stable item identifier from a document's relative path: the
/// markdown extension is stripped and every `/` becomes `__`.
///
/// Identical paths always yield identical ids. Paths whose segments contain
/// a literal `__` can collide with nested paths (`a__b.md` vs `a/b.md`) —
/// a known limitation of the id scheme, kept so ids in a live connection
/// stay stable.
pub fn doc_id(relative_path: &str) -> String {
    relative_path
        .strip_suffix(MARKDOWN_EXT)
        .unwrap_or(relative_path)
        .replace('/', ID_SEPARATOR)
}

/// Map extracted documents to publishable items.
pub fn transform(documents: &[SourceDocument], policy: &AclPolicy) -> Vec<ExternalItem> {
    documents.iter().map(|doc| to_item(doc, policy)).collect()
}

fn to_item(doc: &SourceDocument, policy: &AclPolicy) -> ExternalItem {
    ExternalItem {
        id: doc_id(&doc.relative_path),
        properties: ItemProperties {
            // The remote schema requires both fields present, so absent
            // front matter becomes an empty string, never a missing field.
            title: doc.title().unwrap_or_default().to_string(),
            description: doc.description().unwrap_or_default().to_string(),
            url: doc.canonical_url.clone(),
            icon_url: doc.icon_url.clone(),
        },
        content: ItemContent::text(doc.plain_text.clone()),
        acl: policy.grants_for(&doc.relative_path),
    }
}
