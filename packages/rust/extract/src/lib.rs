//! Markdown extraction for SearchBridge.
//!
//! Walks a content root, reads every markdown file, splits front matter
//! from body, reduces the body to plain text, and derives the canonical
//! documentation URL. Extraction is all-or-nothing: any read or parse
//! failure aborts the run, so a partially extracted corpus never reaches
//! the index.

pub mod frontmatter;
pub mod plaintext;

use std::path::Path;

use tracing::{debug, instrument};
use url::Url;
use walkdir::WalkDir;

use searchbridge_shared::{Result, SearchBridgeError};

pub use frontmatter::FrontMatter;

/// Markdown file extension the extractor accepts (case-sensitive).
const MARKDOWN_EXT: &str = ".md";

// ---------------------------------------------------------------------------
// SourceDocument
// ---------------------------------------------------------------------------

/// One parsed markdown file, immutable after extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Slash-normalized path from the content root; unique per document.
    pub relative_path: String,
    /// Parsed front matter; empty when the file has no metadata block.
    pub front_matter: FrontMatter,
    /// Markdown body as read from disk.
    pub raw_body: String,
    /// Body with HTML and markdown syntax removed, whitespace collapsed.
    pub plain_text: String,
    /// Absolute URL of the published page for this document.
    pub canonical_url: String,
    /// Icon shown next to search results; same constant for every document.
    pub icon_url: String,
}

impl SourceDocument {
    /// The front-matter `title`, when present as a string.
    pub fn title(&self) -> Option<&str> {
        self.front_matter.get("title").and_then(|v| v.as_str())
    }

    /// The front-matter `description`, when present as a string.
    pub fn description(&self) -> Option<&str> {
        self.front_matter.get("description").and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Settings for a single extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Base URL the relative document paths resolve against.
    pub base_url: Url,
    /// Icon URL stamped onto every document.
    pub icon_url: String,
}

/// Extract every markdown document under `root`, recursively.
///
/// Non-markdown files are silently skipped. Results are sorted by
/// `relative_path` so repeated runs over the same tree produce identical
/// output.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn extract(root: &Path, opts: &ExtractOptions) -> Result<Vec<SourceDocument>> {
    if !root.is_dir() {
        return Err(SearchBridgeError::validation(format!(
            "content root does not exist: {}",
            root.display()
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| SearchBridgeError::extract(root, e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(MARKDOWN_EXT) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let relative_path = normalize_separators(relative);

        documents.push(extract_file(path, &relative_path, opts)?);
    }

    // Sort for deterministic ordering
    documents.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(count = documents.len(), "extraction complete");
    Ok(documents)
}

fn extract_file(path: &Path, relative_path: &str, opts: &ExtractOptions) -> Result<SourceDocument> {
    let source = std::fs::read_to_string(path).map_err(|e| SearchBridgeError::io(path, e))?;

    let (front_matter, body) =
        frontmatter::split(&source).map_err(|msg| SearchBridgeError::extract(path, msg))?;

    let plain_text = plaintext::strip(body);
    let canonical_url = canonical_url(&opts.base_url, relative_path)?;

    Ok(SourceDocument {
        relative_path: relative_path.to_string(),
        front_matter,
        raw_body: body.to_string(),
        plain_text,
        canonical_url,
        icon_url: opts.icon_url.clone(),
    })
}

/// Resolve `relative_path` (minus the markdown extension) against the base
/// URL. Path separators are kept as-is; only the identifier rewrites them.
fn canonical_url(base: &Url, relative_path: &str) -> Result<String> {
    let trimmed = relative_path
        .strip_suffix(MARKDOWN_EXT)
        .unwrap_or(relative_path);

    let url = base.join(trimmed).map_err(|e| {
        SearchBridgeError::validation(format!("cannot resolve '{trimmed}' against {base}: {e}"))
    })?;

    Ok(url.to_string())
}

/// Join path components with `/` regardless of the platform separator.
fn normalize_separators(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn opts() -> ExtractOptions {
        ExtractOptions {
            base_url: Url::parse("https://learn.microsoft.com/graph/").expect("base url"),
            icon_url: "https://example.com/icon.png".into(),
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, content).expect("write file");
    }

    #[test]
    fn extracts_markdown_tree_recursively() {
        let dir = TempDir::new().expect("tempdir");
        write(
            dir.path(),
            "overview.md",
            "---\ntitle: Overview\n---\n# Overview\n\nIntro text.\n",
        );
        write(
            dir.path(),
            "kb/use-the-api.md",
            "---\ntitle: Use the API\n---\n# Use the API\n\nSee [docs](x).\n",
        );
        write(dir.path(), "kb/notes.txt", "not markdown");
        write(dir.path(), "kb/UPPER.MD", "# wrong extension case");

        let docs = extract(dir.path(), &opts()).expect("extract");

        // Sorted by relative path; non-markdown and wrong-case files skipped.
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].relative_path, "kb/use-the-api.md");
        assert_eq!(docs[1].relative_path, "overview.md");
    }

    #[test]
    fn derives_canonical_url_without_extension() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "kb/use-the-api.md", "# Use the API\n");

        let docs = extract(dir.path(), &opts()).expect("extract");
        assert_eq!(
            docs[0].canonical_url,
            "https://learn.microsoft.com/graph/kb/use-the-api"
        );
    }

    #[test]
    fn front_matter_and_plain_text_populated() {
        let dir = TempDir::new().expect("tempdir");
        write(
            dir.path(),
            "kb/use-the-api.md",
            "---\ntitle: Use the API\n---\n# Use the API\n\nSee [docs](x).\n",
        );

        let docs = extract(dir.path(), &opts()).expect("extract");
        let doc = &docs[0];
        assert_eq!(doc.title(), Some("Use the API"));
        assert_eq!(doc.description(), None);
        assert_eq!(doc.plain_text, "Use the API See docs.");
        assert!(doc.raw_body.starts_with("# Use the API"));
        assert_eq!(doc.icon_url, "https://example.com/icon.png");
    }

    #[test]
    fn file_without_front_matter_keeps_full_body() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "plain.md", "# No metadata\n\nJust content.\n");

        let docs = extract(dir.path(), &opts()).expect("extract");
        assert!(docs[0].front_matter.is_empty());
        assert_eq!(docs[0].raw_body, "# No metadata\n\nJust content.\n");
    }

    #[test]
    fn malformed_front_matter_aborts_the_run() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "good.md", "# Fine\n");
        write(dir.path(), "bad.md", "---\ntitle: [unbalanced\n---\nBody\n");

        let err = extract(dir.path(), &opts()).unwrap_err();
        assert!(matches!(err, SearchBridgeError::Extract { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(extract(&missing, &opts()).is_err());
    }

    #[test]
    fn extraction_is_deterministic() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "b.md", "# B\n");
        write(dir.path(), "a/nested.md", "# Nested\n");
        write(dir.path(), "a.md", "# A\n");

        let first = extract(dir.path(), &opts()).expect("extract");
        let second = extract(dir.path(), &opts()).expect("extract");

        let paths: Vec<_> = first.iter().map(|d| d.relative_path.clone()).collect();
        assert_eq!(paths, vec!["a.md", "a/nested.md", "b.md"]);
        assert_eq!(
            paths,
            second
                .iter()
                .map(|d| d.relative_path.clone())
                .collect::<Vec<_>>()
        );
    }
}
