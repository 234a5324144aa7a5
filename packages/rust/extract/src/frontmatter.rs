//! YAML front matter parsing.
//!
//! A front matter block is a leading `---` line, a YAML mapping, and a
//! closing `---` line. A file without an opening fence has no front matter:
//! the whole file is body.

use std::collections::BTreeMap;

/// Parsed front matter: string keys mapped to arbitrary YAML values.
pub type FrontMatter = BTreeMap<String, serde_yaml::Value>;

/// Split a markdown source into its front matter and body.
///
/// Returns an empty mapping and the full source when no front matter block
/// is present. An opening fence without a closing fence, or a YAML block
/// that does not parse as a mapping, is an error.
pub fn split(source: &str) -> Result<(FrontMatter, &str), String> {
    let Some(after_fence) = source.strip_prefix("---") else {
        return Ok((FrontMatter::new(), source));
    };
    let Some(rest) = after_fence
        .strip_prefix("\r\n")
        .or_else(|| after_fence.strip_prefix('\n'))
    else {
        // `---something` on the first line is content, not a fence.
        return Ok((FrontMatter::new(), source));
    };

    let mut pos = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let yaml = &rest[..pos];
            let body = &rest[pos + line.len()..];
            let mapping = parse_yaml(yaml)?;
            return Ok((mapping, body));
        }
        pos += line.len();
    }

    Err("front matter block is not closed".into())
}

fn parse_yaml(yaml: &str) -> Result<FrontMatter, String> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::new());
    }
    serde_yaml::from_str(yaml).map_err(|e| format!("invalid front matter: {e}"))
}
