//! Mount element location and fragment commit.
//!
//! The mount is a single element identified by a well-known id, carrying a
//! `data-source` attribute with the dataset location. Pages without the
//! mount are intentionally non-participating: [`find_mount`] returns
//! `Ok(None)` and the caller does nothing, issuing no fetch.
//!
//! This is a span scanner, not an HTML parser: it tokenizes tags (skipping
//! comments and quoted attribute values) and tracks same-name nesting depth
//! to find the end of the mount's content. That is enough for the static
//! pages this tool rewrites.

use std::ops::Range;

use thiserror::Error;

/// Elements that never have a closing tag and so cannot hold content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Error)]
pub enum PageError {
    /// The mount's opening tag was found but no matching close tag exists.
    #[error("Mount element '#{0}' is never closed")]
    UnclosedMount(String),
    /// The mount is a void or self-closing element and cannot hold content.
    #[error("Mount element '#{0}' cannot hold content")]
    VoidMount(String),
}

/// The located mount element: its `data-source` attribute plus the byte
/// span of its inner content within the page.
#[derive(Debug, Clone)]
pub struct Mount {
    inner: Range<usize>,
    data_source: Option<String>,
}

impl Mount {
    /// Raw `data-source` attribute value, unvalidated. An absent attribute
    /// yields `None`; the caller turns that into an unresolvable fetch
    /// whose failure surfaces downstream.
    pub fn data_source(&self) -> Option<&str> {
        self.data_source.as_deref()
    }

    /// Current inner content of the mount within `html`.
    pub fn inner_content<'a>(&self, html: &'a str) -> &'a str {
        &html[self.inner.clone()]
    }
}

/// Scans `html` for the element whose `id` equals `mount_id`.
///
/// Returns `Ok(None)` when no such element exists (silent no-op for the
/// caller, not a failure).
pub fn find_mount(html: &str, mount_id: &str) -> Result<Option<Mount>, PageError> {
    let mut pos = 0;
    while let Some(scan) = next_tag(html, pos) {
        pos = scan.after;
        let Tag::Open {
            name,
            attrs,
            self_closing,
        } = scan.tag
        else {
            continue;
        };

        if !attrs.iter().any(|(k, v)| k == "id" && v == mount_id) {
            continue;
        }

        let data_source = attrs
            .iter()
            .find(|(k, _)| k == "data-source")
            .map(|(_, v)| v.clone());

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return Err(PageError::VoidMount(mount_id.to_string()));
        }

        let inner_start = scan.after;
        let inner_end = find_matching_close(html, inner_start, &name)
            .ok_or_else(|| PageError::UnclosedMount(mount_id.to_string()))?;

        return Ok(Some(Mount {
            inner: inner_start..inner_end,
            data_source,
        }));
    }
    Ok(None)
}

/// Replaces the mount's entire inner content with `fragment`, returning the
/// rewritten page. The single atomic visible update: existing content is
/// cleared and the fragment attached in one splice.
pub fn commit(html: &str, mount: &Mount, fragment: &str) -> String {
    let mut out = String::with_capacity(html.len() - mount.inner.len() + fragment.len());
    out.push_str(&html[..mount.inner.start]);
    out.push_str(fragment);
    out.push_str(&html[mount.inner.end..]);
    out
}

#[derive(Debug)]
enum Tag {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

#[derive(Debug)]
struct TagScan {
    /// Byte offset of the tag's `<` within the page.
    start: usize,
    /// Byte offset just past the tag's `>`.
    after: usize,
    tag: Tag,
}

fn tag_name_at(html: &str, from: usize) -> (String, usize) {
    let rest = &html[from..];
    let len = rest
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    (rest[..len].to_ascii_lowercase(), from + len)
}

/// Returns the next markup tag at or after `from`, skipping comments,
/// doctype declarations, and stray `<` characters in text.
fn next_tag(html: &str, mut from: usize) -> Option<TagScan> {
    let bytes = html.as_bytes();
    loop {
        let lt = html[from..].find('<')? + from;
        let rest = &html[lt..];

        if rest.starts_with("<!--") {
            from = lt + rest.find("-->").map(|i| i + 3)?;
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            from = lt + rest.find('>').map(|i| i + 1)?;
            continue;
        }
        if rest.starts_with("</") {
            let (name, name_end) = tag_name_at(html, lt + 2);
            let gt = html[name_end..].find('>').map(|i| i + name_end)?;
            if name.is_empty() {
                from = gt + 1;
                continue;
            }
            return Some(TagScan {
                start: lt,
                after: gt + 1,
                tag: Tag::Close { name },
            });
        }

        let (name, name_end) = tag_name_at(html, lt + 1);
        if name.is_empty() {
            // Not a tag, just a `<` in text
            from = lt + 1;
            continue;
        }

        // Find the closing `>`, honoring quoted attribute values
        let mut i = name_end;
        let gt = loop {
            if i >= bytes.len() {
                return None;
            }
            match bytes[i] {
                b'"' | b'\'' => {
                    let quote = bytes[i];
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    if i >= bytes.len() {
                        return None;
                    }
                    i += 1;
                }
                b'>' => break i,
                _ => i += 1,
            }
        };

        let raw_attrs = html[name_end..gt].trim_end();
        let self_closing = raw_attrs.ends_with('/');
        let raw_attrs = raw_attrs.trim_end_matches('/');

        return Some(TagScan {
            start: lt,
            after: gt + 1,
            tag: Tag::Open {
                name,
                attrs: parse_attrs(raw_attrs),
                self_closing,
            },
        });
    }
}

/// Parses `name`, `name=value`, `name="value"`, and `name='value'` pairs.
/// Attribute names are lowercased; values are taken verbatim.
fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = raw.trim_start();
    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        if name_len == 0 {
            rest = &rest[1..];
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();

        let value = if let Some(stripped) = rest.strip_prefix('=') {
            rest = stripped.trim_start();
            if let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') {
                let body = &rest[1..];
                let end = body.find(quote).unwrap_or(body.len());
                let value = body[..end].to_string();
                rest = body.get(end + 1..).unwrap_or("");
                value
            } else {
                let end = rest
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(rest.len());
                let value = rest[..end].to_string();
                rest = &rest[end..];
                value
            }
        } else {
            String::new()
        };

        attrs.push((name, value));
        rest = rest.trim_start();
    }
    attrs
}

/// Finds the byte offset of the close tag matching an open `name` tag whose
/// content starts at `from`, counting same-name nesting depth.
fn find_matching_close(html: &str, mut from: usize, name: &str) -> Option<usize> {
    let mut depth = 1usize;
    while let Some(scan) = next_tag(html, from) {
        from = scan.after;
        match scan.tag {
            Tag::Open {
                name: ref n,
                self_closing,
                ..
            } if n == name && !self_closing => depth += 1,
            Tag::Close { name: ref n } if n == name => {
                depth -= 1;
                if depth == 0 {
                    return Some(scan.start);
                }
            }
            _ => {}
        }
    }
    None
}
