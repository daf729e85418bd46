//! Tolerant scanning of board markup.
//!
//! BVG's mobile pages are small and loosely structured, so instead of a
//! full parser this module scans for tags case-insensitively and works
//! on the text between them. An element's content ends at its closing
//! tag or at the next opening tag of the same name, whichever comes
//! first, which copes with unclosed `<td>`, `<tr>` and `<option>`.
//! Comments are skipped, and a `>` inside a quoted attribute value does
//! not end its tag. Nesting an element inside another of the same name
//! is not supported.

/// A tag found in a document, borrowing from it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    attrs: &'a str,
    inner: &'a str,
}

impl<'a> Element<'a> {
    /// Value of an attribute on the opening tag.
    pub(crate) fn attr(&self, name: &str) -> Option<&'a str> {
        attribute(self.attrs, name)
    }

    /// Whether the `class` attribute lists `class`.
    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Elements named `tag` inside this one.
    pub(crate) fn children(&self, tag: &str) -> Vec<Element<'a>> {
        elements(self.inner, tag)
    }

    /// Text content: tags stripped, entities decoded, outer whitespace
    /// trimmed.
    pub(crate) fn text(&self) -> String {
        text(self.inner)
    }
}

/// All elements named `tag`, in document order.
pub(crate) fn elements<'a>(html: &'a str, tag: &str) -> Vec<Element<'a>> {
    let lower = scan_copy(html);
    let tag = tag.to_ascii_lowercase();
    let close = format!("</{tag}");

    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_open(&lower, pos, &tag) {
        let after_name = start + 1 + tag.len();
        let Some(end) = tag_end(&lower, after_name) else {
            break;
        };
        let attrs = &html[after_name..end];
        let content_start = end + 1;

        let inner = if attrs.trim_end().ends_with('/') {
            ""
        } else {
            let by_close = lower[content_start..].find(&close).map(|i| content_start + i);
            let by_next = find_open(&lower, content_start, &tag);
            let content_end = match (by_close, by_next) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => html.len(),
            };
            &html[content_start..content_end]
        };

        found.push(Element {
            attrs: attrs.trim_end_matches('/'),
            inner,
        });
        pos = content_start;
    }

    found
}

/// Lowercased copy of `html` with comments blanked out. Byte offsets
/// match the original, so positions found here slice `html` directly.
fn scan_copy(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(open) = rest.find("<!--") {
        out.push_str(&rest[..open].to_ascii_lowercase());
        let tail = &rest[open..];
        let len = comment_len(tail);
        out.extend(std::iter::repeat_n(' ', len));
        rest = &tail[len..];
    }

    out.push_str(&rest.to_ascii_lowercase());
    out
}

/// Byte length of the comment `s` starts with, up to the end of `s` if
/// it is never closed.
fn comment_len(s: &str) -> usize {
    s[4..].find("-->").map_or(s.len(), |e| 4 + e + 3)
}

/// Position of the `>` ending a tag whose attributes start at `from`.
///
/// Quoted attribute values are skipped. If a quote is never closed the
/// first `>` wins.
fn tag_end(s: &str, from: usize) -> Option<usize> {
    let mut quote = None;

    for (i, &b) in s.as_bytes().iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i),
            None => {}
        }
    }

    s[from..].find('>').map(|i| from + i)
}

/// First element named `tag` whose class list contains `class`.
pub(crate) fn find_with_class<'a>(html: &'a str, tag: &str, class: &str) -> Option<Element<'a>> {
    elements(html, tag).into_iter().find(|e| e.has_class(class))
}

/// Position of the next `<tag` in `lower` at or after `from`, where the
/// name is followed by whitespace, `>` or `/`.
fn find_open(lower: &str, from: usize, tag: &str) -> Option<usize> {
    let open = format!("<{tag}");
    let mut pos = from;

    while let Some(i) = lower[pos..].find(&open) {
        let start = pos + i;
        let next = lower.as_bytes().get(start + open.len());
        match next {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            _ => pos = start + open.len(),
        }
    }

    None
}

/// Value of `name` within the attribute part of an opening tag.
fn attribute<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let lower = attrs.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut pos = 0;

    while let Some(i) = lower[pos..].find(&name) {
        let start = pos + i;
        let end = start + name.len();
        pos = end;

        let at_boundary = start == 0 || bytes[start - 1].is_ascii_whitespace();
        if !at_boundary {
            continue;
        }

        let after = &attrs[end..];
        let Some(rest) = after.trim_start().strip_prefix('=') else {
            // Bare attribute such as `hidden`
            if after.is_empty() || after.starts_with(|c: char| c.is_ascii_whitespace()) {
                return Some("");
            }
            continue;
        };
        let rest = rest.trim_start();

        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let body = &rest[1..];
                body.find(q).map_or(body, |e| &body[..e])
            }
            _ => rest
                .find(|c: char| c.is_ascii_whitespace())
                .map_or(rest, |e| &rest[..e]),
        };
        return Some(value);
    }

    None
}

/// Strip tags and comments, decode entities and trim.
///
/// A `<` only opens a tag when a letter, `/` or `!` follows it; any
/// other `<` is text.
pub(crate) fn text(markup: &str) -> String {
    let mut stripped = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(lt) = rest.find('<') {
        stripped.push_str(&rest[..lt]);
        let tail = &rest[lt..];

        if tail.starts_with("<!--") {
            rest = &tail[comment_len(tail)..];
        } else if tail[1..].starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!') {
            rest = tag_end(tail, 1).map_or("", |end| &tail[end + 1..]);
        } else {
            stripped.push('<');
            rest = &tail[1..];
        }
    }

    stripped.push_str(rest);
    decode_entities(&stripped).trim().to_string()
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
