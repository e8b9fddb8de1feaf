//! Embedded stylesheet regions
//!
//! Component files (`.vue`, `.svelte`, `.astro`) carry stylesheets inside
//! `<style lang="scss">` blocks. The extractor blanks everything outside
//! those blocks, keeping every byte offset and line break, so offsets in
//! the extracted text are host offsets.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::parser::Dialect;

/// Host file extensions that may embed stylesheets
pub const HOST_EXTENSIONS: &[&str] = &["vue", "svelte", "astro"];

/// Stylesheet text extracted from a host file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument {
    /// Host text with non-stylesheet bytes replaced by spaces
    pub content: String,
    /// Byte ranges of the style regions in host coordinates
    pub regions: Vec<Range<usize>>,
    /// Dialect of the first region
    pub dialect: Dialect,
}

impl EmbeddedDocument {
    /// Whether a host offset falls inside a style region
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.regions.iter().any(|r| r.start <= offset && offset <= r.end)
    }
}

/// Whether a file extension denotes a host file
pub fn is_host_extension(extension: &str) -> bool {
    HOST_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Extract the `scss`/`sass` style regions of a host file.
///
/// Returns None when the file has no such region.
pub fn extract(host: &str) -> Option<EmbeddedDocument> {
    static OPEN_RE: OnceLock<Regex> = OnceLock::new();
    static LANG_RE: OnceLock<Regex> = OnceLock::new();
    static CLOSE_RE: OnceLock<Regex> = OnceLock::new();
    let open_re = OPEN_RE.get_or_init(|| Regex::new(r"(?i)<style\b([^>]*)>").unwrap());
    let lang_re =
        LANG_RE.get_or_init(|| Regex::new(r#"(?i)\blang\s*=\s*["']?(scss|sass)\b"#).unwrap());
    let close_re = CLOSE_RE.get_or_init(|| Regex::new(r"(?i)</style\s*>").unwrap());

    let mut regions = Vec::new();
    let mut dialect = None;
    let mut cursor = 0;

    while let Some(open) = open_re.captures_at(host, cursor) {
        let tag = open.get(0).map(|m| m.end()).unwrap_or(host.len());
        let attrs = open.get(1).map(|m| m.as_str()).unwrap_or("");
        let end = close_re
            .find_at(host, tag)
            .map(|m| m.start())
            .unwrap_or(host.len());

        if let Some(lang) = lang_re.captures(attrs).and_then(|c| c.get(1)) {
            if dialect.is_none() {
                dialect = Some(if lang.as_str().eq_ignore_ascii_case("sass") {
                    Dialect::Sass
                } else {
                    Dialect::Scss
                });
            }
            regions.push(tag..end);
        }
        cursor = end;
    }

    let dialect = dialect?;
    Some(EmbeddedDocument {
        content: blank_outside(host, &regions),
        regions,
        dialect,
    })
}

/// Replace every byte outside `regions` with a space, keeping line breaks
fn blank_outside(host: &str, regions: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(host.len());
    for (offset, ch) in host.char_indices() {
        let inside = regions.iter().any(|r| r.start <= offset && offset < r.end);
        if inside || ch == '\n' || ch == '\r' {
            out.push(ch);
        } else {
            out.extend(std::iter::repeat(' ').take(ch.len_utf8()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vue_scss_block() {
        let host = "<template><div/></template>\n<style lang=\"scss\">\n$a: 1px;\n</style>\n";
        let doc = extract(host).unwrap();

        assert_eq!(doc.dialect, Dialect::Scss);
        assert_eq!(doc.regions.len(), 1);
        assert_eq!(doc.content.len(), host.len());
        let offset = host.find("$a").unwrap();
        assert_eq!(&doc.content[offset..offset + 2], "$a");
        assert!(doc.contains_offset(offset));
        assert!(!doc.content.contains("template"));
    }

    #[test]
    fn test_plain_css_block_is_ignored() {
        let host = "<style>\n.a { color: red; }\n</style>";
        assert!(extract(host).is_none());
    }

    #[test]
    fn test_sass_dialect_and_multibyte_padding() {
        let host = "<p>héllo</p><style lang='sass'>\n$b: 2\n</style>";
        let doc = extract(host).unwrap();

        assert_eq!(doc.dialect, Dialect::Sass);
        assert_eq!(doc.content.len(), host.len());
        assert!(doc.content.contains("$b: 2"));
    }

    #[test]
    fn test_host_extension_check() {
        assert!(is_host_extension("vue"));
        assert!(is_host_extension("Svelte"));
        assert!(!is_host_extension("scss"));
    }
}
