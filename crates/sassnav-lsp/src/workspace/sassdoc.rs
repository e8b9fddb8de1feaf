//! SassDoc comment parsing
//!
//! Consecutive `///` lines directly above a declaration form its
//! documentation block.

use regex::Regex;
use std::sync::OnceLock;

/// A documented parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParam {
    pub name: String,
    pub type_name: Option<String>,
    pub description: String,
}

/// Documentation attached to a declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SassDoc {
    /// Free text before the first annotation
    pub description: String,
    pub params: Vec<DocParam>,
    pub returns: Option<String>,
    /// `Some("")` when `@deprecated` carries no message
    pub deprecated: Option<String>,
    pub type_name: Option<String>,
    pub examples: Vec<String>,
}

impl SassDoc {
    /// Parse the text of `///` lines (markers already stripped).
    ///
    /// Returns None for an empty block.
    pub fn parse(lines: &[String]) -> Option<Self> {
        static PARAM_RE: OnceLock<Regex> = OnceLock::new();
        let param_re = PARAM_RE.get_or_init(|| {
            Regex::new(
                r"^@(?:param|arg|argument|parameter)\s+(?:\{([^}]*)\}\s*)?(\$?[\w-]+(?:\.\.\.)?)(?:\s*\[[^\]]*\])?\s*(?:-\s*)?(.*)$",
            )
            .unwrap()
        });

        if lines.iter().all(|l| l.trim().is_empty()) {
            return None;
        }

        let mut doc = SassDoc::default();
        let mut description = Vec::new();
        let mut in_example = false;

        for line in lines {
            let trimmed = line.trim();

            if let Some(rest) = trimmed.strip_prefix('@') {
                in_example = false;
                let (tag, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(t, v)| (t, v.trim()))
                    .unwrap_or((rest, ""));

                match tag {
                    "param" | "arg" | "argument" | "parameter" => {
                        if let Some(cap) = param_re.captures(trimmed) {
                            doc.params.push(DocParam {
                                name: cap[2].to_string(),
                                type_name: cap.get(1).map(|m| m.as_str().trim().to_string()),
                                description: cap[3].trim().to_string(),
                            });
                        }
                    }
                    "return" | "returns" => doc.returns = Some(value.to_string()),
                    "deprecated" => doc.deprecated = Some(value.to_string()),
                    "type" => doc.type_name = Some(value.to_string()),
                    "example" => {
                        in_example = true;
                        doc.examples.push(String::new());
                    }
                    _ => {}
                }
                continue;
            }

            if in_example {
                if let Some(example) = doc.examples.last_mut() {
                    if !example.is_empty() {
                        example.push('\n');
                    }
                    example.push_str(line.trim_end());
                }
            } else if doc.params.is_empty() && doc.returns.is_none() {
                description.push(trimmed);
            }
        }

        doc.description = description.join("\n").trim().to_string();
        Some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_description_and_annotations() {
        let doc = SassDoc::parse(&lines(
            "Spacing scale step.\nUse for margins.\n@param {Number} $step [1] - Multiplier\n@return {Length}",
        ))
        .unwrap();

        assert_eq!(doc.description, "Spacing scale step.\nUse for margins.");
        assert_eq!(doc.params.len(), 1);
        assert_eq!(doc.params[0].name, "$step");
        assert_eq!(doc.params[0].type_name.as_deref(), Some("Number"));
        assert_eq!(doc.params[0].description, "Multiplier");
        assert_eq!(doc.returns.as_deref(), Some("{Length}"));
    }

    #[test]
    fn test_deprecated_without_message() {
        let doc = SassDoc::parse(&lines("@deprecated")).unwrap();
        assert_eq!(doc.deprecated.as_deref(), Some(""));
    }

    #[test]
    fn test_example_block() {
        let doc = SassDoc::parse(&lines("@example scss\n  .a { @include b; }\n@type Map")).unwrap();
        assert_eq!(doc.examples, vec!["  .a { @include b; }".to_string()]);
        assert_eq!(doc.type_name.as_deref(), Some("Map"));
    }

    #[test]
    fn test_empty_block() {
        assert!(SassDoc::parse(&lines("  \n")).is_none());
    }
}
