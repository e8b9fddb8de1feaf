//! Link & symbol extraction
//!
//! A single linear pass splits the text into statements (tracking quotes,
//! comments, interpolation and bracket depth), then each statement is
//! classified as a variable declaration, a mixin/function header, or a
//! module link. SCSS statements end at `;`, `{` and `}`; in the indented
//! syntax they end at line breaks and blocks follow indentation.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::path::Path;

use tower_lsp::lsp_types::Url;

use super::document::{
    is_private_name, CallableKind, CallableRef, CallableSymbol, DocumentRecord, ForwardLink,
    FunctionSymbol, ImportLink, MixinSymbol, Namespace, UseLink, VariableSymbol,
};
use super::line_index::LineIndex;
use super::sassdoc::SassDoc;

/// Stylesheet syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Brace syntax (`.scss`)
    #[default]
    Scss,
    /// Indented syntax (`.sass`)
    Sass,
}

impl Dialect {
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("scss") {
            Some(Dialect::Scss)
        } else if extension.eq_ignore_ascii_case("sass") {
            Some(Dialect::Sass)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Scss => "scss",
            Dialect::Sass => "sass",
        }
    }
}

/// Extraction result for one text
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub variables: HashMap<String, VariableSymbol>,
    pub mixins: HashMap<String, MixinSymbol>,
    pub functions: HashMap<String, FunctionSymbol>,
    pub uses: Vec<UseLink>,
    pub forwards: Vec<ForwardLink>,
    pub imports: Vec<ImportLink>,
    pub line_index: LineIndex,
}

impl ParsedDocument {
    /// Build the Store record once link targets have been filled in.
    ///
    /// Links whose target is the document itself are dropped here.
    pub fn into_record(
        self,
        uri: Url,
        version: Option<i32>,
        text: String,
        dialect: Dialect,
    ) -> DocumentRecord {
        let not_self = |target: &Option<Url>| target.as_ref() != Some(&uri);

        let uses = self
            .uses
            .into_iter()
            .filter(|l| not_self(&l.target))
            .map(|l| (DocumentRecord::link_key(l.target.as_ref(), &l.link), l))
            .collect();
        let forwards = self
            .forwards
            .into_iter()
            .filter(|l| not_self(&l.target))
            .map(|l| (DocumentRecord::link_key(l.target.as_ref(), &l.link), l))
            .collect();
        let imports = self
            .imports
            .into_iter()
            .filter(|l| not_self(&l.target))
            .collect();

        DocumentRecord {
            uri,
            version,
            text,
            dialect,
            line_index: self.line_index,
            variables: self.variables,
            mixins: self.mixins,
            functions: self.functions,
            imports,
            uses,
            forwards,
        }
    }
}

/// Parse declarations and module links from stylesheet text
pub fn parse(text: &str, dialect: Dialect) -> ParsedDocument {
    let statements = match dialect {
        Dialect::Scss => split_scss(text),
        Dialect::Sass => split_sass(text),
    };
    Extractor::new(text, dialect).run(&statements)
}

/// Default namespace of a `@use`: last path segment without extension or `_`
pub fn default_namespace(link: &str) -> String {
    let link = link.strip_prefix("sass:").unwrap_or(link);
    let segment = link.rsplit('/').next().unwrap_or(link);
    let stem = [".scss", ".sass", ".css"]
        .iter()
        .find_map(|ext| segment.strip_suffix(ext))
        .unwrap_or(segment);
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

/// References that are plain CSS imports rather than module links
pub fn is_css_import(link: &str) -> bool {
    link.ends_with(".css")
        || link.starts_with("http://")
        || link.starts_with("https://")
        || link.starts_with("//")
        || link.starts_with("url(")
}

/// Whether a link loads a stylesheet file rather than a built-in module or plain CSS
pub fn is_module_link(link: &str) -> bool {
    !link.starts_with("sass:") && !is_css_import(link)
}

// ==================== STATEMENT SPLITTING ====================

#[derive(Debug, Clone)]
struct Statement {
    /// Trimmed statement text
    range: Range<usize>,
    parent: Option<usize>,
    body: Option<Range<usize>>,
    doc: Vec<String>,
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn line_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| start + p)
        .unwrap_or(bytes.len())
}

fn doc_line(comment: &str) -> Option<String> {
    let rest = comment.strip_prefix("///")?;
    if rest.starts_with('/') {
        return None;
    }
    Some(rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string())
}

fn trimmed_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    start..end.max(start)
}

fn split_scss(text: &str) -> Vec<Statement> {
    let bytes = text.as_bytes();
    let mut statements: Vec<Statement> = Vec::new();
    let mut blocks: Vec<usize> = Vec::new();
    let mut pending_doc: Vec<String> = Vec::new();
    let mut start = 0usize;
    let mut parens = 0usize;
    let mut interpolation = 0usize;
    let mut i = 0usize;

    let push = |statements: &mut Vec<Statement>,
                blocks: &[usize],
                pending_doc: &mut Vec<String>,
                range: Range<usize>| {
        statements.push(Statement {
            range: trimmed_range(text, range),
            parent: blocks.last().copied(),
            body: None,
            doc: std::mem::take(pending_doc),
        });
        statements.len() - 1
    };

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                if text[start..i].trim().is_empty() {
                    start = end;
                }
                i = end;
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') && parens == 0 => {
                let end = line_end(bytes, i);
                if text[start..i].trim().is_empty() {
                    match doc_line(&text[i..end]) {
                        Some(line) => pending_doc.push(line),
                        None => pending_doc.clear(),
                    }
                    start = end;
                }
                i = end;
                continue;
            }
            b'#' if bytes.get(i + 1) == Some(&b'{') => {
                interpolation += 1;
                i += 2;
                continue;
            }
            b'(' | b'[' => parens += 1,
            b')' | b']' => parens = parens.saturating_sub(1),
            b';' if parens == 0 && interpolation == 0 => {
                if !text[start..i].trim().is_empty() {
                    push(&mut statements, &blocks, &mut pending_doc, start..i);
                }
                start = i + 1;
            }
            b'{' if interpolation == 0 => {
                let idx = push(&mut statements, &blocks, &mut pending_doc, start..i);
                statements[idx].body = Some(i + 1..i + 1);
                blocks.push(idx);
                parens = 0;
                start = i + 1;
            }
            b'}' => {
                if interpolation > 0 {
                    interpolation -= 1;
                } else {
                    if !text[start..i].trim().is_empty() {
                        push(&mut statements, &blocks, &mut pending_doc, start..i);
                    }
                    if let Some(idx) = blocks.pop() {
                        if let Some(body) = statements[idx].body.as_mut() {
                            body.end = i;
                        }
                    }
                    pending_doc.clear();
                    parens = 0;
                    start = i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if !text[start..].trim().is_empty() {
        push(&mut statements, &blocks, &mut pending_doc, start..text.len());
    }
    // Unclosed blocks run to the end of the text
    for idx in blocks {
        if let Some(body) = statements[idx].body.as_mut() {
            body.end = text.len();
        }
    }

    statements
}

/// Length of a Sass line before any trailing `//` comment
fn sass_code_len(line: &str) -> usize {
    let bytes = line.as_bytes();
    let mut parens = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b'/' if parens == 0 && matches!(bytes.get(i + 1), Some(b'/') | Some(b'*')) => {
                return i;
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

fn split_sass(text: &str) -> Vec<Statement> {
    let mut statements: Vec<Statement> = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut pending_doc: Vec<String> = Vec::new();
    let mut comment_indent: Option<usize> = None;
    let mut last_content_end = 0usize;
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        let content = line.trim_end_matches(['\n', '\r']);
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = content.len() - trimmed.len();

        if let Some(ci) = comment_indent {
            if indent > ci {
                continue;
            }
            comment_indent = None;
        }
        if trimmed.starts_with("//") || trimmed.starts_with("/*") {
            match doc_line(trimmed) {
                Some(doc) => pending_doc.push(doc),
                None => {
                    pending_doc.clear();
                    comment_indent = Some(indent);
                }
            }
            continue;
        }

        while let Some(&(frame_indent, idx)) = stack.last() {
            if frame_indent < indent {
                break;
            }
            stack.pop();
            if let Some(body) = statements[idx].body.as_mut() {
                body.end = last_content_end;
            }
        }

        let parent = stack.last().map(|&(_, idx)| idx);
        if let Some(p) = parent {
            if statements[p].body.is_none() {
                let header_end = statements[p].range.end;
                statements[p].body = Some(header_end..header_end);
            }
        }

        let code = &trimmed[..sass_code_len(trimmed)];
        let code = code.trim_end().trim_end_matches(';').trim_end();
        let start = line_start + indent;
        statements.push(Statement {
            range: start..start + code.len(),
            parent,
            body: None,
            doc: std::mem::take(&mut pending_doc),
        });
        stack.push((indent, statements.len() - 1));
        last_content_end = line_start + content.len();
    }

    for (_, idx) in stack {
        if let Some(body) = statements[idx].body.as_mut() {
            body.end = last_content_end;
        }
    }

    statements
}

// ==================== CLASSIFICATION ====================

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Cursor over one statement's text, reporting absolute offsets
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    base: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Self { text, pos: 0, base }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn is_done(&self) -> bool {
        self.rest().trim().is_empty()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Eat a whole word (not a prefix of a longer identifier)
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let rest = self.rest();
        let Some(after) = rest.strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().map_or(true, |c| !is_ident_char(c)) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<(&'a str, usize)> {
        self.skip_ws();
        let rest = self.rest();
        let len: usize = rest
            .chars()
            .take_while(|&c| is_ident_char(c))
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return None;
        }
        let start = self.pos;
        self.pos += len;
        Some((&rest[..len], self.base + start))
    }

    /// `$name` or `name`
    fn member_name(&mut self) -> Option<String> {
        let sigil = self.eat("$");
        let (name, _) = self.ident()?;
        Some(if sigil {
            format!("${}", name)
        } else {
            name.to_string()
        })
    }

    /// Quoted string: contents and absolute span of the contents
    fn quoted(&mut self) -> Option<(&'a str, Range<usize>)> {
        self.skip_ws();
        let rest = self.rest();
        let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let close = rest[1..].find(quote)?;
        let start = self.pos + 1;
        self.pos += close + 2;
        Some((&rest[1..close + 1], self.base + start..self.base + start + close))
    }

    /// Unquoted token up to whitespace or a comma (indented `@import a, b`)
    fn bare_token(&mut self) -> Option<(&'a str, Range<usize>)> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == ',')
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        let start = self.pos;
        self.pos += len;
        Some((&rest[..len], self.base + start..self.base + start + len))
    }

    /// Balanced `( ... )` starting at the cursor: inner text and absolute start
    fn parenthesized(&mut self) -> Option<(&'a str, usize)> {
        self.skip_ws();
        let rest = self.rest();
        if !rest.starts_with('(') {
            return None;
        }
        let close = matching_paren(rest, 0)?;
        let inner_start = self.pos + 1;
        self.pos += close + 1;
        Some((&rest[1..close], self.base + inner_start))
    }
}

/// Index of the bracket closing the one at `open`, quote-aware
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split on `separator` outside quotes and brackets; returns byte ranges
pub fn split_top_level(text: &str, separator: u8) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                parts.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(start..bytes.len());
    parts
}

/// Strip trailing `!default` / `!global` flags from a value
fn strip_flags(value: &str) -> (&str, bool, bool) {
    let mut value = value.trim();
    let mut is_default = false;
    let mut is_global = false;
    loop {
        let lower = value.to_ascii_lowercase();
        if lower.ends_with("!default") {
            is_default = true;
            value = value[..value.len() - "!default".len()].trim_end();
        } else if lower.ends_with("!global") {
            is_global = true;
            value = value[..value.len() - "!global".len()].trim_end();
        } else {
            return (value, is_default, is_global);
        }
    }
}

struct Extractor<'a> {
    text: &'a str,
    dialect: Dialect,
    line_index: LineIndex,
    parsed: ParsedDocument,
    callables: Vec<CallableSymbol>,
    /// Statement index -> index into `callables`
    callable_of: HashMap<usize, usize>,
}

impl<'a> Extractor<'a> {
    fn new(text: &'a str, dialect: Dialect) -> Self {
        Self {
            text,
            dialect,
            line_index: LineIndex::new(text),
            parsed: ParsedDocument::default(),
            callables: Vec::new(),
            callable_of: HashMap::new(),
        }
    }

    fn run(mut self, statements: &[Statement]) -> ParsedDocument {
        for (idx, statement) in statements.iter().enumerate() {
            self.classify(idx, statement, statements);
        }

        for callable in self.callables {
            let map = match callable.kind {
                CallableKind::Mixin => &mut self.parsed.mixins,
                CallableKind::Function => &mut self.parsed.functions,
            };
            map.entry(callable.name.clone()).or_insert(callable);
        }
        self.parsed.line_index = self.line_index;
        self.parsed
    }

    fn enclosing_callable(&self, statement: &Statement, statements: &[Statement]) -> Option<usize> {
        let mut parent = statement.parent;
        while let Some(p) = parent {
            if let Some(&callable) = self.callable_of.get(&p) {
                return Some(callable);
            }
            parent = statements[p].parent;
        }
        None
    }

    fn classify(&mut self, idx: usize, statement: &Statement, statements: &[Statement]) {
        let source = self.text;
        let text = &source[statement.range.clone()];
        let base = statement.range.start;

        if text.starts_with('$') {
            self.variable(text, base, statement, statements);
            return;
        }

        let mut cursor = Cursor::new(text, base);
        if cursor.eat("@") {
            let Some((keyword, _)) = cursor.ident() else {
                return;
            };
            match keyword {
                "use" => self.use_link(&mut cursor),
                "forward" => self.forward_link(&mut cursor),
                "import" => self.import_links(&mut cursor),
                "mixin" => self.callable(idx, CallableKind::Mixin, &mut cursor, statement, statements),
                "function" => {
                    self.callable(idx, CallableKind::Function, &mut cursor, statement, statements)
                }
                _ => {}
            }
        } else if self.dialect == Dialect::Sass && cursor.eat("=") {
            self.callable(idx, CallableKind::Mixin, &mut cursor, statement, statements);
        }
    }

    fn variable(&mut self, text: &str, base: usize, statement: &Statement, statements: &[Statement]) {
        let mut cursor = Cursor::new(text, base);
        cursor.eat("$");
        let Some((name, _)) = cursor.ident() else {
            return;
        };
        if !cursor.eat(":") {
            return;
        }
        let (value, is_default, is_global) = strip_flags(cursor.rest());
        let name = format!("${}", name);

        let owner = self.enclosing_callable(statement, statements);
        let mut symbol = VariableSymbol {
            is_private: is_private_name(&name),
            name,
            value: Some(value.to_string()),
            offset: base,
            position: self.line_index.position(self.text, base),
            owner: None,
            doc: SassDoc::parse(&statement.doc),
            is_default,
            is_global,
            is_rest: false,
        };

        if is_global || statement.parent.is_none() {
            self.parsed
                .variables
                .entry(symbol.name.clone())
                .or_insert(symbol);
        } else if let Some(callable) = owner {
            let callable = &mut self.callables[callable];
            symbol.owner = Some(callable.callable_ref());
            callable.locals.push(symbol);
        }
    }

    fn callable(
        &mut self,
        idx: usize,
        kind: CallableKind,
        cursor: &mut Cursor<'_>,
        statement: &Statement,
        statements: &[Statement],
    ) {
        if self.enclosing_callable(statement, statements).is_some() {
            return;
        }
        let Some((name, name_offset)) = cursor.ident() else {
            return;
        };
        let doc = SassDoc::parse(&statement.doc);
        let owner = CallableRef {
            kind,
            name: name.to_string(),
        };

        let parameters = match cursor.parenthesized() {
            Some((params, params_offset)) => self.parameters(params, params_offset, &owner, doc.as_ref()),
            None => Vec::new(),
        };

        self.callable_of.insert(idx, self.callables.len());
        self.callables.push(CallableSymbol {
            name: name.to_string(),
            kind,
            parameters,
            locals: Vec::new(),
            offset: name_offset,
            position: self.line_index.position(self.text, name_offset),
            body: statement.body.clone(),
            doc,
            is_private: is_private_name(name),
        });
    }

    fn parameters(
        &self,
        params: &str,
        params_offset: usize,
        owner: &CallableRef,
        doc: Option<&SassDoc>,
    ) -> Vec<VariableSymbol> {
        split_top_level(params, b',')
            .into_iter()
            .filter_map(|range| {
                let segment = &params[range.clone()];
                let mut cursor = Cursor::new(segment, params_offset + range.start);
                cursor.skip_ws();
                let offset = cursor.base + cursor.pos;
                if !cursor.eat("$") {
                    return None;
                }
                let (name, _) = cursor.ident()?;
                let name = format!("${}", name);
                let is_rest = cursor.eat("...");
                let value = if cursor.eat(":") {
                    Some(cursor.rest().trim().to_string()).filter(|v| !v.is_empty())
                } else {
                    None
                };
                let param_doc = doc
                    .and_then(|d| d.params.iter().find(|p| p.name.trim_end_matches("...") == name))
                    .map(|p| SassDoc {
                        description: p.description.clone(),
                        type_name: p.type_name.clone(),
                        ..SassDoc::default()
                    });

                Some(VariableSymbol {
                    is_private: is_private_name(&name),
                    name,
                    value,
                    offset,
                    position: self.line_index.position(self.text, offset),
                    owner: Some(owner.clone()),
                    doc: param_doc,
                    is_default: false,
                    is_global: false,
                    is_rest,
                })
            })
            .collect()
    }

    fn use_link(&mut self, cursor: &mut Cursor<'_>) {
        let Some((link, span)) = cursor.quoted() else {
            return;
        };
        let mut namespace = Namespace::Named(default_namespace(link));
        let mut is_aliased = false;
        let mut configuration = None;

        while !cursor.is_done() {
            if cursor.eat_keyword("as") {
                if cursor.eat("*") {
                    namespace = Namespace::Wildcard;
                } else if let Some((alias, _)) = cursor.ident() {
                    namespace = Namespace::Named(alias.to_string());
                } else {
                    break;
                }
                is_aliased = true;
            } else if cursor.eat_keyword("with") {
                configuration = cursor.parenthesized().map(|(c, _)| c.trim().to_string());
            } else {
                break;
            }
        }

        self.parsed.uses.push(UseLink {
            link: link.to_string(),
            target: None,
            namespace,
            is_aliased,
            configuration,
            span,
        });
    }

    fn forward_link(&mut self, cursor: &mut Cursor<'_>) {
        let Some((link, span)) = cursor.quoted() else {
            return;
        };
        let mut prefix = None;
        let mut hide = BTreeSet::new();
        let mut show = None;
        let mut configuration = None;

        while !cursor.is_done() {
            if cursor.eat_keyword("as") {
                let Some((name, _)) = cursor.ident() else {
                    break;
                };
                cursor.eat("*");
                prefix = Some(name.to_string());
            } else if cursor.eat_keyword("hide") {
                hide.extend(Self::name_list(cursor));
            } else if cursor.eat_keyword("show") {
                show.get_or_insert_with(BTreeSet::new)
                    .extend(Self::name_list(cursor));
            } else if cursor.eat_keyword("with") {
                configuration = cursor.parenthesized().map(|(c, _)| c.trim().to_string());
            } else {
                break;
            }
        }

        self.parsed.forwards.push(ForwardLink {
            link: link.to_string(),
            target: None,
            prefix,
            hide,
            show,
            configuration,
            span,
        });
    }

    fn name_list(cursor: &mut Cursor<'_>) -> Vec<String> {
        let mut names = Vec::new();
        while let Some(name) = cursor.member_name() {
            names.push(name);
            if !cursor.eat(",") {
                break;
            }
        }
        names
    }

    fn import_links(&mut self, cursor: &mut Cursor<'_>) {
        loop {
            let item = match cursor.quoted() {
                Some(item) => Some(item),
                None if self.dialect == Dialect::Sass => cursor.bare_token(),
                None => None,
            };
            let Some((link, span)) = item else {
                break;
            };
            if !is_css_import(link) {
                self.parsed.imports.push(ImportLink {
                    link: link.to_string(),
                    target: None,
                    span,
                });
            }
            if !cursor.eat(",") {
                break;
            }
        }
    }
}
