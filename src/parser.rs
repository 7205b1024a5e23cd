//! Lightweight structural parser for PHP and Blade source text.
//!
//! Produces a forest of call, array and literal nodes with exact byte and
//! line/column ranges, which is all the downstream matching needs. This is a
//! hand-rolled scanner, not a grammar: anything it does not recognize becomes
//! an `Unknown` node and scanning resumes after it, so partially-typed and
//! malformed documents always produce a usable (if degraded) tree. Parsing is
//! pure text-to-tree and cheap enough to re-run on every editor event.

// ============================================================================
// PART 1: Node Types
// ============================================================================

/// Source range of a node. Offsets are in bytes, rows and columns are
/// 0-indexed, columns count bytes within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first byte of the node
    pub byte_start: usize,
    /// Byte offset one past the last byte of the node
    pub byte_end: usize,
    /// Row of the first byte (0-indexed)
    pub start_row: usize,
    /// Column of the first byte (0-indexed)
    pub start_column: usize,
    /// Row just past the node (0-indexed)
    pub end_row: usize,
    /// Column just past the node (0-indexed)
    pub end_column: usize,
}

/// One parsed node with its source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Quoted string literal, quotes stripped and escapes decoded
    String(String),
    /// Numeric literal, kept as raw source text
    Number(String),
    /// `true` / `false`
    Bool(bool),
    /// `[...]` or `array(...)` literal
    Array(Vec<ArrayEntry>),
    /// Bare function call, `view('welcome')`. Blade directives with an
    /// argument list parse as calls whose callee keeps the `@` prefix.
    Call {
        callee: String,
        arguments: Vec<Argument>,
    },
    /// Static method call `Gate::allows(...)`, or static member access
    /// without an argument list such as `Post::class` (empty arguments).
    /// The class name carries no leading backslash.
    StaticCall {
        class: String,
        method: String,
        arguments: Vec<Argument>,
    },
    /// Unrecognized span. Well-formed calls found inside it (closure
    /// bodies, complex expressions) are kept as children so matching can
    /// still reach them.
    Unknown(Vec<Node>),
}

/// One entry of an array literal. `key` is present only for `key => value`
/// entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayEntry {
    pub key: Option<Node>,
    pub value: Node,
}

/// One argument of a call.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Declared name for named-argument syntax (`view: 'welcome'`)
    pub name: Option<String>,
    /// Ordinal position among the call's arguments, contiguous from 0
    pub index: usize,
    pub value: Node,
}

/// Parse result: the document's top-level nodes in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDocument {
    pub nodes: Vec<Node>,
}

impl Node {
    /// String literal payload, if this node is one.
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            NodeKind::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// Arguments of a call-shaped node; empty for every other kind.
    pub fn arguments(&self) -> &[Argument] {
        match &self.kind {
            NodeKind::Call { arguments, .. } | NodeKind::StaticCall { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Class name of a static-call-shaped node (`Post::find(...)`,
    /// `Post::class`).
    pub fn class_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StaticCall { class, .. } => Some(class),
            _ => None,
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Call { .. } | NodeKind::StaticCall { .. }
        )
    }

    pub fn array_entries(&self) -> &[ArrayEntry] {
        match &self.kind {
            NodeKind::Array(entries) => entries,
            _ => &[],
        }
    }
}

impl ParsedDocument {
    /// All call-shaped nodes in the document, depth-first and in source
    /// order, including calls nested in arguments, array entries and
    /// unrecognized spans.
    pub fn calls(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for node in &self.nodes {
            collect_calls(node, &mut out);
        }
        out
    }
}

fn collect_calls<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    match &node.kind {
        NodeKind::Call { arguments, .. } | NodeKind::StaticCall { arguments, .. } => {
            out.push(node);
            for argument in arguments {
                collect_calls(&argument.value, out);
            }
        }
        NodeKind::Array(entries) => {
            for entry in entries {
                if let Some(key) = &entry.key {
                    collect_calls(key, out);
                }
                collect_calls(&entry.value, out);
            }
        }
        NodeKind::Unknown(children) => {
            for child in children {
                collect_calls(child, out);
            }
        }
        _ => {}
    }
}

/// Parses a document into a forest of nodes. Never fails: unrecognized
/// spans become `Unknown` nodes and scanning resumes after them.
pub fn parse(text: &str) -> ParsedDocument {
    let mut scanner = Scanner::new(text);
    ParsedDocument {
        nodes: scanner.scan_document(),
    }
}

// ============================================================================
// PART 2: Scanner
// ============================================================================

/// Words that look like calls when followed by `(` but are language
/// constructs. Compared case-insensitively, as PHP does.
const NON_CALL_KEYWORDS: &[&str] = &[
    "if",
    "elseif",
    "while",
    "for",
    "foreach",
    "switch",
    "match",
    "catch",
    "function",
    "fn",
    "use",
    "isset",
    "unset",
    "empty",
    "list",
    "exit",
    "die",
    "declare",
    "array",
    "echo",
    "print",
    "return",
    "require",
    "require_once",
    "include",
    "include_once",
    "eval",
    "clone",
    "yield",
    "new",
    "throw",
    "global",
    "static",
];

fn is_non_call_keyword(name: &str) -> bool {
    NON_CALL_KEYWORDS
        .iter()
        .any(|keyword| name.eq_ignore_ascii_case(keyword))
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Byte position plus its row/column, so the scanner can rewind cheaply.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    byte: usize,
    row: usize,
    column: usize,
}

struct Scanner<'a> {
    bytes: &'a [u8],
    cursor: Cursor,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner {
            bytes: text.as_bytes(),
            cursor: Cursor {
                byte: 0,
                row: 0,
                column: 0,
            },
        }
    }

    fn at_end(&self) -> bool {
        self.cursor.byte >= self.bytes.len()
    }

    /// Current byte, or NUL past the end so byte comparisons stay safe.
    fn peek(&self) -> u8 {
        self.bytes.get(self.cursor.byte).copied().unwrap_or(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor.byte + offset).copied()
    }

    fn peek_is(&self, expected: u8) -> bool {
        self.peek() == expected
    }

    fn bump(&mut self) {
        if let Some(&b) = self.bytes.get(self.cursor.byte) {
            self.cursor.byte += 1;
            if b == b'\n' {
                self.cursor.row += 1;
                self.cursor.column = 0;
            } else {
                self.cursor.column += 1;
            }
        }
    }

    fn reset(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn span_between(&self, start: Cursor, end: Cursor) -> Span {
        Span {
            byte_start: start.byte,
            byte_end: end.byte,
            start_row: start.row,
            start_column: start.column,
            end_row: end.row,
            end_column: end.column,
        }
    }

    fn span_from(&self, start: Cursor) -> Span {
        self.span_between(start, self.cursor)
    }

    fn unknown_between(&self, start: Cursor, end: Cursor) -> Node {
        Node {
            kind: NodeKind::Unknown(Vec::new()),
            span: self.span_between(start, end),
        }
    }

    // ---- whitespace and comments ----

    /// Skips whitespace and comments. `//` and `#` only open a comment in a
    /// plausible position (after whitespace or statement punctuation), so
    /// `https://...` URLs and `href="#"` fragments in template text are not
    /// eaten. `#[` is a PHP attribute, not a comment.
    fn skip_insignificant(&mut self) {
        loop {
            while !self.at_end() && self.peek().is_ascii_whitespace() {
                self.bump();
            }
            if self.at_end() {
                return;
            }
            let b = self.peek();
            if b == b'/' && self.peek_at(1) == Some(b'*') {
                self.bump();
                self.bump();
                while !self.at_end() {
                    if self.peek() == b'*' && self.peek_at(1) == Some(b'/') {
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
                continue;
            }
            if b == b'/' && self.peek_at(1) == Some(b'/') && self.line_comment_position() {
                self.skip_to_line_end();
                continue;
            }
            if b == b'#' && self.peek_at(1) != Some(b'[') && self.line_comment_position() {
                self.skip_to_line_end();
                continue;
            }
            return;
        }
    }

    fn line_comment_position(&self) -> bool {
        match self.cursor.byte.checked_sub(1).map(|i| self.bytes[i]) {
            None => true,
            Some(prev) => matches!(
                prev,
                b' ' | b'\t' | b'\n' | b'\r' | b';' | b'{' | b'}' | b'(' | b',' | b'='
            ),
        }
    }

    fn skip_to_line_end(&mut self) {
        while !self.at_end() && self.peek() != b'\n' {
            self.bump();
        }
    }

    fn skip_ident(&mut self) {
        while !self.at_end() && is_ident_continue(self.peek()) {
            self.bump();
        }
    }

    // ---- document scan ----

    /// Top-level scan: calls become nodes, everything between them coalesces
    /// into `Unknown` runs. Quotes are plain bytes here on purpose: template
    /// text is full of unbalanced apostrophes, and treating them as string
    /// openers would swallow real calls.
    fn scan_document(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut pending: Option<(Cursor, Cursor)> = None;
        loop {
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            let token_start = self.cursor;
            if let Some(node) = self.try_parse_call() {
                if let Some((start, end)) = pending.take() {
                    nodes.push(self.unknown_between(start, end));
                }
                nodes.push(node);
                continue;
            }
            if self.cursor.byte == token_start.byte {
                self.skip_junk_token();
            }
            match &mut pending {
                Some((_, end)) => *end = self.cursor,
                None => pending = Some((token_start, self.cursor)),
            }
        }
        if let Some((start, end)) = pending.take() {
            nodes.push(self.unknown_between(start, end));
        }
        nodes
    }

    /// Consumes one uninteresting token. Variables are taken whole so that
    /// `$view(` is never mistaken for a `view(` call.
    fn skip_junk_token(&mut self) {
        let b = self.peek();
        if b == b'$' {
            self.bump();
            self.skip_ident();
        } else if is_ident_start(b) {
            self.skip_ident();
        } else {
            self.bump();
        }
    }

    /// Scans an opaque expression region for embedded well-formed calls,
    /// stopping at any byte of `stops` (or an unmatched closer) at bracket
    /// depth zero. Strings are honored here so delimiters inside them do
    /// not end the region early.
    fn scan_region(&mut self, stops: &[u8]) -> Vec<Node> {
        let mut children = Vec::new();
        let mut depth: usize = 0;
        loop {
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            let b = self.peek();
            if depth == 0 && stops.contains(&b) {
                break;
            }
            match b {
                b'\'' | b'"' => {
                    self.parse_string();
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    self.bump();
                }
                b')' | b']' | b'}' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.bump();
                }
                b'$' => {
                    self.bump();
                    self.skip_ident();
                }
                _ if b == b'@' || b == b'\\' || is_ident_start(b) => {
                    let before = self.cursor.byte;
                    if let Some(node) = self.try_parse_call() {
                        children.push(node);
                    } else if self.cursor.byte == before {
                        self.bump();
                    }
                }
                _ => {
                    self.bump();
                }
            }
        }
        children
    }

    // ---- calls ----

    /// Tries to parse a call-shaped node at the current position. On `None`
    /// the scanner may still have consumed the candidate name; callers fold
    /// whatever was consumed into the surrounding unknown run.
    fn try_parse_call(&mut self) -> Option<Node> {
        let b = self.peek();
        if b == b'@' {
            return self.try_parse_directive();
        }
        if !(is_ident_start(b) || b == b'\\') {
            return None;
        }
        let start = self.cursor;
        let name = self.read_qualified_name()?;
        self.finish_call(name, start)
    }

    /// Blade directive with an argument list, e.g. `@can('edit', $post)`.
    /// A directive token without parentheses is not a call. Blade allows
    /// horizontal whitespace before the parentheses but not a newline.
    fn try_parse_directive(&mut self) -> Option<Node> {
        if self.peek_at(1).map(is_ident_start) != Some(true) {
            return None;
        }
        let start = self.cursor;
        self.bump();
        let word = self.read_ident();
        while matches!(self.peek(), b' ' | b'\t') {
            self.bump();
        }
        if !self.peek_is(b'(') {
            return None;
        }
        self.bump();
        let arguments = self.parse_arguments();
        let mut callee = String::from("@");
        callee.push_str(&word);
        Some(Node {
            kind: NodeKind::Call { callee, arguments },
            span: self.span_from(start),
        })
    }

    /// Completes a call-shaped node once its callee name has been read:
    /// `name(...)`, `Class::method(...)`, or bare `Class::member`.
    fn finish_call(&mut self, name: String, start: Cursor) -> Option<Node> {
        self.skip_insignificant();
        if self.peek_is(b':') && self.peek_at(1) == Some(b':') {
            self.bump();
            self.bump();
            self.skip_insignificant();
            if self.at_end() || !is_ident_start(self.peek()) {
                // `Class::$prop` and the like: leave it to the junk scan
                return None;
            }
            let method = self.read_ident();
            let member_end = self.cursor;
            self.skip_insignificant();
            if self.peek_is(b'(') {
                self.bump();
                let arguments = self.parse_arguments();
                return Some(Node {
                    kind: NodeKind::StaticCall {
                        class: name,
                        method,
                        arguments,
                    },
                    span: self.span_from(start),
                });
            }
            // `Post::class` and other member access: kept so the class name
            // stays reachable for correlation
            return Some(Node {
                kind: NodeKind::StaticCall {
                    class: name,
                    method,
                    arguments: Vec::new(),
                },
                span: self.span_between(start, member_end),
            });
        }
        if self.peek_is(b'(') && !is_non_call_keyword(&name) {
            self.bump();
            let arguments = self.parse_arguments();
            return Some(Node {
                kind: NodeKind::Call {
                    callee: name,
                    arguments,
                },
                span: self.span_from(start),
            });
        }
        None
    }

    /// Reads `Name`, `Ns\Name` or `\Ns\Name`; the leading backslash is
    /// dropped so callers always see the normalized form.
    fn read_qualified_name(&mut self) -> Option<String> {
        if self.peek_is(b'\\') {
            self.bump();
        }
        if self.at_end() || !is_ident_start(self.peek()) {
            return None;
        }
        let mut name = self.read_ident();
        while self.peek_is(b'\\') && self.peek_at(1).map(is_ident_start) == Some(true) {
            self.bump();
            name.push('\\');
            name.push_str(&self.read_ident());
        }
        Some(name)
    }

    fn read_ident(&mut self) -> String {
        let start = self.cursor.byte;
        self.skip_ident();
        String::from_utf8_lossy(&self.bytes[start..self.cursor.byte]).into_owned()
    }

    // ---- argument lists ----

    /// Parses an argument list after its opening parenthesis. Degrades on
    /// malformed input: an unterminated list keeps the arguments collected
    /// so far, so `Gate::allows(` mid-typing still yields a call node.
    fn parse_arguments(&mut self) -> Vec<Argument> {
        let mut arguments = Vec::new();
        loop {
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            if self.peek_is(b')') {
                self.bump();
                break;
            }
            let index = arguments.len();
            if let Some(argument) = self.parse_argument(index) {
                arguments.push(argument);
            }
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            match self.peek() {
                b',' => {
                    self.bump();
                }
                b')' => {
                    self.bump();
                    break;
                }
                _ => break,
            }
        }
        arguments
    }

    fn parse_argument(&mut self, index: usize) -> Option<Argument> {
        let name = self.try_argument_name();
        self.skip_insignificant();
        let value_start = self.cursor;
        let value = self.parse_value();
        self.skip_insignificant();
        if self.at_end() || matches!(self.peek(), b',' | b')') {
            return match value {
                Some(value) => Some(Argument { name, index, value }),
                None if name.is_some() => Some(Argument {
                    name,
                    index,
                    value: Node {
                        kind: NodeKind::Unknown(Vec::new()),
                        span: self.span_from(value_start),
                    },
                }),
                None => None,
            };
        }
        // The argument is a larger expression than the recognized value
        // (concatenation, method chain, ternary, closure). Rescan it whole
        // for call subtrees and wrap it in an Unknown node. A `;` at depth
        // zero can only mean the list was never closed, so it ends the
        // argument too.
        self.reset(value_start);
        let children = self.scan_region(&[b',', b')', b';']);
        Some(Argument {
            name,
            index,
            value: Node {
                kind: NodeKind::Unknown(children),
                span: self.span_from(value_start),
            },
        })
    }

    /// `name:` (a single colon) introduces a named argument; `::` is the
    /// scope operator, so one lookahead byte disambiguates.
    fn try_argument_name(&mut self) -> Option<String> {
        self.skip_insignificant();
        if !is_ident_start(self.peek()) {
            return None;
        }
        let start = self.cursor;
        let word = self.read_ident();
        self.skip_insignificant();
        if self.peek_is(b':') && self.peek_at(1) != Some(b':') {
            self.bump();
            return Some(word);
        }
        self.reset(start);
        None
    }

    // ---- values ----

    fn parse_value(&mut self) -> Option<Node> {
        self.skip_insignificant();
        if self.at_end() {
            return None;
        }
        let start = self.cursor;
        let b = self.peek();
        match b {
            b'\'' | b'"' => Some(self.parse_string()),
            b'[' => {
                self.bump();
                Some(self.parse_array(start, b']'))
            }
            b'$' => {
                self.bump();
                self.skip_ident();
                Some(Node {
                    kind: NodeKind::Unknown(Vec::new()),
                    span: self.span_from(start),
                })
            }
            b'-' | b'+' if self.peek_at(1).map(|d| d.is_ascii_digit()) == Some(true) => {
                Some(self.parse_number())
            }
            _ if b.is_ascii_digit() => Some(self.parse_number()),
            b'@' => self.try_parse_call(),
            _ if is_ident_start(b) || b == b'\\' => self.parse_word_value(start),
            _ => None,
        }
    }

    fn parse_word_value(&mut self, start: Cursor) -> Option<Node> {
        let name = self.read_qualified_name()?;
        if name.eq_ignore_ascii_case("true") {
            return Some(Node {
                kind: NodeKind::Bool(true),
                span: self.span_from(start),
            });
        }
        if name.eq_ignore_ascii_case("false") {
            return Some(Node {
                kind: NodeKind::Bool(false),
                span: self.span_from(start),
            });
        }
        if name.eq_ignore_ascii_case("null") {
            return Some(Node {
                kind: NodeKind::Unknown(Vec::new()),
                span: self.span_from(start),
            });
        }
        if name == "array" {
            self.skip_insignificant();
            if self.peek_is(b'(') {
                self.bump();
                return Some(self.parse_array(start, b')'));
            }
            return None;
        }
        self.finish_call(name, start)
    }

    /// Parses a quoted string after positioning on its opening quote.
    /// Single quotes decode `\\` and `\'`; double quotes additionally
    /// decode the common escapes. No interpolation. An unterminated string
    /// becomes an Unknown node.
    fn parse_string(&mut self) -> Node {
        let start = self.cursor;
        let quote = self.peek();
        self.bump();
        let mut value: Vec<u8> = Vec::new();
        let mut terminated = false;
        while !self.at_end() {
            let b = self.peek();
            if b == quote {
                self.bump();
                terminated = true;
                break;
            }
            if b == b'\\' {
                self.bump();
                if self.at_end() {
                    break;
                }
                let escaped = self.peek();
                self.bump();
                let decoded: &[u8] = if quote == b'\'' {
                    match escaped {
                        b'\\' => b"\\",
                        b'\'' => b"'",
                        _ => {
                            value.push(b'\\');
                            value.push(escaped);
                            continue;
                        }
                    }
                } else {
                    match escaped {
                        b'\\' => b"\\",
                        b'"' => b"\"",
                        b'\'' => b"'",
                        b'n' => b"\n",
                        b't' => b"\t",
                        b'r' => b"\r",
                        b'$' => b"$",
                        _ => {
                            value.push(b'\\');
                            value.push(escaped);
                            continue;
                        }
                    }
                };
                value.extend_from_slice(decoded);
                continue;
            }
            value.push(b);
            self.bump();
        }
        if terminated {
            Node {
                kind: NodeKind::String(String::from_utf8_lossy(&value).into_owned()),
                span: self.span_from(start),
            }
        } else {
            Node {
                kind: NodeKind::Unknown(Vec::new()),
                span: self.span_from(start),
            }
        }
    }

    fn parse_number(&mut self) -> Node {
        let start = self.cursor;
        if matches!(self.peek(), b'-' | b'+') {
            self.bump();
        }
        while !self.at_end() && matches!(self.peek(), b'0'..=b'9' | b'_' | b'.') {
            self.bump();
        }
        let raw = String::from_utf8_lossy(&self.bytes[start.byte..self.cursor.byte]).into_owned();
        Node {
            kind: NodeKind::Number(raw),
            span: self.span_from(start),
        }
    }

    // ---- arrays ----

    /// Parses array entries after the opener was consumed; `closer` is `]`
    /// for `[...]` and `)` for `array(...)`.
    fn parse_array(&mut self, start: Cursor, closer: u8) -> Node {
        let mut entries = Vec::new();
        loop {
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            if self.peek() == closer {
                self.bump();
                break;
            }
            if let Some(entry) = self.parse_array_entry(closer) {
                entries.push(entry);
            }
            self.skip_insignificant();
            if self.at_end() {
                break;
            }
            if self.peek_is(b',') {
                self.bump();
                continue;
            }
            if self.peek() == closer {
                self.bump();
                break;
            }
            break;
        }
        Node {
            kind: NodeKind::Array(entries),
            span: self.span_from(start),
        }
    }

    fn parse_array_entry(&mut self, closer: u8) -> Option<ArrayEntry> {
        let first = self.parse_entry_component(closer)?;
        self.skip_insignificant();
        if self.peek_is(b'=') && self.peek_at(1) == Some(b'>') {
            self.bump();
            self.bump();
            let value = match self.parse_entry_component(closer) {
                Some(value) => value,
                None => Node {
                    kind: NodeKind::Unknown(Vec::new()),
                    span: self.span_from(self.cursor),
                },
            };
            return Some(ArrayEntry {
                key: Some(first),
                value,
            });
        }
        Some(ArrayEntry {
            key: None,
            value: first,
        })
    }

    /// One side of an array entry, finalized against the entry delimiters
    /// (`,`, the closer, or `=>`). Complex expressions degrade to Unknown
    /// with any embedded calls kept, same as call arguments.
    fn parse_entry_component(&mut self, closer: u8) -> Option<Node> {
        self.skip_insignificant();
        let start = self.cursor;
        let value = self.parse_value();
        self.skip_insignificant();
        let clean = self.at_end()
            || self.peek() == b','
            || self.peek() == closer
            || (self.peek() == b'=' && self.peek_at(1) == Some(b'>'));
        if let Some(value) = value {
            if clean {
                return Some(value);
            }
        } else if clean && self.cursor.byte == start.byte {
            return None;
        }
        self.reset(start);
        let children = self.scan_region(&[b',', closer, b'=']);
        Some(Node {
            kind: NodeKind::Unknown(children),
            span: self.span_from(start),
        })
    }
}

// ============================================================================
// PART 3: Tests
// ============================================================================
