//! Declarative call-site matching over parsed documents.
//!
//! A `Signature` names the calls a feature cares about (callee class set,
//! method set, and which argument carries the resource name); `detect` runs a
//! set of signatures over a document and returns every match with its exact
//! ranges. Matches expose the full argument list of their call, so features
//! that correlate two arguments of the same call (ability name plus model
//! class) read the sibling directly instead of keeping state across passes.

use crate::parser::{parse, Argument, Node, NodeKind, ParsedDocument, Span};

/// Picks the target argument out of a call's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSelector {
    /// The argument at this position, in declaration order
    Index(usize),
    /// The argument declared with this name. `fallback_index` is consulted
    /// only when no argument carries the name and the argument at that
    /// position is positional; `None` means named syntax is required.
    Name {
        name: String,
        fallback_index: Option<usize>,
    },
}

impl ArgumentSelector {
    pub fn named(name: &str, fallback_index: Option<usize>) -> Self {
        ArgumentSelector::Name {
            name: name.to_string(),
            fallback_index,
        }
    }

    /// Index of the selected argument, or `None` when the selector is
    /// unsatisfied (absent argument, missing name). An unsatisfied selector
    /// is a normal negative, not an error.
    pub fn select(&self, arguments: &[Argument]) -> Option<usize> {
        match self {
            ArgumentSelector::Index(index) => {
                if *index < arguments.len() {
                    Some(*index)
                } else {
                    None
                }
            }
            ArgumentSelector::Name {
                name,
                fallback_index,
            } => {
                if let Some(position) = arguments
                    .iter()
                    .position(|argument| argument.name.as_deref() == Some(name.as_str()))
                {
                    return Some(position);
                }
                match fallback_index {
                    Some(index) if *index < arguments.len() && arguments[*index].name.is_none() => {
                        Some(*index)
                    }
                    _ => None,
                }
            }
        }
    }
}

/// One call shape to look for. Signatures are OR-ed: run several over a
/// document and take the union of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Class names qualifying a static call, aliases pre-expanded (short
    /// facade name plus fully-qualified name). Empty means this signature
    /// matches bare calls only.
    pub callee_names: Vec<String>,
    /// Method names, or bare function / directive names when `callee_names`
    /// is empty. An empty set matches nothing.
    pub method_names: Vec<String>,
    pub argument: ArgumentSelector,
}

impl Signature {
    pub fn static_call(callees: &[&str], methods: &[&str], argument: ArgumentSelector) -> Self {
        Signature {
            callee_names: callees.iter().map(|s| s.to_string()).collect(),
            method_names: methods.iter().map(|s| s.to_string()).collect(),
            argument,
        }
    }

    pub fn bare_call(methods: &[&str], argument: ArgumentSelector) -> Self {
        Signature {
            callee_names: Vec::new(),
            method_names: methods.iter().map(|s| s.to_string()).collect(),
            argument,
        }
    }

    fn matches_call(&self, node: &Node) -> bool {
        match &node.kind {
            NodeKind::Call { callee, .. } => {
                self.callee_names.is_empty() && self.method_names.iter().any(|m| m == callee)
            }
            NodeKind::StaticCall { class, method, .. } => {
                !self.callee_names.is_empty()
                    && self.callee_names.iter().any(|c| c == class)
                    && self.method_names.iter().any(|m| m == method)
            }
            _ => false,
        }
    }
}

/// One detected call-site. Owns a clone of the call node, so it stays valid
/// after the parse tree is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureMatch {
    /// Index into the signature slice given to `detect`
    pub signature: usize,
    /// The matched call node, arguments included
    pub call: Node,
    /// Index of the selected argument; always valid for `call`
    pub argument_index: usize,
}

impl SignatureMatch {
    /// The argument the selector picked.
    pub fn argument(&self) -> &Argument {
        &self.call.arguments()[self.argument_index]
    }

    /// All arguments of the matched call, the selected one included.
    pub fn arguments(&self) -> &[Argument] {
        self.call.arguments()
    }

    /// Sibling argument by position, for cross-argument correlation.
    pub fn sibling(&self, index: usize) -> Option<&Argument> {
        self.call.arguments().get(index)
    }

    /// Literal value of the selected argument, when it is a string.
    pub fn literal(&self) -> Option<&str> {
        self.argument().value.as_str()
    }

    pub fn span(&self) -> Span {
        self.call.span
    }

    pub fn argument_span(&self) -> Span {
        self.argument().value.span
    }
}

/// Parses `text` and returns every signature match, in source order. A call
/// can match several signatures and then appears once per signature;
/// callers wanting one entry per call de-duplicate by `(span, signature)`.
pub fn detect(text: &str, signatures: &[Signature]) -> Vec<SignatureMatch> {
    detect_in(&parse(text), signatures)
}

/// Same as `detect` for an already-parsed document.
pub fn detect_in(document: &ParsedDocument, signatures: &[Signature]) -> Vec<SignatureMatch> {
    let mut matches = Vec::new();
    for call in document.calls() {
        for (signature_index, signature) in signatures.iter().enumerate() {
            if !signature.matches_call(call) {
                continue;
            }
            if let Some(argument_index) = signature.argument.select(call.arguments()) {
                matches.push(SignatureMatch {
                    signature: signature_index,
                    call: (*call).clone(),
                    argument_index,
                });
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_allows() -> Vec<Signature> {
        vec![Signature::static_call(
            &["Gate"],
            &["allows"],
            ArgumentSelector::Index(0),
        )]
    }

    #[test]
    fn test_static_call_index_selector() {
        let matches = detect("Gate::allows('edit-post', $post)", &gate_allows());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].literal(), Some("edit-post"));
        assert_eq!(matches[0].argument_index, 0);
    }

    #[test]
    fn test_sibling_argument_access() {
        let text = "Gate::allows('edit-post', $post)";
        let matches = detect(text, &gate_allows());
        let sibling = matches[0].sibling(1).expect("second argument");
        assert!(matches!(sibling.value.kind, NodeKind::Unknown(_)));
        let span = sibling.value.span;
        assert_eq!(&text[span.byte_start..span.byte_end], "$post");
    }

    #[test]
    fn test_missing_argument_is_no_match() {
        let signatures = vec![Signature::static_call(
            &["Route"],
            &["view"],
            ArgumentSelector::Index(1),
        )];
        assert!(detect("Route::view('/')", &signatures).is_empty());
        let matches = detect("Route::view('/', 'welcome')", &signatures);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].literal(), Some("welcome"));
    }

    #[test]
    fn test_unterminated_call_yields_no_match() {
        assert!(detect("Gate::allows(", &gate_allows()).is_empty());
    }

    #[test]
    fn test_bare_call_requires_empty_callee_set() {
        let bare = vec![Signature::bare_call(&["view"], ArgumentSelector::Index(0))];
        assert_eq!(detect("view('welcome')", &bare).len(), 1);
        // the bare signature must not match a static call of the same name
        assert!(detect("View::view('welcome')", &bare).is_empty());

        let qualified = vec![Signature::static_call(
            &["View"],
            &["make"],
            ArgumentSelector::Index(0),
        )];
        // and a qualified signature must not match a bare call
        assert!(detect("make('welcome')", &qualified).is_empty());
    }

    #[test]
    fn test_callee_alias_sets() {
        let signatures = vec![Signature::static_call(
            &["Gate", "Illuminate\\Support\\Facades\\Gate"],
            &["allows"],
            ArgumentSelector::Index(0),
        )];
        let text = "\\Illuminate\\Support\\Facades\\Gate::allows('publish')";
        let matches = detect(text, &signatures);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].literal(), Some("publish"));
    }

    #[test]
    fn test_named_selector_strict() {
        let signatures = vec![Signature::bare_call(
            &["Content"],
            ArgumentSelector::named("view", None),
        )];
        let matches = detect("Content(markdown: 'mail.md', view: 'mail.html')", &signatures);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].literal(), Some("mail.html"));
        assert_eq!(matches[0].argument().name.as_deref(), Some("view"));

        // positional syntax does not satisfy a strict named selector
        assert!(detect("Content('mail.html')", &signatures).is_empty());
    }

    #[test]
    fn test_named_selector_with_positional_fallback() {
        let signatures = vec![Signature::bare_call(
            &["Content"],
            ArgumentSelector::named("view", Some(0)),
        )];
        let named = detect("Content(view: 'mail.html')", &signatures);
        assert_eq!(named.len(), 1);
        let positional = detect("Content('mail.html')", &signatures);
        assert_eq!(positional.len(), 1);
        assert_eq!(positional[0].literal(), Some("mail.html"));

        // a different name in the fallback slot does not count
        assert!(detect("Content(markdown: 'mail.md')", &signatures).is_empty());
    }

    #[test]
    fn test_empty_method_set_matches_nothing() {
        let signatures = vec![Signature::bare_call(&[], ArgumentSelector::Index(0))];
        assert!(detect("view('welcome')", &signatures).is_empty());
    }

    #[test]
    fn test_multiple_signatures_can_match_one_call() {
        let signatures = vec![
            Signature::static_call(&["Gate"], &["allows"], ArgumentSelector::Index(0)),
            Signature::static_call(&["Gate"], &["allows", "denies"], ArgumentSelector::Index(0)),
        ];
        let matches = detect("Gate::allows('edit-post')", &signatures);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].signature, 0);
        assert_eq!(matches[1].signature, 1);
    }

    #[test]
    fn test_matches_inside_closures_and_arrays() {
        let signatures = vec![
            Signature::static_call(&["Route"], &["view"], ArgumentSelector::Index(1)),
            Signature::bare_call(&["view"], ArgumentSelector::Index(0)),
        ];
        let text = "Route::prefix('admin')->group(function () {\n    Route::view('/home', 'admin.home');\n    return view('admin.fallback');\n});";
        let matches = detect(text, &signatures);
        let literals: Vec<_> = matches.iter().filter_map(|m| m.literal()).collect();
        assert!(literals.contains(&"admin.home"));
        assert!(literals.contains(&"admin.fallback"));
    }

    #[test]
    fn test_directive_matching() {
        let signatures = vec![Signature::bare_call(&["@can"], ArgumentSelector::Index(0))];
        let matches = detect("@can('edit-post', $post)\n ... @endcan", &signatures);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].literal(), Some("edit-post"));
    }

    #[test]
    fn test_detect_is_idempotent() {
        let text = "view('a'); Gate::allows('b', $x); @include('c')";
        let signatures = vec![
            Signature::bare_call(&["view", "@include"], ArgumentSelector::Index(0)),
            Signature::static_call(&["Gate"], &["allows"], ArgumentSelector::Index(0)),
        ];
        assert_eq!(detect(text, &signatures), detect(text, &signatures));
    }

    #[test]
    fn test_match_spans_point_at_source() {
        let text = "$ok = Gate::allows('edit-post', $post);";
        let matches = detect(text, &gate_allows());
        let call_span = matches[0].span();
        assert_eq!(
            &text[call_span.byte_start..call_span.byte_end],
            "Gate::allows('edit-post', $post)"
        );
        let argument_span = matches[0].argument_span();
        assert_eq!(
            &text[argument_span.byte_start..argument_span.byte_end],
            "'edit-post'"
        );
    }
}
