//! Ready-made signatures for the framework's well-known call shapes.
//!
//! Facade aliases are pre-expanded: every callee set carries the short
//! facade name and the fully-qualified one, so imports and fully-qualified
//! call sites match without any resolution step.

use once_cell::sync::Lazy;

use crate::matcher::{ArgumentSelector, Signature};

const GATE_FACADES: &[&str] = &["Gate", "Illuminate\\Support\\Facades\\Gate"];
const ROUTE_FACADES: &[&str] = &["Route", "Illuminate\\Support\\Facades\\Route"];
const ROUTE_AUTH_FACADES: &[&str] = &[
    "Route",
    "Illuminate\\Support\\Facades\\Route",
    "Auth",
    "Illuminate\\Support\\Facades\\Auth",
];
const VIEW_FACADES: &[&str] = &["View", "Illuminate\\Support\\Facades\\View"];
const APP_FACADES: &[&str] = &["App", "Illuminate\\Support\\Facades\\App"];
const MAIL_CONTENT: &[&str] = &["Content", "Illuminate\\Mail\\Mailables\\Content"];

/// Authorization ability references: gate checks, route/auth guards, the
/// Blade directives, and the bare method forms used on users and
/// controllers. The ability name is always the first argument.
pub static ABILITY_SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::static_call(
            GATE_FACADES,
            &[
                "has",
                "allows",
                "denies",
                "check",
                "any",
                "none",
                "authorize",
                "inspect",
            ],
            ArgumentSelector::Index(0),
        ),
        Signature::static_call(
            ROUTE_AUTH_FACADES,
            &["can", "cannot"],
            ArgumentSelector::Index(0),
        ),
        Signature::bare_call(
            &["@can", "@cannot", "@canany"],
            ArgumentSelector::Index(0),
        ),
        Signature::bare_call(&["can", "cannot", "authorize"], ArgumentSelector::Index(0)),
    ]
});

/// View name references. `Route::view` takes the view as its second
/// argument; mail `Content` uses named arguments with documented positional
/// slots (view at 0, markdown at 3).
pub static VIEW_SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::static_call(
            VIEW_FACADES,
            &[
                "make",
                "first",
                "renderWhen",
                "renderUnless",
                "renderEach",
                "exists",
            ],
            ArgumentSelector::Index(0),
        ),
        Signature::static_call(ROUTE_FACADES, &["view"], ArgumentSelector::Index(1)),
        Signature::bare_call(
            &[
                "@component",
                "@each",
                "@extends",
                "@include",
                "@push",
                "@section",
                "assertViewIs",
                "links",
                "markdown",
                "view",
            ],
            ArgumentSelector::Index(0),
        ),
        Signature::bare_call(MAIL_CONTENT, ArgumentSelector::named("view", Some(0))),
        Signature::bare_call(MAIL_CONTENT, ArgumentSelector::named("markdown", Some(3))),
    ]
});

/// Service-container binding references.
pub static BINDING_SIGNATURES: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::static_call(
            APP_FACADES,
            &["make", "bound", "isShared"],
            ArgumentSelector::Index(0),
        ),
        Signature::bare_call(&["app"], ArgumentSelector::Index(0)),
    ]
});

/// Every default table concatenated, for consumers that run one pass over a
/// document and fan matches out by signature afterwards.
pub fn all_signatures() -> Vec<Signature> {
    let mut signatures = Vec::new();
    signatures.extend(ABILITY_SIGNATURES.iter().cloned());
    signatures.extend(VIEW_SIGNATURES.iter().cloned());
    signatures.extend(BINDING_SIGNATURES.iter().cloned());
    signatures
}
