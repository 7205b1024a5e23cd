//! Editor-facing intelligence core for Laravel projects.
//!
//! Three layers, leaf-first: a lightweight structural [`parser`] that turns
//! PHP and Blade text into call/array/literal nodes with exact source
//! ranges, a declarative [`matcher`] that finds the call-sites a feature
//! cares about, and pattern-invalidated [`repository`] caches holding
//! probe-introspected project facts (views, abilities, container bindings,
//! model attributes, custom directives). Feature layers combine matches
//! with snapshots to produce completions, hovers, links and diagnostics;
//! none of that rendering lives here.

// Structural parsing and matching
pub mod matcher;
pub mod parser;
pub mod signatures;

// Probe-backed project data
pub mod auth;
pub mod bindings;
pub mod directives;
pub mod models;
pub mod probe;
pub mod repository;
pub mod views;

// Re-export commonly used types
pub use matcher::{detect, detect_in, ArgumentSelector, Signature, SignatureMatch};
pub use parser::{parse, Argument, Node, NodeKind, ParsedDocument, Span};
pub use probe::{Probe, ProbeFuture, ProbeRunner};
pub use repository::{LoadError, LoadFuture, Repository, SnapshotLoader};
