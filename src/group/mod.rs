//! Group flat records by the value of a (possibly nested) field.
//!
//! ```text
//! Input (flat records)              →  Grouped output
//! ┌───────────────────────────┐        ┌────────────────────────────────┐
//! │ category: Fruit, n: Apple │        │ category: Fruit                │
//! │ category: Veg, n: Carrot  │   →    │ items: [Apple, Banana]         │
//! │ category: Fruit, n: Banana│        ├────────────────────────────────┤
//! └───────────────────────────┘        │ category: Veg                  │
//!                                      │ items: [Carrot]                │
//!                                      └────────────────────────────────┘
//! ```
//!
//! The engine is pure computation: it never mutates input records and
//! holds no state beyond one invocation. Non-fatal conditions (the
//! grouping field resolving in no record at all) are reported through
//! the [`Diagnostics`] sink, never as errors.

pub mod engine;
pub mod key;
pub mod path;
pub mod pipeline;

pub use engine::{group_records, GroupedRecord};
pub use key::normalize_key;
pub use path::resolve;

/// Sink for non-fatal diagnostics raised while grouping.
pub trait Diagnostics {
    /// Report a hint. The operation still completes.
    fn hint(&mut self, message: String);
}

/// Diagnostics sink that discards everything.
#[derive(Debug, Default)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn hint(&mut self, _message: String) {}
}

/// Diagnostics sink that accumulates hints for later inspection.
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    pub hints: Vec<String>,
}

impl Diagnostics for CollectedDiagnostics {
    fn hint(&mut self, message: String) {
        self.hints.push(message);
    }
}
