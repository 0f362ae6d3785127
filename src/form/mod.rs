//! Client-side monitor form: raw inputs, per-type editors, staged
//! dependency edits and the submit flow.

pub mod dependencies;
pub mod editors;
pub mod fields;
pub mod session;

pub use dependencies::{DependencyEditor, ReconcileFailure, StagedDependency};
pub use editors::{BuildContext, ConfigDraft, ConfigEditor};
pub use fields::{HeaderPair, ListField, NumberInput};
pub use session::{FormDraft, FormPhase, FormSession, SessionMode, SharedFields, SubmitOutcome};
