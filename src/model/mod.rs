//! Plain value types: compositions, their edit history, workflow stages and
//! the analysis contract.

pub mod analysis;
mod composition;
mod stage;

pub use analysis::AnalysisData;
pub use composition::{Composition, EditEvent, EditKind, title_from_prompt};
pub use stage::WorkflowStage;
