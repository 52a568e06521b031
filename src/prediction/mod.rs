// Prediction engine: the per-team record model, the constraint solver,
// the cross-team synchronization engine, and store-wide validators.

pub mod constraints;
pub mod record;
pub mod sync;
pub mod validate;

pub use constraints::{clamp_record, ClampedRecord, Range, RecordInput};
pub use record::{GameOutcome, GameSlot, PredictionRecord, PredictionStore};
pub use sync::{apply_team_record, RecordUpdate, SaveError};
