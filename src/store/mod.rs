pub mod memory;

use uuid::Uuid;

use crate::error::StoreError;
use crate::models::prediction::Prediction;
use crate::models::team::Team;
use crate::settlement::processor::Settlement;

pub use memory::{InMemoryStore, StoreSnapshot};

/// Storage collaborator for team and prediction records.
///
/// Implementations must make `commit_settlement` atomic: either the settled
/// prediction and both team records are written, or none of them is.
pub trait Store: Send + Sync {
    fn team(&self, name: &str) -> Result<Option<Team>, StoreError>;
    fn put_team(&self, team: Team) -> Result<(), StoreError>;
    fn teams(&self) -> Result<Vec<Team>, StoreError>;
    fn clear_teams(&self) -> Result<(), StoreError>;

    fn prediction(&self, id: Uuid) -> Result<Option<Prediction>, StoreError>;
    fn put_prediction(&self, prediction: Prediction) -> Result<(), StoreError>;
    /// All predictions, oldest first.
    fn predictions(&self) -> Result<Vec<Prediction>, StoreError>;
    fn delete_prediction(&self, id: Uuid) -> Result<Option<Prediction>, StoreError>;
    fn clear_predictions(&self) -> Result<(), StoreError>;

    fn commit_settlement(&self, settlement: &Settlement) -> Result<(), StoreError>;
}
