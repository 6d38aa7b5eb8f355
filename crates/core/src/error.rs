use crate::types::GenerationId;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("A poll cycle is already in progress (building generation {0})")]
    CycleInProgress(GenerationId),

    #[error("Cycle handle for generation {handle} does not belong to the open cycle")]
    StaleCycle { handle: GenerationId },

    #[error("Requested {requested} rows but only {available} characters are available")]
    ReportRange { requested: usize, available: usize },
}
