//! Structured event names attached to tracing records, so log pipelines can
//! filter on `event` without parsing message text.

/// Event vocabulary for simulation lifecycle and store logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SimulationEvent {
    SimulationStarted,
    TurnCompleted,
    SimulationCompleted,
    ModelCallFailed,
    LikelihoodOutOfRange,
    RequestRejected,
    StoreBackendEnabled,
    StoreValkeyConnected,
    StoreCommandRetrySucceeded,
    DocumentSaved,
}

impl SimulationEvent {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::SimulationStarted => "simulation.started",
            Self::TurnCompleted => "simulation.turn_completed",
            Self::SimulationCompleted => "simulation.completed",
            Self::ModelCallFailed => "simulation.model_call_failed",
            Self::LikelihoodOutOfRange => "simulation.likelihood_out_of_range",
            Self::RequestRejected => "gateway.request_rejected",
            Self::StoreBackendEnabled => "store.backend_enabled",
            Self::StoreValkeyConnected => "store.valkey_connected",
            Self::StoreCommandRetrySucceeded => "store.command_retry_succeeded",
            Self::DocumentSaved => "store.document_saved",
        }
    }
}
