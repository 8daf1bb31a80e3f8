//! Inbound HTTP surface.

mod http;

pub use http::{
    FALLBACK_ERROR_MESSAGE, GatewayState, HealthResponse, MODEL_ERROR_MESSAGE, SimulationResponse,
    router, run_http,
};
