//! prelim-bridge
//!
//! Call boundary between an orchestration layer and a preliminary-search
//! engine: request building, engine adapter, hit stream consumer, empty
//! result policy and the `Bridge` facade tying them together.

pub mod adapter;
pub mod bridge;
pub mod call_config;
pub mod consumer;
pub mod policy;
pub mod telemetry;

pub use bridge::Bridge;
pub use telemetry::init_tracing;
