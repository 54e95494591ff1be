//! Epidemiological Analytics Engine — deterministic, rule-based.
//!
//! Turns a time-stamped, geo-located stream of disease-event reports into
//! outbreak clusters with trace-back/trace-forward windows, epidemic curves
//! with the EDR growth indicator, and permutation-validated spatial
//! hotspot/cold-spot classification (Global/Local Moran's I).
//!
//! No DB, no network; pure computation over fully materialized in-memory
//! inputs. All randomness is derived from an explicit seed.

pub mod cluster;
pub mod config;
pub mod engine;
pub mod epicurve;
pub mod error;
pub mod moran;
pub mod normalize;
pub mod types;
pub mod weights;

pub use config::Config;
pub use error::EngineError;
pub use types::{AnalysisRequest, AnalysisResponse};
