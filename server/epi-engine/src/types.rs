//! Core types for the epi engine (JSON contracts + internal models).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what the caller sends)
// ---------------------------------------------------------------------------

/// One disease-event report from the ingestion layer. Unknown fields are
/// silently ignored; dates arrive as "YYYY-MM-DD" strings and are validated
/// during normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
  pub event_id: String,
  pub reported_date: String,
  pub disease_id: String,
  pub location_id: String,
  #[serde(default)]
  pub latitude: Option<f64>,
  #[serde(default)]
  pub longitude: Option<f64>,
  #[serde(default)]
  pub case_count: u64,
  #[serde(default)]
  pub death_count: u64,
}

/// Disease knowledge-base row. Either incubation bound may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundDiseaseProfile {
  pub disease_id: String,
  #[serde(default)]
  pub incubation_min_days: Option<u32>,
  #[serde(default)]
  pub incubation_max_days: Option<u32>,
}

/// Geographic unit carrying the attribute value under test (e.g. outbreak
/// count aggregated onto the unit by an upstream step).
#[derive(Debug, Clone, Deserialize)]
pub struct SpatialUnit {
  pub unit_id: String,
  /// Boundary ring as [x, y] vertices. Opaque to the engine beyond
  /// shared-vertex adjacency testing.
  pub polygon: Vec<[f64; 2]>,
  pub value: f64,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Canonical event after validation (date parsed, required ids non-empty).
/// Read-only to every engine.
#[derive(Debug, Clone)]
pub struct OutbreakEvent {
  pub event_id: String,
  pub reported_date: NaiveDate,
  pub disease_id: String,
  pub location_id: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub case_count: u64,
  pub death_count: u64,
}

/// Incubation-period bounds for one disease. `Unknown` when the knowledge
/// base is missing either bound; tracing is then reported as unavailable,
/// never computed from a guessed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incubation {
  Known { min_days: u32, max_days: u32 },
  Unknown,
}

/// Disease-knowledge lookup: disease id -> incubation bounds.
#[derive(Debug, Clone, Default)]
pub struct DiseaseCatalog {
  profiles: HashMap<String, Incubation>,
}

impl DiseaseCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, disease_id: impl Into<String>, incubation: Incubation) {
    self.profiles.insert(disease_id.into(), incubation);
  }

  /// Diseases absent from the catalog behave as `Unknown`.
  pub fn incubation(&self, disease_id: &str) -> Incubation {
    self
      .profiles
      .get(disease_id)
      .copied()
      .unwrap_or(Incubation::Unknown)
  }

  pub fn contains(&self, disease_id: &str) -> bool {
    self.profiles.contains_key(disease_id)
  }
}

// ---------------------------------------------------------------------------
// Cluster output types
// ---------------------------------------------------------------------------

/// Trace-back / trace-forward investigation window for a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TracingWindow {
  pub trace_back_start: NaiveDate,
  pub trace_back_end: NaiveDate,
  pub trace_forward_start: NaiveDate,
  pub trace_forward_end: NaiveDate,
}

/// Tracing outcome per cluster. `Unavailable` is the explicit degraded
/// marker for diseases without a complete incubation profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Tracing {
  Available { window: TracingWindow },
  Unavailable { reason: String },
}

/// One outbreak cluster derived from the gap heuristic. Recomputed in full
/// whenever the input event set changes.
#[derive(Debug, Clone, Serialize)]
pub struct OutbreakCluster {
  /// Sequential id, starting at 1, in chronological cluster order.
  pub cluster_id: u32,
  /// Disease of the index case (clusters are assumed single-disease;
  /// mixed-disease input is an upstream validation concern).
  pub disease_id: String,
  /// Member event ids in chronological order.
  pub event_ids: Vec<String>,
  pub index_case_date: NaiveDate,
  pub last_case_date: NaiveDate,
  pub event_count: usize,
  pub total_cases: u64,
  pub total_deaths: u64,
  pub tracing: Tracing,
}

// ---------------------------------------------------------------------------
// Epidemic-curve output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
  pub date: NaiveDate,
  pub count: u64,
}

/// Contiguous daily event counts from the earliest to the latest reported
/// date, zero-filled. Empty input produces an empty series.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyCountSeries {
  pub points: Vec<DailyCount>,
}

impl DailyCountSeries {
  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Total events across the series (equals the input event count).
  pub fn total(&self) -> u64 {
    self.points.iter().map(|p| p.count).sum()
  }
}

/// One EDR point. `partial` marks the leading `2w - 1` points where one or
/// both rolling windows are not yet fully populated — degraded confidence,
/// not equal footing with the rest of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdrPoint {
  pub date: NaiveDate,
  pub edr: f64,
  pub partial: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EdrSeries {
  pub points: Vec<EdrPoint>,
}

// ---------------------------------------------------------------------------
// Spatial weights
// ---------------------------------------------------------------------------

/// Row-standardized contiguity weights over a fixed unit ordering. Shared
/// read-only input to both the global and local statistics.
#[derive(Debug, Clone)]
pub struct SpatialWeights {
  /// Unit ids in input order; all index fields refer to this ordering.
  pub unit_ids: Vec<String>,
  /// Neighbor indices per unit.
  pub neighbors: Vec<Vec<usize>>,
  /// Row-standardized weights, parallel to `neighbors` (each 1/k).
  pub weights: Vec<Vec<f64>>,
  /// Indices of zero-neighbor units (all-zero weight rows). A warning
  /// condition for callers, not an error.
  pub islands: Vec<usize>,
}

impl SpatialWeights {
  pub fn n(&self) -> usize {
    self.unit_ids.len()
  }

  /// Sum of all weights (S0). With row standardization this is the number
  /// of non-island units.
  pub fn s0(&self) -> f64 {
    self.weights.iter().map(|row| row.iter().sum::<f64>()).sum()
  }

  /// Spatial lag: per-unit weighted average of neighbor values. Islands get
  /// a lag of 0.
  pub fn lag(&self, values: &[f64]) -> Vec<f64> {
    (0..self.n())
      .map(|i| {
        self.neighbors[i]
          .iter()
          .zip(&self.weights[i])
          .map(|(&j, w)| w * values[j])
          .sum()
      })
      .collect()
  }
}

// ---------------------------------------------------------------------------
// Spatial statistics output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MoranResult {
  pub global_i: f64,
  /// Expectation under the null, -1 / (n - 1).
  pub expected_i: f64,
  pub p_value_sim: f64,
  pub permutations: usize,
}

/// LISA quadrant from the signs of (own deviation, neighbor-lag deviation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
  HighHigh,
  LowLow,
  HighLow,
  LowHigh,
}

#[derive(Debug, Clone, Serialize)]
pub struct LisaResult {
  pub unit_id: String,
  pub local_i: f64,
  /// Retained for reference even when not significant; callers must not
  /// present a non-significant quadrant as a validated cluster.
  pub quadrant: Quadrant,
  pub p_value_sim: f64,
  pub is_significant: bool,
  pub is_island: bool,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One inbound request line from stdin.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AnalysisRequest {
  Cluster {
    events: Vec<InboundEvent>,
    #[serde(default)]
    profiles: Vec<InboundDiseaseProfile>,
    #[serde(default)]
    gap_threshold_days: Option<i64>,
  },
  Epicurve {
    events: Vec<InboundEvent>,
    #[serde(default)]
    window_days: Option<usize>,
  },
  Spatial {
    units: Vec<SpatialUnit>,
    #[serde(default)]
    permutations: Option<usize>,
    #[serde(default)]
    significance_threshold: Option<f64>,
    #[serde(default)]
    seed: Option<u64>,
  },
}

/// One outbound result line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AnalysisResponse {
  Cluster {
    clusters: Vec<OutbreakCluster>,
  },
  Epicurve {
    daily_counts: DailyCountSeries,
    edr: EdrSeries,
  },
  Spatial {
    moran: MoranResult,
    lisa: Vec<LisaResult>,
    /// Unit ids with zero contiguity neighbors.
    islands: Vec<String>,
  },
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
