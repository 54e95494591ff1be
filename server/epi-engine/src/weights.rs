//! Contiguity spatial weights: shared-boundary-vertex neighbor detection
//! with row standardization.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::types::{SpatialUnit, SpatialWeights};

/// Absolute per-coordinate tolerance when comparing boundary vertices.
/// Administrative boundary files digitize shared borders with identical
/// vertex coordinates, so a tight tolerance is enough.
pub const VERTEX_TOLERANCE: f64 = 1e-9;

/// Build row-standardized queen-style contiguity weights.
///
/// Two units are neighbors iff their boundary rings share at least one
/// vertex (within [`VERTEX_TOLERANCE`]). Each neighbor weight is `1/k` for
/// a unit with `k` neighbors, so every non-island row sums to 1. Units with
/// zero neighbors get an all-zero row and are listed in `islands` — a
/// warning condition the caller must surface, not an error.
pub fn build_contiguity_weights(
  units: &[SpatialUnit],
) -> Result<SpatialWeights, EngineError> {
  let mut seen: HashSet<&str> = HashSet::new();
  for unit in units {
    if unit.unit_id.is_empty() {
      return Err(EngineError::validation("unit_id", "must not be empty"));
    }
    if !seen.insert(&unit.unit_id) {
      return Err(EngineError::validation(
        "unit_id",
        &format!("duplicate unit '{}'", unit.unit_id),
      ));
    }
    if unit.polygon.len() < 3 {
      return Err(EngineError::validation(
        "polygon",
        &format!("unit '{}' needs at least 3 vertices", unit.unit_id),
      ));
    }
    if unit
      .polygon
      .iter()
      .any(|v| !v[0].is_finite() || !v[1].is_finite())
    {
      return Err(EngineError::validation(
        "polygon",
        &format!("unit '{}' has a non-finite vertex", unit.unit_id),
      ));
    }
  }

  let n = units.len();
  let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
  for i in 0..n {
    for j in (i + 1)..n {
      if touches(&units[i].polygon, &units[j].polygon) {
        neighbors[i].push(j);
        neighbors[j].push(i);
      }
    }
  }

  let weights: Vec<Vec<f64>> = neighbors
    .iter()
    .map(|row| {
      if row.is_empty() {
        Vec::new()
      } else {
        vec![1.0 / row.len() as f64; row.len()]
      }
    })
    .collect();

  let islands: Vec<usize> = (0..n).filter(|&i| neighbors[i].is_empty()).collect();

  Ok(SpatialWeights {
    unit_ids: units.iter().map(|u| u.unit_id.clone()).collect(),
    neighbors,
    weights,
    islands,
  })
}

/// Queen-style contiguity test: any vertex of one ring within tolerance of
/// any vertex of the other.
fn touches(a: &[[f64; 2]], b: &[[f64; 2]]) -> bool {
  a.iter().any(|p| {
    b.iter().any(|q| {
      (p[0] - q[0]).abs() <= VERTEX_TOLERANCE && (p[1] - q[1]).abs() <= VERTEX_TOLERANCE
    })
  })
}

/// Unit squares on an integer grid, row-major. Test helper shared with the
/// moran module.
#[cfg(test)]
pub fn grid_units(rows: usize, cols: usize, values: &[f64]) -> Vec<SpatialUnit> {
  let mut units = Vec::with_capacity(rows * cols);
  for r in 0..rows {
    for c in 0..cols {
      let (x, y) = (c as f64, r as f64);
      units.push(SpatialUnit {
        unit_id: format!("u{}-{}", r, c),
        polygon: vec![
          [x, y],
          [x + 1.0, y],
          [x + 1.0, y + 1.0],
          [x, y + 1.0],
        ],
        value: values[r * cols + c],
      });
    }
  }
  units
}
