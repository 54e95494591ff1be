//! Engine configuration with sane defaults.

use crate::error::EngineError;

/// Tunable scalars for the analytics engines.
#[derive(Debug, Clone)]
pub struct Config {
  /// Max day gap between consecutive events within one outbreak cluster.
  pub gap_threshold_days: i64,
  /// Trailing window size (days) for the EDR rolling sums.
  pub edr_window_days: usize,
  /// Permutation count for Moran / LISA significance testing.
  pub permutations: usize,
  /// Pseudo p-value threshold below which a LISA unit is significant.
  pub significance_threshold: f64,
  /// Seed for all permutation randomness; identical seeds reproduce
  /// identical p-values.
  pub seed: u64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      gap_threshold_days: 14,
      edr_window_days: 7,
      permutations: 1999,
      significance_threshold: 0.05,
      seed: 0,
    }
  }
}

impl Config {
  /// Reject configurations the engines cannot honor.
  pub fn validate(&self) -> Result<(), EngineError> {
    if self.gap_threshold_days < 0 {
      return Err(EngineError::config("gap_threshold_days must be >= 0"));
    }
    if self.edr_window_days == 0 {
      return Err(EngineError::config("edr_window_days must be >= 1"));
    }
    if self.permutations == 0 {
      return Err(EngineError::config(
        "permutations must be >= 1 when a p-value is requested",
      ));
    }
    if !(self.significance_threshold > 0.0 && self.significance_threshold < 1.0) {
      return Err(EngineError::config(
        "significance_threshold must be in (0, 1)",
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    assert!(Config::default().validate().is_ok());
  }

  #[test]
  fn rejects_negative_gap() {
    let config = Config {
      gap_threshold_days: -1,
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_zero_window() {
    let config = Config {
      edr_window_days: 0,
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_zero_permutations() {
    let config = Config {
      permutations: 0,
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn rejects_out_of_range_threshold() {
    for bad in [0.0, 1.0, -0.05, 1.5] {
      let config = Config {
        significance_threshold: bad,
        ..Config::default()
      };
      assert!(config.validate().is_err(), "threshold {} should fail", bad);
    }
  }
}
