//! Request dispatch: one entrypoint per analysis operation.
//!
//! Per-request scalars override the engine defaults; everything else is
//! explicit parameter passing — no shared state between requests.

use crate::cluster;
use crate::config::Config;
use crate::epicurve;
use crate::error::EngineError;
use crate::moran;
use crate::normalize;
use crate::types::*;
use crate::weights;

/// Run one analysis request against the given default configuration.
pub fn run(
  request: &AnalysisRequest,
  defaults: &Config,
) -> Result<AnalysisResponse, EngineError> {
  match request {
    AnalysisRequest::Cluster {
      events,
      profiles,
      gap_threshold_days,
    } => {
      let mut config = defaults.clone();
      if let Some(gap) = gap_threshold_days {
        config.gap_threshold_days = *gap;
      }
      let events = normalize::normalize_events(events)?;
      let catalog = normalize::normalize_profiles(profiles)?;
      let clusters = cluster::cluster_events(&events, &catalog, &config)?;
      Ok(AnalysisResponse::Cluster { clusters })
    }

    AnalysisRequest::Epicurve { events, window_days } => {
      let mut config = defaults.clone();
      if let Some(window) = window_days {
        config.edr_window_days = *window;
      }
      let events = normalize::normalize_events(events)?;
      let daily_counts = epicurve::daily_counts(&events);
      let edr = epicurve::calculate_edr(&daily_counts, &config)?;
      Ok(AnalysisResponse::Epicurve { daily_counts, edr })
    }

    AnalysisRequest::Spatial {
      units,
      permutations,
      significance_threshold,
      seed,
    } => {
      let mut config = defaults.clone();
      if let Some(p) = permutations {
        config.permutations = *p;
      }
      if let Some(t) = significance_threshold {
        config.significance_threshold = *t;
      }
      if let Some(s) = seed {
        config.seed = *s;
      }
      let w = weights::build_contiguity_weights(units)?;
      let values: Vec<f64> = units.iter().map(|u| u.value).collect();
      let moran = moran::global_morans_i(&values, &w, &config)?;
      let lisa = moran::local_morans_i(&values, &w, &config)?;
      let islands = w
        .islands
        .iter()
        .map(|&i| w.unit_ids[i].clone())
        .collect();
      Ok(AnalysisResponse::Spatial {
        moran,
        lisa,
        islands,
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inbound(id: &str, date: &str) -> InboundEvent {
    InboundEvent {
      event_id: id.into(),
      reported_date: date.into(),
      disease_id: "measles".into(),
      location_id: "adm-1".into(),
      latitude: None,
      longitude: None,
      case_count: 1,
      death_count: 0,
    }
  }

  #[test]
  fn cluster_request_respects_gap_override() {
    let request = AnalysisRequest::Cluster {
      events: vec![inbound("a", "2025-01-01"), inbound("b", "2025-01-05")],
      profiles: Vec::new(),
      gap_threshold_days: Some(2),
    };
    let response = run(&request, &Config::default()).unwrap();
    match response {
      AnalysisResponse::Cluster { clusters } => assert_eq!(clusters.len(), 2),
      _ => panic!("wrong response op"),
    }
  }

  #[test]
  fn epicurve_request_aligns_series() {
    let request = AnalysisRequest::Epicurve {
      events: vec![inbound("a", "2025-01-01"), inbound("b", "2025-01-10")],
      window_days: Some(3),
    };
    let response = run(&request, &Config::default()).unwrap();
    match response {
      AnalysisResponse::Epicurve { daily_counts, edr } => {
        assert_eq!(daily_counts.len(), 10);
        assert_eq!(edr.points.len(), 10);
        assert_eq!(daily_counts.points[0].date, edr.points[0].date);
      }
      _ => panic!("wrong response op"),
    }
  }

  #[test]
  fn malformed_event_aborts_the_whole_request() {
    let request = AnalysisRequest::Cluster {
      events: vec![inbound("a", "2025-01-01"), inbound("b", "not-a-date")],
      profiles: Vec::new(),
      gap_threshold_days: None,
    };
    assert!(run(&request, &Config::default()).is_err());
  }
}
