//! Outbreak clustering via the day-gap heuristic, plus tracing-window
//! derivation from disease incubation profiles.

use chrono::{Duration, NaiveDate};

use crate::config::Config;
use crate::error::EngineError;
use crate::types::*;

/// Partition events into outbreak clusters.
///
/// Events are sorted defensively by (date, event id); a new cluster starts
/// wherever the day gap to the chronological predecessor exceeds
/// `gap_threshold_days`. Every input event lands in exactly one cluster;
/// cluster ids are sequential from 1. Empty input yields an empty set.
pub fn cluster_events(
  events: &[OutbreakEvent],
  catalog: &DiseaseCatalog,
  config: &Config,
) -> Result<Vec<OutbreakCluster>, EngineError> {
  config.validate()?;
  if events.is_empty() {
    return Ok(Vec::new());
  }

  let mut ordered: Vec<&OutbreakEvent> = events.iter().collect();
  ordered.sort_by(|a, b| {
    a.reported_date
      .cmp(&b.reported_date)
      .then_with(|| a.event_id.cmp(&b.event_id))
  });

  let mut groups: Vec<Vec<&OutbreakEvent>> = Vec::new();
  let mut current: Vec<&OutbreakEvent> = Vec::new();
  let mut prev_date: Option<NaiveDate> = None;
  for event in ordered {
    if let Some(prev) = prev_date {
      if (event.reported_date - prev).num_days() > config.gap_threshold_days {
        groups.push(std::mem::take(&mut current));
      }
    }
    prev_date = Some(event.reported_date);
    current.push(event);
  }
  groups.push(current);

  Ok(
    groups
      .iter()
      .enumerate()
      .map(|(idx, members)| build_cluster(idx as u32 + 1, members, catalog))
      .collect(),
  )
}

fn build_cluster(
  cluster_id: u32,
  members: &[&OutbreakEvent],
  catalog: &DiseaseCatalog,
) -> OutbreakCluster {
  let index_case_date = members[0].reported_date;
  let last_case_date = members[members.len() - 1].reported_date;
  let disease_id = members[0].disease_id.clone();
  let tracing = resolve_tracing(&disease_id, index_case_date, last_case_date, catalog);

  OutbreakCluster {
    cluster_id,
    event_ids: members.iter().map(|e| e.event_id.clone()).collect(),
    index_case_date,
    last_case_date,
    event_count: members.len(),
    total_cases: members.iter().map(|e| e.case_count).sum(),
    total_deaths: members.iter().map(|e| e.death_count).sum(),
    tracing,
    disease_id,
  }
}

/// Derive the investigation window for a cluster, or report why it cannot
/// be derived. Incubation bounds are never defaulted.
pub fn resolve_tracing(
  disease_id: &str,
  index_case_date: NaiveDate,
  last_case_date: NaiveDate,
  catalog: &DiseaseCatalog,
) -> Tracing {
  match catalog.incubation(disease_id) {
    Incubation::Known { min_days, max_days } => {
      // Checked subtraction: normalize_profiles caps the bounds, but a
      // hand-built catalog can still hold values that would push the
      // window outside the representable date range.
      let back_start = index_case_date.checked_sub_signed(Duration::days(max_days as i64));
      let back_end = index_case_date.checked_sub_signed(Duration::days(min_days as i64));
      match (back_start, back_end) {
        (Some(trace_back_start), Some(trace_back_end)) => Tracing::Available {
          window: TracingWindow {
            trace_back_start,
            trace_back_end,
            trace_forward_start: trace_back_start,
            trace_forward_end: last_case_date,
          },
        },
        _ => Tracing::Unavailable {
          reason: format!(
            "incubation bounds for disease '{}' exceed the representable date range",
            disease_id
          ),
        },
      }
    }
    Incubation::Unknown => Tracing::Unavailable {
      reason: format!(
        "no complete incubation profile for disease '{}'",
        disease_id
      ),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(d as i64 - 1)
  }

  fn event(id: &str, d: u32) -> OutbreakEvent {
    OutbreakEvent {
      event_id: id.into(),
      reported_date: day(d),
      disease_id: "measles".into(),
      location_id: "adm-1".into(),
      latitude: None,
      longitude: None,
      case_count: 1,
      death_count: 0,
    }
  }

  fn measles_catalog() -> DiseaseCatalog {
    let mut catalog = DiseaseCatalog::new();
    catalog.insert(
      "measles",
      Incubation::Known {
        min_days: 3,
        max_days: 14,
      },
    );
    catalog
  }

  #[test]
  fn empty_input_yields_empty_set() {
    let clusters =
      cluster_events(&[], &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert!(clusters.is_empty());
  }

  #[test]
  fn single_event_forms_singleton_cluster() {
    let events = vec![event("a", 5)];
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].cluster_id, 1);
    assert_eq!(clusters[0].event_ids, vec!["a"]);
    assert_eq!(clusters[0].index_case_date, day(5));
    assert_eq!(clusters[0].last_case_date, day(5));
  }

  #[test]
  fn gap_over_threshold_splits_clusters() {
    // Scenario A: days 1, 3, 20 with threshold 14 -> {1, 3} and {20}.
    let events = vec![event("a", 1), event("b", 3), event("c", 20)];
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].event_ids, vec!["a", "b"]);
    assert_eq!(clusters[1].event_ids, vec!["c"]);
    assert_eq!(clusters[1].cluster_id, 2);
  }

  #[test]
  fn gap_exactly_at_threshold_stays_together() {
    let events = vec![event("a", 1), event("b", 15)];
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert_eq!(clusters.len(), 1);
  }

  #[test]
  fn same_date_events_share_a_cluster() {
    let events = vec![event("a", 4), event("b", 4), event("c", 4)];
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].event_count, 3);
  }

  #[test]
  fn unsorted_input_is_sorted_defensively() {
    let events = vec![event("c", 20), event("a", 1), event("b", 3)];
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].event_ids, vec!["a", "b"]);
  }

  #[test]
  fn membership_partitions_the_input() {
    let events: Vec<OutbreakEvent> = [1u32, 2, 3, 30, 31, 60, 90, 91, 92]
      .iter()
      .enumerate()
      .map(|(i, &d)| event(&format!("e{}", i), d))
      .collect();
    let clusters =
      cluster_events(&events, &DiseaseCatalog::new(), &Config::default()).unwrap();

    let mut seen: Vec<String> = clusters
      .iter()
      .flat_map(|c| c.event_ids.iter().cloned())
      .collect();
    assert_eq!(seen.len(), events.len(), "no event dropped or duplicated");
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), events.len());

    // Intra-cluster consecutive member gaps <= threshold.
    let dates: std::collections::HashMap<&str, NaiveDate> = events
      .iter()
      .map(|e| (e.event_id.as_str(), e.reported_date))
      .collect();
    for cluster in &clusters {
      for pair in cluster.event_ids.windows(2) {
        let gap = (dates[pair[1].as_str()] - dates[pair[0].as_str()]).num_days();
        assert!(gap <= 14, "intra-cluster gap {} exceeds threshold", gap);
      }
    }

    // Inter-cluster boundary gaps > threshold.
    for pair in clusters.windows(2) {
      let gap = (pair[1].index_case_date - pair[0].last_case_date).num_days();
      assert!(gap > 14, "boundary gap {} should exceed threshold", gap);
    }
  }

  #[test]
  fn tracing_window_from_complete_profile() {
    // Scenario B: min=3, max=14, index day 20, last day 25.
    let tracing = resolve_tracing("measles", day(20), day(25), &measles_catalog());
    match tracing {
      Tracing::Available { window } => {
        assert_eq!(window.trace_back_start, day(6));
        assert_eq!(window.trace_back_end, day(17));
        assert_eq!(window.trace_forward_start, day(6));
        assert_eq!(window.trace_forward_end, day(25));
        assert!(window.trace_back_start <= window.trace_back_end);
        assert!(window.trace_back_end <= day(20));
      }
      Tracing::Unavailable { .. } => panic!("expected available tracing"),
    }
  }

  #[test]
  fn tracing_unavailable_without_profile() {
    let tracing = resolve_tracing("novel-x", day(20), day(25), &DiseaseCatalog::new());
    match tracing {
      Tracing::Unavailable { reason } => assert!(reason.contains("novel-x")),
      Tracing::Available { .. } => panic!("must not guess an incubation period"),
    }
  }

  #[test]
  fn overflowing_incubation_bounds_degrade_instead_of_panicking() {
    let mut catalog = DiseaseCatalog::new();
    catalog.insert(
      "bad-entry",
      Incubation::Known {
        min_days: 3,
        max_days: u32::MAX,
      },
    );
    let tracing = resolve_tracing("bad-entry", day(20), day(25), &catalog);
    match tracing {
      Tracing::Unavailable { reason } => assert!(reason.contains("bad-entry")),
      Tracing::Available { .. } => panic!("window outside the date range"),
    }
  }

  #[test]
  fn tracing_invariant_holds_for_clustered_events() {
    let events = vec![event("a", 20), event("b", 22), event("c", 25)];
    let clusters =
      cluster_events(&events, &measles_catalog(), &Config::default()).unwrap();
    for cluster in &clusters {
      if let Tracing::Available { window } = &cluster.tracing {
        assert!(window.trace_back_start <= window.trace_back_end);
        assert!(window.trace_back_end <= cluster.index_case_date);
        assert!(cluster.index_case_date <= cluster.last_case_date);
        assert_eq!(window.trace_forward_end, cluster.last_case_date);
      }
    }
  }

  #[test]
  fn negative_gap_threshold_is_a_config_error() {
    let config = Config {
      gap_threshold_days: -1,
      ..Config::default()
    };
    let err = cluster_events(&[event("a", 1)], &DiseaseCatalog::new(), &config).unwrap_err();
    assert!(err.to_string().contains("gap_threshold_days"));
  }
}
