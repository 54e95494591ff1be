//! Normalize inbound records into canonical internal models.
//!
//! Validation fails fast on the first malformed record; nothing is
//! partially processed.

use chrono::NaiveDate;

use crate::error::EngineError;
use crate::types::*;

/// Upper bound on incubation-period days the engine accepts. Ten years
/// covers every known disease with margin; anything larger is a data-entry
/// error and would push tracing windows outside the representable date
/// range.
pub const MAX_INCUBATION_DAYS: u32 = 3650;

/// Parse and validate a single inbound event.
pub fn normalize_event(raw: &InboundEvent) -> Result<OutbreakEvent, EngineError> {
  let reported_date = parse_date(&raw.reported_date, "reported_date")?;

  if raw.event_id.is_empty() {
    return Err(EngineError::validation("event_id", "must not be empty"));
  }
  if raw.disease_id.is_empty() {
    return Err(EngineError::validation("disease_id", "must not be empty"));
  }
  if raw.location_id.is_empty() {
    return Err(EngineError::validation("location_id", "must not be empty"));
  }

  if let Some(lat) = raw.latitude {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
      return Err(EngineError::validation("latitude", "must be in [-90, 90]"));
    }
  }
  if let Some(lon) = raw.longitude {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
      return Err(EngineError::validation("longitude", "must be in [-180, 180]"));
    }
  }

  Ok(OutbreakEvent {
    event_id: raw.event_id.clone(),
    reported_date,
    disease_id: raw.disease_id.clone(),
    location_id: raw.location_id.clone(),
    latitude: raw.latitude,
    longitude: raw.longitude,
    case_count: raw.case_count,
    death_count: raw.death_count,
  })
}

/// Normalize a whole event collection. An empty collection is allowed —
/// the engines treat it as an empty result, not an error.
pub fn normalize_events(raw: &[InboundEvent]) -> Result<Vec<OutbreakEvent>, EngineError> {
  raw.iter().map(normalize_event).collect()
}

/// Build the disease catalog from knowledge-base rows.
///
/// A profile with both bounds present and `max >= min` becomes
/// `Incubation::Known`; a profile missing either bound becomes `Unknown`
/// (a legitimate data gap, not an error). Inverted bounds and duplicate
/// disease ids are rejected.
pub fn normalize_profiles(
  raw: &[InboundDiseaseProfile],
) -> Result<DiseaseCatalog, EngineError> {
  let mut catalog = DiseaseCatalog::new();
  for profile in raw {
    if profile.disease_id.is_empty() {
      return Err(EngineError::validation("disease_id", "must not be empty"));
    }
    if catalog.contains(&profile.disease_id) {
      return Err(EngineError::validation(
        "disease_id",
        &format!("duplicate profile for '{}'", profile.disease_id),
      ));
    }
    let incubation = match (profile.incubation_min_days, profile.incubation_max_days) {
      (Some(min_days), Some(max_days)) => {
        if max_days > MAX_INCUBATION_DAYS {
          return Err(EngineError::validation(
            "incubation_max_days",
            &format!(
              "must be <= {} days ({} for '{}')",
              MAX_INCUBATION_DAYS, max_days, profile.disease_id
            ),
          ));
        }
        if max_days < min_days {
          return Err(EngineError::validation(
            "incubation_max_days",
            &format!(
              "must be >= incubation_min_days ({} < {}) for '{}'",
              max_days, min_days, profile.disease_id
            ),
          ));
        }
        Incubation::Known { min_days, max_days }
      }
      _ => Incubation::Unknown,
    };
    catalog.insert(profile.disease_id.clone(), incubation);
  }
  Ok(catalog)
}

fn parse_date(s: &str, field: &str) -> Result<NaiveDate, EngineError> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| EngineError::validation(field, &format!("invalid YYYY-MM-DD date: {}", e)))
}
