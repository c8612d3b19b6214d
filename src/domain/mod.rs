/// Domain models for the application
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Monitored airport
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub code: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// Named sector of bearings from an airport
#[derive(Debug, Clone, PartialEq)]
pub struct WatchRegion {
    pub name: &'static str,
    pub bearing_start: f64,
    pub bearing_end: f64,
    pub destinations: &'static [&'static str],
    pub normal: bool,
}

/// Callsign prefix of a known charter operator
#[derive(Debug, Clone, PartialEq)]
pub struct CharterOperator {
    pub prefix: &'static str,
    pub name: &'static str,
}

/// Result of classifying a bearing against the watch regions
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMatch {
    pub name: String,
    pub destinations: Vec<String>,
    pub unusual: bool,
}

/// Feed query area in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

/// One aircraft state vector as returned by the feed
#[derive(Debug, Clone, PartialEq)]
pub struct RawState {
    pub icao24: String,
    pub callsign: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude_m: Option<f64>,
    pub velocity_ms: Option<f64>,
    pub heading: Option<f64>,
    pub vertrate: Option<f64>,
    pub on_ground: bool,
}

/// Enriched detection of one aircraft near one airport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub timestamp: DateTime<Utc>,
    pub airport_code: String,
    pub airport_name: String,
    pub icao24: String,
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: Option<f64>,
    pub velocity_ms: Option<f64>,
    pub heading: Option<f64>,
    pub vertrate: Option<f64>,
    pub on_ground: bool,
    pub distance_from_airport_km: f64,
    pub bearing_from_airport: f64,
    pub projected_region: String,
    pub potential_destinations: Vec<String>,
    pub unusual_destination: bool,
    pub is_charter_operator: bool,
    pub operator_name: Option<String>,
    pub unknown_callsign: bool,
    pub alerts: Vec<String>,
    pub is_alert: bool,
}

/// Longitudinal record of one airframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProfile {
    pub icao24: String,
    pub callsigns_seen: BTreeSet<String>,
    pub airports_visited: BTreeSet<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub total_detections: u64,
    pub is_charter: bool,
    pub operator: Option<String>,
}

impl AircraftProfile {
    /// New profile seeded from the first sighting. Counters start at zero,
    /// `record` is expected to be applied to the same detection afterwards.
    pub fn first_sighting(d: &Detection) -> Self {
        Self {
            icao24: d.icao24.clone(),
            callsigns_seen: BTreeSet::new(),
            airports_visited: BTreeSet::new(),
            first_seen: d.timestamp,
            last_seen: d.timestamp,
            total_detections: 0,
            is_charter: d.is_charter_operator,
            operator: d.operator_name.clone(),
        }
    }

    /// Fold one detection into the profile. Charter fields are left alone.
    pub fn record(&mut self, d: &Detection) {
        self.callsigns_seen.insert(d.callsign.clone());
        self.airports_visited.insert(d.airport_code.clone());
        self.last_seen = self.last_seen.max(d.timestamp);
        self.total_detections += 1;
    }
}

/// Persisted aircraft database keyed by icao24
pub type AircraftDatabase = BTreeMap<String, AircraftProfile>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapKind {
    Landing,
    Takeoff,
}

/// Possible landing or takeoff inferred from a detection gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEvent {
    pub kind: GapKind,
    pub icao: String,
    pub callsign: String,
    pub airport: String,
    pub timestamp: DateTime<Utc>,
    pub gap_hours: f64,
    pub distance_km: f64,
    pub altitude_m: Option<f64>,
}

/// Landing and takeoff candidates of one gap run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub possible_landings: Vec<GapEvent>,
    pub possible_takeoffs: Vec<GapEvent>,
}

/// Daily gap summary blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: DateTime<Utc>,
    pub possible_landings: Vec<GapEvent>,
    pub possible_takeoffs: Vec<GapEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn detection(callsign: &str, airport: &str, hour: u32) -> Detection {
        Detection {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            airport_code: airport.to_string(),
            airport_name: "Test Field".to_string(),
            icao24: "a1b2c3".to_string(),
            callsign: callsign.to_string(),
            latitude: 30.0,
            longitude: -100.0,
            altitude_m: Some(500.0),
            velocity_ms: None,
            heading: None,
            vertrate: None,
            on_ground: false,
            distance_from_airport_km: 1.0,
            bearing_from_airport: 10.0,
            projected_region: "UNKNOWN".to_string(),
            potential_destinations: vec![],
            unusual_destination: false,
            is_charter_operator: false,
            operator_name: None,
            unknown_callsign: false,
            alerts: vec![],
            is_alert: false,
        }
    }

    #[test]
    fn test_profile_record_keeps_last_seen_monotonic() {
        let later = detection("SWQ100", "SAT", 12);
        let earlier = detection("SWQ100", "SAT", 8);
        let mut profile = AircraftProfile::first_sighting(&later);
        profile.record(&later);
        profile.record(&earlier);
        assert_eq!(profile.last_seen, later.timestamp);
        assert!(profile.last_seen >= profile.first_seen);
        assert_eq!(profile.total_detections, 2);
    }

    #[test]
    fn test_profile_sets_serialize_sorted() {
        let mut profile = AircraftProfile::first_sighting(&detection("ZZZ1", "TUS", 1));
        profile.record(&detection("ZZZ1", "TUS", 1));
        profile.record(&detection("AAA1", "AEX", 2));
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["callsigns_seen"], serde_json::json!(["AAA1", "ZZZ1"]));
        assert_eq!(json["airports_visited"], serde_json::json!(["AEX", "TUS"]));
    }
}
