/// Heuristics applied to every detection: region, operator and alert tags
use crate::domain::{CharterOperator, Detection, RegionMatch, WatchRegion};

pub const UNKNOWN_REGION: &str = "UNKNOWN";
pub const UNKNOWN_CALLSIGN: &str = "Unknown";

const VERY_CLOSE_KM: f64 = 2.0;
const NEAR_KM: f64 = 5.0;
const DESCENT_RATE_MS: f64 = -2.0;

/// First region (in declaration order) whose inclusive bearing range holds `bearing`
pub fn classify_region(bearing: f64, regions: &[WatchRegion]) -> RegionMatch {
    regions
        .iter()
        .find(|r| r.bearing_start <= bearing && bearing <= r.bearing_end)
        .map(|r| RegionMatch {
            name: r.name.to_string(),
            destinations: r.destinations.iter().map(|d| d.to_string()).collect(),
            unusual: !r.normal,
        })
        .unwrap_or_else(|| RegionMatch {
            name: UNKNOWN_REGION.to_string(),
            destinations: Vec::new(),
            unusual: false,
        })
}

/// Operator name for a callsign by case-insensitive prefix, first match wins.
///
/// `_icao24` is accepted so airframe-based matching can be added without
/// touching callers.
pub fn match_operator<'a>(
    callsign: &str,
    _icao24: &str,
    operators: &'a [CharterOperator],
) -> Option<&'a str> {
    let upper = callsign.to_uppercase();
    operators
        .iter()
        .find(|op| upper.starts_with(op.prefix))
        .map(|op| op.name)
}

/// Blank or placeholder callsign
pub fn is_unknown_callsign(callsign: &str) -> bool {
    matches!(callsign, "" | UNKNOWN_CALLSIGN | "N/A")
}

/// Alert tags for a detection, in fixed evaluation order. The `alerts` and
/// `is_alert` fields of the input are ignored.
pub fn evaluate_alerts(d: &Detection) -> Vec<String> {
    let mut alerts = Vec::new();
    let dist = d.distance_from_airport_km;
    let charter = d.is_charter_operator;

    if charter {
        let name = d.operator_name.as_deref().unwrap_or_default();
        alerts.push(format!("CHARTER_OPERATOR:{}", name));
    }

    if d.unknown_callsign {
        alerts.push("UNKNOWN_CALLSIGN".to_string());
    }

    if d.unusual_destination {
        alerts.push(format!("UNUSUAL_DESTINATION:{}", d.projected_region));
    }

    if dist < VERY_CLOSE_KM {
        alerts.push("VERY_CLOSE_TO_AIRPORT".to_string());
    }

    if d.vertrate.is_some_and(|v| v < DESCENT_RATE_MS) && dist < NEAR_KM {
        alerts.push("DESCENDING_NEAR_AIRPORT".to_string());
    }

    if charter && d.unusual_destination && dist < NEAR_KM {
        alerts.push("HIGH_PRIORITY:Charter+Unusual_Destination".to_string());
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHARTER_OPERATORS, WATCH_REGIONS};
    use chrono::Utc;

    fn detection(distance_km: f64) -> Detection {
        Detection {
            timestamp: Utc::now(),
            airport_code: "SAT".to_string(),
            airport_name: "San Antonio International".to_string(),
            icao24: "a1b2c3".to_string(),
            callsign: UNKNOWN_CALLSIGN.to_string(),
            latitude: 29.54,
            longitude: -98.47,
            altitude_m: Some(500.0),
            velocity_ms: Some(70.0),
            heading: Some(180.0),
            vertrate: None,
            on_ground: false,
            distance_from_airport_km: distance_km,
            bearing_from_airport: 180.0,
            projected_region: "MEXICO_CENTRAL_AMERICA".to_string(),
            potential_destinations: vec![],
            unusual_destination: false,
            is_charter_operator: false,
            operator_name: None,
            unknown_callsign: true,
            alerts: vec![],
            is_alert: false,
        }
    }

    #[test]
    fn test_classify_region_overlap_first_declared_wins() {
        // 75 deg lies in AFRICA_EAST, AFRICA_WEST and MIDDLE_EAST; declaration order decides
        let m = classify_region(75.0, WATCH_REGIONS);
        assert_eq!(m.name, "AFRICA_EAST");
        assert!(m.unusual);
        assert_eq!(m.destinations[0], "Eritrea");

        let reordered: Vec<WatchRegion> = WATCH_REGIONS.iter().rev().cloned().collect();
        assert_eq!(classify_region(75.0, &reordered).name, "MIDDLE_EAST");
    }

    #[test]
    fn test_classify_region_bounds_inclusive() {
        assert_eq!(classify_region(15.0, WATCH_REGIONS).name, "SOUTH_ASIA");
        assert_eq!(classify_region(210.0, WATCH_REGIONS).name, "MEXICO_CENTRAL_AMERICA");
        // 120 < 121 <= 135
        let carib = classify_region(121.0, WATCH_REGIONS);
        assert_eq!(carib.name, "CARIBBEAN");
        assert!(!carib.unusual);
    }

    #[test]
    fn test_classify_region_no_match_is_unknown() {
        let m = classify_region(300.0, WATCH_REGIONS);
        assert_eq!(m.name, UNKNOWN_REGION);
        assert!(m.destinations.is_empty());
        assert!(!m.unusual);
    }

    #[test]
    fn test_classify_region_deterministic() {
        for b in [0.0, 44.9, 45.0, 90.0, 135.0, 359.9] {
            assert_eq!(classify_region(b, WATCH_REGIONS), classify_region(b, WATCH_REGIONS));
        }
    }

    #[test]
    fn test_match_operator_case_insensitive_prefix() {
        assert_eq!(match_operator("swq3021", "abc123", CHARTER_OPERATORS), Some("Swift Air"));
        assert_eq!(match_operator("N167HQ", "abc123", CHARTER_OPERATORS), Some("Known ICE Aircraft"));
        assert_eq!(match_operator("AAL100", "abc123", CHARTER_OPERATORS), None);
        assert_eq!(match_operator("", "abc123", CHARTER_OPERATORS), None);
    }

    #[test]
    fn test_match_operator_first_match_wins() {
        let ops = [
            CharterOperator { prefix: "SW", name: "Broad" },
            CharterOperator { prefix: "SWQ", name: "Narrow" },
        ];
        assert_eq!(match_operator("SWQ1", "x", &ops), Some("Broad"));
    }

    #[test]
    fn test_is_unknown_callsign() {
        assert!(is_unknown_callsign(""));
        assert!(is_unknown_callsign("Unknown"));
        assert!(is_unknown_callsign("N/A"));
        assert!(!is_unknown_callsign("SWQ3021"));
    }

    #[test]
    fn test_alerts_unknown_callsign_very_close() {
        let d = detection(1.5);
        let alerts = evaluate_alerts(&d);
        assert_eq!(alerts, vec!["UNKNOWN_CALLSIGN", "VERY_CLOSE_TO_AIRPORT"]);
        assert!(!alerts.is_empty());
    }

    #[test]
    fn test_alerts_charter_unusual_high_priority() {
        let mut d = detection(3.0);
        d.callsign = "SWQ3021".to_string();
        d.unknown_callsign = false;
        d.is_charter_operator = true;
        d.operator_name = Some("Swift Air".to_string());
        d.projected_region = "AFRICA_EAST".to_string();
        d.unusual_destination = true;

        let alerts = evaluate_alerts(&d);
        assert_eq!(
            alerts,
            vec![
                "CHARTER_OPERATOR:Swift Air",
                "UNUSUAL_DESTINATION:AFRICA_EAST",
                "HIGH_PRIORITY:Charter+Unusual_Destination",
            ]
        );
    }

    #[test]
    fn test_alerts_high_priority_requires_proximity() {
        let mut d = detection(6.0);
        d.unknown_callsign = false;
        d.is_charter_operator = true;
        d.operator_name = Some("Swift Air".to_string());
        d.projected_region = "AFRICA_EAST".to_string();
        d.unusual_destination = true;

        let alerts = evaluate_alerts(&d);
        assert!(!alerts.iter().any(|a| a.starts_with("HIGH_PRIORITY")));
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn test_alerts_descending_near_airport() {
        let mut d = detection(4.0);
        d.unknown_callsign = false;
        d.vertrate = Some(-3.5);
        assert_eq!(evaluate_alerts(&d), vec!["DESCENDING_NEAR_AIRPORT"]);

        d.vertrate = Some(-2.0);
        assert!(evaluate_alerts(&d).is_empty());

        d.vertrate = None;
        assert!(evaluate_alerts(&d).is_empty());
    }
}
