/// Business logic services layer
use crate::clients::StateFeed;
use crate::config::{GapSettings, MonitorSettings, Watchlist};
use crate::domain::{
    AircraftDatabase, AircraftProfile, Airport, DailySummary, Detection, GapEvent, GapKind,
    GapReport, RawState,
};
use crate::errors::{AppError, AppResult};
use crate::geo::{bearing, bounding_box, distance_km};
use crate::repo::{AircraftRepo, DetectionRepo, SummaryRepo};
use crate::rules::{classify_region, evaluate_alerts, is_unknown_callsign, match_operator};
use crate::utils::{month_stamp, months_in_window};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ALERTS_TO_REPORT: usize = 10;

/// Turn one raw state seen from `airport` into a detection with alert tags
pub fn enrich_state(
    airport: &Airport,
    state: &RawState,
    captured_at: DateTime<Utc>,
    watchlist: &Watchlist,
) -> AppResult<Detection> {
    let (lat, lon) = match (state.latitude, state.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(AppError::MalformedRecord(format!(
                "{} has no position",
                state.icao24
            )))
        }
    };

    let dist = distance_km(airport.lat, airport.lon, lat, lon);
    let brg = bearing(airport.lat, airport.lon, lat, lon);
    let region = classify_region(brg, &watchlist.regions);
    let operator = match_operator(&state.callsign, &state.icao24, &watchlist.operators);

    let mut detection = Detection {
        timestamp: captured_at,
        airport_code: airport.code.to_string(),
        airport_name: airport.name.to_string(),
        icao24: state.icao24.clone(),
        callsign: state.callsign.clone(),
        latitude: lat,
        longitude: lon,
        altitude_m: state.altitude_m,
        velocity_ms: state.velocity_ms,
        heading: state.heading,
        vertrate: state.vertrate,
        on_ground: state.on_ground,
        distance_from_airport_km: dist,
        bearing_from_airport: brg,
        projected_region: region.name,
        potential_destinations: region.destinations,
        unusual_destination: region.unusual,
        is_charter_operator: operator.is_some(),
        operator_name: operator.map(str::to_string),
        unknown_callsign: is_unknown_callsign(&state.callsign),
        alerts: Vec::new(),
        is_alert: false,
    };
    detection.alerts = evaluate_alerts(&detection);
    detection.is_alert = !detection.alerts.is_empty();
    Ok(detection)
}

/// Query the feed around every airport and enrich what comes back.
///
/// A failing airport is logged and skipped. An aircraft inside two boxes
/// yields one detection per airport.
pub async fn collect_detections(
    feed: &dyn StateFeed,
    watchlist: &Watchlist,
    settings: &MonitorSettings,
    captured_at: DateTime<Utc>,
) -> Vec<Detection> {
    let mut detections = Vec::new();

    for airport in &watchlist.airports {
        let bbox = bounding_box(airport.lat, airport.lon, settings.radius_km);
        let states = match feed.fetch_states(&bbox).await {
            Ok(states) => states,
            Err(e) => {
                warn!("Error querying {}: {}", airport.code, e);
                continue;
            }
        };

        for state in &states {
            if state
                .altitude_m
                .is_some_and(|alt| alt > settings.altitude_threshold_m)
            {
                continue;
            }
            match enrich_state(airport, state, captured_at, watchlist) {
                Ok(d) => detections.push(d),
                Err(e) => debug!("skipping state near {}: {}", airport.code, e),
            }
        }
    }

    detections
}

/// Fold detections into the aircraft database. Charter status is taken from
/// the first sighting only.
pub fn merge_into_database(db: &mut AircraftDatabase, detections: &[Detection]) {
    for d in detections {
        db.entry(d.icao24.clone())
            .or_insert_with(|| AircraftProfile::first_sighting(d))
            .record(d);
    }
}

/// Scan each airframe's time-ordered detections for gaps longer than
/// `min_gap_minutes` that start or end close to and low over an airport
pub fn infer_gaps(detections: &[Detection], criteria: &GapSettings) -> GapReport {
    let mut by_aircraft: BTreeMap<&str, Vec<&Detection>> = BTreeMap::new();
    for d in detections {
        by_aircraft.entry(d.icao24.as_str()).or_default().push(d);
    }

    let near_and_low = |d: &Detection| {
        d.distance_from_airport_km < criteria.near_km
            && d.altitude_m.is_some_and(|alt| alt < criteria.low_altitude_m)
    };

    let mut report = GapReport::default();
    for (icao, mut track) in by_aircraft {
        track.sort_by_key(|d| d.timestamp);

        for pair in track.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let gap_minutes = (curr.timestamp - prev.timestamp).num_milliseconds() as f64 / 60_000.0;
            if gap_minutes <= criteria.min_gap_minutes {
                continue;
            }

            if near_and_low(curr) {
                report
                    .possible_takeoffs
                    .push(gap_event(GapKind::Takeoff, icao, curr, gap_minutes));
            }
            if near_and_low(prev) {
                report
                    .possible_landings
                    .push(gap_event(GapKind::Landing, icao, prev, gap_minutes));
            }
        }
    }
    report
}

fn gap_event(kind: GapKind, icao: &str, at: &Detection, gap_minutes: f64) -> GapEvent {
    GapEvent {
        kind,
        icao: icao.to_string(),
        callsign: at.callsign.clone(),
        airport: at.airport_code.clone(),
        timestamp: at.timestamp,
        gap_hours: gap_minutes / 60.0,
        distance_km: at.distance_from_airport_km,
        altitude_m: at.altitude_m,
    }
}

/// Counts reported after a polling cycle
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleStats {
    pub detections: usize,
    pub alerts: usize,
    pub charter: usize,
    pub unknown_callsign: usize,
    pub unusual_destination: usize,
}

impl CycleStats {
    fn of(detections: &[Detection]) -> Self {
        let count = |f: fn(&Detection) -> bool| detections.iter().filter(|d| f(d)).count();
        Self {
            detections: detections.len(),
            alerts: count(|d| d.is_alert),
            charter: count(|d| d.is_charter_operator),
            unknown_callsign: count(|d| d.unknown_callsign),
            unusual_destination: count(|d| d.unusual_destination),
        }
    }
}

/// Airport polling service
pub struct MonitorService {
    feed: Arc<dyn StateFeed>,
    watchlist: Watchlist,
    settings: MonitorSettings,
    detection_repo: DetectionRepo,
    aircraft_repo: AircraftRepo,
}

impl MonitorService {
    pub fn new(
        feed: Arc<dyn StateFeed>,
        watchlist: Watchlist,
        settings: MonitorSettings,
        detection_repo: DetectionRepo,
        aircraft_repo: AircraftRepo,
    ) -> Self {
        Self {
            feed,
            watchlist,
            settings,
            detection_repo,
            aircraft_repo,
        }
    }

    /// Run one polling cycle and persist its detections
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> AppResult<CycleStats> {
        let detections =
            collect_detections(self.feed.as_ref(), &self.watchlist, &self.settings, now).await;

        if detections.is_empty() {
            info!("No aircraft detected");
            return Ok(CycleStats::default());
        }

        let month = month_stamp(now);
        let saved = self
            .detection_repo
            .append_detections(&month, &detections)
            .await?;
        info!("Saved {} detections", saved);

        let alerts = self.detection_repo.append_alerts(&month, &detections).await?;
        if alerts > 0 {
            report_alerts(&detections);
        }

        let mut db = self.aircraft_repo.load().await?;
        merge_into_database(&mut db, &detections);
        self.aircraft_repo.save(&db).await?;

        let stats = CycleStats::of(&detections);
        info!(
            "Total aircraft detected: {}, alerts: {}, charter operators: {}, unknown callsigns: {}, unusual destinations: {}",
            stats.detections,
            stats.alerts,
            stats.charter,
            stats.unknown_callsign,
            stats.unusual_destination
        );
        Ok(stats)
    }
}

fn report_alerts(detections: &[Detection]) {
    let alerts: Vec<&Detection> = detections.iter().filter(|d| d.is_alert).collect();
    warn!("{} ALERTS", alerts.len());
    for a in alerts.iter().take(ALERTS_TO_REPORT) {
        warn!(
            "{} at {}: {:.1}km, {}m, region {}, alerts: {}",
            a.callsign,
            a.airport_name,
            a.distance_from_airport_km,
            fmt_altitude(a.altitude_m),
            a.projected_region,
            a.alerts.join(", ")
        );
    }
}

fn fmt_altitude(alt: Option<f64>) -> String {
    alt.map(|m| format!("{:.0}", m))
        .unwrap_or_else(|| "?".to_string())
}

/// Daily gap analysis service
pub struct GapService {
    detection_repo: DetectionRepo,
    summary_repo: SummaryRepo,
    settings: GapSettings,
}

impl GapService {
    pub fn new(detection_repo: DetectionRepo, summary_repo: SummaryRepo, settings: GapSettings) -> Self {
        Self {
            detection_repo,
            summary_repo,
            settings,
        }
    }

    /// Analyse the trailing window ending at `now` and write the daily summary.
    /// Returns `None` when there is no detection log for the current month.
    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<Option<DailySummary>> {
        let window = Duration::hours(self.settings.window_hours);
        let mut months = months_in_window(now, window);
        let current = months.pop().unwrap_or_else(|| month_stamp(now));

        let mut detections = match self.detection_repo.load_month_required(&current).await {
            Ok(log) => log,
            Err(AppError::MissingStore(key)) => {
                warn!("No data file found ({}), nothing to analyze", key);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        for month in &months {
            detections.extend(self.detection_repo.load_month(month).await?);
        }

        let cutoff = now - window;
        detections.retain(|d| d.timestamp > cutoff);
        info!(
            "Analyzing {} detections from last {} hours",
            detections.len(),
            self.settings.window_hours
        );

        let report = infer_gaps(&detections, &self.settings);
        report_gaps(&report);

        let summary = DailySummary {
            date: now,
            possible_landings: report.possible_landings,
            possible_takeoffs: report.possible_takeoffs,
        };
        let key = self.summary_repo.write(now, &summary).await?;
        info!("Summary saved to {}", key);
        Ok(Some(summary))
    }
}

fn report_gaps(report: &GapReport) {
    info!("Possible landings: {}", report.possible_landings.len());
    for e in &report.possible_landings {
        info!(
            "{} {} ({}) at {}: {:.1}km from airport, {}m, then {:.1} hour gap",
            e.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            e.callsign,
            e.icao,
            e.airport,
            e.distance_km,
            fmt_altitude(e.altitude_m),
            e.gap_hours
        );
    }
    info!("Possible takeoffs: {}", report.possible_takeoffs.len());
    for e in &report.possible_takeoffs {
        info!(
            "{} {} ({}) at {}: {:.1}km from airport, {}m, after {:.1} hour gap",
            e.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            e.callsign,
            e.icao,
            e.airport,
            e.distance_km,
            fmt_altitude(e.altitude_m),
            e.gap_hours
        );
    }
}
