/// Application configuration module
use crate::domain::{Airport, CharterOperator, WatchRegion};
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub opensky_url: String,
    pub poll_every_seconds: u64,
    pub http_timeout_seconds: u64,
    pub monitor: MonitorSettings,
    pub gaps: GapSettings,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorSettings {
    pub radius_km: f64,
    pub altitude_threshold_m: f64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            radius_km: 5.0,
            altitude_threshold_m: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GapSettings {
    pub window_hours: i64,
    pub min_gap_minutes: f64,
    pub near_km: f64,
    pub low_altitude_m: f64,
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            window_hours: 48,
            min_gap_minutes: 60.0,
            near_km: 5.0,
            low_altitude_m: 2000.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("ice_operations_data"));

        let opensky_url = env::var("OPENSKY_URL")
            .unwrap_or_else(|_| "https://opensky-network.org/api/states/all".to_string());

        let monitor_defaults = MonitorSettings::default();
        let monitor = MonitorSettings {
            radius_km: env_f64("MONITOR_RADIUS_KM", monitor_defaults.radius_km),
            altitude_threshold_m: env_f64(
                "ALTITUDE_THRESHOLD_M",
                monitor_defaults.altitude_threshold_m,
            ),
        };

        let gap_defaults = GapSettings::default();
        let gaps = GapSettings {
            window_hours: env_u64("GAP_WINDOW_HOURS", gap_defaults.window_hours as u64) as i64,
            min_gap_minutes: env_f64("GAP_MINUTES", gap_defaults.min_gap_minutes),
            near_km: env_f64("GAP_NEAR_KM", gap_defaults.near_km),
            low_altitude_m: env_f64("GAP_LOW_ALTITUDE_M", gap_defaults.low_altitude_m),
        };

        if monitor.radius_km <= 0.0 {
            anyhow::bail!("MONITOR_RADIUS_KM must be positive");
        }

        Ok(Self {
            data_dir,
            opensky_url,
            poll_every_seconds: env_u64("POLL_EVERY_SECONDS", 300),
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 30),
            monitor,
            gaps,
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Static watch tables. Declaration order is significant for region and
/// operator matching (first match wins).
#[derive(Clone, Debug)]
pub struct Watchlist {
    pub airports: Vec<Airport>,
    pub regions: Vec<WatchRegion>,
    pub operators: Vec<CharterOperator>,
}

impl Watchlist {
    pub fn builtin() -> Self {
        Self {
            airports: AIRPORTS.to_vec(),
            regions: WATCH_REGIONS.to_vec(),
            operators: CHARTER_OPERATORS.to_vec(),
        }
    }
}

pub const AIRPORTS: &[Airport] = &[
    Airport { code: "AZA", name: "Mesa Gateway (Phoenix)", lat: 33.3078, lon: -111.6545 },
    Airport { code: "AEX", name: "Alexandria International", lat: 31.3274, lon: -92.5498 },
    Airport { code: "SAT", name: "San Antonio International", lat: 29.5337, lon: -98.4698 },
    Airport { code: "BRO", name: "Brownsville South Padre", lat: 25.9068, lon: -97.4259 },
    Airport { code: "ELP", name: "El Paso International", lat: 31.8072, lon: -106.3778 },
    Airport { code: "HRL", name: "Harlingen Valley", lat: 26.2285, lon: -97.6544 },
    Airport { code: "MFE", name: "McAllen Miller", lat: 26.1758, lon: -98.2386 },
    Airport { code: "TUS", name: "Tucson International", lat: 32.1161, lon: -110.9410 },
];

pub const CHARTER_OPERATORS: &[CharterOperator] = &[
    CharterOperator { prefix: "SWQ", name: "Swift Air" },
    CharterOperator { prefix: "WAL", name: "World Atlantic" },
    CharterOperator { prefix: "CSQ", name: "iAero Airways" },
    CharterOperator { prefix: "SWA", name: "iAero Group" },
    CharterOperator { prefix: "N166HQ", name: "Known ICE Aircraft" },
    CharterOperator { prefix: "N167HQ", name: "Known ICE Aircraft" },
    CharterOperator { prefix: "N168HQ", name: "Known ICE Aircraft" },
];

pub const WATCH_REGIONS: &[WatchRegion] = &[
    WatchRegion {
        name: "AFRICA_EAST",
        bearing_start: 60.0,
        bearing_end: 120.0,
        destinations: &["Eritrea", "Somalia", "Ethiopia", "Kenya"],
        normal: false,
    },
    WatchRegion {
        name: "AFRICA_WEST",
        bearing_start: 45.0,
        bearing_end: 90.0,
        destinations: &["Senegal", "Guinea", "Sierra Leone", "Gambia"],
        normal: false,
    },
    WatchRegion {
        name: "EASTERN_EUROPE",
        bearing_start: 30.0,
        bearing_end: 60.0,
        destinations: &["Romania", "Moldova", "Ukraine"],
        normal: false,
    },
    WatchRegion {
        name: "MIDDLE_EAST",
        bearing_start: 45.0,
        bearing_end: 90.0,
        destinations: &["Iraq", "Syria", "Yemen"],
        normal: false,
    },
    WatchRegion {
        name: "SOUTH_ASIA",
        bearing_start: 15.0,
        bearing_end: 45.0,
        destinations: &["Bangladesh", "Myanmar", "Nepal"],
        normal: false,
    },
    WatchRegion {
        name: "MEXICO_CENTRAL_AMERICA",
        bearing_start: 150.0,
        bearing_end: 210.0,
        destinations: &["Mexico", "Guatemala", "Honduras", "El Salvador"],
        normal: true,
    },
    WatchRegion {
        name: "CARIBBEAN",
        bearing_start: 90.0,
        bearing_end: 135.0,
        destinations: &["Haiti", "Dominican Republic", "Jamaica"],
        normal: true,
    },
];
