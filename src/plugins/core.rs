use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::clock::MileageClock;
use crate::geo::{GeoPoint, MapView, Viewport, TULARE};
use crate::hotspots::{HotspotSpec, HotspotStore, Platform};
use crate::ledger::{Ledger, DEFAULT_FUEL_PRICE, DEFAULT_MPG};
use crate::location::DeviceLocation;
use crate::plugins::sim::{TrackingRng, DEFAULT_STEP_MAX, DEFAULT_STEP_MIN};

pub const CONFIG_PATH: &str = "config/dashboard.ron";

pub struct CorePlugin;

/// Frame ordering for everything that writes dashboard state.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardSet {
    Commands,
    Location,
    Clock,
    Report,
}

#[derive(Resource, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub tick_interval_ms: u64,
    pub mpg: f64,
    pub fuel_price_per_unit: f64,
    pub home: GeoPoint,
    pub viewport: Viewport,
    pub mileage_step_min: f64,
    pub mileage_step_max: f64,
    pub seed: u64,
    pub hotspots: Vec<HotspotSpec>,
    /// What the device location provider reports.
    pub device_location: DeviceLocation,
    pub locate_on_start: bool,
    pub auto_track: bool,
    pub summary_every_ticks: u64,
    pub event_log_capacity: usize,
    /// Headless runs exit after this many seconds.
    pub run_seconds: Option<f32>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            mpg: DEFAULT_MPG,
            fuel_price_per_unit: DEFAULT_FUEL_PRICE,
            home: TULARE,
            viewport: Viewport::default(),
            mileage_step_min: DEFAULT_STEP_MIN,
            mileage_step_max: DEFAULT_STEP_MAX,
            seed: 42,
            hotspots: vec![
                HotspotSpec::at(TULARE)
                    .named("Tulare Walmart")
                    .with_platform(Platform::DoorDash)
                    .with_radius(300.0),
                HotspotSpec::at(GeoPoint::new(36.3302, -119.2921))
                    .named("Visalia Downtown")
                    .with_platform(Platform::UberEats)
                    .with_radius(350.0),
            ],
            device_location: DeviceLocation::Unsupported,
            locate_on_start: false,
            auto_track: false,
            summary_every_ticks: 10,
            event_log_capacity: 8,
            run_seconds: None,
        }
    }
}

impl DashboardConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// `Ok(None)` when there is no config file.
pub fn load_config(path: &Path) -> Result<Option<DashboardConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let config = ron::de::from_str::<DashboardConfig>(&contents)?;
    Ok(Some(config))
}

/// Bounded list of user-facing notices, oldest dropped first.
#[derive(Resource, Debug)]
pub struct EventLog {
    entries: Vec<String>,
    max_entries: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

impl EventLog {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
        }
    }

    #[allow(dead_code)]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let config = match load_config(Path::new(CONFIG_PATH)) {
            Ok(Some(config)) => {
                info!("Loaded config from {}", CONFIG_PATH);
                config
            }
            Ok(None) => DashboardConfig::default(),
            Err(error) => {
                warn!("Config load failed, using defaults: {}", error);
                DashboardConfig::default()
            }
        };

        insert_dashboard_state(app, config);

        app.configure_sets(
            Update,
            (
                DashboardSet::Commands,
                DashboardSet::Location,
                DashboardSet::Clock,
                DashboardSet::Report,
            )
                .chain(),
        )
        .add_systems(Startup, log_startup)
        .add_systems(Update, exit_after_run_time);
    }
}

pub fn insert_dashboard_state(app: &mut App, config: DashboardConfig) {
    let store = HotspotStore::with_seeds(&config.hotspots);
    let ledger = Ledger::new(config.mpg, config.fuel_price_per_unit);
    let map_view = MapView::new(config.home, config.viewport);
    let rng = TrackingRng::from_seed_u64(config.seed);
    let log = EventLog::with_capacity(config.event_log_capacity);

    app.insert_resource(store)
        .insert_resource(ledger)
        .insert_resource(map_view)
        .insert_resource(rng)
        .insert_resource(log)
        .init_resource::<MileageClock>()
        .insert_resource(config);
}

fn log_startup(store: Res<HotspotStore>, ledger: Res<Ledger>, map_view: Res<MapView>) {
    let home = map_view.home();
    info!(
        "Dashboard ready (hotspots: {}, mpg: {}, fuel: {:.2}, home: {:.4}, {:.4})",
        store.len(),
        ledger.mpg(),
        ledger.fuel_price_per_unit(),
        home.lat,
        home.lng
    );
}

fn exit_after_run_time(
    time: Res<Time>,
    config: Res<DashboardConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some(limit) = config.run_seconds {
        if time.elapsed_secs() >= limit {
            info!("Run time of {}s reached, exiting", limit);
            exit.write(AppExit::Success);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_preview_app() {
        let config = DashboardConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.mpg, 24.0);
        assert_eq!(config.fuel_price_per_unit, 4.79);
        assert_eq!(config.home, TULARE);
        assert_eq!(config.hotspots.len(), 2);
        assert!(!config.auto_track);
    }

    #[test]
    fn tick_interval_never_zero() {
        let config = DashboardConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn partial_ron_config_keeps_defaults() {
        let config = ron::de::from_str::<DashboardConfig>(
            "(mpg: 31.0, home: (lat: 36.33, lng: -119.29), auto_track: true)",
        )
        .expect("valid config");

        assert_eq!(config.mpg, 31.0);
        assert_eq!(config.home, GeoPoint::new(36.33, -119.29));
        assert!(config.auto_track);
        assert_eq!(config.fuel_price_per_unit, 4.79);
        assert_eq!(config.hotspots.len(), 2);
    }

    #[test]
    fn ron_hotspot_seeds_parse_with_partial_fields() {
        let config = ron::de::from_str::<DashboardConfig>(
            "(hotspots: [(name: Some(\"Depot\"), position: (lat: 1.0, lng: 2.0), platform: Some(UberEats))])",
        )
        .expect("valid config");

        assert_eq!(config.hotspots.len(), 1);
        assert_eq!(config.hotspots[0].platform, Some(Platform::UberEats));
        assert_eq!(config.hotspots[0].radius_m, None);
    }

    #[test]
    fn load_config_missing_file_is_none() {
        let loaded = load_config(Path::new("config/does-not-exist.ron"));
        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    fn event_log_push_trims_oldest_entries() {
        let mut log = EventLog::default();
        for index in 0..12 {
            log.push(format!("entry-{}", index));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries.first().map(String::as_str), Some("entry-4"));
        assert_eq!(log.latest(), Some("entry-11"));
    }

    fn run_exit_check(run_seconds: Option<f32>, elapsed: Duration) -> App {
        let mut app = App::new();
        let mut time = Time::<()>::default();
        time.advance_by(elapsed);
        app.insert_resource(time)
            .insert_resource(DashboardConfig {
                run_seconds,
                ..Default::default()
            })
            .add_systems(Update, exit_after_run_time);
        app.update();
        app
    }

    #[test]
    fn exit_after_run_time_exits_once_limit_reached() {
        let app = run_exit_check(Some(2.0), Duration::from_secs(3));
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }

    #[test]
    fn exit_after_run_time_waits_for_limit() {
        let app = run_exit_check(Some(5.0), Duration::from_secs(3));
        assert_eq!(app.should_exit(), None);
    }

    #[test]
    fn exit_after_run_time_without_limit_keeps_running() {
        let app = run_exit_check(None, Duration::from_secs(3600));
        assert_eq!(app.should_exit(), None);
    }

    #[test]
    fn insert_dashboard_state_seeds_resources() {
        let mut app = App::new();
        insert_dashboard_state(
            &mut app,
            DashboardConfig {
                mpg: -1.0,
                ..Default::default()
            },
        );

        let world = app.world();
        let store = world.resource::<HotspotStore>();
        assert_eq!(store.list()[0].name, "Tulare Walmart");
        assert_eq!(store.list()[1].radius_m, 350.0);
        assert_eq!(world.resource::<Ledger>().mpg(), 0.0);
        assert_eq!(world.resource::<MapView>().center, TULARE);
        assert!(!world.resource::<MileageClock>().is_active());
    }
}
