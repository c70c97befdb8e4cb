//! Mileage tracking and busy-notification simulation.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

use crate::clock::MileageClock;
use crate::dashboard::build_dashboard_view;
use crate::geo::MapView;
use crate::hotspots::{HotspotStore, Platform};
use crate::ledger::{Ledger, TrackingState};
use crate::plugins::core::{DashboardConfig, DashboardSet};

pub const DEFAULT_STEP_MIN: f64 = 0.02;
pub const DEFAULT_STEP_MAX: f64 = 0.10;

// =============================================================================
// Plugin
// =============================================================================

pub struct SimPlugin;

impl Plugin for SimPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimTickCount>()
            .init_resource::<TrackingRng>()
            .add_systems(Update, advance_mileage_clock.in_set(DashboardSet::Clock))
            .add_systems(Update, log_session_summary.in_set(DashboardSet::Report));
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Clock ticks that accrued mileage.
#[derive(Resource, Default)]
pub struct SimTickCount {
    pub tick: u64,
}

/// Seeded source for simulated per-tick mileage.
#[derive(Resource)]
pub struct TrackingRng(pub ChaCha8Rng);

impl Default for TrackingRng {
    fn default() -> Self {
        Self::from_seed_u64(42)
    }
}

impl TrackingRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform in `[min, max)`; a collapsed or inverted range yields `min`.
    /// Non-finite bounds fall back to the default step range.
    pub fn mileage_step(&mut self, min: f64, max: f64) -> f64 {
        let (min, max) = if min.is_finite() && max.is_finite() {
            (min, max)
        } else {
            (DEFAULT_STEP_MIN, DEFAULT_STEP_MAX)
        };
        let min = min.max(0.0);
        if !(max > min) {
            return min;
        }
        self.0.gen_range(min..max)
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Idle -> Tracking. Returns false if already tracking.
pub fn start_tracking(ledger: &mut Ledger, clock: &mut MileageClock, interval: Duration) -> bool {
    if ledger.is_tracking() {
        return false;
    }

    ledger.set_tracking(TrackingState::Tracking);
    clock.subscribe(interval);
    true
}

/// Tracking -> Idle. The clock subscription is cancelled before returning.
pub fn stop_tracking(ledger: &mut Ledger, clock: &mut MileageClock) -> bool {
    if let Some(handle) = clock.handle() {
        clock.cancel(handle);
    }
    ledger.set_tracking(TrackingState::Idle)
}

/// Accrues one simulated step and snaps the total to thousandths.
pub fn tracking_tick(ledger: &mut Ledger, step: f64) -> bool {
    if !ledger.accrue_miles(step) {
        return false;
    }
    ledger.round_miles();
    true
}

pub fn busy_notice(platform: Platform, hotspot_name: &str) -> String {
    format!("{}: Hotspot turned RED in {}", platform, hotspot_name)
}

/// Sweeps every hotspot of `platform`, then names the first selected one when
/// it turned busy.
pub fn simulate_busy(store: &mut HotspotStore, platform: Platform, busy: bool) -> Option<String> {
    store.set_busy_for_platform(platform, busy);
    if !busy {
        return None;
    }

    store
        .first_selected(platform)
        .map(|hotspot| busy_notice(platform, &hotspot.name))
}

// =============================================================================
// Systems
// =============================================================================

pub fn advance_mileage_clock(
    time: Res<Time>,
    config: Res<DashboardConfig>,
    mut clock: ResMut<MileageClock>,
    mut ledger: ResMut<Ledger>,
    mut rng: ResMut<TrackingRng>,
    mut ticks: ResMut<SimTickCount>,
) {
    let fired = clock.advance(time.delta());

    for _ in 0..fired {
        let step = rng.mileage_step(config.mileage_step_min, config.mileage_step_max);
        if tracking_tick(&mut ledger, step) {
            ticks.tick = ticks.tick.saturating_add(1);
        }
    }
}

fn log_session_summary(
    ticks: Res<SimTickCount>,
    config: Res<DashboardConfig>,
    store: Res<HotspotStore>,
    ledger: Res<Ledger>,
    map_view: Res<MapView>,
    mut last_logged: Local<u64>,
) {
    if !summary_due(ticks.tick, *last_logged, config.summary_every_ticks) {
        return;
    }
    *last_logged = ticks.tick;

    let view = build_dashboard_view(&store, &ledger, &map_view);
    info!("Tick {}: {}", ticks.tick, view.summary_line());
}

/// A summary is due once per new tick that lands on the cadence.
fn summary_due(tick: u64, last_logged: u64, every: u64) -> bool {
    every != 0 && tick != last_logged && tick.is_multiple_of(every)
}

// =============================================================================
// Tests
// =============================================================================
