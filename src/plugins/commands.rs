use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::clock::MileageClock;
use crate::geo::{GeoPoint, MapView, ScreenPoint};
use crate::hotspots::{HotspotForm, HotspotId, HotspotSpec, HotspotStore, Platform};
use crate::ledger::{EarningId, Ledger};
use crate::plugins::core::{DashboardConfig, DashboardSet, EventLog};
use crate::plugins::geolocation::LocationSource;
use crate::plugins::sim::{simulate_busy, start_tracking, stop_tracking};

pub const DROPPED_PIN_NAME: &str = "Custom Pin";

pub struct CommandsPlugin;

impl Plugin for CommandsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<DashboardCommand>()
            .add_systems(Startup, queue_startup_commands)
            .add_systems(Update, apply_commands.in_set(DashboardSet::Commands));
    }
}

/// Everything a renderer can ask the dashboard to do.
#[derive(Message, Clone, Debug)]
pub enum DashboardCommand {
    AddHotspot(HotspotSpec),
    SubmitHotspotForm(HotspotForm),
    /// Tap on the map at a viewport pixel.
    DropPin(ScreenPoint),
    RemoveHotspot(HotspotId),
    SetSelected { id: HotspotId, selected: bool },
    SetBusy { id: HotspotId, busy: bool },
    ToggleBusy(HotspotId),
    SimulateBusy { platform: Platform, busy: bool },
    AddEarning { platform: Platform, amount: f64 },
    AddEarningInput { platform: Platform, input: String },
    RemoveEarning(EarningId),
    StartTracking,
    StopTracking,
    ResetMiles,
    SetMpg(f64),
    SetFuelPrice(f64),
    SetMpgInput(String),
    SetFuelPriceInput(String),
    RecenterHome,
    Recenter(GeoPoint),
    UseMyLocation,
    ResizeMap { width: f64, height: f64 },
}

fn queue_startup_commands(
    config: Res<DashboardConfig>,
    mut commands: MessageWriter<DashboardCommand>,
) {
    if config.auto_track {
        commands.write(DashboardCommand::StartTracking);
    }
    if config.locate_on_start {
        commands.write(DashboardCommand::UseMyLocation);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn apply_commands(
    mut commands: MessageReader<DashboardCommand>,
    config: Res<DashboardConfig>,
    mut store: ResMut<HotspotStore>,
    mut ledger: ResMut<Ledger>,
    mut map_view: ResMut<MapView>,
    mut clock: ResMut<MileageClock>,
    mut location: ResMut<LocationSource>,
    mut log: ResMut<EventLog>,
) {
    for command in commands.read() {
        debug!("Command: {:?}", command);

        match command {
            DashboardCommand::AddHotspot(spec) => {
                let hotspot = store.add(spec.clone());
                info!("Hotspot added: {} ({})", hotspot.name, hotspot.platform);
            }
            DashboardCommand::SubmitHotspotForm(form) => {
                let hotspot = store.add(form.to_spec());
                info!("Hotspot added: {} ({})", hotspot.name, hotspot.platform);
            }
            DashboardCommand::DropPin(screen) => {
                let position = map_view.unproject(*screen);
                let hotspot = store.add(
                    HotspotSpec::at(position)
                        .named(DROPPED_PIN_NAME)
                        .with_platform(Platform::DoorDash),
                );
                info!(
                    "Pin dropped at {:.4}, {:.4}",
                    hotspot.position.lat, hotspot.position.lng
                );
            }
            DashboardCommand::RemoveHotspot(id) => {
                store.remove(*id);
            }
            DashboardCommand::SetSelected { id, selected } => {
                store.set_selected(*id, *selected);
            }
            DashboardCommand::SetBusy { id, busy } => {
                store.set_busy(*id, *busy);
            }
            DashboardCommand::ToggleBusy(id) => {
                store.toggle_busy(*id);
            }
            DashboardCommand::SimulateBusy { platform, busy } => {
                if let Some(notice) = simulate_busy(&mut store, *platform, *busy) {
                    info!("{}", notice);
                    log.push(notice);
                }
            }
            DashboardCommand::AddEarning { platform, amount } => {
                if ledger.add_earning(*platform, *amount).is_none() {
                    debug!("Earning declined: {}", amount);
                }
            }
            DashboardCommand::AddEarningInput { platform, input } => {
                if ledger.add_earning_input(*platform, input).is_none() {
                    debug!("Earning declined: {:?}", input);
                }
            }
            DashboardCommand::RemoveEarning(id) => {
                ledger.remove_earning(*id);
            }
            DashboardCommand::StartTracking => {
                if start_tracking(&mut ledger, &mut clock, config.tick_interval()) {
                    info!("Tracking started");
                }
            }
            DashboardCommand::StopTracking => {
                if stop_tracking(&mut ledger, &mut clock) {
                    info!("Tracking stopped at {:.2} mi", ledger.miles());
                }
            }
            DashboardCommand::ResetMiles => ledger.reset_miles(),
            DashboardCommand::SetMpg(value) => ledger.set_mpg(*value),
            DashboardCommand::SetFuelPrice(value) => ledger.set_fuel_price(*value),
            DashboardCommand::SetMpgInput(input) => ledger.set_mpg_input(input),
            DashboardCommand::SetFuelPriceInput(input) => ledger.set_fuel_price_input(input),
            DashboardCommand::RecenterHome => map_view.recenter_home(),
            DashboardCommand::Recenter(point) => map_view.recenter(*point),
            DashboardCommand::UseMyLocation => {
                if !location.request() {
                    log.push("Geolocation not available".to_string());
                }
            }
            DashboardCommand::ResizeMap { width, height } => {
                if !map_view.resize(*width, *height) {
                    debug!("Ignored map size {}x{}", width, height);
                }
            }
        }
    }
}
