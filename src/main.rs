use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::time::Duration;

mod clock;
mod dashboard;
mod geo;
mod hotspots;
mod input;
mod ledger;
mod location;
mod plugins;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 30.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins((
            plugins::core::CorePlugin,
            plugins::geolocation::GeolocationPlugin,
            plugins::commands::CommandsPlugin,
            plugins::sim::SimPlugin,
        ))
        .run();
}
