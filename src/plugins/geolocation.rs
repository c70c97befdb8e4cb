use bevy::prelude::*;

use crate::geo::MapView;
use crate::location::{
    DeviceLocation, FailingLocation, FixedLocation, LocationError, LocationProvider,
    LocationResult,
};
use crate::plugins::core::{DashboardConfig, DashboardSet, EventLog};

pub struct GeolocationPlugin;

impl Plugin for GeolocationPlugin {
    fn build(&self, app: &mut App) {
        let device_location = app
            .world()
            .get_resource::<DashboardConfig>()
            .map(|config| config.device_location)
            .unwrap_or_default();

        app.insert_resource(LocationSource::from_device(device_location))
            .add_systems(Update, poll_location.in_set(DashboardSet::Location));
    }
}

/// The device position provider plus whether a request is outstanding.
#[derive(Resource)]
pub struct LocationSource {
    provider: Option<Box<dyn LocationProvider>>,
    pending: bool,
}

impl LocationSource {
    pub fn new(provider: impl LocationProvider) -> Self {
        Self {
            provider: Some(Box::new(provider)),
            pending: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            provider: None,
            pending: false,
        }
    }

    pub fn from_device(device: DeviceLocation) -> Self {
        match device {
            DeviceLocation::Unsupported => Self::unavailable(),
            DeviceLocation::Fixed(fix) => Self::new(FixedLocation::new(fix)),
            DeviceLocation::Denied => Self::new(FailingLocation::new(LocationError::Denied)),
            DeviceLocation::Unavailable => Self::new(FailingLocation::new(
                LocationError::Unavailable("no position fix".to_string()),
            )),
        }
    }

    #[allow(dead_code)]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    #[allow(dead_code)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns false when there is no provider to ask.
    pub fn request(&mut self) -> bool {
        match self.provider.as_mut() {
            Some(provider) => {
                provider.request_position();
                self.pending = true;
                true
            }
            None => false,
        }
    }

    pub fn poll(&mut self) -> Option<LocationResult> {
        if !self.pending {
            return None;
        }

        let result = self.provider.as_mut()?.poll_position()?;
        self.pending = false;
        Some(result)
    }
}

pub fn poll_location(
    mut source: ResMut<LocationSource>,
    mut map_view: ResMut<MapView>,
    mut log: ResMut<EventLog>,
) {
    match source.poll() {
        Some(Ok(point)) => {
            map_view.recenter(point);
            info!("Centered on {:.4}, {:.4}", point.lat, point.lng);
            log.push("Centered on your location".to_string());
        }
        Some(Err(error)) => {
            warn!("Location request failed: {}", error);
            log.push("Location blocked".to_string());
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, TULARE};
    use bevy::ecs::system::SystemState;

    /// Never answers.
    struct SilentLocation;

    impl LocationProvider for SilentLocation {
        fn request_position(&mut self) {}

        fn poll_position(&mut self) -> Option<LocationResult> {
            None
        }
    }

    fn run_poll(world: &mut World) {
        let mut system_state: SystemState<(
            ResMut<LocationSource>,
            ResMut<MapView>,
            ResMut<EventLog>,
        )> = SystemState::new(world);
        let (source, map_view, log) = system_state.get_mut(world);
        poll_location(source, map_view, log);
        system_state.apply(world);
    }

    fn location_world(mut source: LocationSource) -> World {
        let mut world = World::default();
        source.request();
        world.insert_resource(source);
        world.insert_resource(MapView::default());
        world.insert_resource(EventLog::default());
        world
    }

    #[test]
    fn poll_location_recenters_on_fix() {
        let fix = GeoPoint::new(36.3302, -119.2921);
        let mut world = location_world(LocationSource::new(FixedLocation::new(fix)));

        run_poll(&mut world);

        assert_eq!(world.resource::<MapView>().center, fix);
        assert_eq!(
            world.resource::<EventLog>().latest(),
            Some("Centered on your location")
        );
        assert!(!world.resource::<LocationSource>().is_pending());
    }

    #[test]
    fn poll_location_failure_keeps_center() {
        let mut world = location_world(LocationSource::from_device(DeviceLocation::Denied));

        run_poll(&mut world);

        assert_eq!(world.resource::<MapView>().center, TULARE);
        assert_eq!(world.resource::<EventLog>().latest(), Some("Location blocked"));
    }

    #[test]
    fn poll_location_pending_forever_is_harmless() {
        let mut world = location_world(LocationSource::new(SilentLocation));

        for _ in 0..3 {
            run_poll(&mut world);
        }

        assert_eq!(world.resource::<MapView>().center, TULARE);
        assert!(world.resource::<EventLog>().entries().is_empty());
        assert!(world.resource::<LocationSource>().is_pending());
    }

    #[test]
    fn unavailable_source_refuses_requests() {
        let mut source = LocationSource::unavailable();
        assert!(!source.is_available());
        assert!(!source.request());
        assert!(source.poll().is_none());
    }

    #[test]
    fn unavailable_device_reports_failure() {
        let mut source = LocationSource::from_device(DeviceLocation::Unavailable);
        assert!(source.is_available());
        assert!(source.request());
        assert!(matches!(
            source.poll(),
            Some(Err(LocationError::Unavailable(_)))
        ));
        assert!(!source.is_pending());
    }

    #[test]
    fn device_setting_selects_provider() {
        assert!(!LocationSource::from_device(DeviceLocation::Unsupported).is_available());

        let fix = GeoPoint::new(36.21, -119.34);
        let mut source = LocationSource::from_device(DeviceLocation::Fixed(fix));
        assert!(source.request());
        assert_eq!(source.poll(), Some(Ok(fix)));
    }

    #[test]
    fn plugin_wires_configured_device() {
        let mut app = App::new();
        app.insert_resource(DashboardConfig {
            device_location: DeviceLocation::Denied,
            ..Default::default()
        })
        .insert_resource(MapView::default())
        .insert_resource(EventLog::default())
        .add_plugins(GeolocationPlugin);

        assert!(app.world_mut().resource_mut::<LocationSource>().request());
        app.update();

        assert_eq!(app.world().resource::<EventLog>().latest(), Some("Location blocked"));
        assert_eq!(app.world().resource::<MapView>().center, TULARE);
    }
}
