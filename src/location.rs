use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

pub type LocationResult = Result<GeoPoint, LocationError>;

/// What the host's positioning reports, as configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DeviceLocation {
    /// No positioning on this host.
    #[default]
    Unsupported,
    Fixed(GeoPoint),
    /// Positioning exists but the user refused it.
    Denied,
    /// Positioning exists but cannot produce a fix.
    Unavailable,
}

/// One-shot device position source.
///
/// `request_position` starts a request; `poll_position` returns `None` while
/// it is pending, which may be forever. No timeout is imposed.
pub trait LocationProvider: Send + Sync + 'static {
    fn request_position(&mut self);

    fn poll_position(&mut self) -> Option<LocationResult>;
}

/// Resolves every request with the same configured fix.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    fix: GeoPoint,
    requested: bool,
}

impl FixedLocation {
    pub fn new(fix: GeoPoint) -> Self {
        Self {
            fix,
            requested: false,
        }
    }
}

impl LocationProvider for FixedLocation {
    fn request_position(&mut self) {
        self.requested = true;
    }

    fn poll_position(&mut self) -> Option<LocationResult> {
        if !self.requested {
            return None;
        }
        self.requested = false;
        Some(Ok(self.fix))
    }
}

/// Fails every request with the same error.
#[derive(Debug, Clone)]
pub struct FailingLocation {
    error: LocationError,
    requested: bool,
}

impl FailingLocation {
    pub fn new(error: LocationError) -> Self {
        Self {
            error,
            requested: false,
        }
    }
}

impl LocationProvider for FailingLocation {
    fn request_position(&mut self) {
        self.requested = true;
    }

    fn poll_position(&mut self) -> Option<LocationResult> {
        if !self.requested {
            return None;
        }
        self.requested = false;
        Some(Err(self.error.clone()))
    }
}
