use bevy::prelude::*;
use std::fmt;
use std::str::FromStr;

use crate::geo::{parse_coordinate, GeoPoint};
use crate::input::leading_number;

pub const DEFAULT_HOTSPOT_NAME: &str = "New Hotspot";
pub const DEFAULT_RADIUS_M: f64 = 300.0;

#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize,
    serde::Deserialize,
)]
pub enum Platform {
    #[default]
    DoorDash,
    UberEats,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::DoorDash, Platform::UberEats];

    pub fn label(self) -> &'static str {
        match self {
            Platform::DoorDash => "DoorDash",
            Platform::UberEats => "UberEats",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownPlatform(trimmed.to_string()))
    }
}

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
pub struct HotspotId(pub u64);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hotspot {
    pub id: HotspotId,
    pub name: String,
    pub position: GeoPoint,
    /// Advisory only; nothing geofences on it.
    pub radius_m: f64,
    pub platform: Platform,
    pub busy: bool,
    pub selected: bool,
}

/// Partial hotspot description; missing fields take the store defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HotspotSpec {
    pub name: Option<String>,
    pub position: GeoPoint,
    pub radius_m: Option<f64>,
    pub platform: Option<Platform>,
}

impl HotspotSpec {
    pub fn at(position: GeoPoint) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = Some(radius_m);
        self
    }
}

/// Raw text from the "Add Hotspot" form.
#[derive(Clone, Debug, Default)]
pub struct HotspotForm {
    pub name: String,
    pub platform: String,
    pub lat: String,
    pub lng: String,
    pub radius: String,
}

impl HotspotForm {
    pub fn to_spec(&self) -> HotspotSpec {
        let radius_m = leading_number(&self.radius)
            .map(f64::trunc)
            .filter(|radius| radius.is_finite() && *radius > 0.0);

        HotspotSpec {
            name: Some(self.name.clone()),
            position: GeoPoint::new(parse_coordinate(&self.lat), parse_coordinate(&self.lng)),
            radius_m,
            platform: self.platform.parse().ok(),
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct HotspotStore {
    hotspots: Vec<Hotspot>,
    next_id: u64,
}

impl HotspotStore {
    pub fn with_seeds(seeds: &[HotspotSpec]) -> Self {
        let mut store = Self::default();
        for spec in seeds {
            store.add(spec.clone());
        }
        store
    }

    pub fn add(&mut self, spec: HotspotSpec) -> &Hotspot {
        self.next_id += 1;
        let name = spec
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOTSPOT_NAME.to_string());
        let radius_m = spec
            .radius_m
            .filter(|radius| radius.is_finite() && *radius > 0.0)
            .unwrap_or(DEFAULT_RADIUS_M);

        self.hotspots.push(Hotspot {
            id: HotspotId(self.next_id),
            name,
            position: spec.position,
            radius_m,
            platform: spec.platform.unwrap_or_default(),
            busy: false,
            selected: true,
        });

        &self.hotspots[self.hotspots.len() - 1]
    }

    /// Returns whether a hotspot was removed.
    pub fn remove(&mut self, id: HotspotId) -> bool {
        let before = self.hotspots.len();
        self.hotspots.retain(|hotspot| hotspot.id != id);
        self.hotspots.len() != before
    }

    #[allow(dead_code)]
    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|hotspot| hotspot.id == id)
    }

    fn get_mut(&mut self, id: HotspotId) -> Option<&mut Hotspot> {
        self.hotspots.iter_mut().find(|hotspot| hotspot.id == id)
    }

    pub fn set_selected(&mut self, id: HotspotId, selected: bool) -> bool {
        match self.get_mut(id) {
            Some(hotspot) => {
                hotspot.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn set_busy(&mut self, id: HotspotId, busy: bool) -> bool {
        match self.get_mut(id) {
            Some(hotspot) => {
                hotspot.busy = busy;
                true
            }
            None => false,
        }
    }

    pub fn toggle_busy(&mut self, id: HotspotId) -> Option<bool> {
        let hotspot = self.get_mut(id)?;
        hotspot.busy = !hotspot.busy;
        Some(hotspot.busy)
    }

    /// Applies to every hotspot of `platform`, selected or not. Returns how
    /// many hotspots matched.
    pub fn set_busy_for_platform(&mut self, platform: Platform, busy: bool) -> usize {
        let mut matched = 0;
        for hotspot in self
            .hotspots
            .iter_mut()
            .filter(|hotspot| hotspot.platform == platform)
        {
            hotspot.busy = busy;
            matched += 1;
        }
        matched
    }

    /// First selected hotspot of `platform` in insertion order.
    pub fn first_selected(&self, platform: Platform) -> Option<&Hotspot> {
        self.hotspots
            .iter()
            .find(|hotspot| hotspot.platform == platform && hotspot.selected)
    }

    pub fn list(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn busy_count(&self) -> usize {
        self.hotspots.iter().filter(|hotspot| hotspot.busy).count()
    }
}
