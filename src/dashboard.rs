//! Read-side view model handed to whatever renders the dashboard.

use crate::geo::{GeoPoint, MapView, ScreenPoint};
use crate::hotspots::{HotspotId, HotspotStore, Platform};
use crate::ledger::{format_money, Ledger, Totals};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionMetrics {
    pub miles: f64,
    pub mpg: f64,
    pub fuel_price_per_unit: f64,
    pub tracking: bool,
    pub center: GeoPoint,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HotspotPin {
    pub id: HotspotId,
    pub name: String,
    pub platform: Platform,
    pub busy: bool,
    pub selected: bool,
    pub screen: ScreenPoint,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DashboardView {
    pub totals: Totals,
    pub metrics: SessionMetrics,
    pub pins: Vec<HotspotPin>,
}

impl DashboardView {
    pub fn busy_pins(&self) -> usize {
        self.pins.iter().filter(|pin| pin.busy).count()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "earned {} (DD {} / UE {}), {:.2} mi, gas {}, net {}, busy {}/{}",
            format_money(self.totals.total_earnings),
            format_money(self.totals.by_platform.door_dash),
            format_money(self.totals.by_platform.uber_eats),
            self.metrics.miles,
            format_money(self.totals.gas_cost),
            format_money(self.totals.net),
            self.busy_pins(),
            self.pins.len()
        )
    }
}

pub fn session_metrics(ledger: &Ledger, map_view: &MapView) -> SessionMetrics {
    SessionMetrics {
        miles: ledger.miles(),
        mpg: ledger.mpg(),
        fuel_price_per_unit: ledger.fuel_price_per_unit(),
        tracking: ledger.is_tracking(),
        center: map_view.center,
    }
}

pub fn build_dashboard_view(
    store: &HotspotStore,
    ledger: &Ledger,
    map_view: &MapView,
) -> DashboardView {
    let pins = store
        .list()
        .iter()
        .map(|hotspot| HotspotPin {
            id: hotspot.id,
            name: hotspot.name.clone(),
            platform: hotspot.platform,
            busy: hotspot.busy,
            selected: hotspot.selected,
            screen: map_view.project(hotspot.position),
        })
        .collect();

    DashboardView {
        totals: ledger.totals(),
        metrics: session_metrics(ledger, map_view),
        pins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Viewport, TULARE};
    use crate::hotspots::HotspotSpec;

    #[test]
    fn pins_follow_store_order_and_projection() {
        let store = HotspotStore::with_seeds(&[
            HotspotSpec::at(TULARE).named("Tulare Walmart"),
            HotspotSpec::at(GeoPoint::new(TULARE.lat + 0.01, TULARE.lng))
                .named("North")
                .with_platform(Platform::UberEats),
        ]);
        let map_view = MapView::new(
            TULARE,
            Viewport {
                width: 400.0,
                height: 300.0,
            },
        );

        let view = build_dashboard_view(&store, &Ledger::default(), &map_view);
        assert_eq!(view.pins.len(), 2);
        assert_eq!(view.pins[0].name, "Tulare Walmart");
        assert_eq!(view.pins[0].screen, ScreenPoint { x: 200.0, y: 150.0 });
        assert!((view.pins[1].screen.y - 40.0).abs() < 1e-6);
        assert_eq!(view.pins[1].platform, Platform::UberEats);
    }

    #[test]
    fn metrics_mirror_ledger_and_center() {
        let mut ledger = Ledger::new(30.0, 4.0);
        ledger.set_tracking(crate::ledger::TrackingState::Tracking);
        ledger.accrue_miles(1.5);
        let mut map_view = MapView::default();
        map_view.recenter(GeoPoint::new(36.33, -119.29));

        let metrics = session_metrics(&ledger, &map_view);
        assert_eq!(metrics.miles, 1.5);
        assert_eq!(metrics.mpg, 30.0);
        assert_eq!(metrics.fuel_price_per_unit, 4.0);
        assert!(metrics.tracking);
        assert_eq!(metrics.center, GeoPoint::new(36.33, -119.29));
    }

    #[test]
    fn summary_line_formats_money() {
        let mut store = HotspotStore::with_seeds(&[HotspotSpec::at(TULARE)]);
        store.set_busy_for_platform(Platform::DoorDash, true);
        let mut ledger = Ledger::default();
        ledger.add_earning(Platform::DoorDash, 12.5);

        let view = build_dashboard_view(&store, &ledger, &MapView::default());
        assert_eq!(
            view.summary_line(),
            "earned $12.50 (DD $12.50 / UE $0.00), 0.00 mi, gas $0.00, net $12.50, busy 1/1"
        );
    }
}
