use bevy::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::hotspots::Platform;
use crate::input::leading_number;

pub const DEFAULT_MPG: f64 = 24.0;
pub const DEFAULT_FUEL_PRICE: f64 = 4.79;

#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize,
)]
pub struct EarningId(pub u64);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EarningRecord {
    pub id: EarningId,
    pub platform: Platform,
    pub amount: f64,
    /// Unix milliseconds.
    pub at: u64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TrackingState {
    #[default]
    Idle,
    Tracking,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlatformTotals {
    pub door_dash: f64,
    pub uber_eats: f64,
}

impl PlatformTotals {
    pub fn get(&self, platform: Platform) -> f64 {
        match platform {
            Platform::DoorDash => self.door_dash,
            Platform::UberEats => self.uber_eats,
        }
    }

    fn add(&mut self, platform: Platform, amount: f64) {
        match platform {
            Platform::DoorDash => self.door_dash += amount,
            Platform::UberEats => self.uber_eats += amount,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Totals {
    pub total_earnings: f64,
    pub gas_cost: f64,
    pub net: f64,
    pub by_platform: PlatformTotals,
}

/// Earnings plus the mileage and fuel parameters that net profit depends on.
#[derive(Resource, Debug, Clone)]
pub struct Ledger {
    records: Vec<EarningRecord>,
    next_id: u64,
    miles: f64,
    mpg: f64,
    fuel_price_per_unit: f64,
    tracking: TrackingState,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_MPG, DEFAULT_FUEL_PRICE)
    }
}

impl Ledger {
    pub fn new(mpg: f64, fuel_price_per_unit: f64) -> Self {
        Self {
            records: Vec::new(),
            next_id: 0,
            miles: 0.0,
            mpg: clamp_to_zero_on_invalid(mpg),
            fuel_price_per_unit: clamp_to_zero_on_invalid(fuel_price_per_unit),
            tracking: TrackingState::Idle,
        }
    }

    /// Declines anything that is not a positive, finite amount.
    pub fn add_earning(&mut self, platform: Platform, amount: f64) -> Option<EarningId> {
        self.add_earning_at(platform, amount, unix_millis_now())
    }

    pub fn add_earning_at(&mut self, platform: Platform, amount: f64, at: u64) -> Option<EarningId> {
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }

        self.next_id += 1;
        let id = EarningId(self.next_id);
        self.records.push(EarningRecord {
            id,
            platform,
            amount,
            at,
        });
        Some(id)
    }

    pub fn add_earning_input(&mut self, platform: Platform, input: &str) -> Option<EarningId> {
        let amount = leading_number(input)?;
        self.add_earning(platform, amount)
    }

    pub fn remove_earning(&mut self, id: EarningId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        self.records.len() != before
    }

    #[allow(dead_code)]
    pub fn records(&self) -> &[EarningRecord] {
        &self.records
    }

    /// Only applies while tracking. Returns whether miles changed.
    pub fn accrue_miles(&mut self, delta: f64) -> bool {
        if self.tracking != TrackingState::Tracking || !delta.is_finite() || delta < 0.0 {
            return false;
        }

        self.miles += delta;
        true
    }

    /// Snaps the running total to thousandths of a mile.
    pub fn round_miles(&mut self) {
        self.miles = round_to_thousandths(self.miles);
    }

    pub fn reset_miles(&mut self) {
        self.miles = 0.0;
    }

    pub fn set_mpg(&mut self, value: f64) {
        self.mpg = clamp_to_zero_on_invalid(value);
    }

    pub fn set_fuel_price(&mut self, value: f64) {
        self.fuel_price_per_unit = clamp_to_zero_on_invalid(value);
    }

    pub fn set_mpg_input(&mut self, input: &str) {
        self.set_mpg(parse_numeric_field(input));
    }

    pub fn set_fuel_price_input(&mut self, input: &str) {
        self.set_fuel_price(parse_numeric_field(input));
    }

    pub fn miles(&self) -> f64 {
        self.miles
    }

    pub fn mpg(&self) -> f64 {
        self.mpg
    }

    pub fn fuel_price_per_unit(&self) -> f64 {
        self.fuel_price_per_unit
    }

    #[allow(dead_code)]
    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking == TrackingState::Tracking
    }

    /// Returns whether the state changed. Only the simulation driver calls this.
    pub(crate) fn set_tracking(&mut self, state: TrackingState) -> bool {
        let changed = self.tracking != state;
        self.tracking = state;
        changed
    }

    pub fn gas_cost(&self) -> f64 {
        if self.mpg > 0.0 && self.miles > 0.0 {
            (self.miles / self.mpg) * self.fuel_price_per_unit
        } else {
            0.0
        }
    }

    pub fn totals(&self) -> Totals {
        let mut by_platform = PlatformTotals::default();
        let mut total_earnings = 0.0;

        for record in &self.records {
            total_earnings += record.amount;
            by_platform.add(record.platform, record.amount);
        }

        let gas_cost = self.gas_cost();
        Totals {
            total_earnings,
            gas_cost,
            net: total_earnings - gas_cost,
            by_platform,
        }
    }
}

/// Negative, NaN and infinite inputs become 0 rather than being rejected.
pub fn clamp_to_zero_on_invalid(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Blank or unparseable text reads as 0.
pub fn parse_numeric_field(input: &str) -> f64 {
    leading_number(input).unwrap_or(0.0)
}

pub fn format_money(value: f64) -> String {
    format!("${:.2}", (value * 100.0).round() / 100.0)
}

fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
