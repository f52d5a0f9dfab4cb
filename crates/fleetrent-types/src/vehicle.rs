//! Rentable vehicle (inventory item) types.

use serde::{Deserialize, Serialize};

use crate::{Amount, Timestamp, VehicleId};

/// A rentable vehicle type with a finite number of identical units.
///
/// `available_units` is the authoritative count and is never negative; it
/// is mutated only through the store's atomic increment/decrement, never
/// cached in memory across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Vehicle {
    /// Row identity.
    pub id: VehicleId,
    /// Display name (e.g. "Toyota Avanza").
    pub name: String,
    /// Catalog category (e.g. "suv", "mpv").
    pub category: String,
    /// Units currently on the lot.
    pub available_units: u32,
    /// Price per rental day, smallest currency unit.
    pub unit_price: Amount,
    /// Creation time, unix seconds.
    pub created_at: Timestamp,
    /// Last mutation time, unix seconds. Monotonic per row.
    pub updated_at: Timestamp,
}

impl Vehicle {
    /// True when at least one unit can still be handed out.
    pub fn in_stock(&self) -> bool {
        self.available_units > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: VehicleId(1),
            name: "Toyota Avanza".to_string(),
            category: "mpv".to_string(),
            available_units: 3,
            unit_price: 100_000,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_in_stock() {
        let mut vehicle = sample();
        assert!(vehicle.in_stock());
        vehicle.available_units = 0;
        assert!(!vehicle.in_stock());
    }

    #[test]
    fn test_vehicle_serde() {
        let vehicle = sample();
        let json = serde_json::to_string(&vehicle).unwrap();
        assert!(json.contains("\"available_units\":3"));
        let back: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vehicle);
    }
}
