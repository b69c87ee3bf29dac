use crate::validation::VehicleInput;

pub const CC_PER_LITER: f64 = 1000.0;

/// Numeric fields expressed in the units the service expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceUnits {
    pub year: i32,
    pub mileage_km: f64,
    pub owner_count: u32,
    /// `None` when the conversion did not produce a finite number.
    pub engine_cc: Option<f64>,
    pub seats: u32,
}

pub fn liters_to_cc(liters: f64) -> Option<f64> {
    Some(liters * CC_PER_LITER).filter(|cc| cc.is_finite())
}

pub fn to_service_units(input: &VehicleInput) -> ServiceUnits {
    ServiceUnits {
        year: input.year,
        mileage_km: input.mileage,
        owner_count: input.owner_count,
        engine_cc: liters_to_cc(input.engine_size),
        seats: input.seats,
    }
}
