use crate::errors::{Error, Result};
use crate::units::ServiceUnits;
use crate::validation::VehicleInput;
use serde::{Deserialize, Serialize};

/// Body of `POST /predict`. Serialises to exactly these nine keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionRequest {
    pub brand: String,
    pub model: String,
    pub fuel_type: String,
    pub transmission: String,
    pub year: i32,
    pub mileage_km: f64,
    pub owner_count: u32,
    pub engine_cc: f64,
    pub seats: u32,
}

pub const REQUEST_FIELDS: [&str; 9] = [
    "brand",
    "model",
    "fuel_type",
    "transmission",
    "year",
    "mileage_km",
    "owner_count",
    "engine_cc",
    "seats",
];

pub fn build_request(input: &VehicleInput, units: &ServiceUnits) -> Result<PredictionRequest> {
    let engine_cc = units
        .engine_cc
        .ok_or(Error::MissingConversion("engine_cc"))?;
    Ok(PredictionRequest {
        brand: input.brand.clone(),
        model: input.model.clone(),
        fuel_type: input.fuel_type.clone(),
        transmission: input.transmission.clone(),
        year: units.year,
        mileage_km: units.mileage_km,
        owner_count: units.owner_count,
        engine_cc,
        seats: units.seats,
    })
}
