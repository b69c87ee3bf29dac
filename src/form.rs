//! Raw, user-entered vehicle attributes.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

pub const FUEL_TYPES: &[&str] = &["Petrol", "Diesel", "Hybrid", "Electric"];
pub const TRANSMISSIONS: &[&str] = &["Manual", "Automatic"];

/// Input fields of the vehicle form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Year,
    Mileage,
    Brand,
    Model,
    FuelType,
    Transmission,
    OwnerCount,
    EngineSize,
    Seats,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Year,
        Field::Mileage,
        Field::Brand,
        Field::Model,
        Field::FuelType,
        Field::Transmission,
        Field::OwnerCount,
        Field::EngineSize,
        Field::Seats,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Mileage => "mileage",
            Field::Brand => "brand",
            Field::Model => "model",
            Field::FuelType => "fuel_type",
            Field::Transmission => "transmission",
            Field::OwnerCount => "owner_count",
            Field::EngineSize => "engine_size",
            Field::Seats => "seats",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Mileage => "Mileage",
            Field::Brand => "Brand",
            Field::Model => "Model",
            Field::FuelType => "Fuel Type",
            Field::Transmission => "Transmission",
            Field::OwnerCount => "Owner Count",
            Field::EngineSize => "Engine Size (L)",
            Field::Seats => "Seats",
        }
    }

    /// Fixed choices offered by the presentation layer, if any.
    pub fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Field::FuelType => Some(FUEL_TYPES),
            Field::Transmission => Some(TRANSMISSIONS),
            _ => None,
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("unknown field: {}", s.trim()))
    }
}

/// One raw value per field. Missing entries read as empty input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<Field, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(|field| (field, self.get(field)))
    }
}
