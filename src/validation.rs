//! Per-field acceptance rules for the vehicle form.
//!
//! Every rule looks at exactly one field. A form is submittable when no rule
//! reports an error; the collected messages are shown verbatim next to the
//! offending fields.

use crate::form::{Field, FormState};
use chrono::Datelike;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::ops::RangeInclusive;

pub const MIN_YEAR: i32 = 1950;
/// The service rejects engines under 100 cc; the form works in liters.
pub const MIN_ENGINE_LITERS: f64 = 0.1;
pub const OWNER_COUNT_RANGE: RangeInclusive<u32> = 0..=10;
pub const SEATS_RANGE: RangeInclusive<u32> = 1..=20;

/// Error message per failing field. Empty means the form is submittable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn record<T>(&mut self, field: Field, outcome: Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.0.insert(field, message);
                None
            }
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Form values that passed every rule, still in form units.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInput {
    pub year: i32,
    pub mileage: f64,
    pub brand: String,
    pub model: String,
    pub fuel_type: String,
    pub transmission: String,
    pub owner_count: u32,
    /// Liters.
    pub engine_size: f64,
    pub seats: u32,
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub fn max_year(current_year: i32) -> i32 {
    current_year + 1
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_integer(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|v| v.fract() == 0.0)
}

fn check_year(raw: &str, current_year: i32) -> Result<i32, String> {
    let max = max_year(current_year);
    parse_integer(raw)
        .filter(|v| (f64::from(MIN_YEAR)..=f64::from(max)).contains(v))
        .map(|v| v as i32)
        .ok_or_else(|| format!("Year must be between {} and {}", MIN_YEAR, max))
}

fn check_mileage(raw: &str) -> Result<f64, String> {
    parse_number(raw)
        .filter(|v| *v >= 0.0)
        .ok_or_else(|| "Mileage must be a non-negative number".to_string())
}

fn check_required(raw: &str, message: &str) -> Result<String, String> {
    if raw.is_empty() {
        Err(message.to_string())
    } else {
        Ok(raw.to_string())
    }
}

fn check_count(raw: &str, range: &RangeInclusive<u32>, message: &str) -> Result<u32, String> {
    parse_integer(raw)
        .filter(|v| (f64::from(*range.start())..=f64::from(*range.end())).contains(v))
        .map(|v| v as u32)
        .ok_or_else(|| message.to_string())
}

fn check_engine_size(raw: &str) -> Result<f64, String> {
    parse_number(raw)
        .filter(|v| *v >= MIN_ENGINE_LITERS)
        .ok_or_else(|| format!("Engine size must be at least {} L", MIN_ENGINE_LITERS))
}

/// Runs every rule against `form` using the calendar year `current_year`.
pub fn validate_for_year(
    form: &FormState,
    current_year: i32,
) -> Result<VehicleInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let year = errors.record(Field::Year, check_year(form.get(Field::Year), current_year));
    let mileage = errors.record(Field::Mileage, check_mileage(form.get(Field::Mileage)));
    let brand = errors.record(
        Field::Brand,
        check_required(form.get(Field::Brand), "Brand is required"),
    );
    let model = errors.record(
        Field::Model,
        check_required(form.get(Field::Model), "Model is required"),
    );
    let fuel_type = errors.record(
        Field::FuelType,
        check_required(form.get(Field::FuelType), "Fuel type is required"),
    );
    let transmission = errors.record(
        Field::Transmission,
        check_required(form.get(Field::Transmission), "Transmission is required"),
    );
    let owner_count = errors.record(
        Field::OwnerCount,
        check_count(
            form.get(Field::OwnerCount),
            &OWNER_COUNT_RANGE,
            "Owner count must be between 0 and 10",
        ),
    );
    let engine_size = errors.record(
        Field::EngineSize,
        check_engine_size(form.get(Field::EngineSize)),
    );
    let seats = errors.record(
        Field::Seats,
        check_count(
            form.get(Field::Seats),
            &SEATS_RANGE,
            "Seats must be between 1 and 20",
        ),
    );

    match (
        year,
        mileage,
        brand,
        model,
        fuel_type,
        transmission,
        owner_count,
        engine_size,
        seats,
    ) {
        (
            Some(year),
            Some(mileage),
            Some(brand),
            Some(model),
            Some(fuel_type),
            Some(transmission),
            Some(owner_count),
            Some(engine_size),
            Some(seats),
        ) if errors.is_empty() => Ok(VehicleInput {
            year,
            mileage,
            brand,
            model,
            fuel_type,
            transmission,
            owner_count,
            engine_size,
            seats,
        }),
        _ => Err(errors),
    }
}

pub fn validate(form: &FormState) -> Result<VehicleInput, ValidationErrors> {
    validate_for_year(form, current_year())
}

/// The error map alone; empty when the form is submittable.
pub fn check(form: &FormState, current_year: i32) -> ValidationErrors {
    validate_for_year(form, current_year).err().unwrap_or_default()
}
