use serde::{Deserialize, Serialize};

use crate::nutrition::record::NutritionRecord;

pub const GRAMS_PER_OUNCE: f64 = 28.349523125;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Half-up to one decimal for the non-negative values this crate deals in.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn scale(per_100g: f64, grams: f64) -> f64 {
    per_100g * grams / 100.0
}

/// Saturates at `i64::MAX` so the result stays monotonic in `grams`.
pub fn calories_for(record: &NutritionRecord, grams: f64) -> i64 {
    scale(record.kcal_per_100g(), grams).round() as i64
}

pub fn macros_for(record: &NutritionRecord, grams: f64) -> Macros {
    Macros {
        protein: round1(scale(record.protein(), grams)),
        carbs: round1(scale(record.carbs(), grams)),
        fat: round1(scale(record.fat(), grams)),
    }
}

pub fn grams_to_ounces(grams: f64) -> f64 {
    round1(grams / GRAMS_PER_OUNCE)
}

pub fn ounces_to_grams(ounces: f64) -> f64 {
    round1(ounces * GRAMS_PER_OUNCE)
}
