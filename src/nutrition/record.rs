use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Where a nutrition record came from.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutritionSource {
    PrimaryProvider,
    SecondaryProvider,
    Local,
}

impl NutritionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionSource::PrimaryProvider => "primary_provider",
            NutritionSource::SecondaryProvider => "secondary_provider",
            NutritionSource::Local => "local",
        }
    }
}

impl fmt::Display for NutritionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NutritionSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary_provider" => Ok(NutritionSource::PrimaryProvider),
            "secondary_provider" => Ok(NutritionSource::SecondaryProvider),
            "local" => Ok(NutritionSource::Local),
            other => anyhow::bail!("unknown nutrition source: {other}"),
        }
    }
}

/// Nutrition facts per 100 g. Built once, never mutated.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct NutritionRecord {
    kcal_per_100g: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    source: NutritionSource,
}

impl NutritionRecord {
    pub fn new(
        kcal_per_100g: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        source: NutritionSource,
    ) -> Self {
        Self {
            kcal_per_100g: non_negative(kcal_per_100g),
            protein: non_negative(protein),
            carbs: non_negative(carbs),
            fat: non_negative(fat),
            source,
        }
    }

    pub fn kcal_per_100g(&self) -> f64 {
        self.kcal_per_100g
    }

    pub fn protein(&self) -> f64 {
        self.protein
    }

    pub fn carbs(&self) -> f64 {
        self.carbs
    }

    pub fn fat(&self) -> f64 {
        self.fat
    }

    pub fn source(&self) -> NutritionSource {
        self.source
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}
