use serde::{Deserialize, Serialize};

pub const MIN_GRAMS: f64 = 10.0;
pub const MAX_GRAMS: f64 = 1000.0;
pub const MIN_SERVINGS: f64 = 0.25;
pub const MAX_SERVINGS: f64 = 3.0;
pub const GRAMS_PER_SERVING: f64 = 100.0;

pub const SERVING_PRESETS: &[f64] = &[0.5, 1.0, 1.5, 2.0];
pub const GRAM_PRESETS: &[f64] = &[50.0, 100.0, 150.0, 200.0, 250.0];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortionUnit {
    Servings,
    Grams,
}

/// A portion where one field always derives from the other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PortionSpec {
    pub grams: f64,
    pub servings: f64,
}

impl PortionSpec {
    pub fn from_grams(grams: f64) -> Self {
        let grams = grams.clamp(MIN_GRAMS, MAX_GRAMS);
        let servings = ((grams / GRAMS_PER_SERVING) * 4.0).round() / 4.0;
        Self {
            grams,
            servings: servings.clamp(MIN_SERVINGS, MAX_SERVINGS),
        }
    }

    pub fn from_servings(servings: f64) -> Self {
        let servings = servings.clamp(MIN_SERVINGS, MAX_SERVINGS);
        let grams = (servings * GRAMS_PER_SERVING).round();
        Self {
            grams: grams.clamp(MIN_GRAMS, MAX_GRAMS),
            servings,
        }
    }

    pub fn from_unit(unit: PortionUnit, value: f64) -> Self {
        match unit {
            PortionUnit::Servings => Self::from_servings(value),
            PortionUnit::Grams => Self::from_grams(value),
        }
    }
}

impl Default for PortionSpec {
    fn default() -> Self {
        Self::from_servings(1.0)
    }
}

/// Emitted after every accepted edit.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PortionChanged {
    pub unit: PortionUnit,
    pub spec: PortionSpec,
}

/// Live binding between the portion controls: one active unit, the other derived.
#[derive(Debug, Clone)]
pub struct PortionEditor {
    unit: PortionUnit,
    spec: PortionSpec,
}

impl Default for PortionEditor {
    fn default() -> Self {
        Self {
            unit: PortionUnit::Servings,
            spec: PortionSpec::default(),
        }
    }
}

impl PortionEditor {
    pub fn unit(&self) -> PortionUnit {
        self.unit
    }

    pub fn spec(&self) -> PortionSpec {
        self.spec
    }

    pub fn presets(&self) -> &'static [f64] {
        match self.unit {
            PortionUnit::Servings => SERVING_PRESETS,
            PortionUnit::Grams => GRAM_PRESETS,
        }
    }

    /// Switches the active unit. The portion itself is unchanged.
    pub fn toggle_unit(&mut self) -> PortionChanged {
        self.unit = match self.unit {
            PortionUnit::Servings => PortionUnit::Grams,
            PortionUnit::Grams => PortionUnit::Servings,
        };
        self.event()
    }

    /// Slider or typed input for the active unit. Non-finite input is dropped.
    pub fn set_value(&mut self, value: f64) -> Option<PortionChanged> {
        if !value.is_finite() {
            return None;
        }
        self.spec = PortionSpec::from_unit(self.unit, value);
        Some(self.event())
    }

    pub fn apply_preset(&mut self, index: usize) -> Option<PortionChanged> {
        let value = *self.presets().get(index)?;
        self.set_value(value)
    }

    fn event(&self) -> PortionChanged {
        PortionChanged {
            unit: self.unit,
            spec: self.spec,
        }
    }
}
