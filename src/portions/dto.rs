use serde::{Deserialize, Serialize};

use super::calculator::{ounces_to_grams, Macros};
use super::editor::{PortionEditor, PortionSpec, PortionUnit};
use crate::nutrition::record::NutritionRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PresetChoice {
    pub unit: PortionUnit,
    pub index: usize,
}

/// Exactly one of `grams`, `servings`, `ounces` or `preset` drives the portion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortionInput {
    #[serde(default)]
    pub grams: Option<f64>,
    #[serde(default)]
    pub servings: Option<f64>,
    #[serde(default)]
    pub ounces: Option<f64>,
    #[serde(default)]
    pub preset: Option<PresetChoice>,
}

fn select(editor: &mut PortionEditor, unit: PortionUnit) {
    if editor.unit() != unit {
        editor.toggle_unit();
    }
}

impl PortionInput {
    /// Replays the input through a fresh editor, like a single user edit.
    pub fn to_spec(&self) -> Result<PortionSpec, String> {
        let given = [
            self.grams.is_some(),
            self.servings.is_some(),
            self.ounces.is_some(),
            self.preset.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        match given {
            0 => return Err("one of grams, servings, ounces or preset is required".into()),
            1 => {}
            _ => return Err("only one of grams, servings, ounces or preset may be set".into()),
        }

        let mut editor = PortionEditor::default();
        let change = if let Some(grams) = self.grams {
            select(&mut editor, PortionUnit::Grams);
            editor.set_value(grams)
        } else if let Some(ounces) = self.ounces {
            select(&mut editor, PortionUnit::Grams);
            editor.set_value(ounces_to_grams(ounces))
        } else if let Some(servings) = self.servings {
            select(&mut editor, PortionUnit::Servings);
            editor.set_value(servings)
        } else if let Some(choice) = self.preset {
            select(&mut editor, choice.unit);
            let change = editor
                .apply_preset(choice.index)
                .ok_or_else(|| format!("unknown {:?} preset {}", choice.unit, choice.index))?;
            Some(change)
        } else {
            None
        };

        change
            .map(|_| editor.spec())
            .ok_or_else(|| "portion value must be a finite number".into())
    }
}

#[derive(Debug, Deserialize)]
pub struct PortionRequest {
    pub food: String,
    #[serde(flatten)]
    pub portion: PortionInput,
}

#[derive(Debug, Serialize)]
pub struct PortionResult {
    pub food: String,
    pub nutrition: NutritionRecord,
    pub portion: PortionSpec,
    pub ounces: f64,
    pub calories: i64,
    pub macros: Macros,
}

#[derive(Debug, Serialize)]
pub struct PresetList {
    pub servings: &'static [f64],
    pub grams: &'static [f64],
}
