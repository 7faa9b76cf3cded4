use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chemistry::{LITERS_PER_GALLON, k2o_to_elemental, p2o5_to_elemental};
use crate::error::AppError;
use crate::mixing::naming::same_name;

/// Nutrients tracked for every fertilizer, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NutrientKind {
    Nitrogen,
    Phosphorus,
    Potassium,
    Calcium,
    Magnesium,
    Sulfur,
    Boron,
    Copper,
    Iron,
    Manganese,
    Molybdenum,
    Zinc,
    Chlorine,
    Silica,
    HumicAcid,
    FulvicAcid,
}

impl NutrientKind {
    pub const COUNT: usize = 16;

    pub const ALL: [NutrientKind; Self::COUNT] = [
        NutrientKind::Nitrogen,
        NutrientKind::Phosphorus,
        NutrientKind::Potassium,
        NutrientKind::Calcium,
        NutrientKind::Magnesium,
        NutrientKind::Sulfur,
        NutrientKind::Boron,
        NutrientKind::Copper,
        NutrientKind::Iron,
        NutrientKind::Manganese,
        NutrientKind::Molybdenum,
        NutrientKind::Zinc,
        NutrientKind::Chlorine,
        NutrientKind::Silica,
        NutrientKind::HumicAcid,
        NutrientKind::FulvicAcid,
    ];

    /// Position in [`NutrientKind::ALL`], used to index accumulators.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NutrientKind::Nitrogen => "N",
            NutrientKind::Phosphorus => "P",
            NutrientKind::Potassium => "K",
            NutrientKind::Calcium => "Ca",
            NutrientKind::Magnesium => "Mg",
            NutrientKind::Sulfur => "S",
            NutrientKind::Boron => "B",
            NutrientKind::Copper => "Cu",
            NutrientKind::Iron => "Fe",
            NutrientKind::Manganese => "Mn",
            NutrientKind::Molybdenum => "Mo",
            NutrientKind::Zinc => "Zn",
            NutrientKind::Chlorine => "Cl",
            NutrientKind::Silica => "Si",
            NutrientKind::HumicAcid => "Humic",
            NutrientKind::FulvicAcid => "Fulvic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NutrientKind::Nitrogen => "Nitrogen",
            NutrientKind::Phosphorus => "Phosphorus",
            NutrientKind::Potassium => "Potassium",
            NutrientKind::Calcium => "Calcium",
            NutrientKind::Magnesium => "Magnesium",
            NutrientKind::Sulfur => "Sulfur",
            NutrientKind::Boron => "Boron",
            NutrientKind::Copper => "Copper",
            NutrientKind::Iron => "Iron",
            NutrientKind::Manganese => "Manganese",
            NutrientKind::Molybdenum => "Molybdenum",
            NutrientKind::Zinc => "Zinc",
            NutrientKind::Chlorine => "Chlorine",
            NutrientKind::Silica => "Silica",
            NutrientKind::HumicAcid => "Humic acid",
            NutrientKind::FulvicAcid => "Fulvic acid",
        }
    }
}

impl fmt::Display for NutrientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Batch basis for quantities: grams per liter (metric) or per US gallon (imperial).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn liters_per_batch_unit(self) -> f64 {
        match self {
            UnitSystem::Metric => 1.0,
            UnitSystem::Imperial => LITERS_PER_GALLON,
        }
    }

    pub fn batch_unit(self) -> &'static str {
        match self {
            UnitSystem::Metric => "L",
            UnitSystem::Imperial => "gal",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => f.write_str("metric"),
            UnitSystem::Imperial => f.write_str("imperial"),
        }
    }
}

/// Static composition of a single fertilizer product.
///
/// Percentages are mass percent (0..100). `phosphorus_percent` and
/// `potassium_percent` always hold elemental values; the oxide flags and
/// original values only let an edit form show what the user typed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Fertilizer {
    pub name: String,
    pub nitrogen_percent: f64,
    pub phosphorus_percent: f64,
    pub potassium_percent: f64,
    pub calcium_percent: f64,
    pub magnesium_percent: f64,
    pub sulfur_percent: f64,
    pub boron_percent: f64,
    pub copper_percent: f64,
    pub iron_percent: f64,
    pub manganese_percent: f64,
    pub molybdenum_percent: f64,
    pub zinc_percent: f64,
    pub chlorine_percent: f64,
    pub silica_percent: f64,
    pub humic_acid_percent: f64,
    pub fulvic_acid_percent: f64,
    pub is_phosphorus_in_oxide_form: bool,
    pub is_potassium_in_oxide_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_phosphorus_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_potassium_value: Option<f64>,
}

impl Fertilizer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for an elemental percentage.
    pub fn with(mut self, kind: NutrientKind, percent: f64) -> Self {
        self.set_percent(kind, percent);
        self
    }

    pub fn percent(&self, kind: NutrientKind) -> f64 {
        match kind {
            NutrientKind::Nitrogen => self.nitrogen_percent,
            NutrientKind::Phosphorus => self.phosphorus_percent,
            NutrientKind::Potassium => self.potassium_percent,
            NutrientKind::Calcium => self.calcium_percent,
            NutrientKind::Magnesium => self.magnesium_percent,
            NutrientKind::Sulfur => self.sulfur_percent,
            NutrientKind::Boron => self.boron_percent,
            NutrientKind::Copper => self.copper_percent,
            NutrientKind::Iron => self.iron_percent,
            NutrientKind::Manganese => self.manganese_percent,
            NutrientKind::Molybdenum => self.molybdenum_percent,
            NutrientKind::Zinc => self.zinc_percent,
            NutrientKind::Chlorine => self.chlorine_percent,
            NutrientKind::Silica => self.silica_percent,
            NutrientKind::HumicAcid => self.humic_acid_percent,
            NutrientKind::FulvicAcid => self.fulvic_acid_percent,
        }
    }

    pub fn set_percent(&mut self, kind: NutrientKind, percent: f64) {
        let slot = match kind {
            NutrientKind::Nitrogen => &mut self.nitrogen_percent,
            NutrientKind::Phosphorus => &mut self.phosphorus_percent,
            NutrientKind::Potassium => &mut self.potassium_percent,
            NutrientKind::Calcium => &mut self.calcium_percent,
            NutrientKind::Magnesium => &mut self.magnesium_percent,
            NutrientKind::Sulfur => &mut self.sulfur_percent,
            NutrientKind::Boron => &mut self.boron_percent,
            NutrientKind::Copper => &mut self.copper_percent,
            NutrientKind::Iron => &mut self.iron_percent,
            NutrientKind::Manganese => &mut self.manganese_percent,
            NutrientKind::Molybdenum => &mut self.molybdenum_percent,
            NutrientKind::Zinc => &mut self.zinc_percent,
            NutrientKind::Chlorine => &mut self.chlorine_percent,
            NutrientKind::Silica => &mut self.silica_percent,
            NutrientKind::HumicAcid => &mut self.humic_acid_percent,
            NutrientKind::FulvicAcid => &mut self.fulvic_acid_percent,
        };
        *slot = percent;
    }

    /// Check the name and that every percentage is a finite value in 0..=100.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::InvalidFertilizer {
                name: self.name.clone(),
                reason: "name must not be empty".into(),
            });
        }
        for kind in NutrientKind::ALL {
            let v = self.percent(kind);
            if !v.is_finite() || !(0.0..=100.0).contains(&v) {
                return Err(AppError::InvalidFertilizer {
                    name: self.name.clone(),
                    reason: format!("{} must be between 0 and 100 (got {v})", kind.label()),
                });
            }
        }
        Ok(())
    }

    /// Rebuild the add/edit form for this record, restoring oxide-form input.
    pub fn to_input(&self) -> FertilizerInput {
        let values = NutrientKind::ALL
            .iter()
            .map(|&kind| {
                let v = match kind {
                    NutrientKind::Phosphorus if self.is_phosphorus_in_oxide_form => self
                        .original_phosphorus_value
                        .unwrap_or(self.phosphorus_percent),
                    NutrientKind::Potassium if self.is_potassium_in_oxide_form => self
                        .original_potassium_value
                        .unwrap_or(self.potassium_percent),
                    _ => self.percent(kind),
                };
                (kind, v)
            })
            .filter(|(_, v)| *v != 0.0)
            .collect();
        FertilizerInput {
            name: self.name.clone(),
            values,
            phosphorus_as_oxide: self.is_phosphorus_in_oxide_form,
            potassium_as_oxide: self.is_potassium_in_oxide_form,
        }
    }
}

/// Raw add/edit form values. P and K may be given in oxide form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FertilizerInput {
    pub name: String,
    pub values: Vec<(NutrientKind, f64)>,
    pub phosphorus_as_oxide: bool,
    pub potassium_as_oxide: bool,
}

impl FertilizerInput {
    /// Apply the oxide conversion once and validate the resulting record.
    pub fn into_fertilizer(self) -> Result<Fertilizer, AppError> {
        let mut fert = Fertilizer::named(self.name.trim());
        for (kind, v) in self.values {
            fert.set_percent(kind, v);
        }
        if self.phosphorus_as_oxide {
            let raw = fert.phosphorus_percent;
            fert.is_phosphorus_in_oxide_form = true;
            fert.original_phosphorus_value = Some(raw);
            fert.phosphorus_percent = p2o5_to_elemental(raw);
        }
        if self.potassium_as_oxide {
            let raw = fert.potassium_percent;
            fert.is_potassium_in_oxide_form = true;
            fert.original_potassium_value = Some(raw);
            fert.potassium_percent = k2o_to_elemental(raw);
        }
        fert.validate()?;
        Ok(fert)
    }
}

/// One ingredient of a mix: a fertilizer referenced by name and its quantity
/// (grams or milliliters per batch unit).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FertilizerQuantity {
    pub fertilizer_name: String,
    pub quantity: f64,
}

impl FertilizerQuantity {
    pub fn new(fertilizer_name: impl Into<String>, quantity: f64) -> Self {
        Self {
            fertilizer_name: fertilizer_name.into(),
            quantity,
        }
    }
}

impl FromStr for FertilizerQuantity {
    type Err = AppError;

    /// Parse `NAME=QUANTITY`; the last `=` separates so names may contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidIngredient { spec: s.to_string() };
        let (name, qty) = s.rsplit_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        let quantity: f64 = qty.trim().parse().map_err(|_| invalid())?;
        if name.is_empty() || !quantity.is_finite() || quantity < 0.0 {
            return Err(invalid());
        }
        Ok(Self::new(name, quantity))
    }
}

/// A named, ordered recipe for one batch unit of nutrient solution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FertilizerMix {
    pub name: String,
    pub ingredients: Vec<FertilizerQuantity>,
}

impl FertilizerMix {
    pub fn new(name: impl Into<String>, ingredients: Vec<FertilizerQuantity>) -> Self {
        Self {
            name: name.into(),
            ingredients,
        }
    }

    /// Add an ingredient, or increase its quantity if the fertilizer is already used.
    pub fn add_ingredient(&mut self, fertilizer_name: &str, quantity: f64) {
        match self
            .ingredients
            .iter_mut()
            .find(|i| same_name(&i.fertilizer_name, fertilizer_name))
        {
            Some(existing) => existing.quantity += quantity,
            None => self
                .ingredients
                .push(FertilizerQuantity::new(fertilizer_name, quantity)),
        }
    }

    /// Returns `false` when the fertilizer is not part of the mix.
    pub fn set_quantity(&mut self, fertilizer_name: &str, quantity: f64) -> bool {
        match self
            .ingredients
            .iter_mut()
            .find(|i| same_name(&i.fertilizer_name, fertilizer_name))
        {
            Some(existing) => {
                existing.quantity = quantity;
                true
            }
            None => false,
        }
    }

    pub fn remove_ingredient(&mut self, fertilizer_name: &str) -> Option<FertilizerQuantity> {
        let pos = self
            .ingredients
            .iter()
            .position(|i| same_name(&i.fertilizer_name, fertilizer_name))?;
        Some(self.ingredients.remove(pos))
    }

    pub fn total_quantity(&self) -> f64 {
        self.ingredients.iter().map(|i| i.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

/// Persisted user preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppSettings {
    pub unit_system: UnitSystem,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::Metric,
            accent_color: "#2E7D32".into(),
            background_color: "#FFFFFF".into(),
            text_color: "#212121".into(),
        }
    }
}

impl AppSettings {
    pub fn use_imperial_units(&self) -> bool {
        self.unit_system == UnitSystem::Imperial
    }

    pub fn toggle_units(&mut self) -> UnitSystem {
        self.unit_system = self.unit_system.toggled();
        self.unit_system
    }

    /// Set one of the colour preferences (`accent`, `background`, `text`).
    pub fn set_color(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let valid = value.len() == 7
            && value.starts_with('#')
            && value[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(AppError::InvalidColor {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        let slot = match key.to_ascii_lowercase().as_str() {
            "accent" => &mut self.accent_color,
            "background" => &mut self.background_color,
            "text" => &mut self.text_color,
            _ => return Err(AppError::UnknownColorKey(key.to_string())),
        };
        *slot = value.to_ascii_uppercase();
        Ok(())
    }
}

/// Envelope written by export and read by import.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExportData {
    pub fertilizers: Vec<Fertilizer>,
    pub mixes: Vec<FertilizerMix>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oxide_input_is_stored_elemental_and_restored_for_edit() {
        let input = FertilizerInput {
            name: "MKP".into(),
            values: vec![
                (NutrientKind::Phosphorus, 52.0),
                (NutrientKind::Potassium, 34.0),
            ],
            phosphorus_as_oxide: true,
            potassium_as_oxide: true,
        };
        let fert = input.clone().into_fertilizer().unwrap();
        assert!((fert.phosphorus_percent - 22.6928).abs() < 1e-9);
        assert!((fert.potassium_percent - 28.2234).abs() < 1e-9);
        assert_eq!(fert.original_phosphorus_value, Some(52.0));
        assert_eq!(fert.to_input(), input);
    }

    #[test]
    fn rejects_out_of_range_percent() {
        let err = Fertilizer::named("Bad")
            .with(NutrientKind::Nitrogen, 120.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("Nitrogen"));
        assert!(Fertilizer::named("  ").validate().is_err());
    }

    #[test]
    fn parses_ingredient_specs() {
        let q: FertilizerQuantity = "Jacks 5-12-26 = 1.5".parse().unwrap();
        assert_eq!(q, FertilizerQuantity::new("Jacks 5-12-26", 1.5));
        let q: FertilizerQuantity = "A=B=2".parse().unwrap();
        assert_eq!(q.fertilizer_name, "A=B");
        assert!("NoQuantity".parse::<FertilizerQuantity>().is_err());
        assert!("X=-1".parse::<FertilizerQuantity>().is_err());
        assert!("=3".parse::<FertilizerQuantity>().is_err());
    }

    #[test]
    fn current_mix_editing() {
        let mut mix = FertilizerMix::new("Veg", vec![]);
        mix.add_ingredient("Epsom", 0.5);
        mix.add_ingredient("CalNit", 1.0);
        mix.add_ingredient("Epsom", 0.25);
        assert_eq!(mix.ingredients.len(), 2);
        assert!((mix.total_quantity() - 1.75).abs() < 1e-12);
        assert!(mix.set_quantity("CalNit", 2.0));
        assert!(!mix.set_quantity("Missing", 2.0));
        assert_eq!(mix.remove_ingredient("Epsom").map(|q| q.quantity), Some(0.75));
        assert_eq!(mix.ingredients, vec![FertilizerQuantity::new("CalNit", 2.0)]);
    }

    #[test]
    fn mix_editing_ignores_name_case() {
        let mut mix = FertilizerMix::new("Veg", vec![]);
        mix.add_ingredient("Epsom", 1.0);
        mix.add_ingredient("epsom", 1.0);
        assert_eq!(mix.ingredients, vec![FertilizerQuantity::new("Epsom", 2.0)]);
        assert!(mix.set_quantity("EPSOM", 0.5));
        assert_eq!(mix.remove_ingredient("ePsOm").map(|q| q.quantity), Some(0.5));
        assert!(mix.is_empty());
    }

    #[test]
    fn settings_toggle_and_colors() {
        let mut s = AppSettings::default();
        assert!(!s.use_imperial_units());
        assert_eq!(s.toggle_units(), UnitSystem::Imperial);
        assert!(s.use_imperial_units());
        s.set_color("Accent", "#a1b2c3").unwrap();
        assert_eq!(s.accent_color, "#A1B2C3");
        assert!(s.set_color("accent", "red").is_err());
        assert!(matches!(
            s.set_color("border", "#000000"),
            Err(AppError::UnknownColorKey(_))
        ));
    }
}
