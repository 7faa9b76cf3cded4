use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::chemistry::{MG_PER_G, grams_to_ppm, nutrient_grams};
use crate::mixing::naming::same_name;
use crate::models::{Fertilizer, FertilizerMix, NutrientKind, UnitSystem};

/// Name-based access to fertilizer records.
///
/// Mix ingredients reference fertilizers by name only, so anything that can
/// resolve a name can act as the catalog for a calculation.
pub trait FertilizerLookup {
    fn lookup(&self, name: &str) -> Option<&Fertilizer>;
}

impl FertilizerLookup for HashMap<String, Fertilizer> {
    fn lookup(&self, name: &str) -> Option<&Fertilizer> {
        self.get(name)
    }
}

impl FertilizerLookup for BTreeMap<String, Fertilizer> {
    fn lookup(&self, name: &str) -> Option<&Fertilizer> {
        self.get(name)
    }
}

impl FertilizerLookup for [Fertilizer] {
    fn lookup(&self, name: &str) -> Option<&Fertilizer> {
        self.iter()
            .find(|f| f.name == name)
            .or_else(|| self.iter().find(|f| same_name(&f.name, name)))
    }
}

/// How nutrient totals are presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Grams of nutrient per batch unit.
    Grams,
    /// Milligrams per liter of final solution.
    #[default]
    Ppm,
    /// Nutrient grams per gram of blend, times 1000.
    Normalized,
    /// Weighted-average percentage of the blend.
    Percent,
}

impl DisplayMode {
    pub fn unit_label(self, units: UnitSystem) -> String {
        match self {
            DisplayMode::Grams => format!("g/{}", units.batch_unit()),
            DisplayMode::Ppm => "ppm".to_string(),
            DisplayMode::Normalized => "mg/g".to_string(),
            DisplayMode::Percent => "%".to_string(),
        }
    }
}

/// Accumulated nutrient totals for one mix.
///
/// Holds grams of each nutrient per batch unit together with the batch basis
/// and the total quantity of resolved ingredients. Every presentation is
/// derived from these totals, so the imperial conversion is applied exactly
/// once and switching units back and forth gives the same numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct NutrientProfile {
    grams: [f64; NutrientKind::COUNT],
    total_quantity: f64,
    units: UnitSystem,
    missing: Vec<String>,
}

impl NutrientProfile {
    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Same totals on a different batch basis.
    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// Sum of quantities of the ingredients that resolved in the catalog.
    pub fn total_quantity(&self) -> f64 {
        self.total_quantity
    }

    /// Ingredient names that could not be resolved and were skipped.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn grams(&self, kind: NutrientKind) -> f64 {
        self.grams[kind.index()]
    }

    pub fn ppm(&self, kind: NutrientKind) -> f64 {
        grams_to_ppm(self.grams(kind), self.units)
    }

    /// Returns 0 when the mix has no quantity.
    pub fn normalized(&self, kind: NutrientKind) -> f64 {
        self.per_unit_quantity(kind) * MG_PER_G
    }

    /// Returns 0 when the mix has no quantity.
    pub fn weighted_percent(&self, kind: NutrientKind) -> f64 {
        self.per_unit_quantity(kind) * 100.0
    }

    fn per_unit_quantity(&self, kind: NutrientKind) -> f64 {
        if self.total_quantity > 0.0 {
            self.grams(kind) / self.total_quantity
        } else {
            0.0
        }
    }

    pub fn value(&self, kind: NutrientKind, mode: DisplayMode) -> f64 {
        match mode {
            DisplayMode::Grams => self.grams(kind),
            DisplayMode::Ppm => self.ppm(kind),
            DisplayMode::Normalized => self.normalized(kind),
            DisplayMode::Percent => self.weighted_percent(kind),
        }
    }

    /// `(kind, value)` rows in display order.
    pub fn values(&self, mode: DisplayMode) -> Vec<(NutrientKind, f64)> {
        NutrientKind::ALL
            .iter()
            .map(|&k| (k, self.value(k, mode)))
            .collect()
    }
}

/// Compute per-nutrient totals for a mix.
///
/// Each ingredient contributes `(percent / 100) * quantity` grams of every
/// nutrient. Ingredients whose fertilizer is not in the catalog are skipped
/// and reported through [`NutrientProfile::missing`]; the calculation itself
/// never fails. An empty mix yields all-zero totals.
pub fn aggregate<C>(mix: &FertilizerMix, catalog: &C, units: UnitSystem) -> NutrientProfile
where
    C: FertilizerLookup + ?Sized,
{
    let mut grams = [0.0; NutrientKind::COUNT];
    let mut total_quantity = 0.0;
    let mut missing = Vec::new();

    for ingredient in &mix.ingredients {
        let Some(fert) = catalog.lookup(&ingredient.fertilizer_name) else {
            debug!(
                mix = %mix.name,
                fertilizer = %ingredient.fertilizer_name,
                "skipping ingredient not found in catalog"
            );
            missing.push(ingredient.fertilizer_name.clone());
            continue;
        };
        for kind in NutrientKind::ALL {
            grams[kind.index()] += nutrient_grams(fert.percent(kind), ingredient.quantity);
        }
        total_quantity += ingredient.quantity;
    }

    NutrientProfile {
        grams,
        total_quantity,
        units,
        missing,
    }
}

/// One nutrient row of a mix comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub nutrient: NutrientKind,
    pub left: f64,
    pub right: f64,
    pub difference: f64,
}

/// Side-by-side nutrient values of two mixes; `difference` is `right - left`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MixComparison {
    pub left: String,
    pub right: String,
    pub unit_system: UnitSystem,
    pub mode: DisplayMode,
    pub rows: Vec<ComparisonRow>,
}

pub fn compare<C>(
    left: &FertilizerMix,
    right: &FertilizerMix,
    catalog: &C,
    units: UnitSystem,
    mode: DisplayMode,
) -> MixComparison
where
    C: FertilizerLookup + ?Sized,
{
    let a = aggregate(left, catalog, units);
    let b = aggregate(right, catalog, units);
    let rows = NutrientKind::ALL
        .iter()
        .map(|&nutrient| {
            let l = a.value(nutrient, mode);
            let r = b.value(nutrient, mode);
            ComparisonRow {
                nutrient,
                left: l,
                right: r,
                difference: r - l,
            }
        })
        .collect();
    MixComparison {
        left: left.name.clone(),
        right: right.name.clone(),
        unit_system: units,
        mode,
        rows,
    }
}

/// One nutrient row of a calculation summary.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NutrientRow {
    pub nutrient: NutrientKind,
    pub symbol: &'static str,
    pub value: f64,
}

/// Serializable result for higher-level callers (e.g. CLI or UI).
///
/// Fields:
/// - `mix`: name of the calculated mix
/// - `unit_system`: batch basis used for PPM and grams
/// - `mode`: presentation of `nutrients`
/// - `unit`: label for the values (e.g. `ppm`, `g/L`)
/// - `total_quantity`: quantity of resolved ingredients per batch unit
/// - `missing`: ingredients skipped because their fertilizer is unknown
#[derive(Serialize, Debug, Clone)]
pub struct CalculationSummary {
    pub mix: String,
    pub unit_system: UnitSystem,
    pub mode: DisplayMode,
    pub unit: String,
    pub total_quantity: f64,
    pub missing: Vec<String>,
    pub nutrients: Vec<NutrientRow>,
}

/// Aggregate a mix and package the result in the requested presentation.
pub fn compute_summary<C>(
    mix: &FertilizerMix,
    catalog: &C,
    units: UnitSystem,
    mode: DisplayMode,
) -> CalculationSummary
where
    C: FertilizerLookup + ?Sized,
{
    let profile = aggregate(mix, catalog, units);
    let nutrients = profile
        .values(mode)
        .into_iter()
        .map(|(nutrient, value)| NutrientRow {
            nutrient,
            symbol: nutrient.symbol(),
            value,
        })
        .collect();
    CalculationSummary {
        mix: mix.name.clone(),
        unit_system: units,
        mode,
        unit: mode.unit_label(units),
        total_quantity: profile.total_quantity(),
        missing: profile.missing().to_vec(),
        nutrients,
    }
}
