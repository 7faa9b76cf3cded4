use fertmix_rs::{
    DisplayMode, Fertilizer, FertilizerInput, FertilizerMix, FertilizerQuantity, NutrientKind,
    UnitSystem, aggregate,
};
use std::collections::HashMap;

fn approx(v: f64, expected: f64, tol: f64) {
    assert!(
        (v - expected).abs() <= tol,
        "value {v} not within {tol} of {expected}"
    );
}

fn catalog() -> HashMap<String, Fertilizer> {
    let jacks = FertilizerInput {
        name: "Jacks 20-20-20".into(),
        values: vec![
            (NutrientKind::Nitrogen, 20.0),
            (NutrientKind::Phosphorus, 20.0),
            (NutrientKind::Potassium, 20.0),
        ],
        phosphorus_as_oxide: true,
        potassium_as_oxide: true,
    }
    .into_fertilizer()
    .unwrap();
    let calnit = Fertilizer::named("Calcium Nitrate")
        .with(NutrientKind::Nitrogen, 15.5)
        .with(NutrientKind::Calcium, 19.0);
    let epsom = Fertilizer::named("Epsom Salt")
        .with(NutrientKind::Magnesium, 9.8)
        .with(NutrientKind::Sulfur, 13.0);
    [jacks, calnit, epsom]
        .into_iter()
        .map(|f| (f.name.clone(), f))
        .collect()
}

#[test]
fn single_ingredient_matches_worked_example() {
    let mix = FertilizerMix::new("Test", vec![FertilizerQuantity::new("Jacks 20-20-20", 10.0)]);
    let metric = aggregate(&mix, &catalog(), UnitSystem::Metric);

    approx(metric.grams(NutrientKind::Nitrogen), 2.0, 1e-12);
    approx(metric.ppm(NutrientKind::Nitrogen), 2000.0, 1e-9);
    // label P2O5 / K2O stored as elemental
    approx(metric.grams(NutrientKind::Phosphorus), 0.2 * 0.4364 * 10.0, 1e-12);
    approx(metric.grams(NutrientKind::Potassium), 0.2 * 0.8301 * 10.0, 1e-12);

    let imperial = aggregate(&mix, &catalog(), UnitSystem::Imperial);
    approx(imperial.ppm(NutrientKind::Nitrogen), 528.3, 0.05);
}

#[test]
fn totals_equal_sum_of_weighted_contributions() {
    let cat = catalog();
    let ingredients = vec![
        FertilizerQuantity::new("Calcium Nitrate", 0.9),
        FertilizerQuantity::new("Epsom Salt", 0.5),
        FertilizerQuantity::new("Jacks 20-20-20", 0.6),
    ];
    let mix = FertilizerMix::new("Bloom", ingredients.clone());
    let profile = aggregate(&mix, &cat, UnitSystem::Metric);

    for kind in NutrientKind::ALL {
        let expected: f64 = ingredients
            .iter()
            .map(|i| cat[&i.fertilizer_name].percent(kind) / 100.0 * i.quantity)
            .sum();
        approx(profile.grams(kind), expected, 1e-12);
    }
    approx(profile.total_quantity(), 2.0, 1e-12);
}

#[test]
fn empty_mix_is_all_zero() {
    let mix = FertilizerMix::new("Nothing", vec![]);
    let profile = aggregate(&mix, &catalog(), UnitSystem::Imperial);
    for mode in [
        DisplayMode::Grams,
        DisplayMode::Ppm,
        DisplayMode::Normalized,
        DisplayMode::Percent,
    ] {
        assert!(profile.values(mode).iter().all(|(_, v)| *v == 0.0));
    }
}

#[test]
fn toggling_units_restores_ppm() {
    let mix = FertilizerMix::new(
        "Veg",
        vec![
            FertilizerQuantity::new("Calcium Nitrate", 1.2),
            FertilizerQuantity::new("Epsom Salt", 0.6),
        ],
    );
    let metric = aggregate(&mix, &catalog(), UnitSystem::Metric);
    let round_trip = metric
        .clone()
        .with_units(UnitSystem::Imperial)
        .with_units(UnitSystem::Metric);
    for kind in NutrientKind::ALL {
        approx(round_trip.ppm(kind), metric.ppm(kind), 1e-9);
    }
    let imperial = metric.clone().with_units(UnitSystem::Imperial);
    approx(
        imperial.ppm(NutrientKind::Calcium) * 3.78541,
        metric.ppm(NutrientKind::Calcium),
        1e-9,
    );
    // ratios do not depend on the batch basis
    approx(
        imperial.weighted_percent(NutrientKind::Calcium),
        metric.weighted_percent(NutrientKind::Calcium),
        1e-12,
    );
}

#[test]
fn deleted_fertilizer_contributes_nothing() {
    let mix = FertilizerMix::new(
        "Old",
        vec![
            FertilizerQuantity::new("Discontinued Bloom", 3.0),
            FertilizerQuantity::new("Epsom Salt", 1.0),
        ],
    );
    let profile = aggregate(&mix, &catalog(), UnitSystem::Metric);
    assert_eq!(profile.missing().len(), 1);
    approx(profile.weighted_percent(NutrientKind::Magnesium), 9.8, 1e-9);
}
