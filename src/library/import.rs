use serde::Serialize;
use tracing::{info, warn};

use crate::library::{Catalog, MixBook};
use crate::mixing::naming::same_name;
use crate::models::ExportData;

/// What to do when an imported record's name is already taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DuplicatePolicy {
    /// Keep the existing record and drop the imported one.
    #[default]
    Skip,
    /// Overwrite the existing record.
    Replace,
    /// Import under the first free name of the form `Name (n)`.
    Rename,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub fertilizers_added: usize,
    pub fertilizers_replaced: usize,
    pub fertilizers_skipped: usize,
    pub mixes_added: usize,
    pub mixes_replaced: usize,
    pub mixes_skipped: usize,
    /// `(original, new)` names of records imported under a new name.
    pub renamed: Vec<(String, String)>,
}

fn free_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut n = 1usize;
    loop {
        let candidate = format!("{base} ({n})");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Merge imported fertilizers and mixes into the libraries.
///
/// Fertilizers go first so that a renamed fertilizer can be followed by the
/// imported mixes that reference it.
pub fn import(
    data: ExportData,
    catalog: &mut Catalog,
    mixes: &mut MixBook,
    policy: DuplicatePolicy,
) -> ImportReport {
    let mut report = ImportReport::default();
    let mut fert_renames: Vec<(String, String)> = Vec::new();

    for mut fert in data.fertilizers {
        if fert.validate().is_err() {
            warn!(name = %fert.name, "skipping invalid imported fertilizer");
            report.fertilizers_skipped += 1;
            continue;
        }
        if !catalog.contains(&fert.name) {
            catalog.upsert(fert);
            report.fertilizers_added += 1;
            continue;
        }
        match policy {
            DuplicatePolicy::Skip => report.fertilizers_skipped += 1,
            DuplicatePolicy::Replace => {
                catalog.upsert(fert);
                report.fertilizers_replaced += 1;
            }
            DuplicatePolicy::Rename => {
                let new_name = free_name(&fert.name, |n| catalog.contains(n));
                fert_renames.push((fert.name.clone(), new_name.clone()));
                fert.name = new_name;
                catalog.upsert(fert);
                report.fertilizers_added += 1;
            }
        }
    }

    for mut mix in data.mixes {
        for ingredient in &mut mix.ingredients {
            if let Some((_, new)) = fert_renames
                .iter()
                .find(|(old, _)| same_name(old, &ingredient.fertilizer_name))
            {
                ingredient.fertilizer_name = new.clone();
            }
        }
        if mix.name.trim().is_empty() {
            report.mixes_skipped += 1;
            continue;
        }
        if !mixes.contains(&mix.name) {
            mixes.upsert(mix);
            report.mixes_added += 1;
            continue;
        }
        match policy {
            DuplicatePolicy::Skip => report.mixes_skipped += 1,
            DuplicatePolicy::Replace => {
                mixes.upsert(mix);
                report.mixes_replaced += 1;
            }
            DuplicatePolicy::Rename => {
                let new_name = free_name(&mix.name, |n| mixes.contains(n));
                report.renamed.push((mix.name.clone(), new_name.clone()));
                mix.name = new_name;
                mixes.upsert(mix);
                report.mixes_added += 1;
            }
        }
    }

    report.renamed.splice(0..0, fert_renames);
    info!(
        fertilizers_added = report.fertilizers_added,
        fertilizers_replaced = report.fertilizers_replaced,
        mixes_added = report.mixes_added,
        mixes_replaced = report.mixes_replaced,
        renamed = report.renamed.len(),
        "import finished"
    );
    report
}

/// Snapshot the libraries for export.
pub fn export(catalog: &Catalog, mixes: &MixBook) -> ExportData {
    ExportData {
        fertilizers: catalog.records().to_vec(),
        mixes: mixes.records().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fertilizer, FertilizerMix, FertilizerQuantity, NutrientKind};

    fn libs() -> (Catalog, MixBook) {
        let catalog = Catalog::from_records(vec![
            Fertilizer::named("CalNit").with(NutrientKind::Calcium, 19.0),
        ]);
        let mixes = MixBook::from_records(vec![FertilizerMix::new(
            "Veg",
            vec![FertilizerQuantity::new("CalNit", 1.0)],
        )]);
        (catalog, mixes)
    }

    fn incoming() -> ExportData {
        ExportData {
            fertilizers: vec![
                Fertilizer::named("calnit").with(NutrientKind::Calcium, 15.5),
                Fertilizer::named("Epsom").with(NutrientKind::Magnesium, 9.8),
            ],
            mixes: vec![FertilizerMix::new(
                "Veg",
                vec![
                    FertilizerQuantity::new("calnit", 2.0),
                    FertilizerQuantity::new("Epsom", 0.5),
                ],
            )],
        }
    }

    #[test]
    fn skip_keeps_existing_records() {
        let (mut c, mut m) = libs();
        let r = import(incoming(), &mut c, &mut m, DuplicatePolicy::Skip);
        assert_eq!((r.fertilizers_added, r.fertilizers_skipped), (1, 1));
        assert_eq!(r.mixes_skipped, 1);
        assert_eq!(c.get("CalNit").unwrap().calcium_percent, 19.0);
        assert_eq!(m.get("Veg").unwrap().ingredients.len(), 1);
    }

    #[test]
    fn replace_overwrites_existing_records() {
        let (mut c, mut m) = libs();
        let r = import(incoming(), &mut c, &mut m, DuplicatePolicy::Replace);
        assert_eq!(r.fertilizers_replaced, 1);
        assert_eq!(r.mixes_replaced, 1);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("CalNit").unwrap().calcium_percent, 15.5);
        assert_eq!(m.get("Veg").unwrap().ingredients.len(), 2);
    }

    #[test]
    fn rename_rewrites_imported_mix_ingredients() {
        let (mut c, mut m) = libs();
        let r = import(incoming(), &mut c, &mut m, DuplicatePolicy::Rename);
        assert_eq!(
            r.renamed,
            vec![
                ("calnit".to_string(), "calnit (1)".to_string()),
                ("Veg".to_string(), "Veg (1)".to_string()),
            ]
        );
        assert_eq!(c.len(), 3);
        let imported = m.get("Veg (1)").unwrap();
        assert_eq!(imported.ingredients[0].fertilizer_name, "calnit (1)");
        assert_eq!(m.get("Veg").unwrap().ingredients[0].fertilizer_name, "CalNit");
    }
}
