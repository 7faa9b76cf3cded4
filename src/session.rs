//! Application state loaded from a [`LibraryStore`], with every change saved
//! back immediately.

use std::path::Path;

use crate::adapters::store::{ExportFormat, LibraryStore, read_export, write_export};
use crate::error::AppError;
use crate::library::{Catalog, DuplicatePolicy, ImportReport, MixBook};
use crate::mixing::aggregator::{
    CalculationSummary, DisplayMode, MixComparison, compare, compute_summary,
};
use crate::models::{AppSettings, Fertilizer, FertilizerMix, UnitSystem};

pub struct Session<S: LibraryStore> {
    store: S,
    pub catalog: Catalog,
    pub mixes: MixBook,
    pub settings: AppSettings,
}

impl<S: LibraryStore> Session<S> {
    pub fn open(store: S) -> Result<Self, AppError> {
        let catalog = Catalog::from_records(store.load_fertilizers()?);
        let mixes = MixBook::from_records(store.load_mixes()?);
        let settings = store.load_settings()?;
        Ok(Self {
            store,
            catalog,
            mixes,
            settings,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save_catalog(&self) -> Result<(), AppError> {
        self.store.save_fertilizers(self.catalog.records())
    }

    fn save_mixes(&self) -> Result<(), AppError> {
        self.store.save_mixes(self.mixes.records())
    }

    pub fn add_fertilizer(&mut self, fertilizer: Fertilizer) -> Result<(), AppError> {
        self.catalog.add(fertilizer)?;
        self.save_catalog()
    }

    pub fn update_fertilizer(
        &mut self,
        original_name: &str,
        fertilizer: Fertilizer,
    ) -> Result<(), AppError> {
        let old_name = self
            .catalog
            .get(original_name)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| original_name.to_string());
        let new_name = fertilizer.name.clone();
        self.catalog.update(original_name, fertilizer)?;
        self.save_catalog()?;
        if old_name != new_name {
            let changed = self.mixes.rename_ingredient(&old_name, &new_name);
            if changed > 0 {
                tracing::info!(from = %old_name, to = %new_name, changed, "renamed mix ingredients");
                self.save_mixes()?;
            }
        }
        Ok(())
    }

    /// Saved mixes keep referencing the name; they simply stop contributing it.
    pub fn remove_fertilizer(&mut self, name: &str) -> Result<Fertilizer, AppError> {
        let removed = self.catalog.remove(name)?;
        self.save_catalog()?;
        Ok(removed)
    }

    pub fn save_mix(&mut self, mix: FertilizerMix, overwrite: bool) -> Result<(), AppError> {
        let missing = self.catalog.missing_in(&mix);
        if !missing.is_empty() {
            tracing::warn!(mix = %mix.name, ?missing, "mix references unknown fertilizers");
        }
        self.mixes.save(mix, overwrite)?;
        self.save_mixes()
    }

    pub fn remove_mix(&mut self, name: &str) -> Result<FertilizerMix, AppError> {
        let removed = self.mixes.remove(name)?;
        self.save_mixes()?;
        Ok(removed)
    }

    pub fn rename_mix(&mut self, old: &str, new: &str) -> Result<(), AppError> {
        self.mixes.rename(old, new)?;
        self.save_mixes()
    }

    pub fn mix(&self, name: &str) -> Result<&FertilizerMix, AppError> {
        self.mixes.get(name).ok_or_else(|| AppError::NotFound {
            kind: "mix",
            name: name.to_string(),
        })
    }

    /// Unit system to use: an explicit choice, or the saved preference.
    pub fn units(&self, explicit: Option<UnitSystem>) -> UnitSystem {
        explicit.unwrap_or(self.settings.unit_system)
    }

    pub fn calculate(
        &self,
        mix: &FertilizerMix,
        units: Option<UnitSystem>,
        mode: DisplayMode,
    ) -> CalculationSummary {
        let summary = compute_summary(mix, &self.catalog, self.units(units), mode);
        if !summary.missing.is_empty() {
            tracing::warn!(mix = %mix.name, missing = ?summary.missing, "skipped unknown fertilizers");
        }
        summary
    }

    pub fn compare(
        &self,
        left: &str,
        right: &str,
        units: Option<UnitSystem>,
        mode: DisplayMode,
    ) -> Result<MixComparison, AppError> {
        let l = self.mix(left)?;
        let r = self.mix(right)?;
        Ok(compare(l, r, &self.catalog, self.units(units), mode))
    }

    pub fn set_units(&mut self, units: UnitSystem) -> Result<(), AppError> {
        self.settings.unit_system = units;
        self.store.save_settings(&self.settings)
    }

    pub fn toggle_units(&mut self) -> Result<UnitSystem, AppError> {
        let units = self.settings.toggle_units();
        self.store.save_settings(&self.settings)?;
        Ok(units)
    }

    pub fn set_color(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.settings.set_color(key, value)?;
        self.store.save_settings(&self.settings)
    }

    pub fn export_to(&self, path: &Path, format: Option<ExportFormat>) -> Result<(), AppError> {
        let format = match format {
            Some(f) => f,
            None => ExportFormat::from_path(path)?,
        };
        let data = crate::library::export(&self.catalog, &self.mixes);
        write_export(path, &data, format)
    }

    pub fn import_from(
        &mut self,
        path: &Path,
        format: Option<ExportFormat>,
        policy: DuplicatePolicy,
    ) -> Result<ImportReport, AppError> {
        let format = match format {
            Some(f) => f,
            None => ExportFormat::from_path(path)?,
        };
        let data = read_export(path, format)?;
        let mut catalog = self.catalog.clone();
        let mut mixes = self.mixes.clone();
        let report = crate::library::import(data, &mut catalog, &mut mixes, policy);
        self.store.save_fertilizers(catalog.records())?;
        self.store.save_mixes(mixes.records())?;
        self.catalog = catalog;
        self.mixes = mixes;
        Ok(report)
    }
}
