use tracing::{info, warn};

use crate::error::AppError;
use crate::mixing::aggregator::FertilizerLookup;
use crate::mixing::naming::{natural_cmp, same_name};
use crate::models::{Fertilizer, FertilizerMix};

const KIND: &str = "fertilizer";

/// The user's fertilizer collection. Names are unique ignoring case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    fertilizers: Vec<Fertilizer>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records, keeping the first of any case-insensitive duplicates.
    pub fn from_records(records: Vec<Fertilizer>) -> Self {
        let mut catalog = Self::new();
        for fert in records {
            if catalog.contains(&fert.name) {
                warn!(name = %fert.name, "dropping duplicate fertilizer record");
                continue;
            }
            catalog.fertilizers.push(fert);
        }
        catalog
    }

    pub fn into_records(self) -> Vec<Fertilizer> {
        self.fertilizers
    }

    pub fn records(&self) -> &[Fertilizer] {
        &self.fertilizers
    }

    pub fn len(&self) -> usize {
        self.fertilizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fertilizers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fertilizer> {
        self.fertilizers.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Exact name first, then case-insensitive.
    pub fn get(&self, name: &str) -> Option<&Fertilizer> {
        self.position(name).map(|i| &self.fertilizers[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fertilizers
            .iter()
            .position(|f| f.name == name)
            .or_else(|| self.fertilizers.iter().position(|f| same_name(&f.name, name)))
    }

    pub fn add(&mut self, fertilizer: Fertilizer) -> Result<(), AppError> {
        fertilizer.validate()?;
        if self.contains(&fertilizer.name) {
            return Err(AppError::DuplicateName {
                kind: KIND,
                name: fertilizer.name,
            });
        }
        info!(name = %fertilizer.name, "added fertilizer");
        self.fertilizers.push(fertilizer);
        Ok(())
    }

    /// Replace the record called `original_name`. The new record may carry a
    /// different name as long as no other fertilizer uses it.
    pub fn update(&mut self, original_name: &str, fertilizer: Fertilizer) -> Result<(), AppError> {
        fertilizer.validate()?;
        let idx = self.position(original_name).ok_or_else(|| AppError::NotFound {
            kind: KIND,
            name: original_name.to_string(),
        })?;
        if let Some(other) = self.position(&fertilizer.name) {
            if other != idx {
                return Err(AppError::DuplicateName {
                    kind: KIND,
                    name: fertilizer.name,
                });
            }
        }
        info!(from = %original_name, to = %fertilizer.name, "updated fertilizer");
        self.fertilizers[idx] = fertilizer;
        Ok(())
    }

    /// Insert, or overwrite the record with the same name.
    pub fn upsert(&mut self, fertilizer: Fertilizer) {
        match self.position(&fertilizer.name) {
            Some(idx) => self.fertilizers[idx] = fertilizer,
            None => self.fertilizers.push(fertilizer),
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<Fertilizer, AppError> {
        let idx = self.position(name).ok_or_else(|| AppError::NotFound {
            kind: KIND,
            name: name.to_string(),
        })?;
        info!(name = %name, "removed fertilizer");
        Ok(self.fertilizers.remove(idx))
    }

    /// Records in natural name order, as shown in the manage list.
    pub fn sorted(&self) -> Vec<&Fertilizer> {
        let mut out: Vec<&Fertilizer> = self.fertilizers.iter().collect();
        out.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        out
    }

    /// Ingredient names of `mix` that do not resolve in this catalog.
    pub fn missing_in(&self, mix: &FertilizerMix) -> Vec<String> {
        mix.ingredients
            .iter()
            .filter(|i| !self.contains(&i.fertilizer_name))
            .map(|i| i.fertilizer_name.clone())
            .collect()
    }
}

impl FertilizerLookup for Catalog {
    fn lookup(&self, name: &str) -> Option<&Fertilizer> {
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FertilizerQuantity, NutrientKind};

    fn jacks(name: &str) -> Fertilizer {
        Fertilizer::named(name).with(NutrientKind::Nitrogen, 5.0)
    }

    #[test]
    fn names_are_unique_ignoring_case() {
        let mut c = Catalog::new();
        c.add(jacks("CalMag")).unwrap();
        let err = c.add(jacks("calmag")).unwrap_err();
        assert!(matches!(err, AppError::DuplicateName { .. }));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("CALMAG").map(|f| f.name.as_str()), Some("CalMag"));
    }

    #[test]
    fn update_allows_rename_to_free_name_only() {
        let mut c = Catalog::new();
        c.add(jacks("A")).unwrap();
        c.add(jacks("B")).unwrap();
        assert!(c.update("A", jacks("B")).is_err());
        c.update("A", jacks("C")).unwrap();
        c.update("c", jacks("C")).unwrap();
        assert!(c.contains("C") && !c.contains("A"));
        assert!(matches!(
            c.update("Z", jacks("Z")),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn sorted_uses_natural_order() {
        let mut c = Catalog::new();
        for n in ["Jacks 10-30-20", "Jacks 5-15-26", "Jacks 5-50-18"] {
            c.add(jacks(n)).unwrap();
        }
        let names: Vec<&str> = c.sorted().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Jacks 5-15-26", "Jacks 5-50-18", "Jacks 10-30-20"]);
    }

    #[test]
    fn remove_and_missing_ingredients() {
        let mut c = Catalog::from_records(vec![jacks("A"), jacks("B"), jacks("a")]);
        assert_eq!(c.len(), 2);
        c.remove("b").unwrap();
        let mix = FertilizerMix::new(
            "M",
            vec![FertilizerQuantity::new("A", 1.0), FertilizerQuantity::new("B", 1.0)],
        );
        assert_eq!(c.missing_in(&mix), vec!["B".to_string()]);
        assert!(c.remove("B").is_err());
    }
}
