use tracing::{info, warn};

use crate::error::AppError;
use crate::mixing::naming::{natural_cmp, same_name};
use crate::models::FertilizerMix;

const KIND: &str = "mix";

/// Saved mixes, unique by name ignoring case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MixBook {
    mixes: Vec<FertilizerMix>,
}

impl MixBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<FertilizerMix>) -> Self {
        let mut book = Self::new();
        for mix in records {
            if book.contains(&mix.name) {
                warn!(name = %mix.name, "dropping duplicate mix record");
                continue;
            }
            book.mixes.push(mix);
        }
        book
    }

    pub fn into_records(self) -> Vec<FertilizerMix> {
        self.mixes
    }

    pub fn records(&self) -> &[FertilizerMix] {
        &self.mixes
    }

    pub fn len(&self) -> usize {
        self.mixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mixes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FertilizerMix> {
        self.position(name).map(|i| &self.mixes[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.mixes
            .iter()
            .position(|m| m.name == name)
            .or_else(|| self.mixes.iter().position(|m| same_name(&m.name, name)))
    }

    /// Store a mix. An existing mix with the same name is replaced only when
    /// `overwrite` is set.
    pub fn save(&mut self, mix: FertilizerMix, overwrite: bool) -> Result<(), AppError> {
        if mix.name.trim().is_empty() {
            return Err(AppError::EmptyMixName);
        }
        match self.position(&mix.name) {
            Some(_) if !overwrite => Err(AppError::DuplicateName {
                kind: KIND,
                name: mix.name,
            }),
            Some(idx) => {
                info!(name = %mix.name, "replaced mix");
                self.mixes[idx] = mix;
                Ok(())
            }
            None => {
                info!(name = %mix.name, ingredients = mix.ingredients.len(), "saved mix");
                self.mixes.push(mix);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Result<FertilizerMix, AppError> {
        let idx = self.position(name).ok_or_else(|| AppError::NotFound {
            kind: KIND,
            name: name.to_string(),
        })?;
        Ok(self.mixes.remove(idx))
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), AppError> {
        if new.trim().is_empty() {
            return Err(AppError::EmptyMixName);
        }
        let idx = self.position(old).ok_or_else(|| AppError::NotFound {
            kind: KIND,
            name: old.to_string(),
        })?;
        if let Some(other) = self.position(new) {
            if other != idx {
                return Err(AppError::DuplicateName {
                    kind: KIND,
                    name: new.to_string(),
                });
            }
        }
        self.mixes[idx].name = new.to_string();
        Ok(())
    }

    /// Point every ingredient that names fertilizer `old` at `new` instead.
    /// Returns how many ingredient rows changed.
    pub fn rename_ingredient(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        for ingredient in self.mixes.iter_mut().flat_map(|m| m.ingredients.iter_mut()) {
            if same_name(&ingredient.fertilizer_name, old) {
                ingredient.fertilizer_name = new.to_string();
                changed += 1;
            }
        }
        changed
    }

    /// Insert, or overwrite the mix with the same name.
    pub fn upsert(&mut self, mix: FertilizerMix) {
        match self.position(&mix.name) {
            Some(idx) => self.mixes[idx] = mix,
            None => self.mixes.push(mix),
        }
    }

    pub fn sorted(&self) -> Vec<&FertilizerMix> {
        let mut out: Vec<&FertilizerMix> = self.mixes.iter().collect();
        out.sort_by(|a, b| natural_cmp(&a.name, &b.name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FertilizerQuantity;

    fn mix(name: &str, qty: f64) -> FertilizerMix {
        FertilizerMix::new(name, vec![FertilizerQuantity::new("Epsom", qty)])
    }

    #[test]
    fn save_requires_overwrite_for_existing_name() {
        let mut book = MixBook::new();
        book.save(mix("Bloom", 1.0), false).unwrap();
        assert!(matches!(
            book.save(mix("bloom", 2.0), false),
            Err(AppError::DuplicateName { .. })
        ));
        book.save(mix("Bloom", 2.0), true).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("Bloom").unwrap().ingredients[0].quantity, 2.0);
    }

    #[test]
    fn rename_and_remove() {
        let mut book = MixBook::from_records(vec![mix("Veg", 1.0), mix("Bloom", 1.0)]);
        assert!(book.rename("Veg", "bloom").is_err());
        book.rename("Veg", "Veg Week 2").unwrap();
        assert!(book.contains("veg week 2"));
        book.remove("Bloom").unwrap();
        assert!(matches!(book.remove("Bloom"), Err(AppError::NotFound { .. })));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn rename_rejects_blank_names() {
        let mut book = MixBook::from_records(vec![mix("Veg", 1.0)]);
        for blank in ["", "   "] {
            assert!(matches!(
                book.rename("Veg", blank),
                Err(AppError::EmptyMixName)
            ));
        }
        assert_eq!(book.records()[0].name, "Veg");
    }

    #[test]
    fn rename_ingredient_follows_fertilizer_rename() {
        let mut book = MixBook::from_records(vec![
            mix("Veg", 1.0),
            FertilizerMix::new("Bloom", vec![FertilizerQuantity::new("epsom", 2.0)]),
            FertilizerMix::new("Flush", vec![FertilizerQuantity::new("CalNit", 1.0)]),
        ]);
        assert_eq!(book.rename_ingredient("Epsom", "Epsom Salt"), 2);
        assert_eq!(book.get("Veg").unwrap().ingredients[0].fertilizer_name, "Epsom Salt");
        assert_eq!(book.get("Bloom").unwrap().ingredients[0].fertilizer_name, "Epsom Salt");
        assert_eq!(book.get("Flush").unwrap().ingredients[0].fertilizer_name, "CalNit");
    }
}
