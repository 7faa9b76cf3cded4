//! Chemistry module: conversion constants and helpers for fertilizer labels.
//!
//! This module provides:
//! - Oxide-to-elemental factors for phosphorus (P2O5 -> P) and potassium (K2O -> K)
//! - The US gallon to liter factor used to switch between metric and imperial batches
//! - Gram-to-PPM conversion for a nutrient total expressed per batch unit
//!
//! Units conventions:
//! - Fertilizer composition is mass percent (0..100)
//! - Quantities are grams (or milliliters for liquids) per batch unit
//! - A metric batch unit is one liter, an imperial batch unit is one US gallon
//! - PPM means milligrams of nutrient per liter of final solution
//!
//! Label convention:
//! Most fertilizer labels report phosphorus as P2O5 and potassium as K2O. Stored
//! fertilizer records always hold elemental values, so the conversion happens once
//! when a record is entered. There is no inverse conversion.
//!
//! # Examples
//! ```rust
//! use fertmix_rs::chemistry::{grams_to_ppm, p2o5_to_elemental};
//! use fertmix_rs::models::UnitSystem;
//!
//! let p = p2o5_to_elemental(20.0);
//! assert!((p - 8.728).abs() < 1e-9);
//! assert!((grams_to_ppm(2.0, UnitSystem::Metric) - 2000.0).abs() < 1e-9);
//! ```
//!
//! # Panics
//! None of the functions panic.

use crate::models::UnitSystem;

/// Mass fraction of elemental phosphorus in P2O5 (2 * 30.974 / 141.94).
pub const P2O5_TO_P: f64 = 0.4364;
/// Mass fraction of elemental potassium in K2O (2 * 39.098 / 94.196).
pub const K2O_TO_K: f64 = 0.8301;
/// Liters in one US gallon.
pub const LITERS_PER_GALLON: f64 = 3.78541;
/// Milligrams per gram.
pub const MG_PER_G: f64 = 1000.0;

/// Convert a label P2O5 percentage to elemental phosphorus percentage.
pub fn p2o5_to_elemental(p2o5_percent: f64) -> f64 {
    p2o5_percent * P2O5_TO_P
}

/// Convert a label K2O percentage to elemental potassium percentage.
pub fn k2o_to_elemental(k2o_percent: f64) -> f64 {
    k2o_percent * K2O_TO_K
}

/// Express a per-liter concentration relative to a gallon.
pub fn per_liter_to_per_gallon(value: f64) -> f64 {
    value / LITERS_PER_GALLON
}

/// Grams of nutrient contributed by `quantity` of a product containing `percent`.
pub fn nutrient_grams(percent: f64, quantity: f64) -> f64 {
    (percent / 100.0) * quantity
}

/// Convert grams of nutrient per batch unit into PPM (mg/L).
///
/// A metric batch is one liter so the value is simply scaled by 1000. An imperial
/// batch is one gallon, so the same mass is spread over 3.78541 liters.
pub fn grams_to_ppm(grams: f64, units: UnitSystem) -> f64 {
    grams * MG_PER_G / units.liters_per_batch_unit()
}
