use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::adapters::store::{ExportFormat, LibraryStore};
use crate::error::AppError;
use crate::library::DuplicatePolicy;
use crate::mixing::aggregator::{CalculationSummary, DisplayMode, MixComparison};
use crate::models::{
    Fertilizer, FertilizerInput, FertilizerMix, FertilizerQuantity, NutrientKind, UnitSystem,
};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hydroponic fertilizer mixing calculator", long_about = None)]
pub struct Args {
    #[arg(
        long,
        global = true,
        env = "FERTMIX_DATA_DIR",
        default_value = "fertmix-data",
        value_name = "DIR",
        help = "Directory holding Fertilizers.xml, UserMixes.xml and AppSettings.xml"
    )]
    pub data_dir: PathBuf,
    #[arg(long, global = true, help = "Print results as JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the fertilizer catalog
    #[command(subcommand)]
    Fertilizer(FertilizerCommand),
    /// Manage saved mixes
    #[command(subcommand)]
    Mix(MixCommand),
    /// Calculate the nutrient contribution of a mix
    Calc {
        #[arg(long, help = "Saved mix to calculate")]
        mix: Option<String>,
        #[arg(long = "ingredient", value_name = "NAME=QTY", help = "Ad-hoc ingredient (repeatable)")]
        ingredients: Vec<String>,
        #[arg(long, value_enum, help = "Batch basis (defaults to the saved preference)")]
        units: Option<UnitSystem>,
        #[arg(long, value_enum, default_value_t = DisplayMode::Ppm)]
        mode: DisplayMode,
    },
    /// Compare two saved mixes side by side
    Compare {
        left: String,
        right: String,
        #[arg(long, value_enum)]
        units: Option<UnitSystem>,
        #[arg(long, value_enum, default_value_t = DisplayMode::Ppm)]
        mode: DisplayMode,
    },
    /// Export fertilizers and mixes to an XML or JSON file
    Export {
        file: PathBuf,
        #[arg(long, value_enum, help = "File format (inferred from the extension by default)")]
        format: Option<ExportFormat>,
    },
    /// Import fertilizers and mixes from an XML or JSON file
    Import {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        #[arg(long, value_enum, default_value = "skip")]
        on_duplicate: DuplicatePolicy,
    },
    /// Show or change preferences
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum FertilizerCommand {
    /// List fertilizers in natural name order
    List,
    Show {
        name: String,
    },
    Add {
        name: String,
        #[command(flatten)]
        nutrients: NutrientArgs,
    },
    Edit {
        name: String,
        #[arg(long, help = "New name for the fertilizer")]
        rename: Option<String>,
        #[command(flatten)]
        nutrients: NutrientArgs,
    },
    Remove {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MixCommand {
    List,
    Show {
        name: String,
    },
    Save {
        name: String,
        #[arg(long = "ingredient", value_name = "NAME=QTY", required = true)]
        ingredients: Vec<String>,
        #[arg(long, help = "Replace an existing mix with the same name")]
        overwrite: bool,
    },
    Remove {
        name: String,
    },
    Rename {
        old: String,
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    /// Set the default batch basis
    Units {
        #[arg(value_enum)]
        units: UnitSystem,
    },
    /// Switch between metric and imperial
    ToggleUnits,
    /// Set a colour preference: accent, background or text
    Color {
        key: String,
        value: String,
    },
}

/// Percentages as printed on the label. Unset values keep their stored value
/// on edit and default to 0 on add.
#[derive(clap::Args, Debug, Default)]
pub struct NutrientArgs {
    #[arg(long = "n")]
    nitrogen: Option<f64>,
    #[arg(long = "p", help = "Phosphorus, elemental unless --p-oxide")]
    phosphorus: Option<f64>,
    #[arg(long = "k", help = "Potassium, elemental unless --k-oxide")]
    potassium: Option<f64>,
    #[arg(long = "ca")]
    calcium: Option<f64>,
    #[arg(long = "mg")]
    magnesium: Option<f64>,
    #[arg(long = "s")]
    sulfur: Option<f64>,
    #[arg(long = "b")]
    boron: Option<f64>,
    #[arg(long = "cu")]
    copper: Option<f64>,
    #[arg(long = "fe")]
    iron: Option<f64>,
    #[arg(long = "mn")]
    manganese: Option<f64>,
    #[arg(long = "mo")]
    molybdenum: Option<f64>,
    #[arg(long = "zn")]
    zinc: Option<f64>,
    #[arg(long = "cl")]
    chlorine: Option<f64>,
    #[arg(long = "si")]
    silica: Option<f64>,
    #[arg(long = "humic")]
    humic_acid: Option<f64>,
    #[arg(long = "fulvic")]
    fulvic_acid: Option<f64>,
    #[arg(long, help = "--p is given as P2O5")]
    p_oxide: bool,
    #[arg(long, help = "--k is given as K2O")]
    k_oxide: bool,
}

impl NutrientArgs {
    fn given(&self) -> Vec<(NutrientKind, f64)> {
        [
            (NutrientKind::Nitrogen, self.nitrogen),
            (NutrientKind::Phosphorus, self.phosphorus),
            (NutrientKind::Potassium, self.potassium),
            (NutrientKind::Calcium, self.calcium),
            (NutrientKind::Magnesium, self.magnesium),
            (NutrientKind::Sulfur, self.sulfur),
            (NutrientKind::Boron, self.boron),
            (NutrientKind::Copper, self.copper),
            (NutrientKind::Iron, self.iron),
            (NutrientKind::Manganese, self.manganese),
            (NutrientKind::Molybdenum, self.molybdenum),
            (NutrientKind::Zinc, self.zinc),
            (NutrientKind::Chlorine, self.chlorine),
            (NutrientKind::Silica, self.silica),
            (NutrientKind::HumicAcid, self.humic_acid),
            (NutrientKind::FulvicAcid, self.fulvic_acid),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }

    /// Overlay the given values on an existing form (or an empty one).
    fn apply(&self, mut form: FertilizerInput) -> FertilizerInput {
        for (kind, v) in self.given() {
            match form.values.iter_mut().find(|(k, _)| *k == kind) {
                Some(slot) => slot.1 = v,
                None => form.values.push((kind, v)),
            }
        }
        if self.phosphorus.is_some() || self.p_oxide {
            form.phosphorus_as_oxide = self.p_oxide;
        }
        if self.potassium.is_some() || self.k_oxide {
            form.potassium_as_oxide = self.k_oxide;
        }
        form
    }
}

fn parse_ingredients(specs: &[String]) -> Result<Vec<FertilizerQuantity>, AppError> {
    specs.iter().map(|s| s.parse()).collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let s =
        serde_json::to_string_pretty(value).map_err(|source| AppError::SerializeJson { source })?;
    println!("{}", s);
    Ok(())
}

pub fn execute<S: LibraryStore>(args: &Args, session: &mut Session<S>) -> Result<(), AppError> {
    match &args.command {
        Command::Fertilizer(cmd) => fertilizer(cmd, args.json, session),
        Command::Mix(cmd) => mix(cmd, args.json, session),
        Command::Calc {
            mix,
            ingredients,
            units,
            mode,
        } => {
            let target = match (mix, ingredients.is_empty()) {
                (Some(name), _) => session.mix(name)?.clone(),
                (None, false) => FertilizerMix::new("(current mix)", parse_ingredients(ingredients)?),
                (None, true) => return Err(AppError::MissingMix),
            };
            let out = session.calculate(&target, *units, *mode);
            if args.json {
                print_json(&out)
            } else {
                print_summary(&out);
                Ok(())
            }
        }
        Command::Compare {
            left,
            right,
            units,
            mode,
        } => {
            let out = session.compare(left, right, *units, *mode)?;
            if args.json {
                print_json(&out)
            } else {
                print_comparison(&out);
                Ok(())
            }
        }
        Command::Export { file, format } => {
            session.export_to(file, *format)?;
            println!("Exported to {}", file.display());
            Ok(())
        }
        Command::Import {
            file,
            format,
            on_duplicate,
        } => {
            let report = session.import_from(file, *format, *on_duplicate)?;
            if args.json {
                return print_json(&report);
            }
            println!(
                "Fertilizers: {} added, {} replaced, {} skipped",
                report.fertilizers_added, report.fertilizers_replaced, report.fertilizers_skipped
            );
            println!(
                "Mixes: {} added, {} replaced, {} skipped",
                report.mixes_added, report.mixes_replaced, report.mixes_skipped
            );
            for (old, new) in &report.renamed {
                println!("Renamed '{}' -> '{}'", old, new);
            }
            Ok(())
        }
        Command::Settings(cmd) => settings(cmd, args.json, session),
    }
}

fn fertilizer<S: LibraryStore>(
    cmd: &FertilizerCommand,
    json: bool,
    session: &mut Session<S>,
) -> Result<(), AppError> {
    match cmd {
        FertilizerCommand::List => {
            let sorted = session.catalog.sorted();
            if json {
                return print_json(&sorted);
            }
            for f in sorted {
                println!("{}", f.name);
            }
            Ok(())
        }
        FertilizerCommand::Show { name } => {
            let f = session.catalog.get(name).ok_or_else(|| AppError::NotFound {
                kind: "fertilizer",
                name: name.clone(),
            })?;
            if json {
                return print_json(f);
            }
            print_fertilizer(f);
            Ok(())
        }
        FertilizerCommand::Add { name, nutrients } => {
            let form = nutrients.apply(FertilizerInput {
                name: name.clone(),
                ..Default::default()
            });
            session.add_fertilizer(form.into_fertilizer()?)?;
            println!("Added fertilizer '{}'", name);
            Ok(())
        }
        FertilizerCommand::Edit {
            name,
            rename,
            nutrients,
        } => {
            let existing = session.catalog.get(name).ok_or_else(|| AppError::NotFound {
                kind: "fertilizer",
                name: name.clone(),
            })?;
            let mut form = nutrients.apply(existing.to_input());
            if let Some(new_name) = rename {
                form.name = new_name.clone();
            }
            let updated = form.into_fertilizer()?;
            let new_name = updated.name.clone();
            session.update_fertilizer(name, updated)?;
            println!("Updated fertilizer '{}'", new_name);
            Ok(())
        }
        FertilizerCommand::Remove { name } => {
            let removed = session.remove_fertilizer(name)?;
            println!("Removed fertilizer '{}'", removed.name);
            Ok(())
        }
    }
}

fn mix<S: LibraryStore>(
    cmd: &MixCommand,
    json: bool,
    session: &mut Session<S>,
) -> Result<(), AppError> {
    match cmd {
        MixCommand::List => {
            let sorted = session.mixes.sorted();
            if json {
                return print_json(&sorted);
            }
            for m in sorted {
                println!("{} ({} ingredients)", m.name, m.ingredients.len());
            }
            Ok(())
        }
        MixCommand::Show { name } => {
            let m = session.mix(name)?;
            if json {
                return print_json(m);
            }
            println!("{}", m.name);
            for i in &m.ingredients {
                let marker = if session.catalog.contains(&i.fertilizer_name) {
                    ""
                } else {
                    "  (unknown fertilizer)"
                };
                println!("  {:<30} {:>10.3}{}", i.fertilizer_name, i.quantity, marker);
            }
            Ok(())
        }
        MixCommand::Save {
            name,
            ingredients,
            overwrite,
        } => {
            let m = FertilizerMix::new(name.clone(), parse_ingredients(ingredients)?);
            session.save_mix(m, *overwrite)?;
            println!("Saved mix '{}'", name);
            Ok(())
        }
        MixCommand::Remove { name } => {
            let removed = session.remove_mix(name)?;
            println!("Removed mix '{}'", removed.name);
            Ok(())
        }
        MixCommand::Rename { old, new } => {
            session.rename_mix(old, new)?;
            println!("Renamed mix '{}' to '{}'", old, new);
            Ok(())
        }
    }
}

fn settings<S: LibraryStore>(
    cmd: &SettingsCommand,
    json: bool,
    session: &mut Session<S>,
) -> Result<(), AppError> {
    match cmd {
        SettingsCommand::Show => {}
        SettingsCommand::Units { units } => session.set_units(*units)?,
        SettingsCommand::ToggleUnits => {
            session.toggle_units()?;
        }
        SettingsCommand::Color { key, value } => session.set_color(key, value)?,
    }
    if json {
        return print_json(&session.settings);
    }
    let s = &session.settings;
    println!("Units: {}", s.unit_system);
    println!("Accent colour: {}", s.accent_color);
    println!("Background colour: {}", s.background_color);
    println!("Text colour: {}", s.text_color);
    Ok(())
}

fn print_fertilizer(f: &Fertilizer) {
    println!("{}", f.name);
    for kind in NutrientKind::ALL {
        let v = f.percent(kind);
        if v == 0.0 {
            continue;
        }
        let note = match kind {
            NutrientKind::Phosphorus if f.is_phosphorus_in_oxide_form => f
                .original_phosphorus_value
                .map(|o| format!("  (from {o} % P2O5)"))
                .unwrap_or_default(),
            NutrientKind::Potassium if f.is_potassium_in_oxide_form => f
                .original_potassium_value
                .map(|o| format!("  (from {o} % K2O)"))
                .unwrap_or_default(),
            _ => String::new(),
        };
        println!("  {:<12} {:>8.4} %{}", kind.label(), v, note);
    }
}

fn print_summary(out: &CalculationSummary) {
    println!(
        "Mix: {} ({}, {:.3} per {})",
        out.mix,
        out.unit_system,
        out.total_quantity,
        out.unit_system.batch_unit()
    );
    for row in &out.nutrients {
        println!("  {:<7} {:>12.3} {}", row.symbol, row.value, out.unit);
    }
    if !out.missing.is_empty() {
        println!("Skipped unknown fertilizers: {}", out.missing.join(", "));
    }
}

fn print_comparison(out: &MixComparison) {
    let unit = out.mode.unit_label(out.unit_system);
    println!(
        "  {:<7} {:>12} {:>12} {:>12}",
        "", out.left, out.right, "difference"
    );
    for row in &out.rows {
        println!(
            "  {:<7} {:>12.3} {:>12.3} {:>+12.3} {}",
            row.nutrient.symbol(),
            row.left,
            row.right,
            row.difference,
            unit
        );
    }
}
