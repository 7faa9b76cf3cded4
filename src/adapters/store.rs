//! File persistence for the fertilizer catalog, saved mixes and settings.
//!
//! Libraries live as XML documents in a data directory:
//! - `Fertilizers.xml`: `<Fertilizers><Fertilizer>...</Fertilizer></Fertilizers>`
//! - `UserMixes.xml`: `<Mixes><Mix><Name/><Ingredient>...</Ingredient></Mix></Mixes>`
//! - `AppSettings.xml`: `<AppSettings>...</AppSettings>`
//!
//! A missing file loads as an empty library (or default settings). Export and
//! import move an [`ExportData`] envelope as XML or JSON. XML exports reuse the
//! library layout: `<Library><Fertilizers>...</Fertilizers><Mixes>...</Mixes></Library>`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{AppSettings, ExportData, Fertilizer, FertilizerMix, FertilizerQuantity};

pub const FERTILIZERS_FILE: &str = "Fertilizers.xml";
pub const MIXES_FILE: &str = "UserMixes.xml";
pub const SETTINGS_FILE: &str = "AppSettings.xml";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Storage port for everything the application persists.
pub trait LibraryStore {
    fn load_fertilizers(&self) -> Result<Vec<Fertilizer>, AppError>;
    fn save_fertilizers(&self, records: &[Fertilizer]) -> Result<(), AppError>;
    fn load_mixes(&self) -> Result<Vec<FertilizerMix>, AppError>;
    fn save_mixes(&self, records: &[FertilizerMix]) -> Result<(), AppError>;
    fn load_settings(&self) -> Result<AppSettings, AppError>;
    fn save_settings(&self, settings: &AppSettings) -> Result<(), AppError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Fertilizers")]
struct FertilizerDocument {
    #[serde(rename = "Fertilizer", default)]
    fertilizers: Vec<Fertilizer>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Mixes")]
struct MixDocument {
    #[serde(rename = "Mix", default)]
    mixes: Vec<XmlMix>,
}

/// A mix as written to XML: one `<Ingredient>` element per row.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct XmlMix {
    name: String,
    #[serde(rename = "Ingredient")]
    ingredients: Vec<FertilizerQuantity>,
}

impl From<&FertilizerMix> for XmlMix {
    fn from(mix: &FertilizerMix) -> Self {
        Self {
            name: mix.name.clone(),
            ingredients: mix.ingredients.clone(),
        }
    }
}

impl From<XmlMix> for FertilizerMix {
    fn from(mix: XmlMix) -> Self {
        FertilizerMix::new(mix.name, mix.ingredients)
    }
}

impl MixDocument {
    fn from_records(records: &[FertilizerMix]) -> Self {
        Self {
            mixes: records.iter().map(XmlMix::from).collect(),
        }
    }

    fn into_records(self) -> Vec<FertilizerMix> {
        self.mixes.into_iter().map(FertilizerMix::from).collect()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "Library", rename_all = "PascalCase", default)]
struct ExportDocument {
    fertilizers: FertilizerDocument,
    mixes: MixDocument,
}

impl From<&ExportData> for ExportDocument {
    fn from(data: &ExportData) -> Self {
        Self {
            fertilizers: FertilizerDocument {
                fertilizers: data.fertilizers.clone(),
            },
            mixes: MixDocument::from_records(&data.mixes),
        }
    }
}

impl From<ExportDocument> for ExportData {
    fn from(doc: ExportDocument) -> Self {
        ExportData {
            fertilizers: doc.fertilizers.fertilizers,
            mixes: doc.mixes.into_records(),
        }
    }
}

/// XML files in a single data directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, AppError> {
        let path = self.path(file);
        if !path.exists() {
            debug!(path = %path.display(), "no file yet, using defaults");
            return Ok(T::default());
        }
        let text = read_file(&path)?;
        from_xml(&text, &path)
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), AppError> {
        let xml = to_xml(value)?;
        write_file(&self.path(file), &xml)
    }
}

impl LibraryStore for FileStore {
    fn load_fertilizers(&self) -> Result<Vec<Fertilizer>, AppError> {
        Ok(self.load::<FertilizerDocument>(FERTILIZERS_FILE)?.fertilizers)
    }

    fn save_fertilizers(&self, records: &[Fertilizer]) -> Result<(), AppError> {
        let doc = FertilizerDocument {
            fertilizers: records.to_vec(),
        };
        self.save(FERTILIZERS_FILE, &doc)?;
        info!(count = records.len(), "saved fertilizers");
        Ok(())
    }

    fn load_mixes(&self) -> Result<Vec<FertilizerMix>, AppError> {
        Ok(self.load::<MixDocument>(MIXES_FILE)?.into_records())
    }

    fn save_mixes(&self, records: &[FertilizerMix]) -> Result<(), AppError> {
        self.save(MIXES_FILE, &MixDocument::from_records(records))?;
        info!(count = records.len(), "saved mixes");
        Ok(())
    }

    fn load_settings(&self) -> Result<AppSettings, AppError> {
        self.load(SETTINGS_FILE)
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<(), AppError> {
        self.save(SETTINGS_FILE, settings)
    }
}

fn read_file(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

/// Write through a sibling temp file so a failed write never truncates the target.
fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
    let write_err = |source| AppError::WriteFile {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(|source| {
        if let Err(e) = fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %e, "could not remove temp file");
        }
        write_err(source)
    })
}

fn to_xml<T: Serialize>(value: &T) -> Result<String, AppError> {
    let mut out = String::from(XML_DECLARATION);
    let mut ser = quick_xml::se::Serializer::new(&mut out);
    ser.indent(' ', 2);
    value.serialize(ser).map_err(|e| AppError::SerializeXml {
        message: e.to_string(),
    })?;
    out.push('\n');
    Ok(out)
}

fn from_xml<T: DeserializeOwned>(text: &str, path: &Path) -> Result<T, AppError> {
    quick_xml::de::from_str(text).map_err(|e| AppError::ParseXml {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// File format of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    Xml,
    Json,
}

impl ExportFormat {
    /// Infer the format from a `.xml` or `.json` extension.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("xml") => Ok(ExportFormat::Xml),
            Some("json") => Ok(ExportFormat::Json),
            _ => Err(AppError::UnknownFormat(path.display().to_string())),
        }
    }
}

pub fn write_export(path: &Path, data: &ExportData, format: ExportFormat) -> Result<(), AppError> {
    let text = match format {
        ExportFormat::Xml => to_xml(&ExportDocument::from(data))?,
        ExportFormat::Json => serde_json::to_string_pretty(data)
            .map_err(|source| AppError::SerializeJson { source })?,
    };
    write_file(path, &text)?;
    info!(
        path = %path.display(),
        fertilizers = data.fertilizers.len(),
        mixes = data.mixes.len(),
        "exported library"
    );
    Ok(())
}

pub fn read_export(path: &Path, format: ExportFormat) -> Result<ExportData, AppError> {
    let text = read_file(path)?;
    match format {
        ExportFormat::Xml => from_xml::<ExportDocument>(&text, path).map(ExportData::from),
        ExportFormat::Json => serde_json::from_str(&text).map_err(|source| AppError::ParseJson {
            path: path.display().to_string(),
            source,
        }),
    }
}
