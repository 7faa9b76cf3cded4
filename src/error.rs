use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid XML in '{path}': {message}")]
    ParseXml { path: String, message: String },

    #[error("Could not serialize XML: {message}")]
    SerializeXml { message: String },

    #[error("Invalid JSON in '{path}': {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not serialize output to JSON: {source}")]
    SerializeJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("A {kind} named '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    #[error("No {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },

    #[error("Invalid fertilizer '{name}': {reason}")]
    InvalidFertilizer { name: String, reason: String },

    #[error("Mix name must not be empty")]
    EmptyMixName,

    #[error("Invalid ingredient '{spec}': expected NAME=QUANTITY with a non-negative quantity")]
    InvalidIngredient { spec: String },

    #[error("Invalid colour '{value}' for '{key}': expected #RRGGBB")]
    InvalidColor { key: String, value: String },

    #[error("Unknown colour setting '{0}' (expected accent, background or text)")]
    UnknownColorKey(String),

    #[error("Cannot infer export format from '{0}': use .xml or .json, or pass --format")]
    UnknownFormat(String),

    #[cfg(feature = "cli")]
    #[error("Missing mix: provide --mix or at least one --ingredient")]
    MissingMix,
}
