//! Landmark directory loading and lookup
//!
//! The directory maps marker keys to landmarks. It is built once by the
//! caller and passed by reference into each estimation call; nothing here is
//! process-wide state.

use crate::core::types::{Landmark, PlanarCoordinate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory loading error types
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// Directory file exists but could not be read
    Io { path: String, message: String },
    /// Directory file is not a valid landmark record list
    Parse { path: String, message: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::Io { path, message } => {
                write!(f, "Failed to read landmark directory '{}': {}", path, message)
            }
            DirectoryError::Parse { path, message } => {
                write!(f, "Failed to parse landmark directory '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

/// How landmarks are keyed in the directory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeyStyle {
    /// Keyed by landmark name alone
    Name,
    /// Keyed by `"<name> <height>m"` labels
    NameAndHeight,
}

/// One entry of a landmark directory file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Height")]
    pub height: f64,
    #[serde(rename = "CH1903")]
    pub ch1903: [f64; 2],
}

impl From<LandmarkRecord> for Landmark {
    fn from(record: LandmarkRecord) -> Self {
        Landmark::new(
            record.name,
            record.height,
            PlanarCoordinate::new(record.ch1903[0], record.ch1903[1]),
        )
    }
}

/// Read-only lookup of landmarks by marker key
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkDirectory {
    landmarks: HashMap<String, Landmark>,
    key_style: KeyStyle,
}

impl LandmarkDirectory {
    pub fn new(key_style: KeyStyle) -> Self {
        Self {
            landmarks: HashMap::new(),
            key_style,
        }
    }

    /// Build a directory from parsed records.
    pub fn from_records(records: Vec<LandmarkRecord>, key_style: KeyStyle) -> Self {
        let mut directory = Self::new(key_style);
        for record in records {
            directory.insert(record.into());
        }
        directory
    }

    /// Load a directory from a JSON file. A missing file yields an empty
    /// directory; an unreadable or malformed file is an error.
    pub fn load_from_file<P: AsRef<Path>>(path: P, key_style: KeyStyle) -> DirectoryResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new(key_style));
        }
        let content = fs::read_to_string(path).map_err(|e| DirectoryError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let records: Vec<LandmarkRecord> =
            serde_json::from_str(&content).map_err(|e| DirectoryError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::from_records(records, key_style))
    }

    pub fn key_style(&self) -> KeyStyle {
        self.key_style
    }

    /// Insert a landmark under the key its style dictates. A later landmark
    /// with the same key replaces the earlier one.
    pub fn insert(&mut self, landmark: Landmark) {
        let key = match self.key_style {
            KeyStyle::Name => landmark.name.clone(),
            KeyStyle::NameAndHeight => landmark.labeled_key(),
        };
        self.landmarks.insert(key, landmark);
    }

    pub fn get(&self, key: &str) -> Option<&Landmark> {
        self.landmarks.get(key)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Landmark)> {
        self.landmarks.iter()
    }
}
