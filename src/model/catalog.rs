//! Catalog: the fixed list of sections and items a report is built from.
//!
//! The catalog is input data. It is loaded once at startup and never
//! mutated; reports copy the ids and texts they need out of it.

use std::collections::HashSet;
use std::path::Path;
use std::{fs, io};

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog has no sections")]
    Empty,

    #[error("section '{0}' has no items")]
    EmptySection(String),

    #[error("duplicate item id: {0}")]
    DuplicateItem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub sections: Vec<CatalogSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSection {
    pub title: String,
    pub items: Vec<CatalogItem>,
}

/// A checklist question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Stable identifier, e.g. `1.1`. Unique across the catalog.
    pub id: String,

    /// The question shown to the assessor.
    pub text: String,

    /// Whether the form offers "add another" for this item.
    #[serde(default)]
    pub repeatable: bool,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&json)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Reject catalogs that could not produce a well-formed report.
    pub fn check(&self) -> Result<(), CatalogError> {
        if self.sections.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.items.is_empty() {
                return Err(CatalogError::EmptySection(section.title.clone()));
            }
            for item in &section.items {
                if !seen.insert(item.id.as_str()) {
                    return Err(CatalogError::DuplicateItem(item.id.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// The RDF plant risk assessment checklist.
    pub fn builtin() -> Self {
        let section = |title: &str, items: &[(&str, &str)]| CatalogSection {
            title: title.to_string(),
            items: items
                .iter()
                .map(|(id, text)| CatalogItem {
                    id: (*id).to_string(),
                    text: (*text).to_string(),
                    repeatable: true,
                })
                .collect(),
        };

        Self {
            sections: vec![
                section(
                    "1. Housekeeping & Cleanliness",
                    &[
                        ("1.1", "Dinding & Ventilasi"),
                        ("1.2", "Akses Masuk-Keluar"),
                        ("1.3", "Lantai & Tangga"),
                        ("1.4", "Jalur Pejalan Kaki"),
                        ("1.5", "Area Umum & Fasilitas"),
                        ("1.6", "Kebersihan Alat Berat"),
                    ],
                ),
                section(
                    "2. Occupational Health & Safety",
                    &[
                        ("2.1", "Penggunaan APD"),
                        ("2.2", "Rambu & Marka Keselamatan"),
                        ("2.3", "Titik Kumpul"),
                        ("2.4", "P3K & Fasilitas Medis"),
                        ("2.5", "Manajemen Lalu Lintas Kendaraan Berat"),
                    ],
                ),
                section(
                    "3. Material & Product Management",
                    &[
                        ("3.1", "Area Sampah Masuk/MSW"),
                        ("3.2", "Fasilitas Pengumpanan"),
                        ("3.3", "Proses RDF"),
                        ("3.4", "Produk RDF"),
                        ("3.5", "Penyimpanan RDF"),
                        ("3.6", "Kualitas Visual Produk RDF"),
                        ("3.7", "Ukuran"),
                        ("3.8", "Kelembaban"),
                        ("3.9", "Manajemen Lindi"),
                        ("3.10", "Kontrol Kualitas & Laboratorium (Sampel)"),
                    ],
                ),
                section(
                    "4. Equipment & Operational Condition",
                    &[
                        ("4.1", "Kondisi Mesin (Shredder, Conveyor)"),
                        ("4.2", "Sistem Proteksi Mesin (Guard, Interlock)"),
                        ("4.3", "Pemantauan Kondisi Mesin"),
                        ("4.4", "Sistem Proteksi Kebakaran"),
                    ],
                ),
            ],
        }
    }
}
