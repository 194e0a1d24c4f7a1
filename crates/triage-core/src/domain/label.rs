//! Category and priority labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::TriageError;

/// Department a ticket routes to.
///
/// Variants are declared in ascending order of their label text
/// (`Finanzas` < `RRHH` < `Soporte General` < `TI`). The derived `Ord` is the
/// canonical class order used for vote and argmax tie-breaking: the lowest
/// ordinal wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Finanzas")]
    Finanzas,
    #[serde(rename = "RRHH")]
    Rrhh,
    #[serde(rename = "Soporte General")]
    SoporteGeneral,
    #[serde(rename = "TI")]
    Ti,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 4] = [
        Category::Finanzas,
        Category::Rrhh,
        Category::SoporteGeneral,
        Category::Ti,
    ];

    /// Label as written to datasets and output artifacts.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Finanzas => "Finanzas",
            Category::Rrhh => "RRHH",
            Category::SoporteGeneral => "Soporte General",
            Category::Ti => "TI",
        }
    }

    /// Position in the canonical order.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Finanzas" => Ok(Category::Finanzas),
            "RRHH" => Ok(Category::Rrhh),
            "Soporte General" | "SoporteGeneral" => Ok(Category::SoporteGeneral),
            "TI" => Ok(Category::Ti),
            other => Err(TriageError::UnknownLabel(other.to_string())),
        }
    }
}

/// Urgency assigned at inference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Alta,
    Media,
    Baja,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Alta => "Alta",
            Priority::Media => "Media",
            Priority::Baja => "Baja",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
