//! Keyword rule engines.
//!
//! Both engines lowercase the raw description and test substring membership
//! of fixed keyword lists in a strict order; the first list with a hit wins.
//! They are total functions: every input maps to exactly one label.
//!
//! The category engine is the only source of training labels. The priority
//! engine is only consulted at inference time.

use crate::domain::{Category, Priority};

/// Ordered category rules. Checked top to bottom.
pub const CATEGORY_RULES: [(Category, &[&str]); 3] = [
    (
        Category::Ti,
        &[
            "computadora",
            "teclado",
            "monitor",
            "vpn",
            "wifi",
            "acceso",
            "contraseña",
            "error",
            "sistema",
            "laptop",
            "servidor",
        ],
    ),
    (
        Category::Finanzas,
        &[
            "factura",
            "impuestos",
            "viáticos",
            "reembolso",
            "pago",
            "proveedor",
            "banco",
            "fiscal",
            "costo",
        ],
    ),
    (
        Category::Rrhh,
        &[
            "vacaciones",
            "sueldo",
            "nómina",
            "seguro",
            "contrato",
            "beneficios",
            "horario",
            "baja",
            "alta",
            "laboral",
        ],
    ),
];

/// Words that mark a ticket as urgent.
pub const HIGH_PRIORITY_TRIGGERS: &[&str] = &[
    "urgente",
    "crítico",
    "falla",
    "error",
    "seguridad",
    "cayó",
    "servidor",
    "robo",
    "bloqueo",
    "azul",
];

/// Words that mark maintenance or standard requests.
pub const MEDIUM_PRIORITY_TRIGGERS: &[&str] = &[
    "acceso",
    "lento",
    "actualizar",
    "instalar",
    "licencia",
    "vacaciones",
    "factura",
    "reembolso",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Assign the rule-derived department for a raw description.
pub fn assign_category(text: &str) -> Category {
    let text = text.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(Category::SoporteGeneral)
}

/// Assign urgency for a raw (not normalized) description.
///
/// `category` is accepted for interface stability but does not influence
/// the result.
pub fn assign_priority(text: &str, _category: Category) -> Priority {
    let text = text.to_lowercase();
    if contains_any(&text, HIGH_PRIORITY_TRIGGERS) {
        Priority::Alta
    } else if contains_any(&text, MEDIUM_PRIORITY_TRIGGERS) {
        Priority::Media
    } else {
        Priority::Baja
    }
}
