#![allow(dead_code)]

use std::path::Path;

use triage_core::{label_tickets, LabeledExample, Ticket};

/// Raw help-desk requests covering every category.
pub const RAW_TICKETS: &[&str] = &[
    "No puedo acceder a mi VPN, error de contraseña",
    "El teclado de mi laptop no funciona",
    "El monitor parpadea desde ayer",
    "Necesito reembolso de viáticos del viaje a Monterrey",
    "La factura del proveedor llegó duplicada",
    "Consulta sobre el pago pendiente al banco",
    "Quiero solicitar vacaciones en diciembre",
    "Mi nómina de la quincena llegó incompleta",
    "Duda sobre beneficios del contrato",
    "La cafetería del piso tres está cerrada",
    "Solicito limpieza en la sala de juntas",
    "Se rompió la silla de recepción",
];

pub fn tickets() -> Vec<Ticket> {
    RAW_TICKETS
        .iter()
        .enumerate()
        .map(|(i, text)| Ticket::new(None, i + 1, Some(text.to_string())))
        .collect()
}

/// Rule-labeled, normalized training examples.
pub fn examples() -> Vec<LabeledExample> {
    label_tickets(&tickets())
        .into_iter()
        .map(|l| LabeledExample::new(l.normalized_text, l.category))
        .collect()
}

pub fn write_tickets_csv(path: &Path, rows: &[(&str, &str)]) {
    let mut wtr = csv::Writer::from_path(path).unwrap();
    wtr.write_record(["id", "descripcion"]).unwrap();
    for (id, text) in rows {
        wtr.write_record([*id, *text]).unwrap();
    }
    wtr.flush().unwrap();
}
