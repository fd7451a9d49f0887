//! Column layout shared by the CSV and XLSX exporters and the table views.

use std::fmt;

use nomina_shared::NominaRow;
use rust_decimal::Decimal;

/// Number of exported columns.
pub const COLUMN_COUNT: usize = 36;

/// Column labels, in export order.
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "Versión complemento",
    "Folio Fiscal",
    "Serie",
    "Folio",
    "RFC",
    "Empleado",
    "Regimen Fiscal",
    "Codigo Postal",
    "No. Empleado",
    "No. seguro social",
    "Banco",
    "Cuenta bancaria",
    "Régimen contratación",
    "Fecha inicio relación Laboral",
    "Departamento",
    "Puesto",
    "Riesgo",
    "Tipo contrato",
    "Periodicidad pago",
    "Tipo jornada",
    "S.B.C",
    "S.D.I",
    "Tipo de nómina",
    "Fecha inicial pago",
    "Fecha final pago",
    "Días pagados",
    "Fecha de pago",
    "Tipo",
    "Clave SAT",
    "Clave interna",
    "Concepto",
    "Importe Gravado",
    "Importe exento",
    "Fecha de Emisión",
    "Fecha de Timbrado",
    "Estatus",
];

/// A single exported value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Amount(Decimal),
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Amount(d) => write!(f, "{d}"),
        }
    }
}

/// The values of `row`, aligned with [`HEADERS`].
pub fn cells(row: &NominaRow) -> [Cell<'_>; COLUMN_COUNT] {
    use Cell::{Amount, Text};
    let doc = &row.document;

    [
        Text(&doc.version),
        Text(&doc.fiscal_uuid),
        Text(&doc.series),
        Text(&doc.folio),
        Text(&doc.rfc),
        Text(&doc.employee_name),
        Text(&doc.fiscal_regime),
        Text(&doc.postal_code),
        Text(&doc.employee_number),
        Text(&doc.social_security_number),
        Text(&doc.bank),
        Text(&doc.bank_account),
        Text(&doc.hiring_regime),
        Text(&doc.employment_start_date),
        Text(&doc.department),
        Text(&doc.position),
        Text(&doc.risk_class),
        Text(&doc.contract_type),
        Text(&doc.pay_frequency),
        Text(&doc.shift_type),
        Text(&doc.base_salary),
        Text(&doc.integrated_daily_salary),
        Text(&doc.payroll_type),
        Text(&doc.period_start),
        Text(&doc.period_end),
        Text(&doc.days_paid),
        Text(&doc.payment_date),
        Text(row.kind.label()),
        Text(&row.sat_code),
        Text(&row.internal_code),
        Text(&row.concept),
        Amount(row.taxed_amount),
        Amount(row.exempt_amount),
        Text(&doc.issued_at),
        Text(&doc.stamped_at),
        Text(&doc.status),
    ]
}

/// Index of a column by label.
pub fn column_index(label: &str) -> Option<usize> {
    HEADERS.iter().position(|h| *h == label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomina_shared::{DocumentFields, LineKind};

    #[test]
    fn labels_are_unique() {
        for (i, label) in HEADERS.iter().enumerate() {
            assert_eq!(column_index(label), Some(i), "duplicate label {label}");
        }
    }

    #[test]
    fn cells_line_up_with_headers() {
        let row = NominaRow {
            document: DocumentFields {
                version: "4.0".into(),
                fiscal_uuid: "UUID-1".into(),
                employee_name: "INGRID XODAR JIMENEZ".into(),
                payroll_type: "O".into(),
                stamped_at: "2024-01-15T18:31:07".into(),
                status: "Vigente".into(),
                ..Default::default()
            },
            kind: LineKind::Deduction,
            sat_code: "002".into(),
            internal_code: "D002".into(),
            concept: "ISR".into(),
            taxed_amount: Decimal::new(30050, 2),
            exempt_amount: Decimal::ZERO,
        };
        let cells = cells(&row);
        let at = |label: &str| cells[column_index(label).unwrap()].to_string();

        assert_eq!(at("Versión complemento"), "4.0");
        assert_eq!(at("Folio Fiscal"), "UUID-1");
        assert_eq!(at("Empleado"), "INGRID XODAR JIMENEZ");
        assert_eq!(at("Tipo de nómina"), "O");
        assert_eq!(at("Tipo"), "Deducción");
        assert_eq!(at("Clave SAT"), "002");
        assert_eq!(at("Clave interna"), "D002");
        assert_eq!(at("Importe Gravado"), "300.50");
        assert_eq!(at("Importe exento"), "0");
        assert_eq!(at("Fecha de Timbrado"), "2024-01-15T18:31:07");
        assert_eq!(at("Estatus"), "Vigente");
    }
}
