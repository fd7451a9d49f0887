//! Core domain types for extracted payroll rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status assigned to every freshly parsed, unmodified document.
pub const STATUS_CURRENT: &str = "Vigente";

// ---------------------------------------------------------------------------
// LineKind
// ---------------------------------------------------------------------------

/// Whether a row came from a perception (earning) or a deduction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    #[serde(rename = "Percepción")]
    Perception,
    #[serde(rename = "Deducción")]
    Deduction,
}

impl LineKind {
    /// Label used in tables and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Perception => "Percepción",
            Self::Deduction => "Deducción",
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DocumentFields
// ---------------------------------------------------------------------------

/// Invoice- and payroll-level attributes, identical on every row of a document.
///
/// Fields that cannot be resolved from the source (for example the employee
/// metadata of a basic payroll complement) are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    /// `Comprobante@Version`.
    pub version: String,
    /// Fiscal folio (`TimbreFiscalDigital@UUID`).
    pub fiscal_uuid: String,
    pub series: String,
    pub folio: String,

    // Identity and employment metadata.
    /// Receiver RFC.
    pub rfc: String,
    pub employee_name: String,
    /// Issuer's fiscal regime.
    pub fiscal_regime: String,
    pub postal_code: String,
    pub employee_number: String,
    pub social_security_number: String,
    pub bank: String,
    pub bank_account: String,
    pub hiring_regime: String,
    pub employment_start_date: String,
    pub department: String,
    pub position: String,
    pub risk_class: String,
    pub contract_type: String,
    pub pay_frequency: String,
    pub shift_type: String,
    /// Contribution base salary (S.B.C).
    pub base_salary: String,
    /// Integrated daily salary (S.D.I).
    pub integrated_daily_salary: String,
    pub payroll_type: String,

    // Pay period.
    pub period_start: String,
    pub period_end: String,
    pub days_paid: String,
    pub payment_date: String,

    /// `Comprobante@Fecha`.
    pub issued_at: String,
    /// `TimbreFiscalDigital@FechaTimbrado`.
    pub stamped_at: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// NominaRow
// ---------------------------------------------------------------------------

/// One flattened perception or deduction line with its document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominaRow {
    #[serde(flatten)]
    pub document: DocumentFields,
    pub kind: LineKind,
    /// SAT catalog code (`TipoPercepcion` / `TipoDeduccion`).
    pub sat_code: String,
    /// Employer's internal code (`Clave`).
    pub internal_code: String,
    /// Description (`Concepto`).
    pub concept: String,
    pub taxed_amount: Decimal,
    /// Always zero for deductions.
    pub exempt_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(kind: LineKind) -> NominaRow {
        NominaRow {
            document: DocumentFields {
                version: "4.0".into(),
                fiscal_uuid: "6F3E2A1B-0000-4000-8000-000000000001".into(),
                status: STATUS_CURRENT.into(),
                ..Default::default()
            },
            kind,
            sat_code: "001".into(),
            internal_code: "P001".into(),
            concept: "Sueldos, Salarios".into(),
            taxed_amount: Decimal::new(150000, 2),
            exempt_amount: Decimal::ZERO,
        }
    }

    #[test]
    fn line_kind_labels() {
        assert_eq!(LineKind::Perception.to_string(), "Percepción");
        assert_eq!(LineKind::Deduction.label(), "Deducción");
    }

    #[test]
    fn row_serializes_flat() {
        let row = sample_row(LineKind::Perception);
        let json = serde_json::to_value(&row).expect("serialize");
        assert_eq!(json["version"], "4.0");
        assert_eq!(json["kind"], "Percepción");
        assert_eq!(json["taxed_amount"], "1500.00");

        let parsed: NominaRow = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, row);
    }
}
