//! CFDI payroll extraction.
//!
//! Walks a CFDI 4.0 document carrying a payroll complement (`nomina12`) and
//! flattens it into one [`NominaRow`] per perception and deduction line. The
//! invoice, fiscal stamp and payroll attributes are read once into a
//! [`DocumentFields`] template that every row carries.

mod amount;
pub mod intake;
pub mod xml;

use nomina_shared::{DocumentFields, LineKind, NominaError, NominaRow, Result, STATUS_CURRENT};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::amount::parse_amount;
use crate::xml::{Element, XmlDocument, attr};

pub use intake::{LoadedDocument, export_base_name, load_document, read_xml_file};

/// CFDI 4.0 invoice namespace.
pub const CFDI_NS: &str = "http://www.sat.gob.mx/cfd/4";

/// Fiscal stamp complement namespace.
pub const TFD_NS: &str = "http://www.sat.gob.mx/TimbreFiscalDigital";

/// Payroll complement 1.2 namespace.
pub const NOMINA_NS: &str = "http://www.sat.gob.mx/nomina12";

/// Extract the payroll rows of a CFDI document.
///
/// Perception rows come first, then deduction rows, each group in document
/// order. Fails with [`NominaError::InvalidXml`] for malformed input,
/// [`NominaError::MissingElement`] when `Comprobante`, `TimbreFiscalDigital`
/// or `Nomina` is absent, and [`NominaError::NoLineItems`] when there is
/// nothing to extract.
#[instrument(skip_all, fields(len = xml.len()))]
pub fn extract_rows(xml: &str) -> Result<Vec<NominaRow>> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = XmlDocument::parse(xml)?;

    let comprobante = doc
        .find(CFDI_NS, "Comprobante")
        .ok_or(NominaError::MissingElement("Comprobante"))?;
    let timbre = doc
        .find(TFD_NS, "TimbreFiscalDigital")
        .ok_or(NominaError::MissingElement("TimbreFiscalDigital"))?;
    let nomina = doc
        .find(NOMINA_NS, "Nomina")
        .ok_or(NominaError::MissingElement("Nomina"))?;

    let common = document_fields(&Sources {
        comprobante,
        timbre,
        nomina,
        emisor: comprobante.child(CFDI_NS, "Emisor"),
        receptor: comprobante.child(CFDI_NS, "Receptor"),
        employee: nomina.child(NOMINA_NS, "Receptor"),
    });

    let perceptions = nomina
        .find_descendant(NOMINA_NS, "Percepciones")
        .into_iter()
        .flat_map(|container| container.children_named(NOMINA_NS, "Percepcion"))
        .map(|p| NominaRow {
            document: common.clone(),
            kind: LineKind::Perception,
            sat_code: attr(Some(p), "TipoPercepcion").to_string(),
            internal_code: attr(Some(p), "Clave").to_string(),
            concept: attr(Some(p), "Concepto").to_string(),
            taxed_amount: parse_amount(attr(Some(p), "ImporteGravado"), "ImporteGravado"),
            exempt_amount: parse_amount(attr(Some(p), "ImporteExento"), "ImporteExento"),
        });

    let deductions = nomina
        .find_descendant(NOMINA_NS, "Deducciones")
        .into_iter()
        .flat_map(|container| container.children_named(NOMINA_NS, "Deduccion"))
        .map(|d| NominaRow {
            document: common.clone(),
            kind: LineKind::Deduction,
            sat_code: attr(Some(d), "TipoDeduccion").to_string(),
            internal_code: attr(Some(d), "Clave").to_string(),
            concept: attr(Some(d), "Concepto").to_string(),
            taxed_amount: parse_amount(attr(Some(d), "Importe"), "Importe"),
            exempt_amount: Decimal::ZERO,
        });

    let rows: Vec<NominaRow> = perceptions.chain(deductions).collect();
    if rows.is_empty() {
        return Err(NominaError::NoLineItems);
    }

    debug!(
        uuid = %common.fiscal_uuid,
        perceptions = rows.iter().filter(|r| r.kind == LineKind::Perception).count(),
        deductions = rows.iter().filter(|r| r.kind == LineKind::Deduction).count(),
        "extracted payroll rows"
    );

    Ok(rows)
}

/// Elements the document-level fields are read from.
struct Sources<'a> {
    comprobante: &'a Element,
    timbre: &'a Element,
    nomina: &'a Element,
    emisor: Option<&'a Element>,
    receptor: Option<&'a Element>,
    /// `nomina12:Receptor`, present in the extended variant.
    employee: Option<&'a Element>,
}

fn document_fields(src: &Sources<'_>) -> DocumentFields {
    let comprobante = Some(src.comprobante);
    let timbre = Some(src.timbre);
    let nomina = Some(src.nomina);
    let field = |el: Option<&Element>, name: &str| attr(el, name).to_string();

    DocumentFields {
        version: field(comprobante, "Version"),
        fiscal_uuid: field(timbre, "UUID"),
        series: field(comprobante, "Serie"),
        folio: field(comprobante, "Folio"),

        rfc: field(src.receptor, "Rfc"),
        employee_name: field(src.receptor, "Nombre"),
        fiscal_regime: field(src.emisor, "RegimenFiscal"),
        postal_code: field(src.receptor, "DomicilioFiscalReceptor"),
        employee_number: field(src.employee, "NumEmpleado"),
        social_security_number: field(src.employee, "NumSeguridadSocial"),
        bank: field(src.employee, "Banco"),
        bank_account: field(src.employee, "CuentaBancaria"),
        hiring_regime: field(src.employee, "TipoRegimen"),
        employment_start_date: field(src.employee, "FechaInicioRelLaboral"),
        department: field(src.employee, "Departamento"),
        position: field(src.employee, "Puesto"),
        risk_class: field(src.employee, "RiesgoPuesto"),
        contract_type: field(src.employee, "TipoContrato"),
        pay_frequency: field(src.employee, "PeriodicidadPago"),
        shift_type: field(src.employee, "TipoJornada"),
        base_salary: field(src.employee, "SalarioBaseCotApor"),
        integrated_daily_salary: field(src.employee, "SalarioDiarioIntegrado"),
        payroll_type: field(nomina, "TipoNomina"),

        period_start: field(nomina, "FechaInicialPago"),
        period_end: field(nomina, "FechaFinalPago"),
        days_paid: field(nomina, "NumDiasPagados"),
        payment_date: field(nomina, "FechaPago"),

        issued_at: field(comprobante, "Fecha"),
        stamped_at: field(timbre, "FechaTimbrado"),
        status: STATUS_CURRENT.to_string(),
    }
}
