// 📥 CSV seed import - bulk-load companies into the directory
//
// Header row uses the form's field names:
// name,legal_name,cnpj,cep,street,number,complement,district,city,state,email,phone
// Bad rows are reported and skipped; they never abort the import.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use crate::entities::CompanyRegistry;
use crate::form::{describe_errors, CompanyDraft};

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// Line number in the file (the header is line 1)
    pub line: usize,
    pub cnpj: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub rejected: Vec<RejectedRow>,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.imported + self.rejected.len()
    }
}

/// Load creation-form rows from a CSV file
pub fn load_drafts_csv(path: &Path) -> Result<Vec<CompanyDraft>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    load_drafts_reader(file).with_context(|| format!("Failed to parse CSV file: {:?}", path))
}

/// Load creation-form rows from any CSV source
pub fn load_drafts_reader<R: Read>(reader: R) -> Result<Vec<CompanyDraft>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut drafts = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let draft: CompanyDraft =
            result.with_context(|| format!("Failed to parse CSV row at line {}", i + 2))?;
        drafts.push(draft);
    }

    Ok(drafts)
}

/// Validate and register each draft. Invalid rows and duplicate CNPJs are
/// collected in the summary.
pub fn import_drafts(registry: &CompanyRegistry, drafts: Vec<CompanyDraft>) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for (i, draft) in drafts.into_iter().enumerate() {
        let line = i + 2;
        let cnpj = draft.cnpj.clone();

        let reasons = match draft.into_company() {
            Ok(company) => match registry.register(company) {
                Ok(_) => {
                    summary.imported += 1;
                    continue;
                }
                Err(e) => vec![e.to_string()],
            },
            Err(errors) => {
                tracing::warn!(line, errors = %describe_errors(&errors), "skipping invalid row");
                errors.into_iter().map(|e| e.to_string()).collect()
            }
        };

        summary.rejected.push(RejectedRow { line, cnpj, reasons });
    }

    tracing::info!(
        imported = summary.imported,
        rejected = summary.rejected.len(),
        "import finished"
    );
    summary
}
