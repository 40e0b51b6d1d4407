// 📝 Company creation form
// Raw user input → validated Company
//
// The form keeps what the user typed (masked or not). Validation collects
// every problem at once so the UI can flag all fields in one pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cnpj::{strip_non_digits, validate_cnpj, Cnpj};
use crate::entities::{Address, Company};
use crate::lookup::RegistryRecord;
use crate::mask::{mask_cep, mask_cnpj};

/// Digits in a complete CEP
pub const CEP_LENGTH: usize = 8;

// ============================================================================
// FIELD ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Join field errors into one line (CLI output, logs)
pub fn describe_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// DRAFT
// ============================================================================

/// The creation form as submitted. Accepts snake_case and camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDraft {
    pub name: String,
    #[serde(alias = "legalName")]
    pub legal_name: String,
    pub cnpj: String,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CompanyDraft {
    pub fn new(name: impl Into<String>, legal_name: impl Into<String>, cnpj: impl Into<String>) -> Self {
        CompanyDraft {
            name: name.into(),
            legal_name: legal_name.into(),
            cnpj: cnpj.into(),
            ..Default::default()
        }
    }

    /// Check every field, returning all problems found.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Nome fantasia é obrigatório"));
        }

        if self.legal_name.trim().is_empty() {
            errors.push(FieldError::new("legal_name", "Razão social é obrigatória"));
        }

        if let Err(e) = validate_cnpj(&self.cnpj) {
            errors.push(FieldError::new("cnpj", e.to_string()));
        }

        let cep = strip_non_digits(&self.cep);
        if !self.cep.trim().is_empty() && cep.len() != CEP_LENGTH {
            errors.push(FieldError::new("cep", "O CEP deve ter 8 dígitos"));
        }

        let state = self.state.trim();
        if !state.is_empty() && (state.chars().count() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic())) {
            errors.push(FieldError::new("state", "UF deve ter 2 letras"));
        }

        if let Some(email) = non_blank(&self.email) {
            if !is_plausible_email(&email) {
                errors.push(FieldError::new("email", "E-mail inválido"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Auto-fill from a registry record.
    ///
    /// Legal name and non-empty address fields come from the registry. The
    /// trade name, email and phone are only filled when the user left them blank.
    pub fn apply_registry_record(&mut self, record: &RegistryRecord) {
        if !record.cnpj.is_empty() {
            self.cnpj = mask_cnpj(&record.cnpj);
        }

        self.legal_name = record.legal_name.clone();

        if self.name.trim().is_empty() {
            self.name = record
                .trade_name
                .clone()
                .unwrap_or_else(|| record.legal_name.clone());
        }

        let address = &record.address;
        overwrite_if_present(&mut self.cep, &mask_cep(&address.cep));
        overwrite_if_present(&mut self.street, &address.street);
        overwrite_if_present(&mut self.number, &address.number);
        overwrite_if_present(&mut self.complement, &address.complement);
        overwrite_if_present(&mut self.district, &address.district);
        overwrite_if_present(&mut self.city, &address.city);
        overwrite_if_present(&mut self.state, &address.state);

        if non_blank(&self.email).is_none() {
            self.email = record.email.clone();
        }
        if non_blank(&self.phone).is_none() {
            self.phone = record.phone.clone();
        }
    }

    /// Copy with CNPJ and CEP in display form, as the form shows them.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        masked.cnpj = mask_cnpj(&self.cnpj);
        masked.cep = mask_cep(&self.cep);
        masked
    }

    /// Validate and build the Company to register.
    pub fn into_company(self) -> Result<Company, Vec<FieldError>> {
        self.validate()?;

        let cnpj = Cnpj::new(&self.cnpj).map_err(|e| vec![FieldError::new("cnpj", e.to_string())])?;

        let address = Address {
            cep: strip_non_digits(&self.cep),
            street: self.street.trim().to_string(),
            number: self.number.trim().to_string(),
            complement: self.complement.trim().to_string(),
            district: self.district.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_uppercase(),
        };

        let email = non_blank(&self.email).map(|e| e.to_lowercase());
        let phone = non_blank(&self.phone);

        Ok(Company::new(self.name.trim(), self.legal_name.trim(), cnpj)
            .with_address(address)
            .with_contact(email, phone))
    }
}

fn overwrite_if_present(field: &mut String, value: &str) {
    if !value.trim().is_empty() {
        *field = value.to_string();
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

// ============================================================================
// TESTS
// ============================================================================
