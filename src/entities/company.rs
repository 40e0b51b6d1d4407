// 🏢 Company Entity - one registered CNPJ in the directory
//
// Identity: UUID assigned at registration
// Natural key: CNPJ (a CNPJ can be registered only once)

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::cnpj::{strip_non_digits, Cnpj};
use crate::mask::mask_cep;
use crate::pagination::Page;
use crate::search::{SearchFilter, Searchable};

// ============================================================================
// ADDRESS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Postal code, digits only (empty when unknown)
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    /// Bairro
    pub district: String,
    pub city: String,
    /// Two-letter UF code ("SP", "RJ", ...)
    pub state: String,
}

impl Address {
    /// CEP in display form (XXXXX-XXX)
    pub fn cep_formatted(&self) -> String {
        mask_cep(&self.cep)
    }

    /// Single-line form: "Av. Paulista, 1000 - Bela Vista, São Paulo/SP"
    pub fn one_line(&self) -> String {
        let mut line = self.street.clone();
        if !self.number.is_empty() {
            line.push_str(", ");
            line.push_str(&self.number);
        }
        if !self.complement.is_empty() {
            line.push(' ');
            line.push_str(&self.complement);
        }
        if !self.district.is_empty() {
            line.push_str(" - ");
            line.push_str(&self.district);
        }
        if !self.city.is_empty() {
            line.push_str(", ");
            line.push_str(&self.city);
            if !self.state.is_empty() {
                line.push('/');
                line.push_str(&self.state);
            }
        }
        line.trim().to_string()
    }
}

// ============================================================================
// COMPANY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Stable identity (UUID)
    pub id: String,

    /// Trade name (nome fantasia)
    pub name: String,

    /// Legal name (razão social)
    pub legal_name: String,

    pub cnpj: Cnpj,

    pub address: Address,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company with a fresh UUID
    pub fn new(name: impl Into<String>, legal_name: impl Into<String>, cnpj: Cnpj) -> Self {
        Company {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            legal_name: legal_name.into(),
            cnpj,
            address: Address::default(),
            email: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    /// Builder: set address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Builder: set contact details
    pub fn with_contact(mut self, email: Option<String>, phone: Option<String>) -> Self {
        self.email = email;
        self.phone = phone;
        self
    }
}

impl Searchable for Company {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn legal_name(&self) -> &str {
        &self.legal_name
    }

    fn identifier(&self) -> &str {
        self.cnpj.as_str()
    }
}

// ============================================================================
// COMPANY REGISTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("CNPJ {0} já cadastrado")]
    DuplicateCnpj(String),
}

/// In-memory directory of registered companies.
///
/// Cheap to clone; clones share the same storage.
#[derive(Clone, Default)]
pub struct CompanyRegistry {
    companies: Arc<RwLock<Vec<Company>>>,
    filter: SearchFilter,
}

impl CompanyRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with a custom search filter
    pub fn with_filter(filter: SearchFilter) -> Self {
        CompanyRegistry {
            companies: Arc::new(RwLock::new(Vec::new())),
            filter,
        }
    }

    /// Register a company; a CNPJ can only be registered once.
    pub fn register(&self, company: Company) -> Result<Company, RegistryError> {
        let mut companies = self.companies.write();

        if companies.iter().any(|c| c.cnpj == company.cnpj) {
            tracing::warn!(cnpj = %company.cnpj, "rejected duplicate registration");
            return Err(RegistryError::DuplicateCnpj(company.cnpj.formatted()));
        }

        tracing::debug!(id = %company.id, cnpj = %company.cnpj, "company registered");
        companies.push(company.clone());
        Ok(company)
    }

    /// Find company by UUID
    pub fn find_by_id(&self, id: &str) -> Option<Company> {
        self.companies.read().iter().find(|c| c.id == id).cloned()
    }

    /// Find company by CNPJ (masked or raw input)
    pub fn find_by_cnpj(&self, cnpj: &str) -> Option<Company> {
        let digits = strip_non_digits(cnpj);
        self.companies
            .read()
            .iter()
            .find(|c| c.cnpj.as_str() == digits)
            .cloned()
    }

    /// All companies, in registration order
    pub fn all_companies(&self) -> Vec<Company> {
        self.companies.read().clone()
    }

    pub fn count(&self) -> usize {
        self.companies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Search then paginate, as the directory listing does
    pub fn search(&self, term: &str, current_page: i64, per_page: usize) -> Page<Company> {
        let companies = self.companies.read();
        let matches = self.filter.filter(companies.as_slice(), term);
        Page::from_slice(&matches, current_page, per_page)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cnpj(value: &str) -> Cnpj {
        Cnpj::new(value).unwrap()
    }

    fn sample_registry() -> CompanyRegistry {
        let registry = CompanyRegistry::new();
        registry
            .register(Company::new("Café Premium", "Premium Cafés LTDA", cnpj("11222333000181")))
            .unwrap();
        registry
            .register(Company::new("Petro", "Petróleo Brasileiro SA", cnpj("33000167000101")))
            .unwrap();
        registry
            .register(Company::new("BB", "Banco do Brasil SA", cnpj("00000000000191")))
            .unwrap();
        registry
    }

    #[test]
    fn test_company_creation() {
        let company = Company::new("Café Premium", "Premium Cafés LTDA", cnpj("11222333000181"));

        assert!(!company.id.is_empty());
        assert_eq!(company.name, "Café Premium");
        assert_eq!(company.identifier(), "11222333000181");
        assert_eq!(company.address, Address::default());
        assert!(company.email.is_none());
    }

    #[test]
    fn test_address_one_line() {
        let address = Address {
            cep: "01310100".to_string(),
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            complement: "".to_string(),
            district: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        };

        assert_eq!(address.one_line(), "Av. Paulista, 1000 - Bela Vista, São Paulo/SP");
        assert_eq!(address.cep_formatted(), "01310-100");
    }

    #[test]
    fn test_registry_rejects_duplicate_cnpj() {
        let registry = sample_registry();
        let dup = Company::new("Outro", "Outro LTDA", cnpj("11.222.333/0001-81"));

        assert_eq!(
            registry.register(dup),
            Err(RegistryError::DuplicateCnpj("11.222.333/0001-81".to_string()))
        );
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn test_registry_find() {
        let registry = sample_registry();

        let found = registry.find_by_cnpj("33.000.167/0001-01").unwrap();
        assert_eq!(found.name, "Petro");
        assert_eq!(registry.find_by_id(&found.id), Some(found));

        assert!(registry.find_by_cnpj("11111111111111").is_none());
        assert!(registry.find_by_id("non-existent-uuid").is_none());
    }

    #[test]
    fn test_registry_keeps_registration_order() {
        let registry = sample_registry();
        let names: Vec<String> = registry.all_companies().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Café Premium", "Petro", "BB"]);
    }

    #[test]
    fn test_registry_search() {
        let registry = sample_registry();

        let page = registry.search("brasil", 1, 10);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.info.total_items, 2);

        let page = registry.search("", 2, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "BB");
        assert_eq!(page.info.total_pages, 2);

        assert!(registry.search("11222", 1, 10).items.is_empty());
        assert_eq!(registry.search("112223", 1, 10).items.len(), 1);
    }

    #[test]
    fn test_registry_clones_share_storage() {
        let registry = CompanyRegistry::new();
        let clone = registry.clone();
        clone
            .register(Company::new("A", "A LTDA", cnpj("11222333000181")))
            .unwrap();
        assert_eq!(registry.count(), 1);
    }
}
