// Company Registry - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod cnpj;
pub mod mask;
pub mod search;
pub mod pagination;
pub mod entities;
pub mod form;
pub mod lookup;
pub mod import;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use cnpj::{
    Cnpj, CnpjError, CNPJ_LENGTH,
    validate_cnpj, strip_non_digits, check_digits,
};
pub use mask::{mask_cnpj, mask_cep};
pub use search::{
    Searchable, SearchFilter, MIN_IDENTIFIER_DIGITS,
    filter_entities,
};
pub use pagination::{Page, PageInfo, DEFAULT_PER_PAGE, paginate};
pub use entities::{Address, Company, CompanyRegistry, RegistryError};
pub use form::{CompanyDraft, FieldError, describe_errors};
pub use lookup::{CnpjLookup, LookupError, RegistryRecord, StaticCnpjLookup};
#[cfg(feature = "server")]
pub use lookup::HttpCnpjLookup;
pub use import::{ImportSummary, RejectedRow, load_drafts_csv, load_drafts_reader, import_drafts};
pub use config::{Config, ConfigError, LookupConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
