// Entity Models
//
// Each entity has:
// - Stable identity (UUID)
// - Natural key used for de-duplication
// - Registry for lookups and search

pub mod company;

pub use company::{Address, Company, CompanyRegistry, RegistryError};
