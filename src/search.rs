// 🔎 Free-text search over the company directory
// One search box matches trade name, legal name, or CNPJ digits.

use crate::cnpj::strip_non_digits;

/// Shortest digit run that is matched against identifiers.
///
/// Below this, "11222" would hit far too many CNPJs to be useful.
pub const MIN_IDENTIFIER_DIGITS: usize = 6;

// ============================================================================
// SEARCHABLE RECORDS
// ============================================================================

/// A record the directory search can match.
pub trait Searchable {
    /// Display (trade) name
    fn display_name(&self) -> &str;

    /// Registered legal name
    fn legal_name(&self) -> &str;

    /// Identifier normalized to digits only
    fn identifier(&self) -> &str;
}

// ============================================================================
// SEARCH FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFilter {
    /// Minimum digits in the term before identifier matching kicks in (default: 6)
    pub min_identifier_digits: usize,
}

impl Default for SearchFilter {
    fn default() -> Self {
        SearchFilter {
            min_identifier_digits: MIN_IDENTIFIER_DIGITS,
        }
    }
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the records matching `term`, in their original order.
    ///
    /// A blank term matches everything. Otherwise a record matches if its
    /// display name or legal name contains the term (case-insensitive), or
    /// if the term carries enough digits and the identifier contains them.
    /// Each record appears at most once.
    pub fn filter<T: Searchable + Clone>(&self, items: &[T], term: &str) -> Vec<T> {
        let query = match Query::parse(term, self.min_identifier_digits) {
            Some(query) => query,
            None => return items.to_vec(),
        };

        items
            .iter()
            .filter(|item| query.matches(*item))
            .cloned()
            .collect()
    }

    /// Same as `filter`, but only counts matches.
    pub fn count<T: Searchable>(&self, items: &[T], term: &str) -> usize {
        match Query::parse(term, self.min_identifier_digits) {
            Some(query) => items.iter().filter(|item| query.matches(*item)).count(),
            None => items.len(),
        }
    }
}

/// Filter with the default six-digit identifier floor.
pub fn filter_entities<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    SearchFilter::default().filter(items, term)
}

/// Normalized search term, computed once per search instead of per record.
struct Query {
    text: String,
    digits: Option<String>,
}

impl Query {
    fn parse(term: &str, min_identifier_digits: usize) -> Option<Self> {
        let text = term.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        let digits = strip_non_digits(&text);
        let digits = if digits.len() >= min_identifier_digits && !digits.is_empty() {
            Some(digits)
        } else {
            None
        };

        Some(Query { text, digits })
    }

    fn matches<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        if item.display_name().to_lowercase().contains(&self.text) {
            return true;
        }

        if item.legal_name().to_lowercase().contains(&self.text) {
            return true;
        }

        match &self.digits {
            Some(digits) => item.identifier().contains(digits.as_str()),
            None => false,
        }
    }
}
