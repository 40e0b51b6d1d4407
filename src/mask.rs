// 🎭 Progressive masks - format identifiers while they are being typed
//
// Every keystroke re-masks the whole field, so masking must be idempotent:
// "11222333000181" → "11.222.333/0001-81" → "11.222.333/0001-81"

use crate::cnpj::strip_non_digits;

/// CNPJ: XX.XXX.XXX/XXXX-XX
const CNPJ_MASK: MaskSpec = MaskSpec {
    max_digits: 14,
    separators: &[(2, '.'), (5, '.'), (8, '/'), (12, '-')],
};

/// CEP: XXXXX-XXX
const CEP_MASK: MaskSpec = MaskSpec {
    max_digits: 8,
    separators: &[(5, '-')],
};

/// Positional mask: digits are truncated to `max_digits`, and each separator
/// is placed in front of the digit at its index once that digit exists.
struct MaskSpec {
    max_digits: usize,
    separators: &'static [(usize, char)],
}

impl MaskSpec {
    fn apply(&self, raw: &str) -> String {
        let digits = strip_non_digits(raw);
        let mut masked = String::with_capacity(self.max_digits + self.separators.len());

        for (i, digit) in digits.chars().take(self.max_digits).enumerate() {
            if let Some((_, sep)) = self.separators.iter().find(|(at, _)| *at == i) {
                masked.push(*sep);
            }
            masked.push(digit);
        }

        masked
    }
}

/// Mask a (possibly partial) CNPJ.
///
/// Example:
/// - mask_cnpj("123") = "12.3"
/// - mask_cnpj("112223330001819999") = "11.222.333/0001-81"
pub fn mask_cnpj(raw: &str) -> String {
    CNPJ_MASK.apply(raw)
}

/// Mask a (possibly partial) CEP postal code.
///
/// Example:
/// - mask_cep("01310") = "01310"
/// - mask_cep("01310100") = "01310-100"
pub fn mask_cep(raw: &str) -> String {
    CEP_MASK.apply(raw)
}
