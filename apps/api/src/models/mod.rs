pub mod account;
pub mod department;
pub mod employee;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Removes accents and other combining marks (`"Pérez"` → `"Perez"`).
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Canonical form of an email address: accents stripped, lowercased, trimmed.
pub fn normalize_email(raw: &str) -> String {
    fold_diacritics(raw).to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_diacritics_strips_accents() {
        assert_eq!(fold_diacritics("Pérez Núñez"), "Perez Nunez");
        assert_eq!(fold_diacritics("maestría"), "maestria");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.PÉREZ@Test.com "), "ana.perez@test.com");
        assert_eq!(normalize_email(""), "");
    }
}
