//! Case and word-order canonicalization of single names.

/// Reorder a "Surname, Given" name into "Given Surname".
///
/// Only names with exactly one comma are reordered; anything else is ambiguous
/// and returned trimmed but otherwise unchanged. Case is left alone.
///
/// ```
/// use payer_match::matching::normalize::normalize;
///
/// assert_eq!(normalize("Schmidt, Maria"), "Maria Schmidt");
/// assert_eq!(normalize("Maria Schmidt"), "Maria Schmidt");
/// assert_eq!(normalize("A, B, C"), "A, B, C");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let name = name.trim();

    let mut parts = name.split(',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(surname), Some(given), None) => {
            format!("{} {}", given.trim(), surname.trim())
                .trim()
                .to_string()
        }
        _ => name.to_string(),
    }
}

/// Title-case a name: the first letter of every alphabetic run is upper-cased,
/// the remaining letters lower-cased ("MAX MUSTERMANN" -> "Max Mustermann",
/// "o'BRIEN" -> "O'Brien").
#[must_use]
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_reorders_single_comma() {
        assert_eq!(normalize("Schmidt, Maria"), "Maria Schmidt");
        assert_eq!(normalize("  Schmidt ,Maria  "), "Maria Schmidt");
        assert_eq!(normalize("Müller-Lüdenscheidt, Hans Peter"), "Hans Peter Müller-Lüdenscheidt");
    }

    #[test]
    fn test_normalize_leaves_other_names() {
        assert_eq!(normalize("Maria Schmidt"), "Maria Schmidt");
        assert_eq!(normalize("  Maria Schmidt  "), "Maria Schmidt");
        assert_eq!(normalize("A, B, C"), "A, B, C");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for name in ["Schmidt, Maria", "Maria Schmidt", "A, B, C", "Schmidt,", ", Maria", ""] {
            let once = normalize(name);
            assert_eq!(normalize(&once), once, "normalize({name:?})");
        }
    }

    #[test]
    fn test_normalize_does_not_change_case() {
        assert_eq!(normalize("SCHMIDT, MARIA"), "MARIA SCHMIDT");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("MAX MUSTERMANN"), "Max Mustermann");
        assert_eq!(title_case("max mustermann"), "Max Mustermann");
        assert_eq!(title_case("SCHMIDT, MARIA"), "Schmidt, Maria");
        assert_eq!(title_case("MARIA UND HANS SCHMIDT"), "Maria Und Hans Schmidt");
        assert_eq!(title_case("HANS U. MARIA"), "Hans U. Maria");
        assert_eq!(title_case("o'BRIEN"), "O'Brien");
        assert_eq!(title_case("JÖRG MÜLLER-LÜDENSCHEIDT"), "Jörg Müller-Lüdenscheidt");
        assert_eq!(title_case(""), "");
    }
}
