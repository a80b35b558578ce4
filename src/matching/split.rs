//! Splitting of compound payer names ("Maria und Hans Schmidt") into one
//! name per person.
//!
//! Splitting is a heuristic driven by [`SPLIT_RULES`], an ordered table
//! evaluated first-match-wins. The same splitter runs on payer names and on
//! directory names so both sides of a comparison are treated alike.
//!
//! Known limitations: a single person whose name contains one of the
//! conjunction markers is split anyway, and the repeated-surname rule only
//! recognizes two people sharing one trailing surname.

/// Conjunction markers, in the order they are tried (case-sensitive)
pub const SEPARATORS: [&str; 9] = [
    " Und ", " und ", " U. ", " u. ", " And ", " and ", " & ", " + ", "   ",
];

/// Minimum number of words needed to hold two full names
const MIN_WORDS_FOR_TWO_NAMES: usize = 4;

/// One entry of the split rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// Split at the first occurrence of a conjunction marker
    Separator(&'static str),

    /// "Maria Schmidt Hans Schmidt": the last word repeats earlier in the name
    RepeatedSurname,
}

/// The rule table: every separator in order, then the repeated-surname rule
pub const SPLIT_RULES: [SplitRule; 10] = [
    SplitRule::Separator(SEPARATORS[0]),
    SplitRule::Separator(SEPARATORS[1]),
    SplitRule::Separator(SEPARATORS[2]),
    SplitRule::Separator(SEPARATORS[3]),
    SplitRule::Separator(SEPARATORS[4]),
    SplitRule::Separator(SEPARATORS[5]),
    SplitRule::Separator(SEPARATORS[6]),
    SplitRule::Separator(SEPARATORS[7]),
    SplitRule::Separator(SEPARATORS[8]),
    SplitRule::RepeatedSurname,
];

impl SplitRule {
    /// Apply this rule to an already trimmed name.
    ///
    /// Returns `None` when the rule does not apply, so the next rule is tried.
    pub fn apply(&self, name: &str) -> Option<Vec<String>> {
        match self {
            Self::Separator(separator) => split_at_separator(name, separator),
            Self::RepeatedSurname => split_at_repeated_surname(name),
        }
    }
}

impl std::fmt::Display for SplitRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Separator(separator) => write!(f, "separator {separator:?}"),
            Self::RepeatedSurname => write!(f, "repeated surname"),
        }
    }
}

/// Split a name into one or more person names; never returns an empty list.
///
/// ```
/// use payer_match::matching::split::split;
///
/// assert_eq!(split("Maria Und Hans Schmidt"), vec!["Maria Schmidt", "Hans Schmidt"]);
/// assert_eq!(split("Acme GmbH"), vec!["Acme GmbH"]);
/// ```
#[must_use]
pub fn split(name: &str) -> Vec<String> {
    let name = name.trim();

    SPLIT_RULES
        .iter()
        .find_map(|rule| rule.apply(name))
        .unwrap_or_else(|| vec![name.to_string()])
}

/// Which rule `split` would use for this name, if any
pub fn matching_rule(name: &str) -> Option<SplitRule> {
    let name = name.trim();
    SPLIT_RULES
        .iter()
        .copied()
        .find(|rule| rule.apply(name).is_some())
}

fn split_at_separator(name: &str, separator: &str) -> Option<Vec<String>> {
    let (first, second) = name.split_once(separator)?;
    let first = first.trim();
    let second = second.trim();

    // "Maria Und Hans Schmidt": a bare given name borrows the second surname
    let first = match second.split_whitespace().last() {
        Some(surname) if first.split_whitespace().count() == 1 => format!("{first} {surname}"),
        _ => first.to_string(),
    };

    Some(vec![first, second.to_string()])
}

fn split_at_repeated_surname(name: &str) -> Option<Vec<String>> {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() < MIN_WORDS_FOR_TWO_NAMES {
        return None;
    }

    let last = words[words.len() - 1];
    let i = (1..words.len() - 1).rev().find(|&i| words[i] == last)?;

    Some(vec![words[..=i].join(" "), words[i + 1..].join(" ")])
}
