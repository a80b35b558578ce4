use serde::{Deserialize, Serialize};

/// A single entry of the address directory
///
/// The directory is loaded and persisted outside the matching engine, so the
/// name is optional here: a record whose name is absent is kept as-is and
/// rejected by the resolver rather than silently dropped by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectoryRecord {
    /// Full name as written in the directory ("Maria Schmidt", "Schmidt, Maria")
    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub street: String,

    #[serde(default)]
    pub postal_code: String,

    #[serde(default)]
    pub city: String,
}

impl DirectoryRecord {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_address(
        mut self,
        street: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.street = street.into();
        self.postal_code = postal_code.into();
        self.city = city.into();
        self
    }

    /// The record's name, or `None` when it is missing or blank
    pub fn name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether name, street, postal code or city contains `needle`.
    ///
    /// `needle` must already be lower-case.
    pub fn mentions(&self, needle: &str) -> bool {
        [
            self.full_name.as_deref().unwrap_or_default(),
            self.street.as_str(),
            self.postal_code.as_str(),
            self.city.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Single-line postal address, e.g. "Hauptstr. 1, 12345 Berlin"
    pub fn address_line(&self) -> String {
        let locality = format!("{} {}", self.postal_code.trim(), self.city.trim());
        let locality = locality.trim();

        match (self.street.trim(), locality) {
            ("", "") => String::new(),
            ("", locality) => locality.to_string(),
            (street, "") => street.to_string(),
            (street, locality) => format!("{street}, {locality}"),
        }
    }
}
