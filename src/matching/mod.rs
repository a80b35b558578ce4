//! Payer-name resolution engine.
//!
//! - [`normalize`]: case and "Surname, Given" canonicalization
//! - [`split`]: rule-table splitting of compound names into one name per person
//! - [`scoring`]: `ratio` and `token_sort_ratio` similarity scores
//! - [`MatchResolver`]: picks the best directory record for a payer name
//! - [`MatchDiagnosis`]: optional decision trace for audit and review
//! - [`BatchResolver`]: resolves many names on worker threads
//!
//! ## Resolution Algorithm
//!
//! 1. Title-case the payer name, reorder "Surname, Given", split co-payers
//! 2. Split every directory name the same way (once per directory)
//! 3. Score each payer variant against each directory variant with five
//!    comparisons and keep the maximum
//! 4. Accept a candidate only if it beats the running best and clears the
//!    threshold; the first candidate wins exact ties
//! 5. If the name was split and nothing matched, compare the joined variants
//!    against whole directory names
//!
//! Ties are resolved by directory order, so reordering the directory can
//! change which of two equally good records is returned.
//!
//! ## Example
//!
//! ```rust
//! use payer_match::{DirectoryRecord, MatchResolver};
//!
//! let directory = vec![
//!     DirectoryRecord::new("Max Mustermann").with_address("Hauptstr. 1", "12345", "Berlin"),
//!     DirectoryRecord::new("Hans Schmidt"),
//! ];
//!
//! let resolver = MatchResolver::new(&directory).unwrap();
//! let result = resolver.resolve("Maria Und Hans Schmidt");
//!
//! assert_eq!(result.record(), Some(&directory[1]));
//! assert_eq!(result.score(), 100);
//! ```
//!
//! [`normalize`]: normalize
//! [`split`]: split
//! [`MatchResolver`]: engine::MatchResolver
//! [`MatchDiagnosis`]: diagnosis::MatchDiagnosis
//! [`BatchResolver`]: batch::BatchResolver

pub mod batch;
pub mod diagnosis;
pub mod engine;
pub mod normalize;
pub mod scoring;
pub mod split;
