//! Centralized limits and input validation.

/// Maximum number of rows read from a bank export or directory file
pub const MAX_ROWS: usize = 1_000_000;

/// Maximum number of names accepted by a single web API request
pub const MAX_NAMES_PER_REQUEST: usize = 10_000;

/// Maximum length (in characters) of a single name
pub const MAX_NAME_LENGTH: usize = 1_000;

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_row_limit(rows.len()).is_some() {
///     return Err(...);
/// }
/// rows.push(row); // Safe to add
/// ```
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_ROWS}"
        ))
    } else {
        None
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u16),
    #[error("Review thresholds must satisfy low_below <= medium_below <= 100 (got {low_below} / {medium_below})")]
    InvalidReviewThresholds { low_below: u16, medium_below: u16 },
    #[error("Worker count must be at least 1")]
    NoWorkers,
    #[error("Too many names: {0} exceeds maximum of {MAX_NAMES_PER_REQUEST}")]
    TooManyNames(usize),
    #[error("Name too long: exceeds {MAX_NAME_LENGTH} characters")]
    NameTooLong,
}

/// Validate a match threshold given as a user-supplied number.
///
/// # Examples
///
/// ```
/// use payer_match::utils::validation::validate_threshold;
///
/// assert_eq!(validate_threshold(80), Ok(80));
/// assert!(validate_threshold(101).is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::ThresholdOutOfRange` above 100.
pub fn validate_threshold(value: u16) -> Result<u8, ValidationError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(ValidationError::ThresholdOutOfRange(value))
}

/// Validate the pair of review display thresholds.
///
/// # Errors
///
/// Returns `ValidationError::InvalidReviewThresholds` if either is above 100
/// or `low_below` exceeds `medium_below`.
pub fn validate_review_thresholds(
    low_below: u16,
    medium_below: u16,
) -> Result<(u8, u8), ValidationError> {
    let invalid = || ValidationError::InvalidReviewThresholds {
        low_below,
        medium_below,
    };

    let low = validate_threshold(low_below).map_err(|_| invalid())?;
    let medium = validate_threshold(medium_below).map_err(|_| invalid())?;

    if low > medium {
        return Err(invalid());
    }

    Ok((low, medium))
}

/// Validate a worker count
///
/// # Errors
///
/// Returns `ValidationError::NoWorkers` for zero.
pub fn validate_workers(workers: usize) -> Result<usize, ValidationError> {
    if workers == 0 {
        Err(ValidationError::NoWorkers)
    } else {
        Ok(workers)
    }
}

/// Validate the names submitted in one API request
///
/// # Errors
///
/// Returns `ValidationError::TooManyNames` or `ValidationError::NameTooLong`.
pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<(), ValidationError> {
    if names.len() > MAX_NAMES_PER_REQUEST {
        return Err(ValidationError::TooManyNames(names.len()));
    }

    if names
        .iter()
        .any(|name| name.as_ref().chars().count() > MAX_NAME_LENGTH)
    {
        return Err(ValidationError::NameTooLong);
    }

    Ok(())
}
