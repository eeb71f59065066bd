//! # Validation Module
//!
//! Boundary validation for values that cannot be silently defaulted.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: axum Query extractor                                         │
//! │  └── Type validation (page=abc → 400)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── page ≥ 1, page_size in [1, 100]                                   │
//! │  └── dates in YYYY-MM-DD form                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: filter normalization (lenient)                               │
//! │  └── unknown sort / order / tag mode → defaults                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationResult};
use crate::MAX_PAGE_SIZE;

/// Validates a 1-based page number.
///
/// ## Example
/// ```rust
/// use truestate_core::validation::validate_page;
///
/// assert_eq!(validate_page(2).unwrap(), 2);
/// assert!(validate_page(0).is_err());
/// ```
pub fn validate_page(page: i64) -> ValidationResult<u32> {
    if page < 1 {
        return Err(ValidationError::TooSmall {
            field: "page".to_string(),
            min: 1,
        });
    }
    u32::try_from(page).map_err(|_| ValidationError::OutOfRange {
        field: "page".to_string(),
        min: 1,
        max: i64::from(u32::MAX),
    })
}

/// Validates a page size against [1, [`MAX_PAGE_SIZE`]].
pub fn validate_page_size(page_size: i64) -> ValidationResult<u32> {
    let max = i64::from(MAX_PAGE_SIZE);
    if !(1..=max).contains(&page_size) {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max,
        });
    }
    // In range, so the cast cannot truncate
    Ok(page_size as u32)
}

/// Parses a `YYYY-MM-DD` date parameter.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(validate_page(1).unwrap(), 1);
        assert!(validate_page(0).is_err());
        assert!(validate_page(-4).is_err());
        assert!(validate_page(i64::MAX).is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert_eq!(validate_page_size(1).unwrap(), 1);
        assert_eq!(validate_page_size(100).unwrap(), 100);
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date_from", "2021-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()
        );
        assert!(parse_date("date_from", "2021-13-01").is_err());
        assert!(parse_date("date_from", "yesterday").is_err());

        let err = parse_date("date_to", "31-12-2021").unwrap_err();
        assert!(err.to_string().starts_with("date_to"));
    }
}
