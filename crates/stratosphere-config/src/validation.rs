//! Custom validation functions for fields the derive cannot express.

use stratosphere_common::{logging::is_valid_filter, DateZone};
use validator::ValidationError;

/// Validate a timezone: `UTC`, `local` or a known IANA name.
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.trim().is_empty() {
        return Err(ValidationError::new("empty_timezone"));
    }

    match timezone.parse::<DateZone>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("invalid_timezone");
            err.message = Some(format!("Unknown timezone '{}'", timezone).into());
            Err(err)
        }
    }
}

/// Validate a log filter string.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if is_valid_filter(level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_log_level");
        err.message = Some(format!("Invalid log level '{}'", level).into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("local").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("").is_err());
        assert!(validate_timezone("Nowhere/Special").is_err());
    }

    #[test]
    fn test_validate_log_level() {
        assert!(validate_log_level("warn").is_ok());
        assert!(validate_log_level("info,stratosphere_sync=debug").is_ok());
        assert!(validate_log_level("").is_err());
    }
}
