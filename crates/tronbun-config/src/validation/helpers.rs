//! Shared validation helpers.

use std::path::PathBuf;

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if an override path is set but empty.
pub(crate) fn validate_optional_path(errors: &mut Vec<String>, name: &str, value: &Option<PathBuf>) {
    if let Some(path) = value {
        if path.as_os_str().is_empty() {
            errors.push(format!("{name} is set but empty"));
        }
    }
}
