//! Command implementations

use allot_registry::Registry;
use allot_store::JsonFileStore;

use crate::output::print_info;

pub mod allocator;
pub mod category;
pub mod check;
pub mod redistribute;
pub mod report;
pub mod target;

/// Registry backed by the data directory.
pub type LocalRegistry = Registry<JsonFileStore>;

/// Parse `KEY=VALUE` where VALUE parses as `T`.
pub(crate) fn parse_assignment<T>(s: &str) -> Result<(String, T), String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=VALUE, got `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing category in `{}`", s));
    }
    let value = value
        .trim()
        .parse::<T>()
        .map_err(|e| format!("invalid value in `{}`: {}", s, e))?;
    Ok((key.to_string(), value))
}

/// Remind the user when allocators are waiting for a run.
pub(crate) fn hint_pending(registry: &LocalRegistry) {
    let pending = registry.pending_reallocation().len();
    if pending > 0 {
        print_info(&format!(
            "{} allocator(s) pending reallocation; run `allot redistribute pending`",
            pending
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment::<f64>("Health=250.5").unwrap(),
            ("Health".to_string(), 250.5)
        );
        assert_eq!(
            parse_assignment::<u32>(" roads = 3 ").unwrap(),
            ("roads".to_string(), 3)
        );
    }

    #[test]
    fn test_parse_assignment_rejects_malformed() {
        assert!(parse_assignment::<f64>("Health").is_err());
        assert!(parse_assignment::<f64>("=10").is_err());
        assert!(parse_assignment::<u32>("Health=lots").is_err());
        assert!(parse_assignment::<u32>("Health=-1").is_err());
    }
}
