//! Ledger check command

use serde::Serialize;

use super::LocalRegistry;
use crate::error::{CliError, CliResult};
use crate::output::{print_error, print_structured, print_success, OutputFormat};

#[derive(Serialize)]
struct CheckResult<'a> {
    consistent: bool,
    violations: &'a [allot_engine::LedgerViolation],
}

/// Verify the contribution ledger; fails when any invariant is broken.
pub fn execute(registry: &LocalRegistry, format: OutputFormat) -> CliResult<()> {
    let violations = registry.verify();
    let result = CheckResult {
        consistent: violations.is_empty(),
        violations: &violations,
    };

    if !print_structured(&result, format)? {
        if violations.is_empty() {
            print_success(&format!(
                "Ledger consistent ({} allocator(s), {} target(s))",
                registry.allocators().len(),
                registry.targets().len()
            ));
        }
        for violation in &violations {
            print_error(&violation.to_string());
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CliError::LedgerViolations(violations.len()))
    }
}
