//! Ledger resets run before a distribution.

use allot_types::{AllocatorId, Target};
use tracing::debug;

/// Zero every target's funded amount and clear its ledger.
pub fn reset_all(targets: &mut [Target]) {
    for target in targets.iter_mut() {
        target.clear_funding();
    }
    debug!(targets = targets.len(), "All target ledgers cleared");
}

/// Withdraw `allocator`'s ledger entry from every target that has one.
///
/// Returns the total amount withdrawn. Entries of other allocators are left
/// untouched; calling this twice is the same as calling it once.
pub fn reset_for_allocator(targets: &mut [Target], allocator: AllocatorId) -> f64 {
    let withdrawn: f64 = targets
        .iter_mut()
        .filter_map(|t| t.withdraw(allocator))
        .map(|c| c.total)
        .sum();
    debug!(allocator = %allocator, withdrawn, "Allocator contributions withdrawn");
    withdrawn
}
