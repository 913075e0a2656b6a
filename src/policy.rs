//! Fault policies for the sequential containers.
//!
//! A [`FaultPolicy`] decides what happens when a container rejects an
//! operation (push on a full ring, extend past capacity). The rejection is
//! always also visible in the return value; the policy is a side channel for
//! catching misuse loudly during development.
//!
//! - [`Silent`]: ignore the diagnostic, rely on return values (release-friendly).
//! - [`FailFast`]: panic with the diagnostic string (debug/test-friendly).

/// Compile-time strategy for reporting rejected container operations.
///
/// Implementors are zero-sized; the choice is made in the type signature:
///
/// ```ignore
/// let quiet: Fifo<u32, 64> = Fifo::new();                 // Silent default
/// let loud: Fifo<u32, 64, FailFast> = Fifo::new();        // panics on misuse
/// ```
pub trait FaultPolicy {
    /// Called with a short diagnostic when an operation is rejected.
    fn fault(what: &str);
}

/// Swallows diagnostics. The rejected operation still reports failure through
/// its return value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl FaultPolicy for Silent {
    #[inline]
    fn fault(_what: &str) {}
}

/// Panics with the diagnostic. Turns quiet misuse into an immediate, loud
/// failure during bring-up and testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl FaultPolicy for FailFast {
    #[inline]
    fn fault(what: &str) {
        panic!("{what}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_is_a_no_op() {
        Silent::fault("nothing should happen");
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_fail_fast_panics_with_diagnostic() {
        FailFast::fault("boom");
    }
}
