//! Typed bit sets over flag enums.
//!
//! [`FlagSet<E>`] stores up to 64 flags of one enum type in a `u64`,
//! keeping the set algebra type-checked: a `FlagSet<Motor>` cannot be mixed
//! with `Sensor` flags. Implement [`Flag`] on a fieldless enum by handing out
//! bit indices, typically the discriminants:
//!
//! ```ignore
//! #[derive(Clone, Copy)]
//! enum Motor { Enabled, Stalled, OverTemp }
//!
//! impl Flag for Motor {
//!     fn bit(self) -> u32 {
//!         self as u32
//!     }
//! }
//!
//! let mut state = FlagSet::new();
//! state.set(Motor::Enabled);
//! assert!(state.contains(Motor::Enabled));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A flag kind usable in a [`FlagSet`].
///
/// `bit` returns the flag's bit index and must be below 64.
pub trait Flag: Copy {
    fn bit(self) -> u32;
}

/// A set of [`Flag`]s backed by a `u64`.
pub struct FlagSet<E> {
    bits: u64,
    _marker: PhantomData<E>,
}

impl<E: Flag> FlagSet<E> {
    /// The empty set.
    pub const fn new() -> Self {
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn mask(flag: E) -> u64 {
        let bit = flag.bit();
        debug_assert!(bit < 64, "flag bit index {bit} exceeds storage width");
        1u64 << bit
    }

    /// Inserts `flag`.
    #[inline]
    pub fn set(&mut self, flag: E) {
        self.bits |= Self::mask(flag);
    }

    /// Removes `flag`.
    #[inline]
    pub fn clear(&mut self, flag: E) {
        self.bits &= !Self::mask(flag);
    }

    /// Flips `flag`.
    #[inline]
    pub fn toggle(&mut self, flag: E) {
        self.bits ^= Self::mask(flag);
    }

    /// Whether `flag` is in the set.
    #[inline]
    pub fn contains(&self, flag: E) -> bool {
        self.bits & Self::mask(flag) != 0
    }

    /// Whether every flag of `other` is in the set.
    #[inline]
    pub fn contains_all(&self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Whether at least one flag of `other` is in the set.
    #[inline]
    pub fn intersects(&self, other: Self) -> bool {
        self.bits & other.bits != 0
    }

    /// Whether any flag is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    /// Whether no flag is set.
    #[inline]
    pub fn none(&self) -> bool {
        self.bits == 0
    }

    /// Removes every flag.
    #[inline]
    pub fn clear_all(&mut self) {
        self.bits = 0;
    }

    /// The raw bit pattern.
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.bits
    }
}

// Manual impls: `derive` would put an `E: Trait` bound on the phantom
// parameter.

impl<E> Clone for FlagSet<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for FlagSet<E> {}

impl<E> PartialEq for FlagSet<E> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<E> Eq for FlagSet<E> {}

impl<E: Flag> Default for FlagSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for FlagSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlagSet({:#b})", self.bits)
    }
}

impl<E: Flag> From<E> for FlagSet<E> {
    fn from(flag: E) -> Self {
        let mut set = Self::new();
        set.set(flag);
        set
    }
}

impl<E: Flag> FromIterator<E> for FlagSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        for flag in iter {
            set.set(flag);
        }
        set
    }
}

impl<E: Flag> BitOr for FlagSet<E> {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self {
        self.bits |= rhs.bits;
        self
    }
}

impl<E: Flag> BitOr<E> for FlagSet<E> {
    type Output = Self;

    fn bitor(mut self, rhs: E) -> Self {
        self.set(rhs);
        self
    }
}

impl<E: Flag> BitOrAssign<E> for FlagSet<E> {
    fn bitor_assign(&mut self, rhs: E) {
        self.set(rhs);
    }
}

impl<E: Flag> BitAnd for FlagSet<E> {
    type Output = Self;

    fn bitand(mut self, rhs: Self) -> Self {
        self.bits &= rhs.bits;
        self
    }
}

impl<E: Flag> BitAnd<E> for FlagSet<E> {
    type Output = Self;

    fn bitand(self, rhs: E) -> Self {
        self & Self::from(rhs)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug)]
    enum Line {
        Ready,
        Error,
        Busy,
        Overrun,
    }

    impl Flag for Line {
        fn bit(self) -> u32 {
            self as u32
        }
    }

    #[test]
    fn test_set_clear_contains() {
        let mut s: FlagSet<Line> = FlagSet::new();
        assert!(s.none());

        s.set(Line::Ready);
        s.set(Line::Busy);
        assert!(s.contains(Line::Ready));
        assert!(s.contains(Line::Busy));
        assert!(!s.contains(Line::Error));
        assert!(s.any());

        s.clear(Line::Ready);
        assert!(!s.contains(Line::Ready));
        assert!(s.contains(Line::Busy));
    }

    #[test]
    fn test_toggle() {
        let mut s: FlagSet<Line> = FlagSet::new();
        s.toggle(Line::Error);
        assert!(s.contains(Line::Error));
        s.toggle(Line::Error);
        assert!(!s.contains(Line::Error));
        assert!(s.none());
    }

    #[test]
    fn test_bits_match_indices() {
        let s: FlagSet<Line> = [Line::Ready, Line::Overrun].into_iter().collect();
        assert_eq!(s.bits(), 0b1001);
    }

    #[test]
    fn test_set_algebra() {
        let a = FlagSet::from(Line::Ready) | Line::Busy;
        let b = FlagSet::from(Line::Busy) | Line::Overrun;

        let union = a | b;
        assert!(union.contains(Line::Ready));
        assert!(union.contains(Line::Busy));
        assert!(union.contains(Line::Overrun));

        let common = a & b;
        assert!(common.contains(Line::Busy));
        assert!(!common.contains(Line::Ready));
        assert_eq!(common.bits().count_ones(), 1);

        let masked = union & Line::Overrun;
        assert_eq!(masked, FlagSet::from(Line::Overrun));
        assert!((a & Line::Overrun).none());
    }

    #[test]
    fn test_contains_all() {
        let have: FlagSet<Line> = [Line::Ready, Line::Busy, Line::Error].into_iter().collect();
        let want: FlagSet<Line> = [Line::Ready, Line::Error].into_iter().collect();
        assert!(have.contains_all(want));
        assert!(!want.contains_all(have));
        assert!(have.contains_all(FlagSet::new()));
    }

    #[test]
    fn test_intersects() {
        let a: FlagSet<Line> = [Line::Ready, Line::Busy].into_iter().collect();
        let b: FlagSet<Line> = [Line::Busy, Line::Overrun].into_iter().collect();
        let c = FlagSet::from(Line::Error);

        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert!(!a.intersects(FlagSet::new()));
    }

    #[test]
    fn test_clear_all_and_default() {
        let mut s: FlagSet<Line> = [Line::Ready, Line::Busy].into_iter().collect();
        s.clear_all();
        assert_eq!(s, FlagSet::default());
        assert!(s.none());
    }

    #[test]
    fn test_or_assign_single_flag() {
        let mut s: FlagSet<Line> = FlagSet::new();
        s |= Line::Busy;
        s |= Line::Error;
        assert!(s.contains(Line::Busy));
        assert!(s.contains(Line::Error));
    }

    #[test]
    fn test_debug_shows_bit_pattern() {
        let s: FlagSet<Line> = FlagSet::from(Line::Error);
        assert_eq!(format!("{s:?}"), "FlagSet(0b10)");
    }
}
