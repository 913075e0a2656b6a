//! Once-initialized global cell.
//!
//! [`Singleton<T>`] holds a value that is written exactly once and read from
//! anywhere afterwards, for the classic embedded pattern of a single board
//! configuration or driver table in `static` position:
//!
//! ```ignore
//! static BOARD: Singleton<BoardConfig> = Singleton::new();
//!
//! // early in main, once:
//! BOARD.set(BoardConfig::detect()).ok().expect("double init");
//!
//! // anywhere after:
//! let cfg = BOARD.get().unwrap();
//! ```

use std::fmt;
use std::sync::OnceLock;

/// A cell that is initialized exactly once and immutable afterwards.
///
/// Thread-safe: concurrent initializers race safely and exactly one wins.
pub struct Singleton<T> {
    cell: OnceLock<T>,
}

impl<T> Singleton<T> {
    /// Creates an uninitialized cell. Const, so it can be a `static`.
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Initializes the cell.
    ///
    /// Returns the value back as `Err` when the cell was already
    /// initialized; the stored value is untouched.
    pub fn set(&self, value: T) -> Result<(), T> {
        self.cell.set(value)
    }

    /// The stored value, or `None` before initialization.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// The stored value, initializing it from `init` if necessary.
    ///
    /// When several threads race here, one `init` wins and the others
    /// observe its value.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(init)
    }

    /// Whether the cell has been initialized.
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Singleton<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Singleton<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Singleton").field(value).finish(),
            None => f.write_str("Singleton(<unset>)"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
