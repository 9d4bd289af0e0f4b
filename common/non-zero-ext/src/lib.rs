//! Extra methods for non-zero integers.
//!
//! These cover the needs of reference counts that are
//! stored as non-zero integers, where reaching zero
//! means the counted entry must be removed.

#![warn(missing_docs)]

use std::num::NonZeroUsize;

/// Extra methods for non-zero integers.
pub trait NonZeroExt: Sized
{
    /// The number 1.
    const ONE: Self;

    /// Add one, or return [`None`] on overflow.
    fn checked_succ(self) -> Option<Self>;

    /// Subtract one, or return [`None`] if the result would be zero.
    fn checked_pred(self) -> Option<Self>;
}

impl NonZeroExt for NonZeroUsize
{
    // SAFETY: 1 is not zero.
    const ONE: Self = unsafe { Self::new_unchecked(1) };

    fn checked_succ(self) -> Option<Self>
    {
        self.checked_add(1)
    }

    fn checked_pred(self) -> Option<Self>
    {
        Self::new(self.get() - 1)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn one()
    {
        assert_eq!(NonZeroUsize::ONE.get(), 1);
    }

    #[test]
    fn checked_succ()
    {
        assert_eq!(NonZeroUsize::ONE.checked_succ().map(|n| n.get()), Some(2));
        assert_eq!(NonZeroUsize::MAX.checked_succ(), None);
    }

    #[test]
    fn checked_pred()
    {
        let two = NonZeroUsize::ONE.checked_succ().unwrap();
        assert_eq!(two.checked_pred(), Some(NonZeroUsize::ONE));
        assert_eq!(NonZeroUsize::ONE.checked_pred(), None);
    }
}
