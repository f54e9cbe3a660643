//! Settlement triggers handed to the initializer.
//!
//! Each trigger owns a handle on one specific cell, so it can be cloned,
//! moved into a timer or a spawned task, and called from anywhere.

use super::SettleCell;

/// Fulfills the cell it was created for.
pub struct Fulfiller<T, E> {
    cell: SettleCell<T, E>,
}

/// Rejects the cell it was created for.
pub struct Rejecter<T, E> {
    cell: SettleCell<T, E>,
}

impl<T, E> Fulfiller<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(cell: SettleCell<T, E>) -> Self {
        Self { cell }
    }

    /// Settle with `value`. Returns `false` (and does nothing) when the cell
    /// was already settled.
    pub fn fulfill(&self, value: T) -> bool {
        self.cell.fulfill(value)
    }
}

impl<T, E> Rejecter<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(cell: SettleCell<T, E>) -> Self {
        Self { cell }
    }

    /// Settle with `error`. Returns `false` (and does nothing) when the cell
    /// was already settled.
    pub fn reject(&self, error: E) -> bool {
        self.cell.reject(error)
    }
}

impl<T, E> Clone for Fulfiller<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Fulfiller<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fulfiller").finish_non_exhaustive()
    }
}

impl<T, E> std::fmt::Debug for Rejecter<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rejecter").finish_non_exhaustive()
    }
}
