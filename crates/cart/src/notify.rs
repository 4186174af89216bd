//! User-facing notices emitted by the cart store.
//!
//! The store never returns errors to its callers. Every failed operation is
//! turned into a [`CartNotice`] and handed to a [`Notifier`], which is whatever
//! presents messages to the user (a toast, a status line, stderr).

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// A failed cart operation, as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartNotice {
    /// Requested quantity exceeds available stock.
    StockExceeded,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product's quantity failed.
    UpdateFailed,
}

impl CartNotice {
    /// Message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StockExceeded => "Quantidade solicitada fora de estoque",
            Self::AddFailed => "Erro na adição do produto",
            Self::RemoveFailed => "Erro na remoção do produto",
            Self::UpdateFailed => "Erro na alteração de quantidade do produto",
        }
    }
}

impl fmt::Display for CartNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives notices from the cart store.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: CartNotice);
}

impl<F> Notifier for F
where
    F: Fn(CartNotice) + Send + Sync,
{
    fn notify(&self, notice: CartNotice) {
        self(notice);
    }
}

/// Logs each notice at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: CartNotice) {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Collects notices in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<CartNotice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<CartNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return the notices received so far.
    pub fn take(&self) -> Vec<CartNotice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: CartNotice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
