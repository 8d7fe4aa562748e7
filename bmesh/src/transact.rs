//! Transactional edits.
//!
//! Types that stage changes against a target implement `Transact`. A
//! transaction either commits, yielding its output, or aborts. Dropping a
//! transaction without committing it is equivalent to aborting it.

use std::fmt::Debug;

pub trait Transact<T = ()>: Sized {
    type Output;
    type Error: Debug;

    fn commit(self) -> Result<Self::Output, Self::Error>;

    /// Executes a function against the transaction and commits it if the
    /// function succeeds. Otherwise, the transaction is aborted and the error
    /// is returned.
    fn commit_with<F, U, E>(mut self, f: F) -> Result<(Self::Output, U), Self::Error>
    where
        F: FnOnce(&mut Self) -> Result<U, E>,
        E: Into<Self::Error>,
    {
        match f(&mut self) {
            Ok(value) => self.commit().map(|output| (output, value)),
            Err(error) => {
                self.abort();
                Err(error.into())
            }
        }
    }

    fn abort(self) {}
}

pub(crate) trait Drain<T> {
    fn as_option_mut(&mut self) -> &mut Option<T>;

    fn drain(&mut self) -> T {
        self.as_option_mut().take().expect("drained")
    }

    fn try_drain(&mut self) -> Option<T> {
        self.as_option_mut().take()
    }
}
