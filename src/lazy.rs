use std::{cell::OnceCell, fmt};

use crate::error::Result;

type Thunk<M> = Box<dyn Fn() -> Result<M>>;

/// A value that is either already present or produced on first read.
///
/// Both shapes answer [`Lazy::get`]; callers only see a difference in when
/// the producing closure runs. A failed production is not cached, so the
/// next read tries again.
pub struct Lazy<M> {
    cell: OnceCell<M>,
    thunk: Option<Thunk<M>>,
}

impl<M> Lazy<M> {
    pub fn ready(value: M) -> Self {
        Self {
            cell: OnceCell::from(value),
            thunk: None,
        }
    }

    pub fn deferred<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<M> + 'static,
    {
        Self {
            cell: OnceCell::new(),
            thunk: Some(Box::new(thunk)),
        }
    }

    pub fn get(&self) -> Result<&M> {
        if let Some(v) = self.cell.get() {
            return Ok(v);
        }

        // `ready` always fills the cell, so an empty cell implies a thunk.
        let Some(thunk) = self.thunk.as_ref() else {
            unreachable!("Lazy without value or thunk");
        };

        let value = thunk()?;
        Ok(self.cell.get_or_init(|| value))
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<M: fmt::Debug> fmt::Debug for Lazy<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(v) => f.debug_tuple("Lazy").field(v).finish(),
            None => f.write_str("Lazy(<deferred>)"),
        }
    }
}
