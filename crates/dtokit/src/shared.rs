//! Lock-guarded container for multi-threaded hosts.
//!
//! A [`Dto`] is a plain value with no interior mutability. When several
//! threads need the same instance, [`SharedDto`] puts it behind one mutex.
//! Every method holds the lock for its whole duration, so `fill` and any
//! read-modify-write done through [`SharedDto::update`] are not interleaved
//! with other writers.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::dto::Dto;
use crate::error::Result;
use crate::value::{AttrValue, Attributes};

#[derive(Debug, Clone, Default)]
pub struct SharedDto {
    inner: Arc<Mutex<Dto>>,
}

impl SharedDto {
    pub fn new(dto: Dto) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dto)),
        }
    }

    pub fn get(&self, name: &str) -> Result<Option<AttrValue>> {
        self.inner.lock().get(name)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<AttrValue>) -> Result<()> {
        self.inner.lock().set(name, value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.lock().has(name)
    }

    pub fn unset(&self, name: &str) -> Option<AttrValue> {
        self.inner.lock().unset(name)
    }

    pub fn fill<K, V, I>(&self, entries: I) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.inner.lock().fill(entries)
    }

    pub fn to_array(&self) -> Result<Attributes> {
        self.inner.lock().to_array()
    }

    /// Run `f` with exclusive access, e.g. for get-then-set sequences.
    pub fn update<R>(&self, f: impl FnOnce(&mut Dto) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> Dto {
        self.inner.lock().clone()
    }
}

impl From<Dto> for SharedDto {
    fn from(dto: Dto) -> Self {
        Self::new(dto)
    }
}
