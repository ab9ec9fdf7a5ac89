use bytes::Bytes;
use log::info;

use crate::{KvStore, StoreResult};

pub const SMOKE_KEY: &str = "my_key";
pub const SMOKE_VALUE: &[u8] = b"hello world";

/// What the put/get/remove/get sequence observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeReport {
    pub fetched: Option<Bytes>,
    pub removed: bool,
    pub after_remove: Option<Bytes>,
}

impl SmokeReport {
    pub fn passed(&self) -> bool {
        self.fetched.as_deref() == Some(SMOKE_VALUE) && self.removed && self.after_remove.is_none()
    }
}

pub fn smoke_test<S: KvStore + ?Sized>(store: &S) -> StoreResult<SmokeReport> {
    store.put(SMOKE_KEY, Bytes::from_static(SMOKE_VALUE))?;

    let fetched = store.get(SMOKE_KEY)?;
    match &fetched {
        Some(value) => info!("fetched {SMOKE_KEY}: {}", String::from_utf8_lossy(value)),
        None => info!("{SMOKE_KEY} missing right after put"),
    }

    let removed = store.remove(SMOKE_KEY)?;
    let after_remove = store.get(SMOKE_KEY)?;
    match &after_remove {
        Some(value) => info!(
            "{SMOKE_KEY} still present after remove: {}",
            String::from_utf8_lossy(value)
        ),
        None => info!("{SMOKE_KEY} removed"),
    }

    Ok(SmokeReport {
        fetched,
        removed,
        after_remove,
    })
}
