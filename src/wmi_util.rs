//! Scoped WMI access. Each probe opens its own connection and runs one
//! query; nothing is cached across probes, so a follow-up run re-reads
//! the live system state.

use std::cell::RefCell;

use serde::de::DeserializeOwned;
use wmi::{COMLibrary, WMIConnection};

thread_local! {
    // COM init is per-thread and must not be repeated with different modes.
    static COM: RefCell<Option<COMLibrary>> = const { RefCell::new(None) };
}

fn com_library() -> Option<COMLibrary> {
    COM.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = COMLibrary::new().ok();
        }
        *slot
    })
}

/// Run one WQL query against root\CIMV2, deserializing into `T` rows.
/// Any COM/WMI failure is an empty answer, not an error.
pub fn query<T: DeserializeOwned>(wql: &str) -> Option<Vec<T>> {
    let com = com_library()?;
    let conn = WMIConnection::new(com).ok()?;
    match conn.raw_query::<T>(wql) {
        Ok(rows) => Some(rows),
        Err(e) => {
            log::debug!("wmi query failed: {wql}: {e}");
            None
        }
    }
}
