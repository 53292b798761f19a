//! Extensions shipped with the crate.

use super::{ContextValue, Extension};
use std::time::{SystemTime, UNIX_EPOCH};

/// Offset the remote popup check expects on top of the current unix time.
const POPUPCHECK_OFFSET_SECS: u64 = 86_400_000;

/// Appends a `POPUPCHECK` cookie so the vote endpoint skips its consent popup.
pub fn popupcheck() -> Extension {
    Extension::new("popupcheck", &["cookies"], &["cookies"], |args| {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let cookies = args.first().and_then(ContextValue::as_text).unwrap_or("");
        Ok(append_popupcheck(cookies, now).into())
    })
}

fn append_popupcheck(cookies: &str, now_secs: u64) -> String {
    let value = now_secs + POPUPCHECK_OFFSET_SECS;
    if cookies.is_empty() {
        format!("POPUPCHECK={value}")
    } else {
        format!("{cookies};POPUPCHECK={value}")
    }
}
