//! FFI layer for mobile and desktop bindings.
//!
//! This module provides C-compatible functions for host languages that own
//! the network and storage side of sync. Records cross the boundary as JSON
//! strings.
//!
//! # Memory Management
//!
//! - Strings returned by `kvsync_*` functions are allocated by Rust
//! - Caller must free them with `kvsync_string_free`
//! - Conflict pointers must be freed with `kvsync_conflict_free`
//!
//! # Error Handling
//!
//! Functions returning strings produce JSON with either:
//! - `{"ok": <result>}` on success
//! - `{"error": "<message>"}` on failure

use crate::{ConflictRecord, Record, ResolutionStrategy, Resolver};
use serde::Deserialize;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use tracing::warn;

/// Result wrapper for FFI responses.
#[derive(serde::Serialize)]
#[serde(untagged)]
enum FfiResult<T: serde::Serialize> {
    Ok { ok: T },
    Err { error: String },
}

impl<T: serde::Serialize> FfiResult<T> {
    fn ok(value: T) -> Self {
        FfiResult::Ok { ok: value }
    }

    fn err(message: impl Into<String>) -> Self {
        FfiResult::Err {
            error: message.into(),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"error":"serialization failed: {}"}}"#, e))
    }
}

/// A conflict as sent by the host, where either side may be null.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictInput {
    #[serde(default)]
    remote_record: Option<Record>,
    #[serde(default)]
    local_record: Option<Record>,
}

/// Convert a Rust string to a C string pointer.
/// Caller must free with `kvsync_string_free`.
fn to_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(cs) => cs.into_raw(),
        Err(_) => {
            // Value contained a NUL byte; the literal below has none.
            CString::new(r#"{"error":"string contained null bytes"}"#)
                .map(CString::into_raw)
                .unwrap_or(ptr::null_mut())
        }
    }
}

/// Convert a C string pointer to a Rust string.
/// Returns None if pointer is null or invalid UTF-8.
unsafe fn from_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Parse an optional record. A null pointer is an absent record.
unsafe fn parse_record(ptr: *const c_char) -> Result<Option<Record>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    let json = from_c_string(ptr).ok_or_else(|| "record is not valid UTF-8".to_string())?;
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| format!("parse error: {}", e))
}

// ============================================================================
// Conflict Lifecycle
// ============================================================================

/// Create a conflict from the remote and local copies of a record.
///
/// # Arguments
/// - `remote_json`: JSON string of the remote Record, or null
/// - `local_json`: JSON string of the local Record, or null
///
/// # Returns
/// Pointer to ConflictRecord, or null if either record is absent or
/// unparseable, or the keys differ.
///
/// # Safety
/// - `remote_json` and `local_json` must be valid null-terminated C strings or null
/// - Caller must free the returned pointer with `kvsync_conflict_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_new(
    remote_json: *const c_char,
    local_json: *const c_char,
) -> *mut ConflictRecord {
    let (remote, local) = match (parse_record(remote_json), parse_record(local_json)) {
        (Ok(remote), Ok(local)) => (remote, local),
        (remote, local) => {
            warn!(
                remote_error = remote.err().as_deref(),
                local_error = local.err().as_deref(),
                "rejecting conflict with unparseable record"
            );
            return ptr::null_mut();
        }
    };

    match ConflictRecord::from_optional(remote, local) {
        Ok(conflict) => Box::into_raw(Box::new(conflict)),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a conflict.
///
/// # Safety
/// - `conflict` must be a valid pointer from `kvsync_conflict_new`
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_free(conflict: *mut ConflictRecord) {
    if !conflict.is_null() {
        drop(Box::from_raw(conflict));
    }
}

/// Free a string allocated by the engine.
///
/// # Safety
/// - `s` must be a valid pointer from a `kvsync_*` function
/// - Must not be called twice on the same pointer
#[no_mangle]
pub unsafe extern "C" fn kvsync_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ============================================================================
// Conflict Accessors and Resolution
// ============================================================================

/// Get the key of a conflict.
///
/// # Returns
/// JSON string: `{"ok": "<key>"}` or `{"error": "message"}`
///
/// # Safety
/// - `conflict` must be a valid pointer from `kvsync_conflict_new` or null
/// - Caller must free the returned string with `kvsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_key(conflict: *const ConflictRecord) -> *mut c_char {
    match conflict.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.key()).to_json()),
        None => to_c_string(FfiResult::<()>::err("null conflict pointer").to_json()),
    }
}

/// Resolve a conflict with the remote record.
///
/// # Returns
/// JSON string: `{"ok": Record}` or `{"error": "message"}`
///
/// # Safety
/// - `conflict` must be a valid pointer from `kvsync_conflict_new` or null
/// - Caller must free the returned string with `kvsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_resolve_remote(
    conflict: *const ConflictRecord,
) -> *mut c_char {
    match conflict.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.resolve_with_remote_record()).to_json()),
        None => to_c_string(FfiResult::<()>::err("null conflict pointer").to_json()),
    }
}

/// Resolve a conflict with the local record.
///
/// # Returns
/// JSON string: `{"ok": Record}` or `{"error": "message"}`
///
/// # Safety
/// - `conflict` must be a valid pointer from `kvsync_conflict_new` or null
/// - Caller must free the returned string with `kvsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_resolve_local(
    conflict: *const ConflictRecord,
) -> *mut c_char {
    match conflict.as_ref() {
        Some(c) => to_c_string(FfiResult::ok(c.resolve_with_local_record()).to_json()),
        None => to_c_string(FfiResult::<()>::err("null conflict pointer").to_json()),
    }
}

/// Resolve a conflict with a new value.
///
/// # Arguments
/// - `value`: the new value; null resolves to a deletion
///
/// # Returns
/// JSON string: `{"ok": Record}` or `{"error": "message"}`
///
/// # Safety
/// - `conflict` must be a valid pointer from `kvsync_conflict_new` or null
/// - `value` must be a valid null-terminated C string or null
/// - Caller must free the returned string with `kvsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_conflict_resolve_value(
    conflict: *const ConflictRecord,
    value: *const c_char,
) -> *mut c_char {
    let conflict = match conflict.as_ref() {
        Some(c) => c,
        None => return to_c_string(FfiResult::<()>::err("null conflict pointer").to_json()),
    };

    let new_value = if value.is_null() {
        None
    } else {
        match from_c_string(value) {
            Some(v) => Some(v),
            None => return to_c_string(FfiResult::<()>::err("invalid value").to_json()),
        }
    };

    to_c_string(FfiResult::ok(conflict.resolve_with_value(new_value)).to_json())
}

// ============================================================================
// Batch Resolution
// ============================================================================

/// Resolve a batch of conflicts with a strategy.
///
/// # Arguments
/// - `conflicts_json`: JSON array of `{"remoteRecord": Record, "localRecord": Record}`
/// - `strategy`: strategy name (`last-writer-wins`, `remote-wins`, `local-wins`);
///   null selects the default
///
/// # Returns
/// JSON string: `{"ok": ResolveOutcome}` or `{"error": "message"}`
///
/// # Safety
/// - `conflicts_json` and `strategy` must be valid null-terminated C strings or null
/// - Caller must free the returned string with `kvsync_string_free`
#[no_mangle]
pub unsafe extern "C" fn kvsync_resolve_all(
    conflicts_json: *const c_char,
    strategy: *const c_char,
) -> *mut c_char {
    let conflicts_str = match from_c_string(conflicts_json) {
        Some(s) => s,
        None => return to_c_string(FfiResult::<()>::err("invalid conflicts JSON").to_json()),
    };

    let strategy = if strategy.is_null() {
        ResolutionStrategy::default()
    } else {
        match from_c_string(strategy).map(|s| s.parse::<ResolutionStrategy>()) {
            Some(Ok(s)) => s,
            Some(Err(e)) => return to_c_string(FfiResult::<()>::err(e.to_string()).to_json()),
            None => return to_c_string(FfiResult::<()>::err("invalid strategy").to_json()),
        }
    };

    let inputs: Vec<ConflictInput> = match serde_json::from_str(&conflicts_str) {
        Ok(i) => i,
        Err(e) => {
            return to_c_string(FfiResult::<()>::err(format!("parse error: {}", e)).to_json())
        }
    };

    let conflicts: Result<Vec<_>, _> = inputs
        .into_iter()
        .map(|input| ConflictRecord::from_optional(input.remote_record, input.local_record))
        .collect();

    match conflicts {
        Ok(conflicts) => {
            let outcome = Resolver::new(strategy).resolve_all(&conflicts);
            to_c_string(FfiResult::ok(outcome).to_json())
        }
        Err(e) => to_c_string(FfiResult::<()>::err(e.to_string()).to_json()),
    }
}

// ============================================================================
// Utility
// ============================================================================

/// Get the engine version.
///
/// # Returns
/// Static string with version (do not free).
#[no_mangle]
pub extern "C" fn kvsync_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
