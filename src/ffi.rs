//! FFI bindings for mood analytics
//!
//! This module provides C-compatible functions for calling the engine from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `mood_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::AnalyticsConfig;
use crate::pipeline::{analytics_to_json, AnalyticsProcessor};
use crate::types::AnalyticsRequest;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Compute analytics for a JSON array of check-ins and return the report JSON.
///
/// # Safety
/// - `json` and `period` must be valid null-terminated C strings.
/// - `period` is one of "weekly", "monthly", "custom".
/// - Returns a newly allocated string that must be freed with `mood_free_string`.
/// - Returns NULL on error; call `mood_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mood_compute_analytics(
    json: *const c_char,
    period: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let period_str = match cstr_to_string(period) {
        Some(s) => s,
        None => {
            set_last_error("Invalid period string pointer");
            return ptr::null_mut();
        }
    };

    match analytics_to_json(json_str, period_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to an AnalyticsProcessor
pub struct MoodProcessorHandle {
    processor: AnalyticsProcessor,
}

/// Create a new AnalyticsProcessor.
///
/// # Safety
/// - `config_json` is a JSON `AnalyticsConfig` or NULL for defaults.
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `mood_processor_free`.
/// - Returns NULL on error; call `mood_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mood_processor_new(config_json: *const c_char) -> *mut MoodProcessorHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        AnalyticsConfig::default()
    } else {
        let parsed = match cstr_to_string(config_json) {
            Some(s) => AnalyticsConfig::from_json(&s),
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match parsed {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match AnalyticsProcessor::with_config(config) {
        Ok(processor) => Box::into_raw(Box::new(MoodProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free an AnalyticsProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mood_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mood_processor_free(processor: *mut MoodProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Compute analytics with a stateful (memoizing) processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `mood_processor_new`.
/// - `json` (check-in array) and `request_json` (e.g.
///   `{"period":"weekly","today":"2024-06-30"}`) must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `mood_free_string`.
/// - Returns NULL on error; call `mood_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn mood_processor_compute(
    processor: *mut MoodProcessorHandle,
    json: *const c_char,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let request: AnalyticsRequest = match cstr_to_string(request_json) {
        Some(s) => match serde_json::from_str(&s) {
            Ok(request) => request,
            Err(e) => {
                set_last_error(&format!("Invalid request: {e}"));
                return ptr::null_mut();
            }
        },
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.compute_json(&json_str, &request) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by mood analytics functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a `mood_*` function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn mood_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next `mood_*` call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn mood_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn mood_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_history_json() -> CString {
        CString::new(
            r#"[
                {"timestamp": "2024-06-28T08:00:00Z", "mood": 6, "stress": 5},
                {"timestamp": "2024-06-29T08:00:00Z", "mood": 7, "stress": 4},
                {"timestamp": "2024-06-30T08:00:00Z", "mood": 8, "stress": 3, "tags": ["exercise"]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_compute_analytics() {
        let json = sample_history_json();
        let period = CString::new("weekly").unwrap();

        unsafe {
            let result = mood_compute_analytics(json.as_ptr(), period.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let report: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(report["result"]["streak"]["current"], 3);
            assert!(report["result"]["correlations"]["stress"].as_f64().unwrap() < -0.99);

            mood_free_string(result);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        unsafe {
            let config = CString::new(r#"{"max_insights": 2}"#).unwrap();
            let processor = mood_processor_new(config.as_ptr());
            assert!(!processor.is_null());

            let json = sample_history_json();
            let request = CString::new(r#"{"period": "weekly", "today": "2024-06-30"}"#).unwrap();

            let first = mood_processor_compute(processor, json.as_ptr(), request.as_ptr());
            assert!(!first.is_null());
            let second = mood_processor_compute(processor, json.as_ptr(), request.as_ptr());
            assert!(!second.is_null());

            assert_eq!(CStr::from_ptr(first), CStr::from_ptr(second));
            assert_eq!((*processor).processor.cached_results(), 1);

            mood_free_string(first);
            mood_free_string(second);
            mood_processor_free(processor);

            let defaults = mood_processor_new(ptr::null());
            assert!(!defaults.is_null());
            mood_processor_free(defaults);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let invalid_json = CString::new("not json").unwrap();
            let period = CString::new("weekly").unwrap();

            let result = mood_compute_analytics(invalid_json.as_ptr(), period.as_ptr());
            assert!(result.is_null());

            let error = mood_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            let bad_config = CString::new(r#"{"trend_window_size": 0}"#).unwrap();
            assert!(mood_processor_new(bad_config.as_ptr()).is_null());
            assert!(!mood_last_error().is_null());

            let json = sample_history_json();
            let result = mood_processor_compute(ptr::null_mut(), json.as_ptr(), period.as_ptr());
            assert!(result.is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = mood_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::ENGINE_VERSION);
        }
    }
}
