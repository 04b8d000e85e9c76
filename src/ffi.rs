//! FFI bindings for Handsfree
//!
//! This module provides C-compatible functions for calling Handsfree from other
//! languages. Inputs and outputs are null-terminated UTF-8 JSON strings; every
//! returned string is allocated here and must be freed with
//! `handsfree_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::HandsfreeConfig;
use crate::session::TrackingProcessor;
use crate::speech::CalculatorReading;
use crate::types::Landmark;
use crate::vision::{GestureClassifier, TrackingMode};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

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

/// Return the string, or record an error naming the argument
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

fn finish<E: std::fmt::Display>(result: Result<String, E>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Evaluate a spoken arithmetic transcript.
///
/// Returns a JSON calculator reading with the transcript, the parsed
/// expression (or null) and the outcome.
///
/// # Safety
/// - `transcript` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `handsfree_free_string`.
/// - Returns NULL on error; call `handsfree_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn handsfree_calculate(transcript: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(text) = required_arg(transcript, "transcript") else {
        return ptr::null_mut();
    };

    finish(CalculatorReading::from_transcript(&text).to_json())
}

/// Classify a hand landmark snapshot.
///
/// Input is a JSON array of `{x, y, z?}` points; output is a JSON array of
/// gesture labels.
///
/// # Safety
/// - `landmarks_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `handsfree_free_string`.
/// - Returns NULL on error; call `handsfree_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn handsfree_classify_gesture(landmarks_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_arg(landmarks_json, "landmarks JSON") else {
        return ptr::null_mut();
    };

    finish(
        serde_json::from_str::<Vec<Landmark>>(&json)
            .and_then(|landmarks| serde_json::to_string(&GestureClassifier::classify(&landmarks))),
    )
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a TrackingProcessor
pub struct TrackingProcessorHandle {
    processor: TrackingProcessor,
}

/// Create a new tracking processor.
///
/// # Safety
/// - `mode` must be a valid null-terminated C string ("hand" or "eye").
/// - `config_json` may be NULL for defaults, otherwise a valid null-terminated
///   C string holding a JSON configuration.
/// - Returns a pointer that must be freed with `handsfree_processor_free`.
/// - Returns NULL on error; call `handsfree_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn handsfree_processor_new(
    mode: *const c_char,
    config_json: *const c_char,
) -> *mut TrackingProcessorHandle {
    clear_last_error();

    let Some(mode_str) = required_arg(mode, "mode") else {
        return ptr::null_mut();
    };

    let mode = match mode_str.parse::<TrackingMode>() {
        Ok(mode) => mode,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let config = if config_json.is_null() {
        HandsfreeConfig::default()
    } else {
        let Some(json) = required_arg(config_json, "config JSON") else {
            return ptr::null_mut();
        };
        match HandsfreeConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match TrackingProcessor::new(mode, &config) {
        Ok(processor) => Box::into_raw(Box::new(TrackingProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a tracking processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `handsfree_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn handsfree_processor_free(processor: *mut TrackingProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Process one JSON landmark frame and return the JSON frame report.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `handsfree_processor_new`.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `handsfree_free_string`.
/// - Returns NULL on error; call `handsfree_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn handsfree_processor_process_frame(
    processor: *mut TrackingProcessorHandle,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(json) = required_arg(frame_json, "frame JSON") else {
        return ptr::null_mut();
    };

    finish(handle.processor.process_json(&json))
}

/// Current smoothed cursor as JSON (`{"position": {"x": .., "y": ..}}`).
///
/// # Safety
/// - `processor` must be a valid pointer returned by `handsfree_processor_new`.
/// - Returns a newly allocated string that must be freed with `handsfree_free_string`.
/// - Returns NULL on error; call `handsfree_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn handsfree_processor_cursor(
    processor: *mut TrackingProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    finish(serde_json::to_string(&handle.processor.cursor()))
}

/// Re-centre the cursor and clear detector state.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `handsfree_processor_new`.
/// - Returns 0 on success, -1 for a NULL processor.
#[no_mangle]
pub unsafe extern "C" fn handsfree_processor_reset(processor: *mut TrackingProcessorHandle) -> i32 {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return -1;
    }

    (*processor).processor.reset();
    0
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Handsfree functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Handsfree function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn handsfree_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Handsfree function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn handsfree_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Handsfree library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn handsfree_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FrameReport;
    use crate::types::{CursorState, Point2D};
    use std::ffi::CString;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        handsfree_free_string(ptr);
        s
    }

    fn hand_frame_json(x: f64, y: f64) -> CString {
        let mut points = vec![serde_json::json!({"x": x, "y": y + 0.1}); 21];
        points[8] = serde_json::json!({"x": x, "y": y});
        points[4] = serde_json::json!({"x": x + 0.2, "y": y});
        let frame = serde_json::json!({
            "timestamp": "2024-01-15T10:00:00Z",
            "landmarks": points,
        });
        CString::new(frame.to_string()).unwrap()
    }

    #[test]
    fn test_ffi_calculate() {
        let text = CString::new("twelve plus five").unwrap();
        unsafe {
            let json = take_string(handsfree_calculate(text.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["outcome"]["outcome"], "value");
            assert_eq!(value["outcome"]["value"], 17.0);
        }
    }

    #[test]
    fn test_ffi_classify_gesture() {
        let mut points = vec![serde_json::json!({"x": 0.2, "y": 0.2}); 9];
        points[4] = serde_json::json!({"x": 0.5, "y": 0.5});
        points[8] = serde_json::json!({"x": 0.51, "y": 0.5});
        let json = CString::new(serde_json::Value::from(points).to_string()).unwrap();

        unsafe {
            let labels = take_string(handsfree_classify_gesture(json.as_ptr()));
            assert_eq!(labels, r#"["pinch"]"#);
        }
    }

    #[test]
    fn test_ffi_processor_lifecycle() {
        let mode = CString::new("hand").unwrap();
        let config = CString::new(r#"{"screen": {"width": 1000, "height": 1000}}"#).unwrap();

        unsafe {
            let processor = handsfree_processor_new(mode.as_ptr(), config.as_ptr());
            assert!(!processor.is_null());

            let frame = hand_frame_json(0.9, 0.5);
            let report = take_string(handsfree_processor_process_frame(processor, frame.as_ptr()));
            let report: FrameReport = serde_json::from_str(&report).unwrap();
            assert_eq!(report.frame_index, 0);
            assert_eq!(report.cursor, Point2D::new(600.0, 500.0));

            let cursor = take_string(handsfree_processor_cursor(processor));
            let cursor: CursorState = serde_json::from_str(&cursor).unwrap();
            assert_eq!(cursor.position, Point2D::new(600.0, 500.0));

            assert_eq!(handsfree_processor_reset(processor), 0);
            let cursor = take_string(handsfree_processor_cursor(processor));
            let cursor: CursorState = serde_json::from_str(&cursor).unwrap();
            assert_eq!(cursor.position, Point2D::new(500.0, 500.0));

            handsfree_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_processor_defaults_with_null_config() {
        let mode = CString::new("eye").unwrap();
        unsafe {
            let processor = handsfree_processor_new(mode.as_ptr(), ptr::null());
            assert!(!processor.is_null());
            handsfree_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let bad_mode = CString::new("voice").unwrap();
        let mode = CString::new("hand").unwrap();
        let bad_frame = CString::new("not json").unwrap();

        unsafe {
            assert!(handsfree_processor_new(bad_mode.as_ptr(), ptr::null()).is_null());
            let error = CStr::from_ptr(handsfree_last_error()).to_str().unwrap();
            assert!(error.contains("voice"));

            let processor = handsfree_processor_new(mode.as_ptr(), ptr::null());
            assert!(handsfree_last_error().is_null());

            let result = handsfree_processor_process_frame(processor, bad_frame.as_ptr());
            assert!(result.is_null());
            assert!(!handsfree_last_error().is_null());

            assert!(handsfree_processor_cursor(ptr::null_mut()).is_null());
            assert_eq!(handsfree_processor_reset(ptr::null_mut()), -1);
            assert!(handsfree_calculate(ptr::null()).is_null());

            handsfree_processor_free(processor);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = handsfree_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::HANDSFREE_VERSION);
        }
    }
}
