//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Input
//! Document configs are passed as UTF-8 JSON with the same keys as the
//! `press` config file (`title`, `website`, `body`, `footer`, ...).
//!
//! ## Memory management
//! - Buffers returned by `cpress_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `cpress_free_buffer` / `cpress_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error).
//!   1 = null argument, 2 = invalid UTF-8, 3 = generation failed,
//!   4 = rendering failed.
//! - Error details can be retrieved via `cpress_last_error`.
//!
//! ## Thread safety
//! - `cpress_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::config::DocumentConfig;
use crate::error::Result;
use crate::layout_config::LayoutConfig;
use crate::pipeline::{compute_layout, generate_pdf, PipelineConfig};
use crate::render::render_pdf;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Borrow `len` bytes at `ptr` as UTF-8, recording an error on failure.
///
/// # Safety
/// `ptr` must point to `len` valid bytes.
unsafe fn input_str<'a>(ptr: *const u8, len: u32) -> std::result::Result<&'a str, c_int> {
    let bytes = slice::from_raw_parts(ptr, len as usize);
    std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })
}

/// Hand a byte buffer to the caller.
///
/// # Safety
/// `out_buf` and `out_len` must be valid pointers.
unsafe fn hand_over(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

fn layout_from_json(json: &str) -> Result<LayoutConfig> {
    let doc = DocumentConfig::from_json(json)?;
    compute_layout(&doc, &PipelineConfig::default())
}

fn pdf_from_json(json: &str) -> Result<Vec<u8>> {
    let doc = DocumentConfig::from_json(json)?;
    let (bytes, _) = generate_pdf(&doc, &PipelineConfig::default())?;
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Generate a PDF from a JSON document config.
///
/// # Parameters
/// - `json_ptr`: pointer to UTF-8 JSON bytes (not necessarily null-terminated)
/// - `json_len`: length of the JSON data in bytes
/// - `out_buf`: on success, receives a pointer to heap-allocated PDF bytes
/// - `out_len`: on success, receives the length of the PDF buffer
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `cpress_last_error`.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `cpress_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn cpress_generate_pdf(
    json_ptr: *const u8,
    json_len: u32,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match input_str(json_ptr, json_len) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match pdf_from_json(json) {
        Ok(pdf_bytes) => {
            hand_over(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            3
        }
    }
}

/// Compute only the layout config JSON for a JSON document config.
///
/// # Returns
/// `0` on success.
///
/// # Safety
/// - `json_ptr` must point to `json_len` valid bytes.
/// - `*out_json_ptr` must be freed with `cpress_free_string`.
#[no_mangle]
pub unsafe extern "C" fn cpress_compute_layout(
    json_ptr: *const u8,
    json_len: u32,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if json_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match input_str(json_ptr, json_len) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let layout = match layout_from_json(json) {
        Ok(layout) => layout,
        Err(e) => {
            set_last_error(&e.to_string());
            return 3;
        }
    };

    match CString::new(layout.to_json()) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            3
        }
    }
}

/// Render a PDF from a layout config JSON string.
///
/// This allows pre-computing the layout and rendering separately.
///
/// # Safety
/// - `json_ptr` must be a valid null-terminated string.
/// - `out_buf` and `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn cpress_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match CStr::from_ptr(json_ptr).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in JSON: {e}"));
            return 2;
        }
    };

    let layout = match LayoutConfig::from_json(json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&format!("Invalid layout JSON: {e}"));
            return 3;
        }
    };

    match render_pdf(&layout) {
        Ok(pdf_bytes) => {
            hand_over(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            4
        }
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `cpress_generate_pdf`.
///
/// # Safety
/// `buf` must have been returned by a previous `cpress_generate_pdf` (or
/// similar) call, and `len` must be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn cpress_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a layout JSON string.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn cpress_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `cpress_*` call on the same
/// thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn cpress_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn cpress_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = br#"{"title":"FFI","website":"example.com",
        "body":"<h1>Hello FFI</h1><p>Body</p>","footer":"f"}"#;

    #[test]
    fn ffi_generate_pdf() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            cpress_generate_pdf(DOC.as_ptr(), DOC.len() as u32, &mut out_buf, &mut out_len)
        };

        assert_eq!(rc, 0, "Expected success");
        assert!(!out_buf.is_null());
        assert!(out_len > 100);

        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");

        unsafe { cpress_free_buffer(out_buf, out_len) };
    }

    #[test]
    fn ffi_compute_layout() {
        let mut json_ptr: *mut c_char = ptr::null_mut();

        let rc = unsafe { cpress_compute_layout(DOC.as_ptr(), DOC.len() as u32, &mut json_ptr) };

        assert_eq!(rc, 0);
        assert!(!json_ptr.is_null());

        let json = unsafe { CStr::from_ptr(json_ptr) }.to_str().unwrap();
        assert!(json.contains("pages"));
        assert!(json.contains("example.com - FFI"));

        unsafe { cpress_free_string(json_ptr) };
    }

    #[test]
    fn ffi_layout_then_render() {
        let mut json_ptr: *mut c_char = ptr::null_mut();
        let rc = unsafe { cpress_compute_layout(DOC.as_ptr(), DOC.len() as u32, &mut json_ptr) };
        assert_eq!(rc, 0);

        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;
        let rc = unsafe { cpress_render_from_layout(json_ptr, &mut out_buf, &mut out_len) };
        assert_eq!(rc, 0);
        let bytes = unsafe { slice::from_raw_parts(out_buf, out_len as usize) };
        assert_eq!(&bytes[0..5], b"%PDF-");

        unsafe {
            cpress_free_buffer(out_buf, out_len);
            cpress_free_string(json_ptr);
        }
    }

    #[test]
    fn ffi_null_input() {
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe { cpress_generate_pdf(ptr::null(), 0, &mut out_buf, &mut out_len) };

        assert_eq!(rc, 1, "Should fail on null input");
    }

    #[test]
    fn ffi_bad_json_sets_last_error() {
        let input = b"{broken";
        let mut out_buf: *mut u8 = ptr::null_mut();
        let mut out_len: u32 = 0;

        let rc = unsafe {
            cpress_generate_pdf(input.as_ptr(), input.len() as u32, &mut out_buf, &mut out_len)
        };
        assert_eq!(rc, 3);

        let err = unsafe { CStr::from_ptr(cpress_last_error()) }.to_str().unwrap();
        assert!(err.starts_with("Invalid config"), "{err}");
    }

    #[test]
    fn ffi_invalid_utf8() {
        let input = [0xffu8, 0xfe];
        let mut json_ptr: *mut c_char = ptr::null_mut();
        let rc = unsafe { cpress_compute_layout(input.as_ptr(), 2, &mut json_ptr) };
        assert_eq!(rc, 2);
    }

    #[test]
    fn ffi_version() {
        let v = cpress_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, "0.1.0");
    }
}
