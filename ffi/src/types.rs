//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. The parsed envelope crosses the
//! boundary as a JSON C string so hosts decode it with their own JSON
//! tooling. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use menstrual_cycle_core::{ApiResponse, ClientError, HttpMethod, HttpRequest};

/// Opaque handle to a `MenstrualCycleClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: menstrual_cycle_core::MenstrualCycleClient,
}

/// Convert to a heap C string; interior NULs yield an empty string.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `mcc_build_*` functions. The C caller executes the request and
/// passes the response back through `mcc_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    /// Null for GET requests.
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = into_c_string(req.url);
        let body = match req.body {
            Some(b) => into_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing the request and passes a
/// pointer to `mcc_parse_response`. The FFI layer reads but does not free
/// these fields. A null `body` is treated as empty.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Api = 1,
    Deserialization = 2,
    Serialization = 3,
    Validation = 4,
    Config = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

/// Result envelope for `mcc_parse_response`, `mcc_transport_failure` and the
/// `error_out` parameter of constructors and builders.
///
/// On success `error_code` is `Ok`, `error_message` is null and `data_json`
/// holds the service envelope as JSON. On failure `error_code` describes the
/// category, `error_message` is a C string, `http_status` is set for `Api`
/// errors and `data_json` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_json: *mut c_char,
}

impl FfiResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_json: *mut c_char,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message,
            http_status,
            data_json,
        }))
    }

    /// Build a success result carrying the envelope as JSON.
    pub(crate) fn ok(response: &ApiResponse) -> *mut Self {
        match serde_json::to_string(response) {
            Ok(json) => Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), 0, into_c_string(json)),
            Err(e) => Self::from_error(ClientError::Serialization(e.to_string())),
        }
    }

    /// Build an error result from a `ClientError`.
    pub(crate) fn from_error(err: ClientError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ClientError::Api { status, .. } => (FfiErrorCode::Api, *status),
            ClientError::Deserialization(_) => (FfiErrorCode::Deserialization, 0),
            ClientError::Serialization(_) => (FfiErrorCode::Serialization, 0),
            ClientError::Validation(_) => (FfiErrorCode::Validation, 0),
            ClientError::Config(_) => (FfiErrorCode::Config, 0),
            ClientError::Transport(_) => (FfiErrorCode::Transport, 0),
        };
        let message = match &err {
            ClientError::Api { error, .. } => error.clone(),
            other => other.to_string(),
        };
        Self::boxed(error_code, into_c_string(message), http_status, std::ptr::null_mut())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            into_c_string(format!("null argument: {name}")),
            0,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            into_c_string(msg.to_string()),
            0,
            std::ptr::null_mut(),
        )
    }
}
