//! C-ABI wrapper around `menstrual-cycle-core`.
//!
//! # Overview
//! Exposes the calculator client through `extern "C"` functions so any
//! language with a C FFI (Node, .NET, Python, ...) can build the request and
//! parse the response without linking to Rust's async runtime. The host
//! performs the HTTP round-trip with its own stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `mcc_build_request` / `mcc_build_request_with` and `mcc_parse_response`
//!   mirror the core's `build_request` / `parse_response`.
//! - A single `FfiResult` envelope conveys the parsed JSON and errors
//!   uniformly. Constructors and builders return null on failure and, when
//!   the caller passes an `error_out` pointer, hand over the envelope too.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `mcc_free_*` function.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use chrono::NaiveDate;
use menstrual_cycle_core::{
    ClientConfig, ClientError, HttpResponse, MenstrualCycleClient, QueryOptions, TransportError,
};

use types::*;

/// Borrow a C string argument as UTF-8. `None` for null or invalid UTF-8.
fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Map a C "optional int" (negative = omitted) to `Option<u32>`.
fn optional_u32(value: i32) -> Option<u32> {
    u32::try_from(value).ok()
}

/// Hand the outcome of a constructor or builder to the caller.
///
/// On success `*error_out` is set to null. On failure it receives the error
/// envelope, which the caller frees with `mcc_free_result`. A null
/// `error_out` means the caller only wants the null return, so the envelope
/// is freed here.
fn finish<T>(outcome: Result<*mut T, *mut FfiResult>, error_out: *mut *mut FfiResult) -> *mut T {
    let (value, error) = match outcome {
        Ok(value) => (value, std::ptr::null_mut()),
        Err(error) => (std::ptr::null_mut(), error),
    };
    if error_out.is_null() {
        mcc_free_result(error);
    } else {
        unsafe { *error_out = error };
    }
    value
}

fn invalid_argument(message: String) -> *mut FfiResult {
    FfiResult::from_error(ClientError::Validation(vec![message]))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

fn new_client(config: ClientConfig) -> Result<*mut FfiClient, *mut FfiResult> {
    MenstrualCycleClient::without_transport(config)
        .map(|inner| Box::into_raw(Box::new(FfiClient { inner })))
        .map_err(FfiResult::from_error)
}

fn required_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, *mut FfiResult> {
    if ptr.is_null() {
        return Err(FfiResult::null_arg(name));
    }
    str_arg(ptr).ok_or_else(|| invalid_argument(format!("{name} must be valid UTF-8")))
}

/// Create a client for the production endpoint.
///
/// Returns null if `api_key` is null, empty, not valid UTF-8 or not usable
/// as a header value. `error_out` may be null; otherwise it receives null on
/// success or an `FfiResult` (`NULL_ARG`, `VALIDATION` or `CONFIG`) on
/// failure.
/// The caller must free the returned pointer with `mcc_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_client_new(
    api_key: *const c_char,
    secure: bool,
    error_out: *mut *mut FfiResult,
) -> *mut FfiClient {
    let outcome = catch_unwind(|| {
        let key = required_str(api_key, "api_key")?;
        new_client(ClientConfig::new(key).secure(secure))
    })
    .unwrap_or_else(|_| Err(FfiResult::panic("panic in mcc_client_new")));
    finish(outcome, error_out)
}

/// Create a client for a custom host (e.g. `127.0.0.1:3000`).
///
/// Fails like `mcc_client_new`, and also when `host` is null or empty.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_client_new_with_host(
    api_key: *const c_char,
    host: *const c_char,
    secure: bool,
    error_out: *mut *mut FfiResult,
) -> *mut FfiClient {
    let outcome = catch_unwind(|| {
        let key = required_str(api_key, "api_key")?;
        let host = required_str(host, "host")?;
        new_client(ClientConfig::new(key).host(host).secure(secure))
    })
    .unwrap_or_else(|_| Err(FfiResult::panic("panic in mcc_client_new_with_host")));
    finish(outcome, error_out)
}

/// Free a client created by `mcc_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

fn build(client: &FfiClient, query: Option<&QueryOptions>) -> Result<*mut FfiHttpRequest, *mut FfiResult> {
    client
        .inner
        .build_request(query)
        .map(FfiHttpRequest::from_core)
        .map_err(FfiResult::from_error)
}

/// Build the request from a JSON object of query options.
///
/// `query_json` may be null, in which case an empty object is sent.
/// Returns null if `client` is null (`NULL_ARG`) or if `query_json` is not a
/// JSON object with correctly typed fields (`VALIDATION`). `error_out`
/// follows the `mcc_client_new` convention.
/// The caller must free the returned pointer with `mcc_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_build_request(
    client: *const FfiClient,
    query_json: *const c_char,
    error_out: *mut *mut FfiResult,
) -> *mut FfiHttpRequest {
    let outcome = catch_unwind(|| {
        if client.is_null() {
            return Err(FfiResult::null_arg("client"));
        }
        let client = unsafe { &*client };
        let query = if query_json.is_null() {
            None
        } else {
            let text = required_str(query_json, "query_json")?;
            let query = serde_json::from_str::<QueryOptions>(text)
                .map_err(|e| invalid_argument(format!("query_json: {e}")))?;
            Some(query)
        };
        build(client, query.as_ref())
    })
    .unwrap_or_else(|_| Err(FfiResult::panic("panic in mcc_build_request")));
    finish(outcome, error_out)
}

/// Build the request from individual fields.
///
/// `last_period` (`YYYY-MM-DD`) may be null to omit it. Integer fields use
/// a negative value to mean "omit".
/// Returns null if `client` is null (`NULL_ARG`) or `last_period` is not a
/// valid date (`VALIDATION`).
#[unsafe(no_mangle)]
pub extern "C" fn mcc_build_request_with(
    client: *const FfiClient,
    last_period: *const c_char,
    cycle_length: i32,
    period_length: i32,
    cycles: i32,
    error_out: *mut *mut FfiResult,
) -> *mut FfiHttpRequest {
    let outcome = catch_unwind(|| {
        if client.is_null() {
            return Err(FfiResult::null_arg("client"));
        }
        let client = unsafe { &*client };
        let last_period = if last_period.is_null() {
            None
        } else {
            let text = required_str(last_period, "last_period")?;
            let date = text.parse::<NaiveDate>().map_err(|_| {
                invalid_argument(format!("last_period must be YYYY-MM-DD, got {text:?}"))
            })?;
            Some(date)
        };
        let query = QueryOptions {
            last_period,
            cycle_length: optional_u32(cycle_length),
            period_length: optional_u32(period_length),
            cycles: optional_u32(cycles),
        };
        build(client, Some(&query))
    })
    .unwrap_or_else(|_| Err(FfiResult::panic("panic in mcc_build_request_with")));
    finish(outcome, error_out)
}

// ---------------------------------------------------------------------------
// Parse response
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: str_arg(resp.body).unwrap_or("").to_string(),
    }
}

/// Parse the HTTP response of a calculator request.
///
/// On success `data_json` holds the envelope. API errors carry the HTTP
/// status and the service's message.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_parse_response(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_response(ffi_response_to_core(resp)) {
            Ok(envelope) => FfiResult::ok(&envelope),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in mcc_parse_response"))
}

/// Report that the host could not complete the HTTP round-trip.
///
/// Returns a `TRANSPORT` result carrying the same generic message the async
/// client uses, so hosts surface their own I/O failures in one envelope.
/// `cause` may be null; it is never shown to the end user.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_transport_failure(cause: *const c_char) -> *mut FfiResult {
    catch_unwind(|| {
        let error = match str_arg(cause) {
            Some(cause) => TransportError::new(cause.to_string()),
            None => TransportError::generic(),
        };
        FfiResult::from_error(ClientError::Transport(error))
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in mcc_transport_failure"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `mcc_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiResult` returned by `mcc_parse_response`,
/// `mcc_transport_failure` or through an `error_out` parameter. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data_json);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mcc_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
