mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use mm_tensor::{resolve, DispatchConfig, MatmulError, Shape};

/// Execute a closure that returns an `MMStatus`, catching any panics
/// and converting them into `MMStatus::ErrorInternal`.
///
/// Closures only touch caller-owned buffers and an immutable dispatcher, so
/// nothing observable is left half-updated after an unwind.
fn catch_panic<F: FnOnce() -> MMStatus>(f: F) -> MMStatus {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            tracing::error!("panic caught at FFI boundary");
            set_last_error("internal panic".to_string());
            MMStatus::ErrorInternal
        }
    }
}

/// Read `ndim` dimensions from `shape`. A null pointer is only accepted for
/// rank 0.
unsafe fn read_shape(shape: *const usize, ndim: usize) -> Option<Shape> {
    if ndim == 0 {
        return Some(Shape::scalar());
    }
    if shape.is_null() {
        return None;
    }
    Some(Shape::from_slice(std::slice::from_raw_parts(shape, ndim)))
}

fn store_dispatcher(config: DispatchConfig, out: *mut *mut MMDispatcher) -> MMStatus {
    if out.is_null() {
        set_last_error("out is null".to_string());
        return MMStatus::ErrorInvalidArgument;
    }
    if let Err(e) = config.validate() {
        return report(e);
    }
    let handle = Box::new(MMDispatcher::new(config));
    unsafe {
        *out = Box::into_raw(handle);
    }
    MMStatus::Ok
}

/// Create a dispatcher configured from `MM_TINY_THRESHOLD` /
/// `MM_SMALL_THRESHOLD` (defaults 32 / 128).
///
/// On success, writes a heap-allocated handle into `*out`. The caller must
/// later call `mm_dispatcher_destroy` to free it.
#[no_mangle]
pub extern "C" fn mm_dispatcher_create(out: *mut *mut MMDispatcher) -> MMStatus {
    catch_panic(|| match DispatchConfig::from_env() {
        Ok(config) => store_dispatcher(config, out),
        Err(e) => report(e),
    })
}

/// Create a dispatcher with an explicit naive-kernel threshold.
#[no_mangle]
pub extern "C" fn mm_dispatcher_create_with_threshold(
    tiny: usize,
    out: *mut *mut MMDispatcher,
) -> MMStatus {
    catch_panic(|| {
        let config = DispatchConfig::default().with_tiny(tiny);
        let config = config.with_small(config.small.max(tiny));
        store_dispatcher(config, out)
    })
}

/// Destroy a dispatcher previously created by `mm_dispatcher_create*`.
///
/// Passing a null pointer is a no-op and returns `MMStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn mm_dispatcher_destroy(handle: *mut MMDispatcher) -> MMStatus {
    if handle.is_null() {
        return MMStatus::Ok;
    }
    drop(Box::from_raw(handle));
    MMStatus::Ok
}

/// Resolve the output shape of `a @ b`.
///
/// `out_shape` must have room for 3 dimensions. On success `*out_ndim` holds
/// the output rank (0 for a dot product) and the first `*out_ndim` entries of
/// `out_shape` hold its dimensions.
#[no_mangle]
pub unsafe extern "C" fn mm_resolve_shape(
    a_shape: *const usize,
    a_ndim: usize,
    b_shape: *const usize,
    b_ndim: usize,
    out_shape: *mut usize,
    out_ndim: *mut usize,
) -> MMStatus {
    catch_panic(|| {
        if out_shape.is_null() || out_ndim.is_null() {
            set_last_error("null argument".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let (a, b) = match unsafe { (read_shape(a_shape, a_ndim), read_shape(b_shape, b_ndim)) } {
            (Some(a), Some(b)) => (a, b),
            _ => {
                set_last_error("null shape".to_string());
                return MMStatus::ErrorInvalidArgument;
            }
        };
        let plan = match resolve(&a, &b) {
            Ok(p) => p,
            Err(e) => return report(e),
        };
        let dims = plan.out_shape.dims();
        unsafe {
            std::ptr::copy_nonoverlapping(dims.as_ptr(), out_shape, dims.len());
            *out_ndim = dims.len();
        }
        MMStatus::Ok
    })
}

/// Compute `a @ b` into a caller-allocated buffer.
///
/// Both operands must be contiguous row-major `F32` data. `out` must hold
/// exactly as many elements as the shape from `mm_resolve_shape` (1 for a
/// dot product). On any error `out` is left untouched.
#[no_mangle]
pub unsafe extern "C" fn mm_matmul(
    handle: *const MMDispatcher,
    a: MMArray,
    b: MMArray,
    out: *mut f32,
    out_len: usize,
) -> MMStatus {
    catch_panic(|| {
        if handle.is_null() || out.is_null() {
            set_last_error("null argument".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        for arr in [&a, &b] {
            if arr.dtype != MMDType::F32 {
                return report(MatmulError::DTypeMismatch {
                    expected: MMDType::F32.name().to_string(),
                    got: arr.dtype.name().to_string(),
                });
            }
        }
        let (a_shape, b_shape) =
            match unsafe { (read_shape(a.shape, a.ndim), read_shape(b.shape, b.ndim)) } {
                (Some(sa), Some(sb)) => (sa, sb),
                _ => {
                    set_last_error("null shape".to_string());
                    return MMStatus::ErrorInvalidArgument;
                }
            };

        let plan = match resolve(&a_shape, &b_shape) {
            Ok(p) => p,
            Err(e) => return report(e),
        };
        if out_len != plan.out_len() {
            return report(MatmulError::BufferLength {
                expected: plan.out_len(),
                got: out_len,
            });
        }

        let (a_len, b_len) = (a_shape.numel(), b_shape.numel());
        if (a_len > 0 && a.data.is_null()) || (b_len > 0 && b.data.is_null()) {
            set_last_error("null data".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let (a_data, b_data, c_data) = unsafe {
            (
                slice_or_empty(a.data as *const f32, a_len),
                slice_or_empty(b.data as *const f32, b_len),
                std::slice::from_raw_parts_mut(out, out_len),
            )
        };

        let handle = unsafe { &*handle };
        handle.dispatcher.dispatch(&plan, a_data, b_data, c_data);
        MMStatus::Ok
    })
}

unsafe fn slice_or_empty<'a>(ptr: *const f32, len: usize) -> &'a [f32] {
    if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len)
    }
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `mm_free_string`.
#[no_mangle]
pub extern "C" fn mm_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `mm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn mm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
