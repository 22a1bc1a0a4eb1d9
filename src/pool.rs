//! Free lists for the expensive compression scratch state.
//!
//! An HC dictionary is ~550 KiB of tables; allocating and zero-filling one
//! per call dominates small compressions. Both pools are plain
//! mutex-protected stacks: acquire pops or allocates, release pushes back
//! up to a small cap so idle memory stays bounded. Neither operation
//! blocks on anything but the mutex.

use crate::block::compress_hc::HcDict;
use std::sync::Mutex;
use std::vec::Vec;

/// Idle entries kept per pool; more concurrent callers than this simply
/// allocate.
const MAX_POOLED: usize = 8;

static DICT_POOL: Mutex<Vec<HcDict>> = Mutex::new(Vec::new());
static SCRATCH_POOL: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());

/// Returns an idle dictionary or creates one. The caller re-initializes it
/// for its input, so stale table contents are fine.
pub(crate) fn acquire_dict() -> HcDict {
    let recycled = DICT_POOL.lock().ok().and_then(|mut pool| pool.pop());
    recycled.unwrap_or_else(HcDict::new)
}

pub(crate) fn release_dict(dict: HcDict) {
    if let Ok(mut pool) = DICT_POOL.lock() {
        if pool.len() < MAX_POOLED {
            pool.push(dict);
        }
    }
}

/// Returns an empty scratch buffer with at least `capacity` bytes
/// reserved. A pooled buffer that is too small is dropped rather than
/// grown in place.
pub(crate) fn acquire_scratch(capacity: usize) -> Vec<u8> {
    if let Ok(mut pool) = SCRATCH_POOL.lock() {
        if let Some(mut buf) = pool.pop() {
            if buf.capacity() >= capacity {
                buf.clear();
                return buf;
            }
        }
    }
    Vec::with_capacity(capacity)
}

pub(crate) fn release_scratch(buf: Vec<u8>) {
    if let Ok(mut pool) = SCRATCH_POOL.lock() {
        if pool.len() < MAX_POOLED {
            pool.push(buf);
        }
    }
}
