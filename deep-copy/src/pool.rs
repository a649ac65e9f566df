/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

The context pool. Bounds allocation for callers that invoke the
public one-shot entry point in tight loops, by recycling [`CopyContext`]
instances instead of allocating a fresh identity map on every call.

*/

use crate::context::CopyContext;
use std::sync::{Mutex, OnceLock};

/// A pool of reusable [`CopyContext`]s.
///
/// The freelist is a plain `Mutex<Vec<CopyContext>>`: contention is brief
/// (a `Vec::pop`/`Vec::push`), so a simple lock is preferable to pulling in
/// a lock-free queue crate the rest of the engine has no other use for.
pub struct ContextPool {
    free: Mutex<Vec<CopyContext>>,
}

impl ContextPool {
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Hands out a reset (empty) context, reusing one from the freelist
    /// when available.
    pub fn acquire(&self) -> CopyContext {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default()
    }

    /// Clears `ctx` and returns it to the freelist.
    pub fn release(&self, mut ctx: CopyContext) {
        ctx.reset();
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ctx);
    }

    /// Number of contexts currently held in the freelist. Exposed for tests
    /// and diagnostics only.
    pub fn len(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide pool backing [`crate::copy`], the one-shot public entry
/// point. Kept as a single global pool (rather than thread-local) because a
/// `CopyContext` is cheap to reset and moving one between threads is safe
/// (it is `Send`, just not `Sync`) — a global pool lets a burst of work on
/// one thread reuse contexts warmed up by another.
static GLOBAL_POOL: OnceLock<ContextPool> = OnceLock::new();

pub fn global_pool() -> &'static ContextPool {
    GLOBAL_POOL.get_or_init(ContextPool::new)
}

/// RAII guard that returns a leased context to its pool on drop, including
/// on an early return caused by `?` — this is what keeps a failed copy from
/// ever leaving a poisoned context sitting in the pool.
pub struct PooledContext<'a> {
    pool: &'a ContextPool,
    ctx: Option<CopyContext>,
}

impl<'a> PooledContext<'a> {
    pub fn lease(pool: &'a ContextPool) -> Self {
        Self {
            pool,
            ctx: Some(pool.acquire()),
        }
    }

    pub fn get_mut(&mut self) -> &mut CopyContext {
        self.ctx.as_mut().expect("context already released")
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.release(ctx);
        }
    }
}
