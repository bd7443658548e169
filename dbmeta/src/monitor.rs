// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Progress and cancellation signal
//!
//! Every catalog load receives a monitor. Loads poll `is_cancelled()` before
//! each catalog query and between rows of a result set, and unwind with
//! `MetaError::Cancelled` once the flag is observed.

use crate::error::{MetaError, MetaResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Cooperative progress/cancellation signal threaded through every load
pub trait ProgressMonitor: Send + Sync {
    /// Whether the operation has been asked to stop
    fn is_cancelled(&self) -> bool;

    /// Start a named unit of work with an estimated number of steps
    fn begin_task(&self, _name: &str, _total_work: usize) {}

    /// Describe the current step inside the running task
    fn sub_task(&self, _name: &str) {}

    /// Report completed steps
    fn worked(&self, _amount: usize) {}

    /// Finish the task started by `begin_task`
    fn done(&self) {}
}

/// Poll the monitor at a suspension point
pub fn check_cancelled(monitor: &dyn ProgressMonitor) -> MetaResult<()> {
    if monitor.is_cancelled() {
        log::debug!("Cancellation observed, unwinding catalog load");
        return Err(MetaError::Cancelled);
    }
    Ok(())
}

/// Monitor that never cancels and discards progress
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidProgressMonitor;

impl ProgressMonitor for VoidProgressMonitor {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Monitor backed by a shared cancellation flag
///
/// Clones share the same flag, so one clone can be handed to a worker while
/// another stays with the caller that may cancel it.
#[derive(Debug, Default, Clone)]
pub struct CancellationMonitor {
    flag: Arc<AtomicBool>,
    worked: Arc<AtomicUsize>,
}

impl CancellationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every load using this monitor
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Total steps reported through `worked`
    pub fn work_done(&self) -> usize {
        self.worked.load(Ordering::Relaxed)
    }
}

impl ProgressMonitor for CancellationMonitor {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn begin_task(&self, name: &str, total_work: usize) {
        log::trace!("Task '{}' started ({} steps)", name, total_work);
    }

    fn sub_task(&self, name: &str) {
        log::trace!("Sub-task: {}", name);
    }

    fn worked(&self, amount: usize) {
        self.worked.fetch_add(amount, Ordering::Relaxed);
    }
}
