//! User interrupt (Ctrl+C) handling.
//!
//! The signal handler only raises a flag. Long-running loops poll it between
//! units of work and unwind with [`PathlogError::Interrupted`], so scoped
//! cleanup (the path log flush) still runs.

use crate::error::{PathlogError, Result};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT into a fresh flag. May be called once per process.
    pub fn install() -> Result<Self> {
        let interrupt = Self::new();
        let flag = Arc::clone(&interrupt.flag);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(interrupt)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> Result<()> {
        if self.requested() {
            return Err(PathlogError::Interrupted);
        }
        Ok(())
    }
}
