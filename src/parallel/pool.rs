//! Rayon thread pool configuration for batch calculations such as par sheets.
//!
//! Use [WorkerPool::install] to run with a fixed number of threads, or rely on
//! Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;

/// Worker-thread count for par-sheet generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use the global Rayon pool.
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a pool with this worker count. With 0 workers, or if the
    /// dedicated pool cannot be built, the closure runs on the global pool.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                tracing::warn!(workers = self.workers, error = %err, "falling back to global rayon pool");
                f()
            }
        }
    }
}
