//! Data-parallel row scanning.
//!
//! This module wraps the optional rayon dependency behind one small type so
//! the enumerators do not need feature gates of their own. With the
//! `parallel` feature enabled, [`WorkerPool::map_rows`] fans a range of row
//! indices out across rayon workers and collects the results **in index
//! order**. Without the feature it runs sequentially with identical output.
//!
//! # Usage
//!
//! ```
//! use choiceset::parallel::WorkerPool;
//!
//! let pool = WorkerPool::new(None).unwrap();
//! let squares = pool.map_rows(0..5, |i| i * i);
//! assert_eq!(squares, vec![0, 1, 4, 9, 16]);
//! ```
//!
//! # Performance
//!
//! Per-row work in the pair scan grows with the number of remaining
//! partners, so rayon's work stealing keeps the load balanced even though
//! early rows cost far more than late ones.

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;

/// A handle to the threads used for row scanning.
///
/// `WorkerPool::new(None)` uses rayon's global pool. Passing a thread count
/// builds a dedicated pool of that size.
#[derive(Debug, Default)]
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Create a pool.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads` is zero or the pool cannot be built.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        if threads == Some(0) {
            return Err(crate::error::Error::invalid_params(
                "thread count must be at least 1",
            ));
        }

        #[cfg(feature = "parallel")]
        {
            let pool = match threads {
                Some(n) => Some(
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(n)
                        .build()
                        .map_err(|e| crate::error::Error::invalid_params(e.to_string()))?,
                ),
                None => None,
            };
            Ok(Self { pool })
        }

        #[cfg(not(feature = "parallel"))]
        {
            if let Some(n) = threads {
                log::warn!("built without the `parallel` feature, ignoring {n} threads");
            }
            Ok(Self {})
        }
    }

    /// Number of worker threads in use.
    #[must_use]
    pub fn threads(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool
                .as_ref()
                .map_or_else(rayon::current_num_threads, rayon::ThreadPool::current_num_threads)
        }
        #[cfg(not(feature = "parallel"))]
        {
            1
        }
    }

    /// Apply `f` to every index in `rows`, returning results in index order.
    pub fn map_rows<T, F>(&self, rows: Range<usize>, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            let scan = || rows.into_par_iter().map(&f).collect();
            match &self.pool {
                Some(pool) => pool.install(scan),
                None => scan(),
            }
        }
        #[cfg(not(feature = "parallel"))]
        {
            rows.map(f).collect()
        }
    }
}
