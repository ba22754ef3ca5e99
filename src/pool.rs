//! Bounded worker pool shared by the extraction and thumbnail stages.

use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// A fixed number of worker threads dedicated to one pipeline stage.
pub struct WorkerPool {
    pool: ThreadPool,
    size: usize,
}

impl WorkerPool {
    /// Builds a pool with `size` threads (at least one), named `<name>-<n>`.
    pub fn new(size: usize, name: &str) -> Result<Self> {
        let size = size.max(1);
        let prefix = name.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .with_context(|| format!("Failed to create {} worker pool", name))?;
        Ok(Self { pool, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `work` on every task and hands each result to `on_done` on the
    /// calling thread in the order the tasks finish. Returns when all tasks
    /// have completed.
    pub fn run_unordered<T, R, W, D>(&self, tasks: Vec<T>, work: W, mut on_done: D)
    where
        T: Send,
        R: Send,
        W: Fn(T) -> R + Sync,
        D: FnMut(R),
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        let work = &work;

        self.pool.in_place_scope(|scope| {
            for task in tasks {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let _ = tx.send(work(task));
                });
            }
            drop(tx);

            for result in rx.iter() {
                on_done(result);
            }
        });
    }
}
