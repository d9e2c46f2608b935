//! Bounded worker pool for status tasks
//!
//! Every submitted task is spawned right away but has to acquire a permit
//! before doing any work, so at most `workers` tasks run concurrently.

use crate::defaults;
use crate::error::{Result, StatusError};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

/// Outcome of a single pool task
#[derive(Debug)]
pub struct TaskResult {
    pub name: String,
    pub result: Result<()>,
}

pub struct WorkerPool {
    workers: usize,
    semaphore: Arc<Semaphore>,
    tasks: JoinSet<TaskResult>,
    names: HashMap<Id, String>,
    closed: bool,
}

impl WorkerPool {
    /// Create a pool running at most `workers` tasks at once (default when 0)
    pub fn new(workers: usize) -> Self {
        let workers = if workers < 1 {
            defaults::WORKER_COUNT
        } else {
            workers
        };
        Self {
            workers,
            semaphore: Arc::new(Semaphore::new(workers)),
            tasks: JoinSet::new(),
            names: HashMap::new(),
            closed: false,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue a named task
    pub fn submit<F>(&mut self, name: impl Into<String>, task: F) -> Result<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let name = name.into();
        if self.closed {
            return Err(StatusError::Pool(format!(
                "cannot submit task {name:?}: pool is drained"
            )));
        }

        let semaphore = self.semaphore.clone();
        let task_name = name.clone();
        let handle = self.tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    return TaskResult {
                        name: task_name,
                        result: Err(StatusError::Pool(e.to_string())),
                    }
                }
            };
            debug!(task = %task_name, "running status task");
            TaskResult {
                result: task.await,
                name: task_name,
            }
        });
        self.names.insert(handle.id(), name);
        Ok(())
    }

    /// Wait for every submitted task and close the pool
    pub async fn drain(&mut self) -> Vec<TaskResult> {
        self.closed = true;
        let mut results = Vec::with_capacity(self.tasks.len());

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    let name = self.names.get(&e.id()).cloned().unwrap_or_default();
                    warn!(task = %name, error = %e, "status task did not complete");
                    results.push(TaskResult {
                        name,
                        result: Err(StatusError::Pool(e.to_string())),
                    });
                }
            }
        }

        self.semaphore.close();
        results
    }
}
