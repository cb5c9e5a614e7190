use std::future::Future;

use anyhow::{Error, Result};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Runs the server's long-lived tasks and shuts all of them down when one
/// fails or the process receives Ctrl-C.
pub struct Supervisor {
    shutdown: CancellationToken,
    tasks: JoinSet<(&'static str, Result<()>)>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            shutdown: CancellationToken::new(),
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<F, Fut>(&mut self, name: &'static str, factory: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let shutdown = self.shutdown.child_token();
        tracing::debug!(task = name, "starting supervised task");
        self.tasks.spawn(async move { (name, factory(shutdown).await) });
    }

    pub async fn run(mut self) -> Result<()> {
        let mut first_err: Option<Error> = None;

        while !self.tasks.is_empty() {
            tokio::select! {
                Some(outcome) = self.tasks.join_next() => {
                    self.handle_task_outcome(&mut first_err, outcome);
                }
                _ = tokio::signal::ctrl_c(), if !self.shutdown.is_cancelled() => {
                    tracing::info!("received Ctrl-C, shutting down");
                    self.shutdown.cancel();
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn handle_task_outcome(
        &self,
        first_err: &mut Option<Error>,
        outcome: std::result::Result<(&'static str, Result<()>), JoinError>,
    ) {
        let err = match outcome {
            Ok((name, Ok(()))) => {
                tracing::info!(task = name, "task exited gracefully");
                return;
            }
            Ok((name, Err(err))) => {
                tracing::error!(task = name, "task exited with error: {:#}", err);
                err
            }
            Err(join_err) => {
                tracing::error!("task panicked: {:?}", join_err);
                join_err.into()
            }
        };

        if first_err.is_none() {
            *first_err = Some(err);
        }
        if !self.shutdown.is_cancelled() {
            tracing::warn!("supervisor shutting down");
            self.shutdown.cancel();
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_tasks_exit_cleanly() {
        let mut supervisor = Supervisor::new();
        supervisor.spawn("first", |_shutdown| async { Ok(()) });
        supervisor.spawn("second", |_shutdown| async { Ok(()) });

        assert!(supervisor.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_task_cancels_siblings() {
        let mut supervisor = Supervisor::new();
        supervisor.spawn("waiter", |shutdown| async move {
            shutdown.cancelled().await;
            Ok(())
        });
        supervisor.spawn("failer", |_shutdown| async { anyhow::bail!("boom") });

        let err = supervisor.run().await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
