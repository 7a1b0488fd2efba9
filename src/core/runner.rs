//! # Cancel-on-first-finish runner.
//!
//! Runs a group of tasks concurrently under one shared child [`CancellationToken`].
//! The first task to return, for any reason, cancels that token and its result is
//! handed back to the caller.
//!
//! ## Flow
//! ```text
//! parent token ──► child = parent.child_token()
//!
//!   task[0].spawn(child) ─┐
//!   task[1].spawn(child) ─┼──► JoinSet ──► join_next() (first finisher)
//!   task[N].spawn(child) ─┘                     │
//!                                               ├─► child.cancel()   (exactly once)
//!                                               └─► return first result
//!
//! cancel_on_first_finish:       detach the rest (they unwind on their own)
//! cancel_on_first_finish_wait:  join the rest up to `grace`, abort and reap stragglers
//! ```
//!
//! ## Rules
//! - Zero tasks: returns `Ok(())` without spawning anything
//! - Every task receives a clone of the **same** child token
//! - Cancellation of the child token happens **before** the runner returns
//! - The runner introduces no error of its own; a join failure of a spawned unit
//!   is mapped to [`TaskError::Panicked`] (panic) or [`TaskError::Canceled`] (abort)
//! - Parent cancellation propagates to the child token and so to every task

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{core::guard::panic_message, error::TaskError, tasks::TaskRef};

/// Runs `tasks` until the first one returns, cancels the others and returns that result.
///
/// Losing tasks are **not** awaited: their token is cancelled and they are left to
/// finish on the runtime. Use [`cancel_on_first_finish_wait`] to drain them.
pub async fn cancel_on_first_finish(
    parent: &CancellationToken,
    tasks: Vec<TaskRef>,
) -> Result<(), TaskError> {
    if tasks.is_empty() {
        return Ok(());
    }
    let mut group = Group::spawn(parent, tasks);
    let first = group.first().await;
    group.set.detach_all();
    first
}

/// Like [`cancel_on_first_finish`], then waits up to `grace` for the remaining tasks.
///
/// Tasks still running after `grace` are logged and aborted; their futures are
/// dropped before this returns. The returned value is always the first finisher's result.
pub async fn cancel_on_first_finish_wait(
    parent: &CancellationToken,
    grace: Duration,
    tasks: Vec<TaskRef>,
) -> Result<(), TaskError> {
    if tasks.is_empty() {
        return Ok(());
    }
    let mut group = Group::spawn(parent, tasks);
    let first = group.first().await;
    group.drain(grace).await;
    first
}

/// Spawned tasks sharing one child token.
struct Group {
    token: CancellationToken,
    set: JoinSet<Result<(), TaskError>>,
    names: HashMap<Id, String>,
}

impl Group {
    fn spawn(parent: &CancellationToken, tasks: Vec<TaskRef>) -> Self {
        let token = parent.child_token();
        let mut set = JoinSet::new();
        let mut names = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let handle = set.spawn(task.spawn(token.clone()));
            names.insert(handle.id(), task.name().to_owned());
        }
        Self { token, set, names }
    }

    /// Waits for the first finisher, then cancels the shared token.
    async fn first(&mut self) -> Result<(), TaskError> {
        let res = match self.set.join_next_with_id().await {
            Some(Ok((id, res))) => {
                let name = self.names.remove(&id);
                debug!(task = ?name, "first task finished");
                res
            }
            Some(Err(err)) => {
                self.names.remove(&err.id());
                Err(join_error(err))
            }
            None => Ok(()),
        };
        self.token.cancel();
        res
    }

    /// Joins the remaining tasks within `grace`; aborts whatever is left.
    async fn drain(&mut self, grace: Duration) {
        let set = &mut self.set;
        let names = &mut self.names;
        let all = async {
            while let Some(res) = set.join_next_with_id().await {
                let id = match res {
                    Ok((id, _)) => id,
                    Err(err) => err.id(),
                };
                names.remove(&id);
            }
        };

        if tokio::time::timeout(grace, all).await.is_err() {
            let mut stuck: Vec<&str> = self.names.values().map(String::as_str).collect();
            stuck.sort_unstable();
            warn!(?grace, ?stuck, "tasks did not stop within grace; aborting");
            self.set.abort_all();
            // Aborted futures are dropped before their join completes.
            while self.set.join_next().await.is_some() {}
            self.names.clear();
        }
    }
}

fn join_error(err: JoinError) -> TaskError {
    if err.is_panic() {
        TaskError::Panicked {
            info: panic_message(err.into_panic().as_ref()),
        }
    } else {
        TaskError::Canceled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use crate::tasks::TaskFn;

    fn blocking(name: &'static str, seen: Arc<Mutex<Vec<CancellationToken>>>) -> TaskRef {
        TaskFn::arc(name, move |ctx: CancellationToken| {
            seen.lock().unwrap().push(ctx.clone());
            async move {
                ctx.cancelled().await;
                Err(TaskError::Canceled)
            }
        })
    }

    #[tokio::test]
    async fn test_zero_tasks_returns_ok() {
        let parent = CancellationToken::new();
        assert_eq!(cancel_on_first_finish(&parent, Vec::new()).await, Ok(()));
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_error_wins_and_cancels_others() {
        let parent = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let tasks: Vec<TaskRef> = vec![
            blocking("a", Arc::clone(&seen)),
            TaskFn::arc("fail", |_ctx: CancellationToken| async {
                Err(TaskError::fail("test error"))
            }),
            blocking("b", Arc::clone(&seen)),
        ];

        let res = cancel_on_first_finish(&parent, tasks).await;
        assert_eq!(res, Err(TaskError::fail("test error")));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(CancellationToken::is_cancelled));
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_ok_wins() {
        let parent = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let tasks: Vec<TaskRef> = vec![
            TaskFn::arc("done", |_ctx: CancellationToken| async { Ok(()) }),
            blocking("wait", Arc::clone(&seen)),
        ];

        assert_eq!(cancel_on_first_finish(&parent, tasks).await, Ok(()));
        assert!(seen.lock().unwrap()[0].is_cancelled());
    }

    #[tokio::test]
    async fn test_parent_cancel_propagates() {
        let parent = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let tasks: Vec<TaskRef> = vec![
            blocking("a", Arc::clone(&seen)),
            blocking("b", Arc::clone(&seen)),
        ];

        let p = parent.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            p.cancel();
        });

        let res = cancel_on_first_finish(&parent, tasks).await;
        assert_eq!(res, Err(TaskError::Canceled));
    }

    #[tokio::test]
    async fn test_unguarded_panic_is_mapped() {
        fn explode() -> Result<(), TaskError> {
            panic!("unguarded")
        }

        let parent = CancellationToken::new();
        let tasks: Vec<TaskRef> = vec![TaskFn::arc("panic", |_ctx: CancellationToken| async {
            explode()
        })];

        let err = cancel_on_first_finish(&parent, tasks).await.unwrap_err();
        assert_eq!(
            err,
            TaskError::Panicked {
                info: "unguarded".into()
            }
        );
    }

    #[tokio::test]
    async fn test_wait_drains_losers() {
        let parent = CancellationToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&finished);

        let tasks: Vec<TaskRef> = vec![
            TaskFn::arc("fail", |_ctx: CancellationToken| async {
                Err(TaskError::fail("boom"))
            }),
            TaskFn::arc("slow-unwind", move |ctx: CancellationToken| {
                let f = Arc::clone(&f);
                async move {
                    ctx.cancelled().await;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    f.store(true, Ordering::SeqCst);
                    Err(TaskError::Canceled)
                }
            }),
        ];

        let res = cancel_on_first_finish_wait(&parent, Duration::from_secs(5), tasks).await;
        assert_eq!(res, Err(TaskError::fail("boom")));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_aborts_stragglers_after_grace() {
        struct SetOnDrop(Arc<AtomicBool>);

        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let parent = CancellationToken::new();
        let dropped = Arc::new(AtomicBool::new(false));
        let d = Arc::clone(&dropped);

        let tasks: Vec<TaskRef> = vec![
            TaskFn::arc("done", |_ctx: CancellationToken| async { Ok(()) }),
            TaskFn::arc("stubborn", move |_ctx: CancellationToken| {
                let guard = SetOnDrop(Arc::clone(&d));
                async move {
                    let _guard = guard;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
            }),
        ];

        let started = tokio::time::Instant::now();
        let res = cancel_on_first_finish_wait(&parent, Duration::from_millis(50), tasks).await;
        assert_eq!(res, Ok(()));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(dropped.load(Ordering::SeqCst), "straggler still running");
    }
}
