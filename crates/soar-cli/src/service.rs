//! Task service: a [`TaskManager`] owned by one tokio task, driven over a
//! channel.
//!
//! Requests are handled one at a time in the order they were sent. The
//! service stops once every [`TaskHandle`] has been dropped.

use anyhow::{anyhow, Result};
use soar_core::{AircraftState, TaskEvent, TaskManager, TaskStats};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const QUEUE_DEPTH: usize = 64;

enum Request {
    Submit {
        state: AircraftState,
        reply: oneshot::Sender<TaskStats>,
    },
    SetMc {
        mc: f64,
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<TaskStats>,
    },
    TakeEvents {
        reply: oneshot::Sender<Vec<TaskEvent>>,
    },
}

pub struct TaskService;

impl TaskService {
    /// Move `manager` onto a new tokio task and return a handle to it.
    pub fn spawn(manager: TaskManager) -> (TaskHandle, JoinHandle<TaskManager>) {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let join = tokio::spawn(run_service(manager, rx));
        (TaskHandle { tx }, join)
    }
}

async fn run_service(mut manager: TaskManager, mut rx: mpsc::Receiver<Request>) -> TaskManager {
    tracing::debug!("task service started");
    while let Some(request) = rx.recv().await {
        // a dropped reply receiver only means the caller stopped waiting
        match request {
            Request::Submit { state, reply } => {
                let _ = reply.send(manager.update(&state));
            }
            Request::SetMc { mc, reply } => {
                manager.set_mc(mc);
                let _ = reply.send(());
            }
            Request::Snapshot { reply } => {
                let _ = reply.send(manager.stats().clone());
            }
            Request::TakeEvents { reply } => {
                let _ = reply.send(manager.take_events());
            }
        }
    }
    tracing::debug!("task service channel closed");
    manager
}

/// Cloneable client side of a running [`TaskService`].
#[derive(Clone)]
pub struct TaskHandle {
    tx: mpsc::Sender<Request>,
}

impl TaskHandle {
    pub async fn submit(&self, state: AircraftState) -> Result<TaskStats> {
        self.request(|reply| Request::Submit { state, reply }).await
    }

    pub async fn set_mc(&self, mc: f64) -> Result<()> {
        self.request(|reply| Request::SetMc { mc, reply }).await
    }

    /// Statistics from the most recent sample.
    pub async fn snapshot(&self) -> Result<TaskStats> {
        self.request(|reply| Request::Snapshot { reply }).await
    }

    /// Task events raised since the previous call.
    pub async fn take_events(&self) -> Result<Vec<TaskEvent>> {
        self.request(|reply| Request::TakeEvents { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Request) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| anyhow!("task service stopped"))?;
        response
            .await
            .map_err(|_| anyhow!("task service dropped the request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::triangle_scenario;
    use soar_core::{EngineConfig, GeoPoint};

    fn spawn() -> (TaskHandle, JoinHandle<TaskManager>, Vec<AircraftState>) {
        let scenario = triangle_scenario(GeoPoint::new(45.0, 7.0));
        let mut manager = TaskManager::new(EngineConfig::default()).unwrap();
        manager.set_task(scenario.task.clone()).unwrap();
        let samples = scenario.samples(10.0);
        let (handle, join) = TaskService::spawn(manager);
        (handle, join, samples)
    }

    #[tokio::test]
    async fn submits_in_order() {
        let (handle, join, samples) = spawn();
        let mut last_time = f64::NEG_INFINITY;
        for state in samples.iter().take(40) {
            let stats = handle.submit(*state).await.unwrap();
            assert_eq!(stats.time, state.time);
            assert!(stats.time > last_time);
            last_time = stats.time;
        }
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.time, last_time);
        assert!(snapshot.task_started);

        let events = handle.take_events().await.unwrap();
        assert!(events.iter().any(|e| matches!(e, TaskEvent::Started { .. })));
        assert!(handle.take_events().await.unwrap().is_empty());

        drop(handle);
        let manager = join.await.unwrap();
        assert_eq!(manager.stats().time, last_time);
    }

    #[tokio::test]
    async fn set_mc_reaches_the_manager() {
        let (handle, join, _) = spawn();
        handle.set_mc(2.5).await.unwrap();
        let other = handle.clone();
        other.set_mc(-1.0).await.unwrap();
        drop(handle);
        drop(other);
        let manager = join.await.unwrap();
        assert_eq!(manager.mc(), 0.0);
    }

    #[tokio::test]
    async fn concurrent_handles_share_one_manager() {
        let (handle, join, samples) = spawn();
        let first = handle.clone();
        let head: Vec<_> = samples[..10].to_vec();
        let writer = tokio::spawn(async move {
            for state in head {
                first.submit(state).await.unwrap();
            }
        });
        writer.await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().time, samples[9].time);
        drop(handle);
        join.await.unwrap();
    }
}
