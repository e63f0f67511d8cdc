//! Background batch worker
//!
//! [`BatchWorker`] owns a thread running a [`ComputeEngine`]. Tasks are
//! queued over a channel and processed FIFO; each submission gets its own
//! event channel carrying progress reports and the final result, so
//! responses are correlated by handle (and id) rather than arrival order.
//!
//! There is no cancellation. A started task runs to completion; dropping
//! its [`TaskHandle`] just discards the response.

mod engine;
mod task;

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

pub use engine::{ComputeEngine, ItemError, WorkerMetrics};
pub use task::{
    BatchConvertOptions, ColorList, CombinationList, ComputeResult, ComputeTask, DistanceOptions,
    DominantOptions, IndexOptions, NearestData, NearestOptions, Operation, PaletteData, PaletteOptions,
    Progress, SampleData, TaskMetrics, WorkerEvent, recover_envelope,
};

use crate::bridge::MathBridge;
use crate::config::EngineConfig;
use crate::{Error, Result};

enum Request {
    Task(ComputeTask),
    Json(String),
}

struct Job {
    request: Request,
    events: Sender<WorkerEvent>,
}

/// Receiving end for one submitted task
#[derive(Debug)]
pub struct TaskHandle {
    id: Option<String>,
    events: Receiver<WorkerEvent>,
}

impl TaskHandle {
    /// Id of the submitted task; `None` for raw JSON submissions
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Block until the result arrives, discarding progress
    pub fn wait(self) -> Result<ComputeResult> {
        self.wait_with_progress(|_| {})
    }

    /// Block until the result arrives, passing progress to `on_progress`
    pub fn wait_with_progress(self, mut on_progress: impl FnMut(&Progress)) -> Result<ComputeResult> {
        for event in self.events.iter() {
            match event {
                WorkerEvent::Progress(progress) => on_progress(&progress),
                WorkerEvent::Completed(result) => return Ok(result),
            }
        }
        Err(Error::WorkerClosed)
    }

    /// Next event if one is ready
    pub fn try_next(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }
}

/// Threaded front end for a [`ComputeEngine`]
#[derive(Debug)]
pub struct BatchWorker {
    jobs: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
    bridge: Arc<MathBridge>,
}

impl BatchWorker {
    /// Start a worker with its own bridge
    pub fn spawn(config: EngineConfig) -> Result<Self> {
        let bridge = Arc::new(MathBridge::new(config.accelerated.clone()));
        Self::spawn_with_bridge(config, bridge)
    }

    /// Start a worker sharing `bridge`
    ///
    /// The worker thread initializes the bridge before taking its first
    /// task.
    pub fn spawn_with_bridge(config: EngineConfig, bridge: Arc<MathBridge>) -> Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let mut engine = ComputeEngine::with_bridge(config, Arc::clone(&bridge));

        let thread = thread::Builder::new()
            .name("sanzo-worker".into())
            .spawn(move || {
                let state = engine.bridge().init();
                log::debug!("Worker started, bridge {state:?}");

                for job in queue {
                    let events = job.events;
                    let mut progress = |p: Progress| {
                        let _ = events.send(WorkerEvent::Progress(p));
                    };
                    let result = match job.request {
                        Request::Task(task) => engine.process(task, &mut progress),
                        Request::Json(json) => engine.process_json(&json, &mut progress),
                    };
                    // receiver may have been dropped; the result is discarded then
                    let _ = events.send(WorkerEvent::Completed(result));
                }
                log::debug!("Worker stopped");
            })?;

        Ok(Self {
            jobs: Some(jobs),
            thread: Some(thread),
            bridge,
        })
    }

    pub fn bridge(&self) -> &Arc<MathBridge> {
        &self.bridge
    }

    fn send(&self, request: Request, id: Option<String>) -> Result<TaskHandle> {
        let jobs = self.jobs.as_ref().ok_or(Error::WorkerClosed)?;
        let (events, receiver) = mpsc::channel();
        jobs.send(Job { request, events }).map_err(|_| Error::WorkerClosed)?;
        Ok(TaskHandle {
            id,
            events: receiver,
        })
    }

    /// Queue a task
    pub fn submit(&self, task: ComputeTask) -> Result<TaskHandle> {
        let id = task.id.clone();
        self.send(Request::Task(task), Some(id))
    }

    /// Queue a JSON request; decoding happens on the worker thread
    pub fn submit_json(&self, json: impl Into<String>) -> Result<TaskHandle> {
        self.send(Request::Json(json.into()), None)
    }

    /// Finish queued tasks and stop the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Worker thread panicked");
            }
        }
    }
}

impl Drop for BatchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_submit_and_wait() {
        let worker = BatchWorker::spawn(EngineConfig::default()).unwrap();
        let handle = worker
            .submit(ComputeTask::new("t1", Operation::BatchConvertColors {
                data: ColorList::new(vec![json!("#FF0000"), json!("bogus")]),
                options: Default::default(),
            }))
            .unwrap();
        assert_eq!(handle.id(), Some("t1"));

        let result = handle.wait().unwrap();
        assert_eq!(result.id, "t1");
        assert!(result.success);
        let body = result.result.unwrap();
        assert_eq!(body["successCount"], 1);
        assert_eq!(body["errorCount"], 1);
        worker.shutdown();
    }

    #[test]
    fn test_fifo_and_json() {
        let worker = BatchWorker::spawn(EngineConfig::default().without_accelerated()).unwrap();
        let first = worker
            .submit_json(r#"{"id": "a", "operation": "getWorkerMetrics"}"#)
            .unwrap();
        let second = worker.submit_json("{ not json").unwrap();
        let third = worker
            .submit_json(r#"{"id": "c", "operation": "getWorkerMetrics"}"#)
            .unwrap();

        let third = third.wait().unwrap();
        let second = second.wait().unwrap();
        let first = first.wait().unwrap();

        assert_eq!(first.result.unwrap()["tasksProcessed"], 0);
        assert!(!second.success);
        assert_eq!(second.id, "");
        assert_eq!(third.result.unwrap()["tasksProcessed"], 2);
    }

    #[test]
    fn test_worker_survives_huge_k() {
        let worker = BatchWorker::spawn(EngineConfig::default().without_accelerated()).unwrap();
        let nearest = worker
            .submit_json(
                r##"{"id": "k", "operation": "findNearestColors",
                     "data": {"targets": ["#FF0000"], "candidates": ["#FF0000", "#0000FF"]},
                     "options": {"k": 18446744073709551615}}"##,
            )
            .unwrap()
            .wait()
            .unwrap();
        assert!(nearest.success, "{:?}", nearest.error);

        let after = worker
            .submit_json(r#"{"id": "m", "operation": "getWorkerMetrics"}"#)
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(after.result.unwrap()["tasksProcessed"], 1);
        worker.shutdown();
    }

    #[test]
    fn test_worker_initializes_bridge() {
        let worker = BatchWorker::spawn(EngineConfig::default()).unwrap();
        let result = worker
            .submit(ComputeTask::new("m", Operation::GetWorkerMetrics {}))
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(result.result.unwrap()["bridge"]["isWasmReady"], true);
        assert!(worker.bridge().is_accelerated_ready());
    }
}
