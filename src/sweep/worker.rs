//! Worker-thread host for the sweep processor
//!
//! Wraps a [`SweepProcessor`](super::SweepProcessor) in a dedicated
//! thread and a pair of channels, giving the producer side the
//! init/sweep/ready/done envelope:
//!
//! ```text
//! producer                     worker thread
//!    | -- Init(params) ------>    init()
//!    | <------------- Ready  |
//!    |   ..write AABBs/rays into the shared regions..
//!    | -- Sweep{count} ----->    sweep()
//!    | <---- Done{ray_count} |
//!    |   ..read results region..
//! ```
//!
//! The request/reply hop is the only synchronization point; while a
//! request is in flight the worker owns the shared regions, and between
//! replies the producer does. Dropping the worker shuts the thread down.
//!
//! Author: Moroya Sakamoto

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use std::thread::JoinHandle;

use crate::error::IndexError;

use super::{SweepParams, SweepProcessor};

/// Requests the producer sends to the worker
#[derive(Debug)]
pub enum SweepRequest {
    /// Build pools and octree over the shared regions
    Init(Box<SweepParams>),
    /// Ingest `object_count` objects and cast the configured rays
    Sweep {
        /// Number of leading AABB records the producer has written
        object_count: u32,
    },
    /// Stop the worker loop
    Shutdown,
}

/// Replies the worker sends back
#[derive(Debug, PartialEq, Eq)]
pub enum SweepReply {
    /// Init succeeded
    Ready,
    /// Sweep finished; results are in the result region
    Done {
        /// Number of rays cast
        ray_count: u32,
    },
    /// Init or sweep failed
    Failed(IndexError),
}

/// Handle to a sweep processor running on its own thread
pub struct SweepWorker {
    requests: Sender<SweepRequest>,
    replies: Receiver<SweepReply>,
    handle: Option<JoinHandle<()>>,
}

impl SweepWorker {
    /// Spawn the worker thread
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = bounded::<SweepRequest>(1);
        let (reply_tx, reply_rx) = bounded::<SweepReply>(1);
        let handle = std::thread::Builder::new()
            .name("frost-sweep".into())
            .spawn(move || run(request_rx, reply_tx))
            .expect("failed to spawn sweep worker thread");
        Self {
            requests: request_tx,
            replies: reply_rx,
            handle: Some(handle),
        }
    }

    /// Initialize the processor; blocks until the worker replies
    pub fn init(&self, params: SweepParams) -> Result<(), IndexError> {
        self.requests
            .send(SweepRequest::Init(Box::new(params)))
            .map_err(|_| IndexError::Disconnected)?;
        match self.replies.recv().map_err(|_| IndexError::Disconnected)? {
            SweepReply::Ready => Ok(()),
            SweepReply::Failed(err) => Err(err),
            SweepReply::Done { .. } => Err(IndexError::Disconnected),
        }
    }

    /// Run one sweep; blocks until the worker replies with the ray count
    pub fn sweep(&self, object_count: u32) -> Result<u32, IndexError> {
        self.requests
            .send(SweepRequest::Sweep { object_count })
            .map_err(|_| IndexError::Disconnected)?;
        match self.replies.recv().map_err(|_| IndexError::Disconnected)? {
            SweepReply::Done { ray_count } => Ok(ray_count),
            SweepReply::Failed(err) => Err(err),
            SweepReply::Ready => Err(IndexError::Disconnected),
        }
    }
}

impl Drop for SweepWorker {
    fn drop(&mut self) {
        let _ = self.requests.send(SweepRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(requests: Receiver<SweepRequest>, replies: Sender<SweepReply>) {
    let mut processor = SweepProcessor::new();
    debug!("sweep worker up");
    while let Ok(request) = requests.recv() {
        let reply = match request {
            SweepRequest::Init(params) => match processor.init(*params) {
                Ok(()) => SweepReply::Ready,
                Err(err) => SweepReply::Failed(err),
            },
            SweepRequest::Sweep { object_count } => match processor.sweep(object_count) {
                Ok(ray_count) => SweepReply::Done { ray_count },
                Err(err) => SweepReply::Failed(err),
            },
            SweepRequest::Shutdown => break,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    debug!("sweep worker down");
}
