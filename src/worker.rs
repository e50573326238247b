//! Background render worker
//!
//! The worker thread owns a [`RenderSession`]. Every request carries a
//! generation number; the thread skips queued requests that a newer one has
//! already replaced, and the owner throws away any reply whose generation is
//! not the latest submitted. A frame for old parameters is therefore never
//! shown after a frame for newer ones.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::RenderError;
use crate::params::RenderParameters;
use crate::scene::SceneLayout;
use crate::session::{RenderOutput, RenderSession};

struct RenderRequest {
    generation: u64,
    params: RenderParameters,
    /// Switch the session to this layout before rendering
    layout: Option<SceneLayout>,
}

/// Result of one render request
#[derive(Debug)]
pub struct RenderReply {
    pub generation: u64,
    pub result: Result<RenderOutput, RenderError>,
}

pub struct RenderWorker {
    requests: Option<Sender<RenderRequest>>,
    replies: Receiver<RenderReply>,
    handle: Option<JoinHandle<()>>,
    latest: u64,
}

impl RenderWorker {
    /// Start the worker thread with `session`
    pub fn spawn(session: RenderSession) -> Result<Self, RenderError> {
        let (request_tx, request_rx) = mpsc::channel::<RenderRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<RenderReply>();

        let handle = thread::Builder::new()
            .name("fog-rt-worker".to_string())
            .spawn(move || worker_loop(session, request_rx, reply_tx))
            .map_err(|e| RenderError::Worker(e.to_string()))?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            handle: Some(handle),
            latest: 0,
        })
    }

    /// Queue a render of `params`, superseding anything submitted before.
    /// Returns the request's generation.
    pub fn submit(&mut self, params: RenderParameters) -> Result<u64, RenderError> {
        self.send(params, None)
    }

    /// Like [`RenderWorker::submit`], also switching the scene layout
    pub fn submit_with_layout(
        &mut self,
        params: RenderParameters,
        layout: SceneLayout,
    ) -> Result<u64, RenderError> {
        self.send(params, Some(layout))
    }

    fn send(
        &mut self,
        params: RenderParameters,
        layout: Option<SceneLayout>,
    ) -> Result<u64, RenderError> {
        let sender = self.requests.as_ref().ok_or(RenderError::WorkerGone)?;
        let generation = self.latest + 1;
        sender
            .send(RenderRequest {
                generation,
                params,
                layout,
            })
            .map_err(|_| RenderError::WorkerGone)?;
        self.latest = generation;
        Ok(generation)
    }

    /// Generation of the most recent submission, 0 if none
    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    /// Return the reply for the latest submission if it is ready. Stale
    /// replies are discarded along the way.
    pub fn try_latest(&mut self) -> Result<Option<RenderReply>, RenderError> {
        loop {
            match self.replies.try_recv() {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Ok(Some(reply));
                    }
                }
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(RenderError::WorkerGone),
            }
        }
    }

    /// Wait up to `timeout` for the reply to the latest submission
    pub fn wait_latest(&mut self, timeout: Duration) -> Result<Option<RenderReply>, RenderError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.replies.recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(reply) = self.accept(reply) {
                        return Ok(Some(reply));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Ok(None),
                Err(RecvTimeoutError::Disconnected) => return Err(RenderError::WorkerGone),
            }
        }
    }

    fn accept(&self, reply: RenderReply) -> Option<RenderReply> {
        if reply.generation == self.latest {
            Some(reply)
        } else {
            tracing::debug!(
                generation = reply.generation,
                latest = self.latest,
                "Discarding stale frame"
            );
            None
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Render worker panicked");
            }
        }
    }
}

fn worker_loop(
    mut session: RenderSession,
    requests: Receiver<RenderRequest>,
    replies: Sender<RenderReply>,
) {
    while let Ok(mut request) = requests.recv() {
        // Only the newest queued request matters
        while let Ok(newer) = requests.try_recv() {
            tracing::trace!(skipped = request.generation, "Superseded render request");
            let layout = newer.layout.or(request.layout);
            request = RenderRequest { layout, ..newer };
        }

        if let Some(layout) = request.layout {
            session.set_layout(layout);
        }

        let result = session.render(&request.params);
        if let Err(e) = &result {
            tracing::warn!(generation = request.generation, error = %e, "Render failed");
        }

        let reply = RenderReply {
            generation: request.generation,
            result,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    tracing::debug!("Render worker stopped");
}
