//! Throttled frame pipeline: one worker thread between frame acquisition and
//! the presentation side.
//!
//! Frames are pushed into a channel and the worker drains it down to the
//! newest entry before each pass (latest-frame-wins), so a slow pass never
//! builds an unbounded backlog. A minimum interval between passes throttles
//! detection independently of the frame rate; frames landing inside the
//! interval produce no result and the caller keeps its previous overlay.

use super::detector::Detector;
use crate::bbox::BBox;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// One raw frame handed to the pipeline
pub struct Frame {
    pub seq: u64,
    pub image: image::DynamicImage,
}

/// Detections for one processed frame
#[derive(Debug, Clone)]
pub struct FrameDetections {
    pub seq: u64,
    pub detections: Vec<BBox>,
}

/// Handle to the background detection worker.
///
/// Only one pass runs at a time. Dropping the handle (or calling `shutdown`)
/// closes the frame channel and joins the worker; an in-flight pass finishes,
/// no new work is scheduled.
pub struct DetectionPipeline {
    frame_tx: Option<Sender<Frame>>,
    result_rx: Mutex<Receiver<FrameDetections>>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionPipeline {
    /// Spawn the worker thread against a shared detector
    pub fn spawn(detector: Arc<Detector>, interval: Duration) -> Self {
        let (frame_tx, frame_rx) = mpsc::channel::<Frame>();
        let (result_tx, result_rx) = mpsc::channel::<FrameDetections>();

        let handle = thread::spawn(move || {
            run_worker(detector, frame_rx, result_tx, interval);
        });

        Self {
            frame_tx: Some(frame_tx),
            result_rx: Mutex::new(result_rx),
            handle: Some(handle),
        }
    }

    /// Queue a frame for detection. Returns false once the worker is gone.
    pub fn submit(&self, frame: Frame) -> bool {
        self.frame_tx
            .as_ref()
            .is_some_and(|tx| tx.send(frame).is_ok())
    }

    /// Take the next finished result, if any, without blocking
    pub fn try_recv(&self) -> Option<FrameDetections> {
        self.result_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_recv()
            .ok()
    }

    /// Block up to `timeout` for the next finished result
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FrameDetections> {
        self.result_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(timeout)
            .ok()
    }

    /// Stop scheduling work and wait for the worker to exit
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Closing the sender wakes the worker out of recv().
        drop(self.frame_tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DetectionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    detector: Arc<Detector>,
    frame_rx: Receiver<Frame>,
    result_tx: Sender<FrameDetections>,
    interval: Duration,
) {
    debug!("detection worker started");
    let mut last_pass: Option<Instant> = None;

    while let Ok(first) = frame_rx.recv() {
        // Drain the backlog so a slow pass always works on the newest frame.
        let mut latest = first;
        loop {
            match frame_rx.try_recv() {
                Ok(newer) => latest = newer,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if last_pass.is_some_and(|t| t.elapsed() < interval) {
            trace!(seq = latest.seq, "frame inside throttle interval, skipping");
            continue;
        }
        last_pass = Some(Instant::now());

        let detections = detector.detect_image(&latest.image);
        trace!(seq = latest.seq, hits = detections.len(), "pass complete");
        if result_tx
            .send(FrameDetections {
                seq: latest.seq,
                detections,
            })
            .is_err()
        {
            break;
        }
    }
    debug!("detection worker stopped");
}
