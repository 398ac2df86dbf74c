//! Background depth-mask worker
//!
//! Depth-to-mask conversion is CPU-heavy and must not stall the frame
//! delivery path. The session recorder hands owned depth copies to this
//! worker over a channel; the worker converts them in submission order,
//! appends the mask bytes to the session's mask file, and keeps the
//! depth-mask ledger. Closing the channel drains remaining work, closes the
//! file, and hands the ledger back.

use crate::capture::DepthFrame;
use crate::mask::DepthMaskProcessor;
use crate::project::FrameTimestamp;
use std::fs::File;
use std::io::Write;
use std::sync::mpsc;
use tokio::task::JoinHandle;

struct MaskJob {
    depth: DepthFrame,
    timestamp: f64,
}

/// Handle to one session's mask pipeline.
pub(crate) struct MaskWorker {
    tx: Option<mpsc::Sender<MaskJob>>,
    handle: JoinHandle<Vec<FrameTimestamp>>,
}

impl MaskWorker {
    /// Spawn the pipeline for one session. `file` is the session's open
    /// `depth_mask.bin` handle; the worker owns it until [`Self::finish`].
    pub fn spawn(processor: DepthMaskProcessor, file: File) -> Self {
        let (tx, rx) = mpsc::channel::<MaskJob>();
        let handle = tokio::task::spawn_blocking(move || run(processor, file, rx));
        Self { tx: Some(tx), handle }
    }

    /// Queue one depth frame for conversion. Never blocks the caller.
    pub fn submit(&self, depth: DepthFrame, timestamp: f64) {
        let Some(tx) = &self.tx else { return };
        if tx.send(MaskJob { depth, timestamp }).is_err() {
            tracing::warn!("mask worker is gone; depth frame dropped");
        }
    }

    /// Drain all queued work, close the mask file, and return the ledger.
    pub async fn finish(mut self) -> Vec<FrameTimestamp> {
        self.tx.take();
        match self.handle.await {
            Ok(ledger) => ledger,
            Err(err) => {
                tracing::error!("mask worker failed: {err}");
                Vec::new()
            }
        }
    }
}

fn run(
    processor: DepthMaskProcessor,
    mut file: File,
    rx: mpsc::Receiver<MaskJob>,
) -> Vec<FrameTimestamp> {
    let mut ledger = Vec::new();
    let mut index = 0u64;

    while let Ok(job) = rx.recv() {
        let Some(mask) = processor.make_mask(&job.depth) else {
            tracing::debug!(timestamp = job.timestamp, "depth frame produced no mask");
            continue;
        };
        match file.write_all(&mask) {
            Ok(()) => {
                ledger.push(FrameTimestamp { index, timestamp: job.timestamp });
                index += 1;
            }
            Err(err) => tracing::warn!("depth mask write failed: {err}"),
        }
    }

    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_masks_written_in_order_with_ledger() {
        let dir = tempdir().unwrap();
        let mask_path = dir.path().join("depth_mask.bin");
        let file = File::create(&mask_path).unwrap();

        let processor = DepthMaskProcessor::new(4, 4, 0.15, 0.3);
        let worker = MaskWorker::spawn(processor, file);

        worker.submit(DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0]), 0.0);
        worker.submit(DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0]), 0.1);

        let ledger = worker.finish().await;
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].index, 0);
        assert_eq!(ledger[1].index, 1);
        assert_eq!(ledger[1].timestamp, 0.1);

        let written = std::fs::read(&mask_path).unwrap();
        assert_eq!(written.len(), 2 * 4 * 4, "two fixed-size mask frames");
    }

    #[tokio::test]
    async fn test_unusable_depth_frames_get_no_ledger_entry() {
        let dir = tempdir().unwrap();
        let file = File::create(dir.path().join("depth_mask.bin")).unwrap();

        let worker = MaskWorker::spawn(DepthMaskProcessor::new(4, 4, 0.15, 0.3), file);
        worker.submit(DepthFrame::new(2, 2, vec![f32::NAN; 4]), 0.0);
        worker.submit(DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0]), 0.1);

        let ledger = worker.finish().await;
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].index, 0, "skipped frames do not consume indices");
        assert_eq!(ledger[0].timestamp, 0.1);
    }
}
