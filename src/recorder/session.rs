//! Session recorder
//!
//! Orchestrates one recording session: receives raw frame and tracking
//! callbacks, drives the video stream writer and the depth-mask worker,
//! accumulates the per-stream ledgers and pose frames, and on finish
//! serializes the sidecars and produces one or more size-bounded archives.

use super::state::{DeviceInfo, Orientation, RecorderConfig, RecordingState};
use super::video::VideoStreamWriter;
use super::worker::MaskWorker;
use crate::archive;
use crate::capture::{CapturedFrame, JointIndex, TrackedBody, VideoMuxer, WallCalibration};
use crate::mask::DepthMaskProcessor;
use crate::project::schema::{
    DepthMaskParameters, FrameTimestamp, JointPosition, PoseFrame, SessionMetadata,
    SkeletonRecording, StreamTimestamps,
};
use crate::project::sidecars::{
    self, DEPTH_MASK_FILE_NAME, RAW_SUBDIR, SKELETON_SUBDIR, VIDEO_FILE_NAME,
};
use crate::utils::error::{RecorderError, RecorderResult};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// All state owned by one active session, released when the session ends.
struct ActiveSession {
    name: String,
    folder: PathBuf,
    raw_dir: PathBuf,
    skeleton_dir: PathBuf,
    video_path: PathBuf,
    video_fps: u32,

    started_at: Instant,
    start_timestamp: Option<f64>,
    last_mask_timestamp: f64,

    video_ledger: Vec<FrameTimestamp>,
    video_frame_index: u64,
    pose_frames: Vec<PoseFrame>,
    pose_frame_index: u64,

    mask_worker: Option<MaskWorker>,
    metadata: SessionMetadata,
}

/// Records one session at a time from sensor callbacks to archives.
///
/// Frame and pose callbacks are cheap and never block; depth-mask work runs
/// on a background worker that is drained before finalization. Must be used
/// within a tokio runtime.
pub struct SessionRecorder {
    state: Arc<RwLock<RecordingState>>,
    config: RecorderConfig,
    device: DeviceInfo,
    orientation: Orientation,
    calibration: Option<WallCalibration>,
    output_root: PathBuf,
    video: VideoStreamWriter,
    session: Option<ActiveSession>,
}

impl SessionRecorder {
    pub fn new(
        output_root: impl Into<PathBuf>,
        config: RecorderConfig,
        device: DeviceInfo,
        muxer: Arc<dyn VideoMuxer>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(RecordingState::Idle)),
            config,
            device,
            orientation: Orientation::default(),
            calibration: None,
            output_root: output_root.into(),
            video: VideoStreamWriter::new(muxer),
            session: None,
        }
    }

    /// Record wall coordinates relative to a calibrated origin. Without
    /// calibration, wall joints equal world joints.
    pub fn with_calibration(mut self, calibration: WallCalibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Current recorder state.
    pub fn state(&self) -> RecordingState {
        *self.state.read()
    }

    /// Update the device orientation label. The value current at finish
    /// time is the one persisted in metadata.
    pub fn update_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    /// Set up a fresh session: output folder, stream sub-paths, mask
    /// pipeline, and immutable metadata.
    ///
    /// Fails without leaving a partial session behind.
    pub fn prepare_recording(
        &mut self,
        camera_resolution: (u32, u32),
        video_fps: u32,
        depth_available: bool,
    ) -> RecorderResult<()> {
        if *self.state.read() != RecordingState::Idle {
            return Err(RecorderError::AlreadyRecording);
        }
        *self.state.write() = RecordingState::Preparing;

        match self.prepare_session(camera_resolution, video_fps, depth_available) {
            Ok(session) => {
                tracing::info!(name = %session.name, folder = %session.folder.display(), "recording prepared");
                self.session = Some(session);
                *self.state.write() = RecordingState::Recording;
                Ok(())
            }
            Err(err) => {
                *self.state.write() = RecordingState::Idle;
                Err(err)
            }
        }
    }

    fn prepare_session(
        &self,
        camera_resolution: (u32, u32),
        video_fps: u32,
        depth_available: bool,
    ) -> RecorderResult<ActiveSession> {
        fs::create_dir_all(&self.output_root)?;

        let mode = self.config.mode.as_deref();
        let index = next_recording_index(&self.output_root, mode);
        let name = recording_name(mode, index);

        let folder = self.output_root.join(&name);
        let _ = fs::remove_dir_all(&folder);
        let raw_dir = folder.join(RAW_SUBDIR);
        let skeleton_dir = folder.join(SKELETON_SUBDIR);
        fs::create_dir_all(&raw_dir)?;
        fs::create_dir_all(&skeleton_dir)?;

        let mask_file = match File::create(raw_dir.join(DEPTH_MASK_FILE_NAME)) {
            Ok(file) => file,
            Err(err) => {
                let _ = fs::remove_dir_all(&folder);
                return Err(err.into());
            }
        };

        let processor = DepthMaskProcessor::new(
            self.config.mask_width,
            self.config.mask_height,
            self.config.percentile,
            self.config.delta_meters,
        );
        let metadata = SessionMetadata {
            device_model: self.device.model.clone(),
            os_version: self.device.os_version.clone(),
            camera_resolution: format!("{}x{}", camera_resolution.0, camera_resolution.1),
            video_fps,
            depth_mask_fps: self.config.depth_mask_fps,
            depth_mask_encoding: processor.encoding_name().to_string(),
            orientation: self.orientation.label().to_string(),
            depth_available,
            depth_mask_parameters: DepthMaskParameters {
                percentile: self.config.percentile as f64,
                delta_meters: self.config.delta_meters as f64,
                width: self.config.mask_width,
                height: self.config.mask_height,
            },
        };
        let mask_worker = MaskWorker::spawn(processor, mask_file);

        Ok(ActiveSession {
            video_path: raw_dir.join(VIDEO_FILE_NAME),
            name,
            folder,
            raw_dir,
            skeleton_dir,
            video_fps,
            started_at: Instant::now(),
            start_timestamp: None,
            last_mask_timestamp: f64::NEG_INFINITY,
            video_ledger: Vec::new(),
            video_frame_index: 0,
            pose_frames: Vec::new(),
            pose_frame_index: 0,
            mask_worker: Some(mask_worker),
            metadata,
        })
    }

    /// Frame channel: one call per delivered video frame.
    ///
    /// The first frame establishes the session start timestamp and lazily
    /// starts the video stream writer. Accepted frames get a ledger entry;
    /// dropped ones are retried implicitly on the next callback. Depth
    /// masks are extracted at most once per configured interval.
    pub fn process_frame(&mut self, frame: &CapturedFrame) {
        if *self.state.read() != RecordingState::Recording {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let start = *session.start_timestamp.get_or_insert(frame.timestamp);
        let relative = (frame.timestamp - start).max(0.0);

        if !self.video.is_recording() {
            if let Err(err) = self.video.start(
                &frame.image,
                &session.video_path,
                session.video_fps,
                self.config.video_bit_rate,
            ) {
                tracing::error!("video start failed: {err}");
                return;
            }
        }

        if self.video.append(&frame.image, relative) {
            session.video_ledger.push(FrameTimestamp {
                index: session.video_frame_index,
                timestamp: relative,
            });
            session.video_frame_index += 1;
        }

        if relative - session.last_mask_timestamp < self.config.depth_mask_interval() {
            return;
        }
        let Some(depth) = frame.depth.as_ref() else {
            return;
        };
        session.last_mask_timestamp = relative;

        if let Some(worker) = &session.mask_worker {
            worker.submit(depth.clone(), relative);
        }
    }

    /// Pose channel: one call per tracking update.
    ///
    /// Records one pose frame per tracked body, projecting model-space
    /// joint transforms into world space through the body root transform.
    /// Unrecognized joint names are dropped; bodies resolving no joints
    /// are not recorded. Timestamps prefer the paired video frame's clock
    /// and fall back to wall-clock elapsed time.
    pub fn process_bodies(&mut self, bodies: &[TrackedBody], frame_timestamp: Option<f64>) {
        if *self.state.read() != RecordingState::Recording {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let relative = match (frame_timestamp, session.start_timestamp) {
            (Some(timestamp), Some(start)) => (timestamp - start).max(0.0),
            _ => session.started_at.elapsed().as_secs_f64(),
        };

        for body in bodies {
            let mut world_joints = BTreeMap::new();
            for (name, model_transform) in &body.joints {
                let Some(joint) = JointIndex::from_tracking_name(name) else {
                    continue;
                };
                let world = body.root_transform.mul(model_transform).translation();
                world_joints.insert(
                    joint.index(),
                    JointPosition { x: world[0], y: world[1], z: world[2] },
                );
            }
            if world_joints.is_empty() {
                continue;
            }

            let wall_joints = match &self.calibration {
                Some(calibration) => world_joints
                    .iter()
                    .map(|(&index, &position)| (index, calibration.to_wall(position)))
                    .collect(),
                None => world_joints.clone(),
            };

            session.pose_frames.push(PoseFrame {
                frame_index: session.pose_frame_index,
                timestamp: relative,
                world_joints,
                wall_joints,
            });
            session.pose_frame_index += 1;
        }
    }

    /// Finish the session: drain the mask pipeline, finalize the video,
    /// write the JSON sidecars, and produce the archive(s).
    ///
    /// Either way, all buffers and file handles are released and the
    /// recorder returns to idle.
    pub async fn finish_recording(&mut self) -> RecorderResult<Vec<PathBuf>> {
        if *self.state.read() != RecordingState::Recording {
            return Err(RecorderError::NotRecording);
        }
        *self.state.write() = RecordingState::Finishing;

        let result = self.finish_session().await;
        self.session = None;
        *self.state.write() = RecordingState::Idle;
        result
    }

    async fn finish_session(&mut self) -> RecorderResult<Vec<PathBuf>> {
        let Some(session) = self.session.as_mut() else {
            return Err(RecorderError::NotRecording);
        };

        // Mask work must be fully on disk before the ledgers are written.
        let depth_mask_frames = match session.mask_worker.take() {
            Some(worker) => worker.finish().await,
            None => Vec::new(),
        };

        let video_output = self.video.stop().await;
        if video_output.is_none() {
            return Err(RecorderError::VideoFinalize);
        }

        let timestamps = StreamTimestamps {
            video_frames: session.video_ledger.clone(),
            depth_mask_frames,
        };
        sidecars::write_timestamps(&session.raw_dir, &timestamps)?;

        let mut metadata = session.metadata.clone();
        metadata.orientation = self.orientation.label().to_string();
        sidecars::write_metadata(&session.raw_dir, &metadata)?;

        let skeleton = SkeletonRecording {
            created_at_unix: Utc::now().timestamp(),
            video_file_name: Some(VIDEO_FILE_NAME.to_string()),
            frames: std::mem::take(&mut session.pose_frames),
        };
        sidecars::write_skeleton(&session.skeleton_dir, &skeleton)?;

        let archives = create_size_aware_archives(
            &self.output_root,
            session,
            self.config.max_single_archive_bytes,
        )?;
        tracing::info!(
            name = %session.name,
            archives = archives.len(),
            video_frames = timestamps.video_frames.len(),
            depth_mask_frames = timestamps.depth_mask_frames.len(),
            "recording finished"
        );
        Ok(archives)
    }
}

/// Archive the session folder, splitting into raw + skeleton archives when
/// the folder exceeds the single-archive budget. Export channels reject
/// oversized single files; splitting degrades gracefully instead of failing.
fn create_size_aware_archives(
    output_root: &Path,
    session: &ActiveSession,
    max_single_archive_bytes: u64,
) -> RecorderResult<Vec<PathBuf>> {
    let total_bytes = archive::directory_size(&session.folder)?;

    if total_bytes <= max_single_archive_bytes {
        let destination = output_root.join(format!("{}_full.zip", session.name));
        let _ = fs::remove_file(&destination);
        let entries = archive::all_files(&session.folder, Some(session.name.as_str()))?;
        archive::create_archive(&destination, &entries)?;
        return Ok(vec![destination]);
    }

    tracing::info!(
        total_bytes,
        budget = max_single_archive_bytes,
        "session exceeds single-archive budget, splitting"
    );
    let raw_destination = output_root.join(format!("{}_raw.zip", session.name));
    let skeleton_destination = output_root.join(format!("{}_skeleton.zip", session.name));
    let _ = fs::remove_file(&raw_destination);
    let _ = fs::remove_file(&skeleton_destination);

    let raw_entries = archive::all_files(&session.raw_dir, Some(RAW_SUBDIR))?;
    let skeleton_entries = archive::all_files(&session.skeleton_dir, Some(SKELETON_SUBDIR))?;
    archive::create_archive(&raw_destination, &raw_entries)?;
    archive::create_archive(&skeleton_destination, &skeleton_entries)?;
    Ok(vec![raw_destination, skeleton_destination])
}

/// Session folder name for an index, e.g. `recording_003` or
/// `recording_raw_003` with a mode label.
fn recording_name(mode: Option<&str>, index: u32) -> String {
    match mode {
        Some(mode) => format!("recording_{mode}_{index:03}"),
        None => format!("recording_{index:03}"),
    }
}

/// Next unused session index under `root`, scanning existing sibling names
/// (folders and archives alike) for the highest index already taken.
fn next_recording_index(root: &Path, mode: Option<&str>) -> u32 {
    let prefix = match mode {
        Some(mode) => format!("recording_{mode}_"),
        None => "recording_".to_string(),
    };

    let mut highest = 0;
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(rest) = name.strip_prefix(prefix.as_str()) else {
                continue;
            };
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.len() != 3 {
                continue;
            }
            if let Ok(index) = digits.parse::<u32>() {
                highest = highest.max(index);
            }
        }
    }
    highest + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{DepthFrame, PixelBuffer, PixelFormat, Transform, VideoError, VideoSink};
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::tempdir;

    /// Opt-in log output for debugging tests, e.g. RUST_LOG=spatialcap=debug.
    fn init_tracing() {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::util::SubscriberInitExt;

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "spatialcap=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    }

    fn test_image() -> PixelBuffer {
        PixelBuffer { width: 1920, height: 1080, format: PixelFormat::Nv12, data: vec![0; 64] }
    }

    fn frame_at(timestamp: f64, depth: Option<DepthFrame>) -> CapturedFrame {
        CapturedFrame { image: test_image(), timestamp, depth }
    }

    fn near_far_depth() -> DepthFrame {
        DepthFrame::new(2, 2, vec![1.0, 1.0, 5.0, 5.0])
    }

    fn body_with_hips(at: [f32; 3]) -> TrackedBody {
        TrackedBody {
            root_transform: Transform::IDENTITY,
            joints: vec![
                ("hips_joint".to_string(), Transform::from_translation(at)),
                ("mystery_joint".to_string(), Transform::IDENTITY),
            ],
        }
    }

    /// Muxer that writes appended frame bytes straight to the output path.
    struct StubMuxer {
        finish_ok: bool,
    }

    struct StubSink {
        file: std::fs::File,
        output: PathBuf,
        finish_ok: bool,
    }

    impl VideoMuxer for StubMuxer {
        fn open(
            &self,
            _first: &PixelBuffer,
            output: &Path,
            _frame_rate: u32,
            _bit_rate: u32,
        ) -> Result<Box<dyn VideoSink>, VideoError> {
            Ok(Box::new(StubSink {
                file: std::fs::File::create(output)?,
                output: output.to_path_buf(),
                finish_ok: self.finish_ok,
            }))
        }
    }

    #[async_trait]
    impl VideoSink for StubSink {
        fn append(&mut self, image: &PixelBuffer, _seconds: f64) -> bool {
            self.file.write_all(&image.data).is_ok()
        }

        async fn finish(self: Box<Self>) -> Option<PathBuf> {
            self.finish_ok.then_some(self.output)
        }
    }

    fn recorder(root: &Path, config: RecorderConfig, finish_ok: bool) -> SessionRecorder {
        SessionRecorder::new(
            root,
            config,
            DeviceInfo { model: "devkit".into(), os_version: "17.0".into() },
            Arc::new(StubMuxer { finish_ok }),
        )
    }

    /// Entry names from a produced archive, via its central directory.
    fn archive_entry_names(path: &Path) -> Vec<String> {
        let bytes = fs::read(path).unwrap();
        let eocd = bytes.len() - 22;
        assert_eq!(&bytes[eocd..eocd + 4], &0x0605_4b50u32.to_le_bytes());
        let count = u16::from_le_bytes([bytes[eocd + 10], bytes[eocd + 11]]) as usize;
        let mut offset = u32::from_le_bytes([
            bytes[eocd + 16],
            bytes[eocd + 17],
            bytes[eocd + 18],
            bytes[eocd + 19],
        ]) as usize;

        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            assert_eq!(&bytes[offset..offset + 4], &0x0201_4b50u32.to_le_bytes());
            let name_len =
                u16::from_le_bytes([bytes[offset + 28], bytes[offset + 29]]) as usize;
            names.push(
                String::from_utf8(bytes[offset + 46..offset + 46 + name_len].to_vec()).unwrap(),
            );
            offset += 46 + name_len;
        }
        names
    }

    #[tokio::test]
    async fn test_end_to_end_session() {
        init_tracing();
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);

        recorder.prepare_recording((1920, 1080), 30, true).unwrap();
        assert_eq!(recorder.state(), RecordingState::Recording);

        recorder.process_frame(&frame_at(100.0, Some(near_far_depth())));
        recorder.process_frame(&frame_at(100.033, None));
        recorder.process_frame(&frame_at(100.066, None));
        recorder.process_bodies(&[body_with_hips([1.0, 2.0, 3.0])], Some(100.033));

        let archives = recorder.finish_recording().await.unwrap();
        assert_eq!(recorder.state(), RecordingState::Idle);
        assert_eq!(archives.len(), 1);
        assert!(archives[0].file_name().unwrap().to_str().unwrap().ends_with("_full.zip"));

        let session_dir = root.path().join("recording_001");
        let timestamps = sidecars::read_timestamps(&session_dir.join(RAW_SUBDIR)).unwrap();
        assert_eq!(timestamps.video_frames.len(), 3);
        let indices: Vec<u64> = timestamps.video_frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!((timestamps.video_frames[2].timestamp - 0.066).abs() < 1e-9);
        assert_eq!(timestamps.depth_mask_frames.len(), 1);
        assert_eq!(timestamps.depth_mask_frames[0].index, 0);

        let metadata = sidecars::read_metadata(&session_dir.join(RAW_SUBDIR)).unwrap();
        assert_eq!(metadata.camera_resolution, "1920x1080");
        assert_eq!(metadata.depth_mask_encoding, "grayscale8_relative_depth");
        assert!(metadata.depth_available);

        let skeleton = sidecars::read_skeleton(&session_dir.join(SKELETON_SUBDIR)).unwrap();
        assert_eq!(skeleton.frames.len(), 1);
        assert_eq!(skeleton.video_file_name.as_deref(), Some("video.mp4"));
        let joints = &skeleton.frames[0].world_joints;
        assert_eq!(joints.len(), 1, "unrecognized joints are dropped");
        assert_eq!(joints[&0], JointPosition { x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(skeleton.frames[0].wall_joints, skeleton.frames[0].world_joints);

        let mask_bytes = fs::read(session_dir.join(RAW_SUBDIR).join(DEPTH_MASK_FILE_NAME)).unwrap();
        assert_eq!(mask_bytes.len(), 160 * 120, "one fixed-size mask frame");

        let names = archive_entry_names(&archives[0]);
        assert!(names.contains(&"recording_001/raw/video.mp4".to_string()));
        assert!(names.contains(&"recording_001/raw/depth_mask.bin".to_string()));
        assert!(names.contains(&"recording_001/raw/timestamps.json".to_string()));
        assert!(names.contains(&"recording_001/raw/metadata.json".to_string()));
        assert!(names.contains(&"recording_001/skeleton/skeleton.json".to_string()));
    }

    #[tokio::test]
    async fn test_oversized_session_splits_into_raw_and_skeleton() {
        let root = tempdir().unwrap();
        let config = RecorderConfig { max_single_archive_bytes: 16, ..Default::default() };
        let mut recorder = recorder(root.path(), config, true);

        recorder.prepare_recording((1920, 1080), 30, true).unwrap();
        recorder.process_frame(&frame_at(0.0, Some(near_far_depth())));
        recorder.process_bodies(&[body_with_hips([0.0, 1.0, 0.0])], Some(0.0));

        let archives = recorder.finish_recording().await.unwrap();
        assert_eq!(archives.len(), 2);
        let file_names: Vec<&str> =
            archives.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(file_names, vec!["recording_001_raw.zip", "recording_001_skeleton.zip"]);

        let raw_names = archive_entry_names(&archives[0]);
        assert!(raw_names.iter().all(|name| name.starts_with("raw/")));
        assert!(raw_names.contains(&"raw/video.mp4".to_string()));

        let skeleton_names = archive_entry_names(&archives[1]);
        assert_eq!(skeleton_names, vec!["skeleton/skeleton.json".to_string()]);
    }

    #[tokio::test]
    async fn test_depth_mask_interval_gates_extraction() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        recorder.prepare_recording((1920, 1080), 60, true).unwrap();

        // 60 fps frames all carrying depth; at 10 mask fps only every sixth
        // depth frame may be accepted.
        for i in 0..30 {
            let timestamp = i as f64 / 60.0;
            recorder.process_frame(&frame_at(timestamp, Some(near_far_depth())));
        }

        let _ = recorder.finish_recording().await.unwrap();
        let timestamps =
            sidecars::read_timestamps(&root.path().join("recording_001").join(RAW_SUBDIR)).unwrap();
        assert_eq!(timestamps.video_frames.len(), 30);
        assert_eq!(timestamps.depth_mask_frames.len(), 5);
        for pair in timestamps.depth_mask_frames.windows(2) {
            assert!(pair[1].timestamp - pair[0].timestamp >= 0.1 - 1e-9);
        }
    }

    #[tokio::test]
    async fn test_failed_video_finalization_fails_the_session() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), false);

        recorder.prepare_recording((1920, 1080), 30, false).unwrap();
        recorder.process_frame(&frame_at(0.0, None));

        let err = recorder.finish_recording().await.unwrap_err();
        assert!(matches!(err, RecorderError::VideoFinalize));
        assert_eq!(recorder.state(), RecordingState::Idle, "handles released, back to idle");
        assert!(
            !root.path().join("recording_001_full.zip").exists(),
            "no archive on failed finalization"
        );
    }

    #[tokio::test]
    async fn test_prepare_rejects_concurrent_sessions() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);

        recorder.prepare_recording((1920, 1080), 30, false).unwrap();
        let err = recorder.prepare_recording((1920, 1080), 30, false).unwrap_err();
        assert!(matches!(err, RecorderError::AlreadyRecording));
    }

    #[tokio::test]
    async fn test_finish_without_session_errors() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        let err = recorder.finish_recording().await.unwrap_err();
        assert!(matches!(err, RecorderError::NotRecording));
    }

    #[tokio::test]
    async fn test_session_names_skip_used_indices() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("recording_001")).unwrap();
        fs::write(root.path().join("recording_002_full.zip"), b"").unwrap();

        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();
        assert!(root.path().join("recording_003").is_dir());
    }

    #[tokio::test]
    async fn test_mode_label_in_session_name() {
        let root = tempdir().unwrap();
        let config =
            RecorderConfig { mode: Some("raw".to_string()), ..Default::default() };
        let mut recorder = recorder(root.path(), config, true);
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();
        assert!(root.path().join("recording_raw_001").is_dir());
    }

    #[tokio::test]
    async fn test_pose_frames_fall_back_to_wall_clock() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();

        // No video frame yet, so there is no session start timestamp.
        recorder.process_bodies(&[body_with_hips([0.0, 0.0, 0.0])], None);
        recorder.process_frame(&frame_at(50.0, None));

        let _ = recorder.finish_recording().await.unwrap();
        let skeleton = sidecars::read_skeleton(
            &root.path().join("recording_001").join(SKELETON_SUBDIR),
        )
        .unwrap();
        assert_eq!(skeleton.frames.len(), 1);
        assert!(skeleton.frames[0].timestamp >= 0.0);
    }

    #[tokio::test]
    async fn test_bodies_without_resolved_joints_are_not_recorded() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();

        recorder.process_frame(&frame_at(0.0, None));
        let unresolvable = TrackedBody {
            root_transform: Transform::IDENTITY,
            joints: vec![("mystery_joint".to_string(), Transform::IDENTITY)],
        };
        recorder.process_bodies(&[unresolvable], Some(0.0));

        let _ = recorder.finish_recording().await.unwrap();
        let skeleton = sidecars::read_skeleton(
            &root.path().join("recording_001").join(SKELETON_SUBDIR),
        )
        .unwrap();
        assert!(skeleton.frames.is_empty());
    }

    #[tokio::test]
    async fn test_wall_calibration_offsets_wall_joints() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true)
            .with_calibration(WallCalibration { origin: [1.0, 0.0, -2.0] });
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();

        recorder.process_frame(&frame_at(0.0, None));
        recorder.process_bodies(&[body_with_hips([1.5, 1.0, 0.0])], Some(0.0));

        let _ = recorder.finish_recording().await.unwrap();
        let skeleton = sidecars::read_skeleton(
            &root.path().join("recording_001").join(SKELETON_SUBDIR),
        )
        .unwrap();
        let frame = &skeleton.frames[0];
        assert_eq!(frame.world_joints[&0], JointPosition { x: 1.5, y: 1.0, z: 0.0 });
        assert_eq!(frame.wall_joints[&0], JointPosition { x: 0.5, y: 1.0, z: 2.0 });
    }

    #[tokio::test]
    async fn test_orientation_refreshed_at_finish() {
        let root = tempdir().unwrap();
        let mut recorder = recorder(root.path(), RecorderConfig::default(), true);
        recorder.update_orientation(Orientation::Portrait);
        recorder.prepare_recording((1920, 1080), 30, false).unwrap();

        recorder.process_frame(&frame_at(0.0, None));
        recorder.update_orientation(Orientation::LandscapeLeft);

        let _ = recorder.finish_recording().await.unwrap();
        let metadata =
            sidecars::read_metadata(&root.path().join("recording_001").join(RAW_SUBDIR)).unwrap();
        assert_eq!(metadata.orientation, "landscapeLeft");
    }

    #[test]
    fn test_recording_names() {
        assert_eq!(recording_name(None, 7), "recording_007");
        assert_eq!(recording_name(Some("raw"), 12), "recording_raw_012");
    }
}
