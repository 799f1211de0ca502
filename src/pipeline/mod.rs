//! The recognition loop: frames in, throttled letter predictions out.
//!
//! One worker thread drains the frame channel to the newest frame, runs the
//! external landmark detector, picks the feature path for the mode in
//! effect, scores, decodes, and publishes a [`ScannerUpdate`] with
//! `try_send` so a slow sink never stalls detection.

#[cfg(feature = "camera-nokhwa")]
pub mod camera;
pub mod skeleton;

use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc,
};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;

use crate::decoder::decode;
use crate::features::{compose_two_hand_features, extract_distances};
use crate::scorer::ScorerSet;
use crate::types::{Frame, FrameObservation, ModelMode, PredictionLabel, ScannerUpdate};

/// How long the worker waits on the frame channel before rechecking the
/// stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default minimum gap between classification attempts. Landmark results
/// can arrive at display rate; scoring them all is wasted work and makes
/// the label flicker.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(300);

/// The seam to the external hand-landmark detector. One instance is owned
/// by the controller, constructed lazily on first start and reused across
/// sessions until [`ScannerController::release`].
pub trait HandDetector: Send + 'static {
    fn detect(&mut self, frame: &Frame) -> anyhow::Result<FrameObservation>;

    /// Release detector-held resources. Called once, at controller release.
    fn close(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Active,
    Switching,
}

#[derive(Clone, Copy, Debug)]
pub struct ScannerConfig {
    pub initial_mode: ModelMode,
    /// Minimum wall-clock gap between successive classification attempts.
    /// Deployed surfaces use 150-600 ms.
    pub throttle: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            initial_mode: ModelMode::Sibi,
            throttle: DEFAULT_THROTTLE,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("scanner is already active")]
    AlreadyActive,

    /// The landmark detector could not be constructed. The controller stays
    /// idle; the caller decides whether to re-trigger start.
    #[error("failed to acquire landmark detector: {0}")]
    DetectorAcquisition(#[source] anyhow::Error),

    #[cfg(feature = "camera-nokhwa")]
    #[error("failed to open camera: {0}")]
    CameraAcquisition(#[source] anyhow::Error),
}

/// Mode indirection shared with the frame worker. The worker loads the mode
/// once per frame, so a toggle takes effect on the next frame and an
/// in-flight frame finishes with the feature width it started with.
#[derive(Clone)]
struct ModeCell(Arc<AtomicU8>);

impl ModeCell {
    fn new(mode: ModelMode) -> Self {
        Self(Arc::new(AtomicU8::new(encode_mode(mode))))
    }

    fn load(&self) -> ModelMode {
        decode_mode(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, mode: ModelMode) {
        self.0.store(encode_mode(mode), Ordering::Relaxed);
    }
}

fn encode_mode(mode: ModelMode) -> u8 {
    match mode {
        ModelMode::Sibi => 0,
        ModelMode::Bisindo => 1,
    }
}

fn decode_mode(raw: u8) -> ModelMode {
    if raw == 0 {
        ModelMode::Sibi
    } else {
        ModelMode::Bisindo
    }
}

/// What the worker hands back when a session ends, so the next session can
/// reuse the detector and the loaded classifiers.
struct IdleResources {
    detector: Option<Box<dyn HandDetector>>,
    scorers: ScorerSet,
}

struct ScannerSession {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<IdleResources>>,
    #[cfg(feature = "camera-nokhwa")]
    camera: Option<camera::CameraStream>,
}

/// Owns the recognition lifecycle: `Idle` until an explicit start, `Active`
/// while the frame worker runs, transiently `Switching` on a mode toggle.
pub struct ScannerController {
    config: ScannerConfig,
    mode: ModeCell,
    state: ScannerState,
    detector_factory: Box<dyn FnMut() -> anyhow::Result<Box<dyn HandDetector>>>,
    resources: Option<IdleResources>,
    session: Option<ScannerSession>,
}

impl ScannerController {
    pub fn new<F>(scorers: ScorerSet, detector_factory: F, config: ScannerConfig) -> Self
    where
        F: FnMut() -> anyhow::Result<Box<dyn HandDetector>> + 'static,
    {
        Self {
            mode: ModeCell::new(config.initial_mode),
            config,
            state: ScannerState::Idle,
            detector_factory: Box::new(detector_factory),
            resources: Some(IdleResources {
                detector: None,
                scorers,
            }),
            session: None,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn mode(&self) -> ModelMode {
        self.mode.load()
    }

    /// Switches the alphabet standard. While active this passes through
    /// `Switching`: the new mode is published through the mode cell and
    /// picked up at the next frame boundary, so no frame mixes feature
    /// widths.
    pub fn set_mode(&mut self, mode: ModelMode) {
        if self.mode.load() == mode {
            return;
        }
        if self.state == ScannerState::Active {
            self.state = ScannerState::Switching;
            self.mode.store(mode);
            self.state = ScannerState::Active;
        } else {
            self.mode.store(mode);
        }
        log::info!("model mode switched to {}", mode.label());
    }

    /// Starts the recognition loop over an externally supplied frame
    /// stream. On failure the controller stays `Idle` and never retries on
    /// its own.
    pub fn start(
        &mut self,
        frame_rx: Receiver<Frame>,
        update_tx: Sender<ScannerUpdate>,
    ) -> Result<(), StartError> {
        let mut resources = self.resources.take().ok_or(StartError::AlreadyActive)?;

        // Lazily construct the detector singleton; sessions after the first
        // reuse the recovered instance.
        let detector = match resources.detector.take() {
            Some(detector) => detector,
            None => match (self.detector_factory)() {
                Ok(detector) => detector,
                Err(err) => {
                    self.resources = Some(resources);
                    return Err(StartError::DetectorAcquisition(err));
                }
            },
        };

        let stop = Arc::new(AtomicBool::new(false));
        let worker = FrameWorker {
            detector,
            scorers: resources.scorers,
            mode: self.mode.clone(),
            throttle: self.config.throttle,
            stop: stop.clone(),
        };
        let handle = thread::spawn(move || worker.run(frame_rx, update_tx));

        self.session = Some(ScannerSession {
            stop,
            handle: Some(handle),
            #[cfg(feature = "camera-nokhwa")]
            camera: None,
        });
        self.state = ScannerState::Active;
        log::info!("scanner active in {} mode", self.mode.load().label());
        Ok(())
    }

    /// Starts the loop with an owned camera capture thread as the frame
    /// source; stopping the scanner then also stops the media stream.
    #[cfg(feature = "camera-nokhwa")]
    pub fn start_with_camera(
        &mut self,
        index: nokhwa::utils::CameraIndex,
        update_tx: Sender<ScannerUpdate>,
    ) -> Result<(), StartError> {
        if self.session.is_some() {
            return Err(StartError::AlreadyActive);
        }

        let (frame_tx, frame_rx) = crossbeam_channel::bounded(1);
        let stream = camera::start_camera_stream(index, frame_tx)
            .map_err(StartError::CameraAcquisition)?;

        if let Err(err) = self.start(frame_rx, update_tx) {
            stream.stop();
            return Err(err);
        }
        if let Some(session) = self.session.as_mut() {
            session.camera = Some(stream);
        }
        Ok(())
    }

    /// Stops detection: media capture first, then the worker, recovering
    /// the detector and classifiers for the next session. Idempotent.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };

        #[cfg(feature = "camera-nokhwa")]
        if let Some(stream) = session.camera.take() {
            stream.stop();
        }

        session.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = session.handle.take() {
            match handle.join() {
                Ok(resources) => self.resources = Some(resources),
                Err(_) => {
                    log::error!("frame worker panicked; detector and classifiers were lost");
                    self.resources = Some(IdleResources {
                        detector: None,
                        scorers: ScorerSet::new(),
                    });
                }
            }
        }

        self.state = ScannerState::Idle;
        log::info!("scanner stopped");
    }

    /// Stops the loop and closes the cached detector instance. The next
    /// start constructs a fresh one.
    pub fn release(&mut self) {
        self.stop();
        if let Some(resources) = self.resources.as_mut() {
            if let Some(mut detector) = resources.detector.take() {
                detector.close();
            }
        }
    }
}

impl Drop for ScannerController {
    fn drop(&mut self) {
        self.release();
    }
}

struct FrameWorker {
    detector: Box<dyn HandDetector>,
    scorers: ScorerSet,
    mode: ModeCell,
    throttle: Duration,
    stop: Arc<AtomicBool>,
}

impl FrameWorker {
    fn run(
        mut self,
        frame_rx: Receiver<Frame>,
        update_tx: Sender<ScannerUpdate>,
    ) -> IdleResources {
        let mut last_attempt: Option<Instant> = None;

        while let Some(frame) = self.recv_latest_frame(&frame_rx) {
            let observation = match self.detector.detect(&frame) {
                Ok(observation) => observation,
                Err(err) => {
                    log::warn!("landmark detection failed: {err:?}");
                    continue;
                }
            };

            // One mode load per frame; a toggle applies from the next one.
            let mode = self.mode.load();
            let now = Instant::now();
            let due = last_attempt.is_none_or(|at| now.duration_since(at) >= self.throttle);

            let label = if due {
                last_attempt = Some(now);
                self.classify(&observation, mode)
            } else {
                // Throttled: keep the overlay flowing, no label update.
                None
            };

            let overlay = observation
                .hands
                .iter()
                .map(|hand| hand.landmarks.clone())
                .collect();
            let _ = update_tx.try_send(ScannerUpdate {
                label,
                mode,
                overlay,
                timestamp: frame.timestamp,
            });
        }

        IdleResources {
            detector: Some(self.detector),
            scorers: self.scorers,
        }
    }

    /// Blocks for the next frame, then drains the channel so a backlog
    /// never builds up; only the newest frame is worth scoring.
    fn recv_latest_frame(&self, frame_rx: &Receiver<Frame>) -> Option<Frame> {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return None;
            }
            match frame_rx.recv_timeout(STOP_POLL_INTERVAL) {
                Ok(mut frame) => {
                    while let Ok(newer) = frame_rx.try_recv() {
                        frame = newer;
                    }
                    return Some(frame);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// An absent hand publishes the sentinel rather than freezing the last
    /// letter; a scoring failure publishes nothing, leaving the previous
    /// label on screen until the next successful frame.
    fn classify(
        &mut self,
        observation: &FrameObservation,
        mode: ModelMode,
    ) -> Option<PredictionLabel> {
        if !observation.has_hands() {
            return Some(PredictionLabel::NoHand);
        }

        let features = match mode {
            ModelMode::Sibi => extract_distances(&observation.hands[0].landmarks),
            ModelMode::Bisindo => compose_two_hand_features(&observation.hands),
        };

        match self.scorers.score(mode, &features) {
            Ok(scores) => Some(decode(&scores, mode)),
            Err(err) => {
                log::warn!("scoring skipped for this frame: {err}");
                None
            }
        }
    }
}
