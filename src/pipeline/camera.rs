//! Camera capture: a Nokhwa stream feeding RGBA frames into the scanner's
//! frame channel until stopped.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use anyhow::{anyhow, Result};
use crossbeam_channel::Sender;
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, CameraInfo, FrameFormat, RequestedFormat, RequestedFormatType},
    Camera,
};
use rayon::prelude::*;

use crate::types::Frame;

// Formats most capture drivers actually deliver; Nokhwa sometimes reports
// formats the device then rejects.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::MJPEG,
    FrameFormat::NV12,
    FrameFormat::RAWRGB,
];

fn requested_formats() -> [RequestedFormat<'static>; 3] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

#[derive(Clone, Debug)]
pub struct CameraDevice {
    pub index: CameraIndex,
    pub label: String,
}

/// A running capture thread. Dropping or stopping it halts frame delivery
/// and releases the device; this is the "stop all media tracks" half of
/// scanner teardown.
#[derive(Debug)]
pub struct CameraStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CameraStream {
    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.halt();
    }
}

pub fn available_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().clone(),
            label: device_label(&info),
        })
        .collect())
}

fn device_label(info: &CameraInfo) -> String {
    info.human_name()
}

fn open_camera(index: CameraIndex) -> Result<Camera> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err.into()),
            },
            Err(err) => last_err = Some(err.into()),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("no supported camera format")))
}

pub fn start_camera_stream(index: CameraIndex, frame_tx: Sender<Frame>) -> Result<CameraStream> {
    // Fail fast before spawning the capture thread.
    open_camera(index.clone())?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::spawn(move || {
        let mut camera = match open_camera(index) {
            Ok(camera) => camera,
            Err(err) => {
                log::error!("failed to open camera: {err:?}");
                return;
            }
        };

        while !stop_flag.load(Ordering::Relaxed) {
            let raw = match camera.frame() {
                Ok(raw) => raw,
                Err(err) => {
                    log::warn!("camera frame read failed: {err:?}");
                    continue;
                }
            };

            let decoded = match raw.decode_image::<RgbFormat>() {
                Ok(img) => img,
                Err(err) => {
                    log::warn!("failed to decode camera frame: {err:?}");
                    continue;
                }
            };

            let (width, height) = decoded.dimensions();
            let rgb = decoded.into_raw();
            if rgb.is_empty() {
                continue;
            }

            // The detector seam and overlay drawing both want RGBA.
            let mut rgba = vec![0u8; rgb.len() / 3 * 4];
            rgba.par_chunks_mut(4)
                .zip(rgb.par_chunks_exact(3))
                .for_each(|(dst, src)| {
                    dst[0] = src[0];
                    dst[1] = src[1];
                    dst[2] = src[2];
                    dst[3] = 255;
                });

            let frame = Frame {
                rgba,
                width,
                height,
                timestamp: Instant::now(),
            };

            // Drop the frame if the worker is still busy with the last one.
            let _ = frame_tx.try_send(frame);
        }
    });

    Ok(CameraStream {
        stop,
        handle: Some(handle),
    })
}
