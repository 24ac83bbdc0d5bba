//! Frame sources

use std::time::Instant;
use tracing::{debug, info};

use crate::{CameraConfig, CameraError, VideoFrame};

/// A capture backend the monitoring loop pulls frames from
pub trait FrameSource: Send {
    /// Read the next frame.
    ///
    /// Transient failures (`CameraError::is_transient`) mean "no frame this
    /// iteration"; `EndOfStream` means the source is exhausted.
    fn read(&mut self) -> Result<VideoFrame, CameraError>;

    /// Release the underlying device. Further reads fail with `NotInitialized`.
    fn release(&mut self);
}

/// Cabin camera stand-in producing a moving test pattern at the configured
/// resolution. Used when landmarks are replayed from a recorded trace.
pub struct SyntheticCamera {
    config: CameraConfig,
    sequence: u32,
    started: Instant,
    released: bool,
}

impl SyntheticCamera {
    /// Open the camera
    pub fn open(config: CameraConfig) -> Result<Self, CameraError> {
        if config.width == 0 || config.height == 0 {
            return Err(CameraError::Open(format!(
                "invalid resolution {}x{} for {}",
                config.width, config.height, config.device
            )));
        }
        if config.fps == 0 {
            return Err(CameraError::Open(format!("fps must be > 0 for {}", config.device)));
        }

        info!(
            "Opened synthetic camera {} ({}x{} @ {}fps)",
            config.device, config.width, config.height, config.fps
        );

        Ok(Self {
            config,
            sequence: 0,
            started: Instant::now(),
            released: false,
        })
    }

    /// Number of frames produced so far
    pub fn frames_read(&self) -> u32 {
        self.sequence
    }

    fn pattern(&self) -> Vec<u8> {
        let (w, h) = (self.config.width, self.config.height);
        let shift = self.sequence;
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = (x.wrapping_add(y).wrapping_add(shift) & 0xFF) as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        data
    }
}

impl FrameSource for SyntheticCamera {
    fn read(&mut self) -> Result<VideoFrame, CameraError> {
        if self.released {
            return Err(CameraError::NotInitialized);
        }
        if let Some(max) = self.config.max_frames {
            if self.sequence as u64 >= max {
                return Err(CameraError::EndOfStream);
            }
        }

        let frame = VideoFrame::new(
            self.pattern(),
            self.config.width,
            self.config.height,
            self.started.elapsed().as_nanos() as u64,
            self.sequence,
        );
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }

    fn release(&mut self) {
        if !self.released {
            debug!("Releasing camera {}", self.config.device);
            self.released = true;
        }
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.release();
    }
}
