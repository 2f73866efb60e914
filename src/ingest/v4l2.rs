#![cfg(feature = "ingest-v4l2")]

//! V4L2 device capture.
//!
//! Captures RGB24 frames from a local device node. A capture error is
//! surfaced to the caller; the watch loop treats it as fatal and does not
//! reconnect.

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use crate::frame::RawFrame;
use crate::ingest::CameraConfig;

pub(crate) struct V4l2Camera {
    state: DeviceState,
    active_width: u32,
    active_height: u32,
    frame_count: u64,
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl V4l2Camera {
    pub(crate) fn open(config: CameraConfig) -> Result<Self> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device = v4l::Device::with_path(&config.url)
            .with_context(|| format!("open v4l2 device {}", config.url))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = config.width;
        format.height = config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!("V4l2Camera: failed to set format on {}: {}", config.url, err);
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };

        let state = DeviceStateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;

        log::info!(
            "CameraSource: connected to {} ({}x{})",
            config.url,
            format.width,
            format.height
        );

        Ok(Self {
            state,
            active_width: format.width,
            active_height: format.height,
            frame_count: 0,
        })
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        use v4l::io::traits::CaptureStream;

        let (buf, _meta) = self
            .state
            .with_mut(|fields| fields.stream.next())
            .context("capture v4l2 frame")?;

        self.frame_count += 1;
        Ok(Some(RawFrame::new(
            buf.to_vec(),
            self.active_width,
            self.active_height,
        )))
    }
}
