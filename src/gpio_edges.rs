//! GPIO rising-edge source for the UTI output line.
//!
//! The kernel timestamps every edge in its interrupt handler, so the
//! durations do not depend on how quickly this process gets scheduled.

use anyhow::{anyhow, Context};
use futures::StreamExt;
use linux_embedded_hal::gpio_cdev::{
    AsyncLineEventHandle, Chip, EventRequestFlags, LineRequestFlags,
};
use std::time::Duration;
use tracing::debug;
use uti_pt100_lib::config::GpioConfig;
use uti_pt100_lib::sample_buffer::{EdgeCapture, SampleBuffer};

pub struct EdgeLine {
    events: AsyncLineEventHandle,
    line: u32,
    timeout: Duration,
}

impl EdgeLine {
    /// Request `config.line` for rising-edge events.
    ///
    /// Open a fresh line per session: events queued while nobody reads them
    /// overflow the kernel buffer and leave gaps in the stream.
    pub fn open(config: &GpioConfig) -> anyhow::Result<Self> {
        let mut chip =
            Chip::new(&config.chip).with_context(|| format!("open {}", config.chip))?;
        let handle = chip
            .get_line(config.line)
            .with_context(|| format!("get GPIO line {}", config.line))?
            .events(
                LineRequestFlags::INPUT,
                EventRequestFlags::RISING_EDGE,
                "uti-thermometer",
            )
            .with_context(|| format!("request edge events on GPIO line {}", config.line))?;
        let events = AsyncLineEventHandle::new(handle).context("register edge events")?;

        Ok(Self {
            events,
            line: config.line,
            timeout: Duration::from_millis(config.edge_timeout_ms),
        })
    }

    /// Record edges until a buffer of `capacity` durations is sealed.
    pub async fn capture(&mut self, capacity: usize) -> anyhow::Result<SampleBuffer> {
        let mut capture = EdgeCapture::new(capacity);
        while !capture.is_full() {
            let event = tokio::time::timeout(self.timeout, self.events.next())
                .await
                .map_err(|_| {
                    anyhow!(
                        "no edge on GPIO line {} within {:?} ({} of {} samples)",
                        self.line,
                        self.timeout,
                        capture.buffer().len(),
                        capacity
                    )
                })?
                .ok_or_else(|| anyhow!("edge stream on GPIO line {} closed", self.line))?
                .context("read edge event")?;

            // Event timestamps are nanoseconds on CLOCK_MONOTONIC
            capture.on_edge(event.timestamp() / 1_000);
        }
        debug!("Captured {} durations on GPIO line {}", capacity, self.line);
        Ok(capture.into_buffer())
    }
}
