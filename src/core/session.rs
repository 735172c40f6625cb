//! Preset session: request/response exchange with a connected pedal
//!
//! The pedal has no transaction IDs, so a session performs one blocking
//! transaction at a time and owns its handle exclusively.

use super::config::{Config, TimingConfig};
use super::error::PedalError;
use super::presets::{PresetList, PresetRecord};
use crate::hid::commands::{build_program_change, build_read_request};
use crate::hid::device::{open_device, HidTransport};
use crate::hid::protocol::{
    decode_name_response, response_echo_matches, PresetIndex, PresetName, RESPONSE_SIZE,
};
use hidapi::HidDevice;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Session with a C4 Synth. `Connected` while it holds a handle, `Closed` after [`close`].
///
/// [`close`]: PresetSession::close
pub struct PresetSession<T: HidTransport = HidDevice> {
    device: Option<T>,
    timing: TimingConfig,
    presets: PresetList,
    active: Option<PresetIndex>,
}

impl PresetSession<HidDevice> {
    /// Open the pedal described by `config`
    pub fn open(config: &Config) -> Result<Self, PedalError> {
        let device = open_device(&config.hid)?;
        info!("Connected to C4 Synth");
        Ok(Self::with_transport(device, config.timing.clone()))
    }
}

impl<T: HidTransport> PresetSession<T> {
    /// Wrap an already opened transport
    pub fn with_transport(transport: T, timing: TimingConfig) -> Self {
        Self {
            device: Some(transport),
            timing,
            presets: PresetList::new(),
            active: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    /// Presets from the last discovery pass
    pub fn presets(&self) -> &PresetList {
        &self.presets
    }

    /// Preset most recently selected through this session
    pub fn active_preset(&self) -> Option<PresetIndex> {
        self.active
    }

    pub fn transport(&self) -> Option<&T> {
        self.device.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.device.as_mut()
    }

    /// Scan all 128 slots and replace the stored preset list.
    ///
    /// Slots that stay silent are left out of the list. The previous list is
    /// kept if the scan fails.
    pub fn discover_presets(&mut self) -> Result<&PresetList, PedalError> {
        let device = self.device.as_mut().ok_or(PedalError::SessionClosed)?;

        let started = Instant::now();
        let mut presets = PresetList::new();
        for index in PresetIndex::all() {
            if let Some(name) = query_name(device, index, &self.timing)? {
                debug!("Preset {:03}: {}", index.display_number(), name);
                presets.push(PresetRecord { index, name });
            }
        }

        info!(
            "Discovered {} active presets in {:?}",
            presets.len(),
            started.elapsed()
        );
        self.presets = presets;
        Ok(&self.presets)
    }

    /// Send a program change to internal preset `index` (0-127)
    pub fn select_preset(&mut self, index: u8) -> Result<(), PedalError> {
        let index = PresetIndex::new(index)?;
        let frame = build_program_change(index.value())?;
        let device = self.device.as_mut().ok_or(PedalError::SessionClosed)?;

        if let Err(e) = device.write(&frame) {
            warn!("Failed to send program change: {}", e);
            return Err(e.into());
        }
        thread::sleep(Duration::from_millis(self.timing.settle_ms));

        self.active = Some(index);
        info!("Program change to preset {}", index.display_number());
        Ok(())
    }

    /// Release the device handle. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.device.take().is_some() {
            info!("Disconnected from C4 Synth");
        }
    }
}

impl<T: HidTransport> Drop for PresetSession<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// One read transaction for the name of `index`
fn query_name<T: HidTransport>(
    device: &mut T,
    index: PresetIndex,
    timing: &TimingConfig,
) -> Result<Option<PresetName>, PedalError> {
    drain_stale_reports(device, timing.max_stale_reports)?;

    let request = build_read_request(index.value())?;
    device.write(&request)?;
    thread::sleep(Duration::from_millis(timing.settle_ms));

    let Some(raw) = poll_response(device, timing)? else {
        debug!("No answer for preset {}", index.display_number());
        return Ok(None);
    };

    if !response_echo_matches(&raw) {
        debug!(
            "Unexpected echo byte 0x{:02X} for preset {}",
            raw[0],
            index.display_number()
        );
    }

    Ok(decode_name_response(&raw)?)
}

/// Poll until a report arrives or the response budget runs out.
///
/// Each read waits at most the remaining budget, so a read never blocks past
/// the deadline. With `response_timeout_ms = 0` this is a single read.
fn poll_response<T: HidTransport>(
    device: &mut T,
    timing: &TimingConfig,
) -> Result<Option<Vec<u8>>, PedalError> {
    let deadline = Instant::now() + Duration::from_millis(timing.response_timeout_ms);
    let mut buf = [0u8; RESPONSE_SIZE];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout_ms = read_timeout_ms(timing.poll_timeout_ms, remaining);

        let n = device.read_timeout(&mut buf, timeout_ms)?;
        if n > 0 {
            return Ok(Some(buf[..n].to_vec()));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        if timeout_ms == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Per-read timeout for hidapi: never negative (blocking) and never past the budget
fn read_timeout_ms(poll_timeout_ms: u32, remaining: Duration) -> i32 {
    let remaining_ms = u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX);
    let capped = poll_timeout_ms.min(remaining_ms);
    i32::try_from(capped).unwrap_or(i32::MAX)
}

/// Discard reports left over from earlier transactions
fn drain_stale_reports<T: HidTransport>(device: &mut T, max: usize) -> Result<(), PedalError> {
    let mut buf = [0u8; RESPONSE_SIZE];
    for _ in 0..max {
        let n = device.read_timeout(&mut buf, 0)?;
        if n == 0 {
            break;
        }
        debug!("Discarded stale report ({} bytes)", n);
    }
    Ok(())
}
