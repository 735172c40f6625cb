//! HID device discovery and the transport seam used by sessions

use crate::core::config::HidConfig;
use crate::core::error::{PedalError, TransportError};
use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

/// Raw read/write access to the pedal's HID interface.
///
/// A read returning `Ok(0)` means no report was available before the timeout.
/// Dropping the transport releases the handle.
pub trait HidTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;
    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError>;
}

impl HidTransport for HidDevice {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        #[cfg(any(target_os = "macos", target_os = "windows"))]
        let data = {
            let mut framed = Vec::with_capacity(data.len() + 1);
            framed.push(0x00); // Report ID
            framed.extend_from_slice(data);
            framed
        };

        let written = HidDevice::write(self, &data[..])
            .map_err(|e| TransportError::write(e.to_string()))?;
        debug!("Wrote {} bytes to HID device", written);
        Ok(written)
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, TransportError> {
        HidDevice::read_timeout(self, buf, timeout_ms)
            .map_err(|e| TransportError::read(e.to_string()))
    }
}

/// Pick the first candidate whose (VID, PID) matches `config`
fn select_device<T>(
    candidates: impl IntoIterator<Item = T>,
    ids: impl Fn(&T) -> (u16, u16),
    config: &HidConfig,
) -> Result<T, PedalError> {
    candidates
        .into_iter()
        .find(|candidate| ids(candidate) == (config.vendor_id, config.product_id))
        .ok_or(PedalError::DeviceNotFound {
            vendor_id: config.vendor_id,
            product_id: config.product_id,
        })
}

/// Find and open the pedal in non-blocking mode
pub fn open_device(config: &HidConfig) -> Result<HidDevice, PedalError> {
    let api = HidApi::new()
        .map_err(|e| PedalError::DeviceBusy(format!("HID API unavailable: {}", e)))?;

    let device_info = select_device(
        api.device_list(),
        |d| (d.vendor_id(), d.product_id()),
        config,
    )?;

    info!(
        "Found pedal: {} {}",
        device_info.manufacturer_string().unwrap_or("Unknown"),
        device_info.product_string().unwrap_or("Unknown")
    );

    let device = device_info
        .open_device(&api)
        .map_err(|e| PedalError::DeviceBusy(e.to_string()))?;

    device
        .set_blocking_mode(false)
        .map_err(|e| PedalError::DeviceBusy(format!("failed to set non-blocking mode: {}", e)))?;

    Ok(device)
}
