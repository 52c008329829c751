//! Input device discovery.

use cpal::traits::{DeviceTrait, HostTrait};

use super::AudioInputError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Summary of one input device, as shown by `barwave list-devices`.
#[derive(Debug, Clone)]
pub struct InputDeviceInfo {
    pub index: usize,
    pub name: String,
    /// Default sample rate and channel count, if the device could be queried
    pub default_config: Option<(u32, u16)>,
    pub is_default: bool,
}

/// Lists the input devices of the default host.
///
/// Devices whose name cannot be read are skipped.
///
/// # Errors
/// - If the devices cannot be enumerated
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>, AudioInputError> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| AudioInputError::Config(format!("Failed to enumerate devices: {e}")))?
            .filter_map(|device| {
                let name = device.name().ok()?;
                let default_config = device
                    .default_input_config()
                    .ok()
                    .map(|config| (config.sample_rate().0, config.channels()));
                Some((name, default_config))
            })
            .enumerate()
            .map(|(index, (name, default_config))| InputDeviceInfo {
                index,
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                default_config,
            })
            .collect();

        Ok(devices)
    })
}

/// Resolves a device spec: "default", a numeric index or a device name.
///
/// # Errors
/// - If no device matches the spec
pub fn find_input_device(
    host: &cpal::Host,
    device_spec: &str,
) -> Result<cpal::Device, AudioInputError> {
    if device_spec == "default" {
        return host.default_input_device().ok_or(AudioInputError::NoDevices);
    }

    let mut devices = host
        .input_devices()
        .map_err(|e| AudioInputError::Config(format!("Failed to enumerate devices: {e}")))?;

    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = devices.collect();
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            AudioInputError::DeviceNotFound(format!(
                "#{index} (valid indices: 0-{})",
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .find(|device| device.name().is_ok_and(|name| name == device_spec))
        .ok_or_else(|| AudioInputError::DeviceNotFound(device_spec.to_string()))
}

/// Runs `f` with stderr redirected to /dev/null, silencing ALSA's chatter on Linux.
///
/// If the redirect cannot be set up, `f` simply runs with stderr untouched.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    let Ok(dev_null) = OpenOptions::new().write(true).open("/dev/null") else {
        return f();
    };

    // SAFETY: dup/dup2/close only touch file descriptors owned by this process;
    // the saved descriptor is restored and closed before returning.
    let saved_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved_stderr == -1 {
        return f();
    }
    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(saved_stderr) };
        return f();
    }

    let result = f();

    unsafe {
        libc::dup2(saved_stderr, libc::STDERR_FILENO);
        libc::close(saved_stderr);
    }

    result
}

/// ALSA only exists on Linux; elsewhere this just runs `f`.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> T
where
    F: FnOnce() -> T,
{
    f()
}
