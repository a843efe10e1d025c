//! Speaker playback of rendered audio via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host};
use osc3x_core::StereoSamples;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

impl AudioDevice {
    fn describe(device: &Device) -> Option<Self> {
        let name = device_name(device).ok()?;
        let config = device.default_output_config().ok();
        Some(Self {
            name,
            default_sample_rate: config.as_ref().map_or(48000, |c| c.sample_rate()),
            channels: config.as_ref().map_or(2, |c| c.channels()),
        })
    }
}

/// Playback settings.
#[derive(Debug, Clone, Default)]
pub struct PlaybackConfig {
    /// Output device by index, exact name, or partial name. Default device
    /// if `None`.
    pub device: Option<String>,
    /// Buffer size in frames. Device default if `None`.
    pub buffer_size: Option<u32>,
}

/// List all output devices.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    Ok(devices.filter_map(|d| AudioDevice::describe(&d)).collect())
}

/// The default output device, if there is one.
pub fn default_output_device() -> Option<AudioDevice> {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| AudioDevice::describe(&d))
}

/// Play `samples` at `sample_rate` and block until they have been played or
/// `running` is cleared.
pub fn play_buffer(
    samples: StereoSamples,
    sample_rate: u32,
    config: &PlaybackConfig,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let host = cpal::default_host();
    let device = match &config.device {
        Some(name) => find_output_device(&host, name)?,
        None => host.default_output_device().ok_or(Error::NoDevice)?,
    };

    let channels = device
        .default_output_config()
        .map(|c| c.channels())
        .unwrap_or(2);
    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate,
        buffer_size: config
            .buffer_size
            .map_or(cpal::BufferSize::Default, cpal::BufferSize::Fixed),
    };

    let total_frames = samples.len();
    let position = Arc::new(AtomicUsize::new(0));
    let cb_position = Arc::clone(&position);
    let cb_running = Arc::clone(&running);
    let out_channels = usize::from(channels);

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if !cb_running.load(Ordering::Relaxed) {
                    data.fill(0.0);
                    return;
                }
                let pos = cb_position.load(Ordering::Relaxed);
                let end = (pos + data.len() / out_channels).min(total_frames);
                interleave_into(
                    &samples.left[pos..end],
                    &samples.right[pos..end],
                    data,
                    out_channels,
                );
                cb_position.store(end, Ordering::Relaxed);
            },
            |err| tracing::error!(%err, "output stream error"),
            None,
        )
        .map_err(|e| Error::Stream(e.to_string()))?;

    stream.play().map_err(|e| Error::Stream(e.to_string()))?;
    tracing::info!(channels, sample_rate, frames = total_frames, "playback started");

    while running.load(Ordering::SeqCst) && position.load(Ordering::Relaxed) < total_frames {
        std::thread::sleep(Duration::from_millis(50));
    }
    // Let the last buffer drain.
    std::thread::sleep(Duration::from_millis(100));

    tracing::info!(
        played = position.load(Ordering::Relaxed),
        "playback finished"
    );
    Ok(())
}

/// Interleave left and right channels into an output buffer, zeroing
/// whatever is left over.
fn interleave_into(left: &[f32], right: &[f32], output: &mut [f32], channels: usize) {
    let frames = left.len().min(right.len());
    output.fill(0.0);

    match channels {
        1 => {
            // Mono output: mix L+R
            for (out, (l, r)) in output.iter_mut().zip(left.iter().zip(right)) {
                *out = (l + r) * 0.5;
            }
        }
        _ => {
            // L/R in the first two channels, silence the rest
            for (i, frame) in output.chunks_exact_mut(channels).take(frames).enumerate() {
                frame[0] = left[i];
                frame[1] = right[i];
            }
        }
    }
}

/// Find an output device by exact name, partial name, or index.
///
/// The `name_or_index` can be:
/// - A numeric index (e.g., "0", "1")
/// - An exact device name
/// - A partial device name (case-insensitive fuzzy match)
fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    if let Some(device) = devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n == name_or_index))
    {
        return Ok(device.clone());
    }

    let search_lower = name_or_index.to_lowercase();
    let mut matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|name| name.to_lowercase().contains(&search_lower))
                .map(|name| (d.clone(), name))
        })
        .collect();

    if matches.len() > 1 {
        let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
        tracing::warn!(
            search = name_or_index,
            ?names,
            "multiple output devices match, using the first"
        );
    }
    if matches.is_empty() {
        return Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            name_or_index
        )));
    }
    Ok(matches.swap_remove(0).0)
}
