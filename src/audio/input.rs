use crate::{InquestError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use crossbeam_channel::Sender;
use tracing::{debug, error, info};

/// Exclusive handle on the default input device.
///
/// Opening builds and starts the stream immediately; mono sample chunks are
/// pushed through `tx` until the handle is dropped. There is no pause state:
/// the device is either held and flowing, or released.
pub struct MicInput {
    _stream: Stream,
    sample_rate: u32,
}

impl MicInput {
    pub fn open(tx: Sender<Vec<f32>>) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(InquestError::DeviceUnavailable)?;

        info!(
            "Using input device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config: StreamConfig = device
            .default_input_config()
            .map_err(|e| classify_device_error(&e.to_string()))?
            .into();

        let channels = config.channels as usize;
        let sample_rate = config.sample_rate.0;

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Average all channels down to mono
                    let samples = if channels == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                            .collect()
                    };

                    if let Err(e) = tx.try_send(samples) {
                        debug!("Dropping audio chunk: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| classify_device_error(&e.to_string()))?;

        stream
            .play()
            .map_err(|e| classify_device_error(&e.to_string()))?;

        info!("Capture stream started at {} Hz", sample_rate);

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Map a host audio error message onto the capture error taxonomy.
///
/// Hosts do not report microphone permission uniformly, so the split between
/// "denied" and "unavailable" is by message inspection.
pub(crate) fn classify_device_error(message: &str) -> InquestError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        InquestError::PermissionDenied(message.to_string())
    } else if lower.contains("no device")
        || lower.contains("not available")
        || lower.contains("disconnected")
    {
        InquestError::DeviceUnavailable
    } else {
        InquestError::CaptureStream(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_classify_permission_errors() {
        assert!(matches!(
            classify_device_error("Access denied by the user"),
            InquestError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_device_error("operation not allowed"),
            InquestError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_classify_missing_device() {
        assert!(matches!(
            classify_device_error("requested device is not available"),
            InquestError::DeviceUnavailable
        ));
    }

    #[test]
    fn test_classify_other_errors_are_stream_errors() {
        assert!(matches!(
            classify_device_error("backend burped"),
            InquestError::CaptureStream(_)
        ));
    }

    #[test]
    fn test_mic_open_on_hosts_with_a_device() {
        // Hosts without a capture device (CI) exercise the error path instead
        let (tx, _rx) = bounded(16);
        if let Ok(mic) = MicInput::open(tx) {
            assert!(mic.sample_rate() > 0);
        }
    }
}
