//! Sound output. With the `sound` feature the mixer is pulled by a cpal
//! output stream; without it opening always fails and the scene stays
//! silent.

use super::synth::Mixer;
use crate::error::AudioError;
use std::sync::{Arc, Mutex};

#[cfg(feature = "sound")]
pub struct Output {
    _stream: cpal::Stream,
}

#[cfg(feature = "sound")]
impl Output {
    /// Open the default output device and start pulling from `mixer`.
    /// Returns the sample rate the mixer must run at.
    pub fn open(mixer: Arc<Mutex<Mixer>>) -> Result<(Self, u32), AudioError> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
        use tracing::{info, warn};

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels().max(1) as usize;
        let config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut mono = Vec::new();
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                mono.resize(frames, 0.0);
                match mixer.lock() {
                    Ok(mut m) => m.render(&mut mono),
                    Err(_) => mono.fill(0.0),
                }
                for (frame, sample) in data.chunks_mut(channels).zip(&mono) {
                    frame.fill(*sample);
                }
            },
            |err| warn!(error = %err, "audio stream error"),
            None,
        )?;
        stream.play()?;
        info!(sample_rate, channels, "audio output open");
        Ok((Self { _stream: stream }, sample_rate))
    }
}

#[cfg(not(feature = "sound"))]
pub struct Output;

#[cfg(not(feature = "sound"))]
impl Output {
    pub fn open(_mixer: Arc<Mutex<Mixer>>) -> Result<(Self, u32), AudioError> {
        Err(AudioError::Unsupported)
    }
}
