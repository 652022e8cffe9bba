//! Sound effects and background music
//!
//! The scene only talks to the [`Audio`] trait. [`SilentAudio`] stands in
//! whenever sound is disabled or no output device can be opened.

pub mod device;
pub mod music;
pub mod synth;

use crate::config::SceneConfig;
use rand::prelude::*;
use std::sync::{Arc, Mutex};
use synth::{Decay, Envelope, Glide, Mixer, Pitch, Voice, Waveform};
use tracing::warn;

/// Short one-shot sounds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Two-step tone for a phrase letter (E, M or I)
    Letter(char),
    /// Rising square chirp when a pixel sprite pops out
    Creature,
    /// Random note from the chime scale
    Chime,
}

pub trait Audio {
    fn play_effect(&mut self, effect: Effect);
    fn play_fanfare(&mut self);
}

#[derive(Debug, Default)]
pub struct SilentAudio;

impl Audio for SilentAudio {
    fn play_effect(&mut self, _effect: Effect) {}
    fn play_fanfare(&mut self) {}
}

const CHIME_NOTES: [f32; 10] = [
    261.63, 293.66, 329.63, 392.00, 440.00, 523.25, 587.33, 659.25, 783.99, 880.00,
];
const FANFARE_NOTES: [f32; 6] = [329.63, 415.30, 523.25, 659.25, 783.99, 1046.50];
const FANFARE_STEP: f64 = 0.12;

/// Voice for an effect; `None` for letters without a tone of their own
pub fn effect_voice(effect: Effect, rng: &mut StdRng) -> Option<Voice> {
    let letter = |wave, from, to, at| Voice {
        wave,
        pitch: Pitch {
            start: from,
            change: Some((at, to, Glide::Step)),
        },
        envelope: Envelope::exponential(0.2, 0.4),
        level: 1.0,
    };
    match effect {
        Effect::Letter(c) => match c.to_ascii_uppercase() {
            'E' => Some(letter(Waveform::Sine, 329.63, 415.30, 0.12)),
            'M' => Some(letter(Waveform::Triangle, 440.00, 523.25, 0.1)),
            'I' => Some(letter(Waveform::Sine, 659.25, 783.99, 0.1)),
            _ => None,
        },
        Effect::Creature => Some(Voice {
            wave: Waveform::Square,
            pitch: Pitch {
                start: 150.0,
                change: Some((0.1, 300.0, Glide::Linear)),
            },
            envelope: Envelope {
                peak: 0.1,
                hold: None,
                decay: Decay::Linear,
                length: 0.3,
            },
            level: 1.0,
        }),
        Effect::Chime => Some(Voice {
            wave: if rng.gen_bool(0.5) { Waveform::Sine } else { Waveform::Triangle },
            pitch: Pitch::fixed(CHIME_NOTES[rng.gen_range(0..CHIME_NOTES.len())]),
            envelope: Envelope::exponential(0.1, 0.5),
            level: 1.0,
        }),
    }
}

/// Queue the fanfare on `mixer`, starting now
pub fn queue_fanfare(mixer: &mut Mixer) {
    for (delay, voice) in fanfare_voices() {
        mixer.schedule(voice, delay);
    }
}

/// Ascending six-note arpeggio as (delay seconds, voice)
pub fn fanfare_voices() -> impl Iterator<Item = (f64, Voice)> {
    FANFARE_NOTES.iter().enumerate().map(|(i, hz)| {
        (
            i as f64 * FANFARE_STEP,
            Voice {
                wave: Waveform::Sine,
                pitch: Pitch::fixed(*hz),
                envelope: Envelope::exponential(0.15, 0.5),
                level: 1.0,
            },
        )
    })
}

/// Effects and music rendered by the software mixer
pub struct SynthAudio {
    mixer: Arc<Mutex<Mixer>>,
    rng: StdRng,
    _music: Option<music::RepeatingTask>,
    _output: device::Output,
}

impl SynthAudio {
    fn schedule(&self, voice: Voice, delay: f64) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.schedule(voice, delay);
        }
    }
}

impl Audio for SynthAudio {
    fn play_effect(&mut self, effect: Effect) {
        if let Some(voice) = effect_voice(effect, &mut self.rng) {
            self.schedule(voice, 0.0);
        }
    }

    fn play_fanfare(&mut self) {
        if let Ok(mut mixer) = self.mixer.lock() {
            queue_fanfare(&mut mixer);
        }
    }
}

/// Open sound output as configured, falling back to silence on any failure
pub fn open(config: &SceneConfig, rng: &mut StdRng) -> Box<dyn Audio> {
    if !config.audio {
        return Box::new(SilentAudio);
    }

    let mixer = Arc::new(Mutex::new(Mixer::default()));
    let (output, sample_rate) = match device::Output::open(Arc::clone(&mixer)) {
        Ok(opened) => opened,
        Err(err) => {
            warn!(error = %err, "sound disabled");
            return Box::new(SilentAudio);
        }
    };
    if let Ok(mut m) = mixer.lock() {
        *m = Mixer::new(sample_rate);
    }

    let music = if config.music {
        music::start(Arc::clone(&mixer))
            .map_err(|err| warn!(error = %err, "music disabled"))
            .ok()
    } else {
        None
    };

    Box::new(SynthAudio {
        mixer,
        rng: StdRng::seed_from_u64(rng.gen()),
        _music: music,
        _output: output,
    })
}

#[cfg(test)]
mod tests {
    use super::{effect_voice, fanfare_voices, open, queue_fanfare, Effect};
    use crate::audio::synth::{Mixer, Waveform};
    use crate::config::SceneConfig;
    use rand::prelude::*;

    #[test]
    fn letters_have_their_own_tones() {
        let mut rng = StdRng::seed_from_u64(0);
        let e = effect_voice(Effect::Letter('e'), &mut rng).unwrap();
        assert_eq!(e.pitch.at(0.0), 329.63);
        assert_eq!(e.pitch.at(0.2), 415.30);
        let m = effect_voice(Effect::Letter('M'), &mut rng).unwrap();
        assert_eq!(m.wave, Waveform::Triangle);
        assert!(effect_voice(Effect::Letter('Q'), &mut rng).is_none());
    }

    #[test]
    fn chime_picks_from_scale() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let v = effect_voice(Effect::Chime, &mut rng).unwrap();
            assert!(matches!(v.wave, Waveform::Sine | Waveform::Triangle));
            assert!(v.pitch.at(0.0) >= 261.0 && v.pitch.at(0.0) <= 880.0);
        }
    }

    #[test]
    fn fanfare_ascends_at_fixed_steps() {
        let notes: Vec<_> = fanfare_voices().collect();
        assert_eq!(notes.len(), 6);
        assert!(notes.windows(2).all(|w| w[1].1.pitch.start > w[0].1.pitch.start));
        assert!((notes[5].0 - 0.6).abs() < 1e-9);
    }

    #[test]
    fn fanfare_is_audible_through_the_mixer() {
        let mut mixer = Mixer::new(8_000);
        queue_fanfare(&mut mixer);
        assert_eq!(mixer.active_voices(), 6);

        // first note starts at once, the last one 0.6 s later and rings for 0.5 s
        let mut head = vec![0.0; 800];
        mixer.render(&mut head);
        assert!(head.iter().any(|s| s.abs() > 0.05));
        let mut rest = vec![0.0; 9_000];
        mixer.render(&mut rest);
        assert!(rest[4_000..4_800].iter().any(|s| s.abs() > 0.05));
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn disabled_audio_is_silent() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = SceneConfig {
            audio: false,
            ..SceneConfig::default()
        };
        let mut audio = open(&config, &mut rng);
        audio.play_effect(Effect::Chime);
        audio.play_fanfare();
    }
}
