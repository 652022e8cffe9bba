//! Tiny software synthesiser: scheduled oscillator voices summed into a
//! mono sample stream.

use std::f32::consts::TAU;

pub const SAMPLE_RATE: u32 = 44_100;
/// Voices beyond this are dropped oldest-first
const MAX_VOICES: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    /// One sample at `phase` in [0, 1)
    fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Glide {
    /// Jump to the new frequency at the given time
    Step,
    /// Slide linearly until the given time, then hold
    Linear,
}

/// Frequency over the life of a voice
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pitch {
    pub start: f32,
    /// (seconds, target Hz, how to get there)
    pub change: Option<(f32, f32, Glide)>,
}

impl Pitch {
    pub const fn fixed(hz: f32) -> Self {
        Self { start: hz, change: None }
    }

    pub fn at(&self, t: f32) -> f32 {
        match self.change {
            None => self.start,
            Some((when, target, Glide::Step)) => {
                if t < when {
                    self.start
                } else {
                    target
                }
            }
            Some((when, target, Glide::Linear)) => {
                let f = (t / when.max(f32::EPSILON)).min(1.0);
                self.start + (target - self.start) * f
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decay {
    /// Towards 0.001 on an exponential curve
    Exponential,
    /// Straight line to silence
    Linear,
}

/// Gain over the life of a voice
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub peak: f32,
    /// Hold `peak` until (seconds), then decay from the second level
    pub hold: Option<(f32, f32)>,
    pub decay: Decay,
    pub length: f32,
}

impl Envelope {
    pub const fn exponential(peak: f32, length: f32) -> Self {
        Self {
            peak,
            hold: None,
            decay: Decay::Exponential,
            length,
        }
    }

    pub fn gain(&self, t: f32) -> f32 {
        if t < 0.0 || t >= self.length {
            return 0.0;
        }
        let (from_t, from_level) = match self.hold {
            Some((at, _)) if t < at => return self.peak,
            Some((at, level)) => (at, level),
            None => (0.0, self.peak),
        };
        let span = (self.length - from_t).max(f32::EPSILON);
        let f = (t - from_t) / span;
        match self.decay {
            Decay::Exponential => from_level * (0.001 / from_level.max(0.001)).powf(f),
            Decay::Linear => from_level * (1.0 - f),
        }
    }
}

/// A note waiting to play or playing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Voice {
    pub wave: Waveform,
    pub pitch: Pitch,
    pub envelope: Envelope,
    /// Extra multiplier, e.g. a music bus level
    pub level: f32,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    voice: Voice,
    /// Start in samples on the mixer clock
    start: u64,
    phase: f32,
}

/// Sums scheduled voices; the output device pulls from `render`
#[derive(Debug)]
pub struct Mixer {
    sample_rate: u32,
    clock: u64,
    voices: Vec<Scheduled>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(SAMPLE_RATE)
    }
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            clock: 0,
            voices: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Seconds rendered so far
    pub fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Start `voice` `delay` seconds from now
    pub fn schedule(&mut self, voice: Voice, delay: f64) {
        let start = self.clock + (delay.max(0.0) * self.sample_rate as f64) as u64;
        self.schedule_at(voice, start);
    }

    /// Start `voice` at an absolute time in seconds on the mixer clock
    pub fn schedule_at_time(&mut self, voice: Voice, at: f64) {
        let start = (at.max(0.0) * self.sample_rate as f64) as u64;
        self.schedule_at(voice, start.max(self.clock));
    }

    fn schedule_at(&mut self, voice: Voice, start: u64) {
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0);
        }
        self.voices.push(Scheduled {
            voice,
            start,
            phase: 0.0,
        });
    }

    /// Fill `out` with mono samples and advance the clock
    pub fn render(&mut self, out: &mut [f32]) {
        let rate = self.sample_rate as f32;
        for (i, sample) in out.iter_mut().enumerate() {
            let now = self.clock + i as u64;
            let mut acc = 0.0;
            for v in &mut self.voices {
                if now < v.start {
                    continue;
                }
                let t = (now - v.start) as f32 / rate;
                let gain = v.voice.envelope.gain(t) * v.voice.level;
                acc += v.voice.wave.sample(v.phase) * gain;
                v.phase = (v.phase + v.voice.pitch.at(t) / rate).fract();
            }
            *sample = acc.clamp(-1.0, 1.0);
        }
        self.clock += out.len() as u64;

        let clock = self.clock;
        self.voices.retain(|v| {
            let end = v.start + (v.voice.envelope.length * rate) as u64;
            end > clock
        });
    }
}
