//! Background chiptune loop and the repeating task that keeps it queued.

use super::synth::{Decay, Envelope, Mixer, Pitch, Voice, Waveform};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const BPM: f32 = 140.0;
const MASTER: f32 = 0.06;
/// Delay before the first loop starts
const LEAD_IN: f64 = 0.1;

const C3: f32 = 130.81;
const E3: f32 = 164.81;
const F3: f32 = 174.61;
const G3: f32 = 196.00;
const A3: f32 = 220.00;
const C4: f32 = 261.63;
const D4: f32 = 293.66;
const E4: f32 = 329.63;
const F4: f32 = 349.23;
const G4: f32 = 392.00;
const A4: f32 = 440.00;
const B4: f32 = 493.88;
const C5: f32 = 523.25;
const D5: f32 = 587.33;
const E5: f32 = 659.25;
const G5: f32 = 783.99;
const REST: f32 = 0.0;

#[rustfmt::skip]
const MELODY: [f32; 32] = [
    E4, G4, A4, G4, E4, C4, D4, E4,
    G4, A4, B4, A4, G4, E4, D4, C4,
    C4, E4, G4, C5, B4, A4, G4, E4,
    F4, A4, G4, E4, D4, E4, C4, REST,
];

#[rustfmt::skip]
const HARMONY: [f32; 32] = [
    C5, REST, E5, REST, C5, REST, G4, REST,
    E5, REST, D5, REST, C5, REST, G4, REST,
    E5, REST, G5, REST, D5, REST, C5, REST,
    A4, REST, C5, REST, G4, REST, E4, REST,
];

#[rustfmt::skip]
const BASS: [f32; 32] = [
    C3, C3, C3, C3, A3, A3, A3, A3,
    F3, F3, F3, F3, G3, G3, G3, G3,
    C3, C3, E3, E3, F3, F3, G3, G3,
    F3, F3, E3, E3, G3, G3, C3, C3,
];

pub fn beat_seconds() -> f32 {
    60.0 / BPM
}

pub fn loop_seconds() -> f32 {
    MELODY.len() as f32 * beat_seconds()
}

/// Queue one pass of all three parts starting at `start` (mixer seconds)
pub fn schedule_loop(mixer: &mut Mixer, start: f64) {
    let beat = beat_seconds();
    let parts: [(&[f32; 32], Waveform, Envelope); 3] = [
        (
            &MELODY,
            Waveform::Square,
            Envelope {
                peak: 0.4,
                hold: Some((beat * 0.4, 0.35)),
                decay: Decay::Exponential,
                length: beat * 0.8,
            },
        ),
        (&HARMONY, Waveform::Triangle, Envelope::exponential(0.2, beat * 0.6)),
        (&BASS, Waveform::Triangle, Envelope::exponential(0.5, beat * 0.9)),
    ];

    for (notes, wave, envelope) in parts {
        for (i, hz) in notes.iter().enumerate() {
            if *hz == REST {
                continue;
            }
            let voice = Voice {
                wave,
                pitch: Pitch::fixed(*hz),
                envelope,
                level: MASTER,
            };
            mixer.schedule_at_time(voice, start + (i as f32 * beat) as f64);
        }
    }
}

/// Runs a job on a worker thread every `period` until cancelled. Dropping
/// the task cancels it and waits for the worker.
pub struct RepeatingTask {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    pub fn spawn<F>(name: &str, period: Duration, mut job: F) -> io::Result<Self>
    where
        F: FnMut(u64) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut iteration = 0;
            while !flag.load(Ordering::Relaxed) {
                let started = Instant::now();
                job(iteration);
                iteration += 1;
                // Sleep in short slices so cancellation is prompt
                while started.elapsed() < period {
                    if flag.load(Ordering::Relaxed) {
                        return;
                    }
                    thread::sleep(Duration::from_millis(20).min(period));
                }
            }
        })?;
        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("repeating task panicked");
            }
        }
    }
}

/// Keep the loop queued one pass ahead on `mixer`
pub fn start(mixer: Arc<Mutex<Mixer>>) -> io::Result<RepeatingTask> {
    let origin = match mixer.lock() {
        Ok(m) => m.now() + LEAD_IN,
        Err(_) => LEAD_IN,
    };
    let period = Duration::from_secs_f32(loop_seconds());
    debug!(seconds = loop_seconds(), "music loop");
    RepeatingTask::spawn("goldenrain-music", period, move |n| {
        if let Ok(mut m) = mixer.lock() {
            schedule_loop(&mut m, origin + n as f64 * loop_seconds() as f64);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{loop_seconds, schedule_loop, RepeatingTask};
    use crate::audio::synth::Mixer;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn loop_is_thirty_two_beats_at_140_bpm() {
        assert!((loop_seconds() - 32.0 * 60.0 / 140.0).abs() < 1e-4);
    }

    #[test]
    fn schedule_skips_rests() {
        let mut mixer = Mixer::new(8_000);
        schedule_loop(&mut mixer, 0.0);
        // 31 melody notes, 16 harmony notes, 32 bass notes
        assert_eq!(mixer.active_voices(), 31 + 16 + 32);
    }

    #[test]
    fn repeating_task_stops_when_dropped() {
        let runs = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&runs);
        let task = RepeatingTask::spawn("test-task", Duration::from_millis(5), move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        std::thread::sleep(Duration::from_millis(60));
        drop(task);
        let after_drop = runs.load(Ordering::Relaxed);
        assert!(after_drop >= 2);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(runs.load(Ordering::Relaxed), after_drop);
    }

    #[test]
    fn cancel_flag_is_visible() {
        let task = RepeatingTask::spawn("test-cancel", Duration::from_millis(5), |_| {}).unwrap();
        assert!(!task.is_cancelled());
        task.cancel();
        assert!(task.is_cancelled());
    }
}
