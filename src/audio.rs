use fundsp::hacker::*;
use log::warn;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

/// A finite mono clip rendered on the fly from a fundsp graph.
struct Clip {
    unit: Box<dyn AudioUnit + Send>,
    remaining: u64,
}

impl Clip {
    fn new(mut unit: Box<dyn AudioUnit + Send>, seconds: f64) -> Self {
        unit.set_sample_rate(SAMPLE_RATE as f64);
        Clip {
            unit,
            remaining: (seconds * SAMPLE_RATE as f64) as u64,
        }
    }
}

impl Iterator for Clip {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.unit.get_mono())
    }
}

impl rodio::Source for Clip {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.remaining as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.remaining as f64 / SAMPLE_RATE as f64,
        ))
    }
}

// Wing beat: a quick upward sine chirp.
fn flap_clip() -> Clip {
    let freq = lfo(|t: f64| lerp11(320.0, 640.0, (t / 0.08).min(1.0)));
    let gain = lfo(|t: f64| lerp11(0.10, 0.0, (t / 0.12).min(1.0)));
    Clip::new(Box::new(freq >> sine() * gain), 0.12)
}

// Point scored: a decaying chime.
fn score_clip() -> Clip {
    let gain = lfo(|t: f64| lerp11(0.12, 0.0, (t / 0.2).min(1.0)));
    Clip::new(Box::new(sine_hz(880.0) * gain), 0.22)
}

// Crash: a sawtooth sweeping down into silence.
fn crash_clip() -> Clip {
    let freq = lfo(|t: f64| lerp11(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f64| lerp11(0.15, 0.0, (t / 0.5).min(1.0)));
    Clip::new(Box::new(freq >> saw() * gain), 0.5)
}

/// Fire-and-forget sound effects. If no output device is available the
/// whole thing is skipped and the game stays silent.
pub struct Audio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl Audio {
    pub fn init() -> Option<Audio> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Audio {
                _stream: stream,
                handle,
            }),
            Err(err) => {
                warn!("no audio output, continuing silent: {err}");
                None
            }
        }
    }

    fn play(&self, clip: Clip) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        sink.append(clip);
        sink.detach();
    }

    pub fn flap(&self) {
        self.play(flap_clip());
    }

    pub fn score(&self) {
        self.play(score_clip());
    }

    pub fn crash(&self) {
        self.play(crash_clip());
    }
}
