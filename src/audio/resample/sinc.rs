//! `resample/sinc.rs` — Blackman-windowed sinc kernel.
//!
//! Highest quality mode. When downsampling, the cutoff follows the target
//! Nyquist frequency so the kernel also acts as the anti-alias filter.

use std::collections::VecDeque;

use crate::audio::constants::SINC_TAPS;

pub struct SincResampler {
    step: f64,
    /// Fractional position of the next output frame between the two newest
    /// history frames.
    phase: f64,
    channels: usize,
    cutoff: f64,
    /// Pre-computed Blackman window, one weight per tap.
    window: Vec<f64>,
    /// Per-channel convolution history, oldest first.
    history: Vec<VecDeque<f64>>,
}

impl SincResampler {
    pub fn new(source_rate: u32, target_rate: u32, channels: usize) -> Self {
        let step = source_rate as f64 / target_rate as f64;
        let m = (SINC_TAPS - 1) as f64;
        let window = (0..SINC_TAPS)
            .map(|n| {
                let x = 2.0 * std::f64::consts::PI * n as f64 / m;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            step,
            phase: 0.0,
            channels,
            cutoff: (1.0 / step).min(1.0),
            window,
            history: vec![VecDeque::from(vec![0.0; SINC_TAPS]); channels],
        }
    }

    fn sinc(x: f64) -> f64 {
        if x.abs() < 1e-9 {
            return 1.0;
        }
        let pi_x = std::f64::consts::PI * x;
        pi_x.sin() / pi_x
    }

    /// Resample interleaved `input` and append the result to `output`.
    pub fn process(&mut self, input: &[i16], output: &mut Vec<i16>) {
        let ch = self.channels;
        let half = (SINC_TAPS / 2) as f64;

        for frame in input.chunks_exact(ch) {
            for (hist, &s) in self.history.iter_mut().zip(frame) {
                hist.pop_front();
                hist.push_back(s as f64);
            }

            while self.phase < 1.0 {
                for hist in &self.history {
                    let mut acc = 0.0;
                    let mut norm = 0.0;
                    for (i, (&x, &w)) in hist.iter().zip(&self.window).enumerate() {
                        let offset = i as f64 - half - self.phase;
                        let k = Self::sinc(self.cutoff * offset) * w;
                        acc += x * k;
                        norm += k;
                    }
                    let s = if norm.abs() > 1e-9 { acc / norm } else { acc };
                    output.push(s.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16);
                }
                self.phase += self.step;
            }
            self.phase -= 1.0;
        }
    }
}
