//! `resample/hermite.rs` — cubic Hermite (Catmull-Rom) kernel.
//!
//! Four-point interpolation gives much better alias rejection than the
//! linear kernel at modest extra cost. Suited to the 44 100 Hz → 48 000 Hz
//! conversion most capture devices need.
//!
//! The kernel runs two frames behind its input so every tap is a real
//! sample: the three most recent frames of each block are carried over.

const HISTORY: usize = 3;

pub struct HermiteResampler {
    step: f64,
    position: f64,
    channels: usize,
    /// Last `HISTORY` frames of the previous block, oldest first, interleaved.
    history: Vec<i16>,
}

impl HermiteResampler {
    pub fn new(source_rate: u32, target_rate: u32, channels: usize) -> Self {
        Self {
            step: source_rate as f64 / target_rate as f64,
            position: 0.0,
            channels,
            history: vec![0; HISTORY * channels],
        }
    }

    /// Catmull-Rom interpolation between `p[1]` and `p[2]` at `t ∈ [0, 1)`.
    #[inline]
    fn hermite(p: [f64; 4], t: f64) -> f64 {
        let c0 = p[1];
        let c1 = 0.5 * (p[2] - p[0]);
        let c2 = p[0] - 2.5 * p[1] + 2.0 * p[2] - 0.5 * p[3];
        let c3 = 0.5 * (p[3] - p[0]) + 1.5 * (p[1] - p[2]);
        ((c3 * t + c2) * t + c1) * t + c0
    }

    /// Resample interleaved `input` and append the result to `output`.
    pub fn process(&mut self, input: &[i16], output: &mut Vec<i16>) {
        let ch = self.channels;
        let frames = input.len() / ch;
        if frames == 0 {
            return;
        }

        // Frame `k` of the virtual stream `history ++ input`.
        let at = |k: usize, c: usize, history: &[i16]| -> f64 {
            if k < HISTORY {
                history[k * ch + c] as f64
            } else {
                input[(k - HISTORY) * ch + c] as f64
            }
        };

        while self.position < frames as f64 {
            let idx = self.position as usize;
            let t = self.position - idx as f64;
            for c in 0..ch {
                // Input frame `idx` is virtual frame `idx + HISTORY`.
                let p = [
                    at(idx, c, &self.history),
                    at(idx + 1, c, &self.history),
                    at(idx + 2, c, &self.history),
                    at(idx + 3, c, &self.history),
                ];
                let s = Self::hermite(p, t).round();
                output.push(s.clamp(i16::MIN as f64, i16::MAX as f64) as i16);
            }
            self.position += self.step;
        }

        self.position -= frames as f64;

        // Keep the newest HISTORY frames of `history ++ input`.
        if frames >= HISTORY {
            self.history
                .copy_from_slice(&input[(frames - HISTORY) * ch..frames * ch]);
        } else {
            let keep = (HISTORY - frames) * ch;
            self.history.copy_within(frames * ch.., 0);
            self.history[keep..].copy_from_slice(&input[..frames * ch]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_delays_by_two_frames() {
        let mut r = HermiteResampler::new(16_000, 16_000, 1);
        let mut out = Vec::new();
        r.process(&[10, 20, 30, 40], &mut out);
        assert_eq!(out, vec![0, 0, 10, 20]);

        out.clear();
        r.process(&[50], &mut out);
        assert_eq!(out, vec![30]);

        out.clear();
        r.process(&[60, 70], &mut out);
        assert_eq!(out, vec![40, 50]);
    }

    #[test]
    fn constant_signal_stays_constant() {
        let mut r = HermiteResampler::new(44_100, 48_000, 2);
        let input = vec![1_000i16; 882 * 2];
        let mut out = Vec::new();
        r.process(&input, &mut out);
        r.process(&input, &mut out);
        // Skip the ramp-in from the zeroed history.
        assert!(out[8..].iter().all(|&s| s == 1_000));
    }
}
