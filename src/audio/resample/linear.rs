//! `resample/linear.rs` — fast linear-interpolation kernel.
//!
//! Output frames sit between the previous and the current input frame, so
//! the kernel delays the stream by one frame and only needs one frame of
//! history per channel across blocks.

pub struct LinearResampler {
    /// Input frames advanced per output frame.
    step: f64,
    /// Read head, relative to the first frame of the next block.
    position: f64,
    /// Last frame of the previous block.
    last: Vec<i16>,
    channels: usize,
}

impl LinearResampler {
    pub fn new(source_rate: u32, target_rate: u32, channels: usize) -> Self {
        Self {
            step: source_rate as f64 / target_rate as f64,
            position: 0.0,
            last: vec![0; channels],
            channels,
        }
    }

    /// Resample interleaved `input` and append the result to `output`.
    pub fn process(&mut self, input: &[i16], output: &mut Vec<i16>) {
        let ch = self.channels;
        let frames = input.len() / ch;
        if frames == 0 {
            return;
        }

        let sample = |i: usize, c: usize, last: &[i16]| -> f64 {
            if i == 0 {
                last[c] as f64
            } else {
                input[(i - 1) * ch + c] as f64
            }
        };

        while self.position < frames as f64 {
            let idx = self.position as usize;
            let t = self.position - idx as f64;
            for c in 0..ch {
                let a = sample(idx, c, &self.last);
                let b = input[idx * ch + c] as f64;
                output.push((a + (b - a) * t).round() as i16);
            }
            self.position += self.step;
        }

        self.position -= frames as f64;
        self.last
            .copy_from_slice(&input[(frames - 1) * ch..frames * ch]);
    }
}
