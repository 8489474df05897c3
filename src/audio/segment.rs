//! `AudioSegment` — an ordered run of PCM chunks.
//!
//! Producers append interleaved i16 blocks or silence gaps; the encoder moves
//! whole segments around under its lock and trims consumed prefixes outside
//! of it. Sample chunks are reference-counted, so partial removal only moves
//! an offset.

use std::collections::VecDeque;
use std::sync::Arc;

/// One contiguous piece of a segment.
#[derive(Debug, Clone)]
pub enum AudioChunk {
    /// A gap of known duration with no backing data.
    Silence { frames: usize },
    /// Interleaved samples. `offset` and `frames` are in frames, not samples.
    Samples {
        pcm: Arc<[i16]>,
        channels: usize,
        offset: usize,
        frames: usize,
    },
}

impl AudioChunk {
    pub fn silence(frames: usize) -> Self {
        Self::Silence { frames }
    }

    /// Wrap an interleaved block. Trailing samples that do not form a whole
    /// frame are ignored.
    pub fn samples(pcm: impl Into<Arc<[i16]>>, channels: usize) -> Self {
        let pcm = pcm.into();
        let frames = if channels == 0 { 0 } else { pcm.len() / channels };
        Self::Samples {
            pcm,
            channels,
            offset: 0,
            frames,
        }
    }

    /// Duration in frames.
    pub fn frames(&self) -> usize {
        match self {
            Self::Silence { frames } | Self::Samples { frames, .. } => *frames,
        }
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Silence { .. })
    }

    /// Drop the first `count` frames of this chunk.
    fn advance(&mut self, count: usize) {
        match self {
            Self::Silence { frames } => *frames -= count,
            Self::Samples { offset, frames, .. } => {
                *offset += count;
                *frames -= count;
            }
        }
    }

    /// Write the first `count` frames into `out` with `out_channels` samples
    /// per frame.
    ///
    /// Silence writes zeros. Channel layouts are mapped as follows: equal
    /// counts copy, mono output averages every input channel, stereo output
    /// duplicates a mono input and keeps the front pair of wider inputs.
    pub fn interleave_into(&self, count: usize, out_channels: usize, out: &mut [i16]) {
        let out = &mut out[..count * out_channels];
        let Self::Samples {
            pcm,
            channels,
            offset,
            ..
        } = self
        else {
            out.fill(0);
            return;
        };

        let ch = *channels;
        let src = &pcm[offset * ch..(offset + count) * ch];

        if ch == out_channels {
            out.copy_from_slice(src);
            return;
        }

        for (frame, dst) in src.chunks_exact(ch).zip(out.chunks_exact_mut(out_channels)) {
            match out_channels {
                1 => {
                    let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                    dst[0] = (sum / ch as i32) as i16;
                }
                _ if ch == 1 => dst.fill(frame[0]),
                _ => dst.copy_from_slice(&frame[..out_channels]),
            }
        }
    }
}

/// Ordered, time-contiguous list of chunks.
#[derive(Debug, Default, Clone)]
pub struct AudioSegment {
    chunks: VecDeque<AudioChunk>,
    duration: usize,
}

impl AudioSegment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total duration in frames.
    pub fn duration(&self) -> usize {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.duration == 0
    }

    pub fn chunks(&self) -> impl Iterator<Item = &AudioChunk> {
        self.chunks.iter()
    }

    pub fn append(&mut self, chunk: AudioChunk) {
        let frames = chunk.frames();
        if frames == 0 {
            return;
        }
        self.duration += frames;

        // Consecutive gaps collapse into one.
        if chunk.is_silence() {
            if let Some(AudioChunk::Silence { frames: tail }) = self.chunks.back_mut() {
                *tail += frames;
                return;
            }
        }
        self.chunks.push_back(chunk);
    }

    pub fn append_samples(&mut self, pcm: impl Into<Arc<[i16]>>, channels: usize) {
        self.append(AudioChunk::samples(pcm, channels));
    }

    pub fn append_silence(&mut self, frames: usize) {
        self.append(AudioChunk::silence(frames));
    }

    /// Move every chunk of `other` to the end of `self`, leaving it empty.
    pub fn append_from(&mut self, other: &mut AudioSegment) {
        for chunk in other.chunks.drain(..) {
            self.append(chunk);
        }
        other.duration = 0;
    }

    /// Remove the first `frames` frames. Removing more than is buffered
    /// empties the segment.
    pub fn remove_leading(&mut self, mut frames: usize) {
        while frames > 0 {
            let Some(front) = self.chunks.front_mut() else {
                break;
            };
            let take = frames.min(front.frames());
            front.advance(take);
            self.duration -= take;
            frames -= take;
            if front.frames() == 0 {
                self.chunks.pop_front();
            }
        }
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.duration = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_sum_of_chunks() {
        let mut seg = AudioSegment::new();
        seg.append_samples(vec![1i16; 20], 2);
        seg.append_silence(5);
        seg.append_samples(vec![2i16; 3], 1);
        assert_eq!(seg.duration(), 18);
        assert_eq!(seg.chunks().count(), 3);
    }

    #[test]
    fn adjacent_silence_merges() {
        let mut seg = AudioSegment::new();
        seg.append_silence(10);
        seg.append_silence(6);
        assert_eq!(seg.chunks().count(), 1);
        assert_eq!(seg.duration(), 16);
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut seg = AudioSegment::new();
        seg.append_silence(0);
        seg.append_samples(Vec::<i16>::new(), 2);
        assert!(seg.is_empty());
        assert_eq!(seg.chunks().count(), 0);
    }

    #[test]
    fn remove_leading_spans_chunks() {
        let mut seg = AudioSegment::new();
        seg.append_samples((0..10).collect::<Vec<i16>>(), 1);
        seg.append_silence(4);
        seg.append_samples((100..110).collect::<Vec<i16>>(), 1);

        seg.remove_leading(12);
        assert_eq!(seg.duration(), 12);

        let first = seg.chunks().next().unwrap();
        assert!(first.is_silence());
        assert_eq!(first.frames(), 2);

        seg.remove_leading(5);
        let mut out = [0i16; 3];
        seg.chunks().next().unwrap().interleave_into(3, 1, &mut out);
        assert_eq!(out, [103, 104, 105]);
    }

    #[test]
    fn remove_leading_past_end_empties() {
        let mut seg = AudioSegment::new();
        seg.append_silence(8);
        seg.remove_leading(100);
        assert!(seg.is_empty());
        assert_eq!(seg.chunks().count(), 0);
    }

    #[test]
    fn append_from_moves_everything() {
        let mut raw = AudioSegment::new();
        raw.append_samples(vec![7i16; 8], 2);
        raw.append_silence(3);

        let mut source = AudioSegment::new();
        source.append_silence(1);
        source.append_from(&mut raw);

        assert!(raw.is_empty());
        assert_eq!(raw.chunks().count(), 0);
        assert_eq!(source.duration(), 8);
    }

    #[test]
    fn interleave_downmixes_to_mono() {
        let chunk = AudioChunk::samples(vec![100i16, 300, -50, 50], 2);
        let mut out = [1i16; 2];
        chunk.interleave_into(2, 1, &mut out);
        assert_eq!(out, [200, 0]);
    }

    #[test]
    fn interleave_upmixes_mono_and_trims_surround() {
        let mono = AudioChunk::samples(vec![5i16, 6], 1);
        let mut out = [0i16; 4];
        mono.interleave_into(2, 2, &mut out);
        assert_eq!(out, [5, 5, 6, 6]);

        let six = AudioChunk::samples((0..12).collect::<Vec<i16>>(), 6);
        let mut out = [0i16; 4];
        six.interleave_into(2, 2, &mut out);
        assert_eq!(out, [0, 1, 6, 7]);
    }

    #[test]
    fn silence_interleaves_as_zeros() {
        let mut out = [9i16; 6];
        AudioChunk::silence(10).interleave_into(3, 2, &mut out);
        assert_eq!(out, [0; 6]);
    }
}
