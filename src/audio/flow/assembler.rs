//! `FrameAssembler` — slices fixed-size PCM frames off the front of a segment.
//!
//! The encoder buffers arbitrarily sized chunks; the codec wants exactly one
//! packet's worth of interleaved samples per call. The assembler bridges the
//! two without consuming anything itself: it copies, reports how much it
//! copied, and leaves prefix removal to the caller.

use crate::audio::segment::AudioSegment;

pub struct FrameAssembler {
    channels: usize,
    frames: usize,
}

impl FrameAssembler {
    /// `frames` is the target slice length per call, `channels` the layout of
    /// the produced buffer.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self { channels, frames }
    }

    /// Interleaved length of one full frame.
    pub fn frame_len(&self) -> usize {
        self.frames * self.channels
    }

    /// Copy up to one frame from the front of `source` into `pcm`.
    ///
    /// `pcm` is resized to [`frame_len`](Self::frame_len); whatever the
    /// segment could not fill is zeroed, so a short read at end-of-stream is
    /// already padded. Returns the number of frames taken from `source`.
    pub fn assemble(&self, source: &AudioSegment, pcm: &mut Vec<i16>) -> usize {
        pcm.clear();
        pcm.resize(self.frame_len(), 0);

        let mut copied = 0;
        for chunk in source.chunks() {
            if copied == self.frames {
                break;
            }
            let count = chunk.frames().min(self.frames - copied);
            let start = copied * self.channels;
            chunk.interleave_into(count, self.channels, &mut pcm[start..]);
            copied += count;
        }

        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_exactly_one_frame() {
        let mut seg = AudioSegment::new();
        seg.append_samples((0..30).collect::<Vec<i16>>(), 2);
        seg.append_samples((100..120).collect::<Vec<i16>>(), 2);

        let asm = FrameAssembler::new(2, 20);
        let mut pcm = Vec::new();
        let copied = asm.assemble(&seg, &mut pcm);

        assert_eq!(copied, 20);
        assert_eq!(pcm.len(), 40);
        assert_eq!(&pcm[..30], &(0..30).collect::<Vec<i16>>()[..]);
        assert_eq!(&pcm[30..], &(100..110).collect::<Vec<i16>>()[..]);
        // Nothing is consumed by the assembler itself.
        assert_eq!(seg.duration(), 25);
    }

    #[test]
    fn silence_gap_becomes_zeros() {
        let mut seg = AudioSegment::new();
        seg.append_samples(vec![9i16; 4], 1);
        seg.append_silence(3);
        seg.append_samples(vec![8i16; 4], 1);

        let asm = FrameAssembler::new(1, 10);
        let mut pcm = Vec::new();
        assert_eq!(asm.assemble(&seg, &mut pcm), 10);
        assert_eq!(pcm, vec![9, 9, 9, 9, 0, 0, 0, 8, 8, 8]);
    }

    #[test]
    fn short_read_is_zero_padded() {
        let mut seg = AudioSegment::new();
        seg.append_samples(vec![3i16; 6], 2);

        let asm = FrameAssembler::new(2, 8);
        let mut pcm = vec![7i16; 100];
        let copied = asm.assemble(&seg, &mut pcm);

        assert_eq!(copied, 3);
        assert_eq!(pcm.len(), 16);
        assert!(pcm[..6].iter().all(|&s| s == 3));
        assert!(pcm[6..].iter().all(|&s| s == 0));
    }

    #[test]
    fn maps_channels_to_target_layout() {
        let mut seg = AudioSegment::new();
        seg.append_samples(vec![10i16, 20, 30, 40], 2);
        seg.append_samples(vec![5i16], 1);

        let asm = FrameAssembler::new(1, 3);
        let mut pcm = Vec::new();
        assert_eq!(asm.assemble(&seg, &mut pcm), 3);
        assert_eq!(pcm, vec![15, 35, 5]);
    }

    #[test]
    fn empty_source_copies_nothing() {
        let asm = FrameAssembler::new(2, 960);
        let mut pcm = Vec::new();
        assert_eq!(asm.assemble(&AudioSegment::new(), &mut pcm), 0);
        assert_eq!(pcm.len(), 1920);
    }
}
