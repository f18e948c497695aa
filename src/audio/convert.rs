//! Channel mapping plus sample rate conversion between the decoded clip and
//! whatever format the output device accepted.

use rubato::{FftFixedIn, Resampler};

use crate::error::PlaybackError;

/// Input frames handed to the resampler per call
const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

pub struct SampleConverter {
    in_channels: usize,
    out_channels: usize,
    resampler: Option<FftFixedIn<f32>>,
    /// Channel-mapped input waiting for a full resampler chunk, one `Vec` per output channel
    pending: Vec<Vec<f32>>,
    trim: OutputTrim,
}

/// Keeps resampled output aligned with the input: drops the resampler's
/// latency at the start and the zero padding at the end.
struct OutputTrim {
    delay_frames: usize,
    in_rate: u64,
    out_rate: u64,
    frames_in: u64,
    frames_out: u64,
}

impl SampleConverter {
    pub fn new(
        in_rate: u32,
        in_channels: usize,
        out_rate: u32,
        out_channels: usize,
    ) -> Result<Self, PlaybackError> {
        let out_channels = out_channels.max(1);
        let resampler = if in_rate == out_rate {
            None
        } else {
            let resampler = FftFixedIn::<f32>::new(
                in_rate as usize,
                out_rate as usize,
                CHUNK_FRAMES,
                SUB_CHUNKS,
                out_channels,
            )
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;
            tracing::debug!(in_rate, out_rate, out_channels, "Resampler created");
            Some(resampler)
        };
        let delay_frames = resampler.as_ref().map_or(0, |r| r.output_delay());

        Ok(Self {
            in_channels: in_channels.max(1),
            out_channels,
            resampler,
            pending: vec![Vec::new(); out_channels],
            trim: OutputTrim {
                delay_frames,
                in_rate: in_rate as u64,
                out_rate: out_rate as u64,
                frames_in: 0,
                frames_out: 0,
            },
        })
    }

    pub fn is_passthrough(&self) -> bool {
        self.in_channels == self.out_channels && self.resampler.is_none()
    }

    /// Convert one chunk of interleaved input samples
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, PlaybackError> {
        if self.is_passthrough() {
            return Ok(input.to_vec());
        }

        let Some(resampler) = self.resampler.as_mut() else {
            let mut output = Vec::with_capacity(input.len() / self.in_channels * self.out_channels);
            for frame in input.chunks_exact(self.in_channels) {
                map_channels(frame, self.out_channels, &mut output);
            }
            return Ok(output);
        };

        let mut frame_buf = Vec::with_capacity(self.out_channels);
        for frame in input.chunks_exact(self.in_channels) {
            frame_buf.clear();
            map_channels(frame, self.out_channels, &mut frame_buf);
            for (plane, sample) in self.pending.iter_mut().zip(&frame_buf) {
                plane.push(*sample);
            }
        }
        self.trim.frames_in += (input.len() / self.in_channels) as u64;

        let mut output = Vec::new();
        loop {
            let needed = resampler.input_frames_next();
            if self.pending[0].len() < needed {
                break;
            }
            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|plane| plane.drain(..needed).collect())
                .collect();
            let planes = resampler
                .process(&chunk, None)
                .map_err(|e| PlaybackError::Resample(e.to_string()))?;
            self.trim.emit(&planes, &mut output);
        }
        Ok(output)
    }

    /// Push whatever input is still buffered through the resampler
    pub fn flush(&mut self) -> Result<Vec<f32>, PlaybackError> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(Vec::new());
        };

        let mut output = Vec::new();
        let tail = std::mem::replace(&mut self.pending, vec![Vec::new(); self.out_channels]);
        let planes = resampler
            .process_partial(Some(tail.as_slice()), None)
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;
        self.trim.emit(&planes, &mut output);

        // A second, empty pass pushes out the frames held back as latency
        let empty = vec![Vec::<f32>::new(); self.out_channels];
        let planes = resampler
            .process_partial(Some(empty.as_slice()), None)
            .map_err(|e| PlaybackError::Resample(e.to_string()))?;
        self.trim.emit(&planes, &mut output);

        Ok(output)
    }
}

impl OutputTrim {
    /// Interleave resampled planes into `output`, skipping latency and padding
    fn emit(&mut self, planes: &[Vec<f32>], output: &mut Vec<f32>) {
        let produced = planes.first().map_or(0, |plane| plane.len());
        let skip = self.delay_frames.min(produced);
        self.delay_frames -= skip;

        let expected = self.frames_in * self.out_rate / self.in_rate.max(1);
        let room = expected.saturating_sub(self.frames_out) as usize;
        let end = produced.min(skip + room);

        for frame in skip..end {
            for plane in planes {
                output.push(plane[frame]);
            }
        }
        self.frames_out += (end - skip) as u64;
    }
}

fn map_channels(frame: &[f32], out_channels: usize, dst: &mut Vec<f32>) {
    match (frame.len(), out_channels) {
        (1, n) => dst.extend(std::iter::repeat_n(frame[0], n)),
        (i, 1) => dst.push(frame.iter().sum::<f32>() / i as f32),
        (_, n) => {
            for ch in 0..n {
                dst.push(frame.get(ch).copied().unwrap_or(0.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(in_rate: u32, in_ch: usize, out_rate: u32, out_ch: usize) -> SampleConverter {
        SampleConverter::new(in_rate, in_ch, out_rate, out_ch).expect("converter")
    }

    #[test]
    fn passthrough_keeps_samples() {
        let mut converter = converter(44100, 2, 44100, 2);
        assert!(converter.is_passthrough());
        assert_eq!(
            converter.process(&[0.1, 0.2, 0.3, 0.4]).expect("process"),
            vec![0.1, 0.2, 0.3, 0.4]
        );
        assert!(converter.flush().expect("flush").is_empty());
    }

    #[test]
    fn mono_is_duplicated_to_stereo() {
        let mut converter = converter(48000, 1, 48000, 2);
        assert!(!converter.is_passthrough());
        assert_eq!(
            converter.process(&[0.5, -0.5]).expect("process"),
            vec![0.5, 0.5, -0.5, -0.5]
        );
    }

    #[test]
    fn stereo_is_averaged_to_mono() {
        let mut converter = converter(48000, 2, 48000, 1);
        assert_eq!(
            converter.process(&[1.0, 0.0, 0.5, 0.5]).expect("process"),
            vec![0.5, 0.5]
        );
    }

    #[test]
    fn short_input_is_held_until_flush() {
        let mut converter = converter(44100, 1, 48000, 1);
        assert!(converter.process(&[0.25; 100]).expect("process").is_empty());
        assert!(!converter.flush().expect("flush").is_empty());
    }

    #[test]
    fn resampled_clip_keeps_its_length() {
        // One second at 44.1 kHz, fed in decoder-sized packets
        let mut converter = converter(44100, 2, 48000, 2);
        let packet = vec![0.1f32; 1152 * 2];
        let mut out = Vec::new();
        let mut fed = 0;
        while fed < 44100 {
            let frames = (44100 - fed).min(1152);
            out.extend(converter.process(&packet[..frames * 2]).expect("process"));
            fed += frames;
        }
        out.extend(converter.flush().expect("flush"));

        assert_eq!(out.len() % 2, 0);
        let frames = out.len() / 2;
        assert!(frames <= 48000, "produced {frames} frames");
        assert!(frames + CHUNK_FRAMES >= 48000, "produced {frames} frames");
    }

    #[test]
    fn constant_signal_survives_resampling() {
        let mut converter = converter(32000, 1, 48000, 1);
        let mut out = converter.process(&vec![0.5f32; 32000]).expect("process");
        out.extend(converter.flush().expect("flush"));

        // Edges ring against the zero padding; the middle must hold the level
        let middle = &out[out.len() / 4..out.len() / 2];
        assert!(!middle.is_empty());
        for sample in middle {
            assert!((sample - 0.5).abs() < 0.02, "sample {sample}");
        }
    }
}
