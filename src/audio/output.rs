// Audio output using cpal
// The worker thread pushes samples into a ring buffer that the device callback drains

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, Stream, StreamConfig, SupportedStreamConfig};
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::HeapRb;

use super::clip::ClipControl;
use crate::error::PlaybackError;

const RING_BUFFER_MS: usize = 250;

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

pub struct AudioOutput {
    _stream: Stream,
    producer: RingProducer,
    sample_rate: u32,
    channels: usize,
}

impl AudioOutput {
    /// Open the default output device, preferring the clip's own sample rate
    pub fn open(preferred_rate: u32, control: Arc<ClipControl>) -> Result<Self, PlaybackError> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::Output("no output device available".to_string()))?;

        let supported = Self::pick_config(&device, preferred_rate)?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let capacity = (sample_rate as usize * channels * RING_BUFFER_MS / 1000).max(1024);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, consumer, control)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, consumer, control)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, consumer, control)?,
            format => {
                return Err(PlaybackError::Output(format!("unsupported sample format: {:?}", format)));
            }
        };

        stream
            .play()
            .map_err(|e| PlaybackError::Output(format!("failed to start stream: {}", e)))?;

        tracing::debug!(sample_rate, channels, ?sample_format, "Audio output opened");

        Ok(Self {
            _stream: stream,
            producer,
            sample_rate,
            channels,
        })
    }

    fn pick_config(device: &cpal::Device, preferred_rate: u32) -> Result<SupportedStreamConfig, PlaybackError> {
        let wanted = SampleRate(preferred_rate);
        let exact = device.supported_output_configs().ok().and_then(|mut configs| {
            configs.find_map(|range| {
                let usable = matches!(
                    range.sample_format(),
                    SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                );
                let fits = range.min_sample_rate() <= wanted && wanted <= range.max_sample_rate();
                (usable && fits && range.channels() <= 2).then(|| range.with_sample_rate(wanted))
            })
        });

        match exact {
            Some(config) => Ok(config),
            None => device
                .default_output_config()
                .map_err(|e| PlaybackError::Output(format!("failed to get default output config: {}", e))),
        }
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut consumer: RingConsumer,
        control: Arc<ClipControl>,
    ) -> Result<Stream, PlaybackError> {
        let channels = config.channels.max(1) as u64;
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // Paused clips output silence and keep their buffered samples
                    if control.is_paused() {
                        data.fill(T::from_sample(0.0f32));
                        return;
                    }

                    let mut popped = 0u64;
                    for sample in data.iter_mut() {
                        let value = match consumer.try_pop() {
                            Some(value) => {
                                popped += 1;
                                value
                            }
                            None => 0.0,
                        };
                        *sample = T::from_sample(value);
                    }
                    control.advance_frames(popped / channels);
                },
                move |err| {
                    tracing::warn!(error = %err, "Audio output stream error");
                },
                None,
            )
            .map_err(|e| PlaybackError::Output(format!("failed to build output stream: {}", e)))?;

        Ok(stream)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Push all samples, waiting while the buffer is full.
    /// Returns `false` if the clip was released before everything was written.
    pub fn write_blocking(&mut self, samples: &[f32], control: &ClipControl) -> bool {
        let mut remaining = samples;
        while !remaining.is_empty() {
            if control.is_stopped() {
                return false;
            }
            let written = self.producer.push_slice(remaining);
            if written > 0 {
                remaining = &remaining[written..];
            } else {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        true
    }

    /// Whether the device callback has consumed every queued sample
    pub fn is_drained(&self) -> bool {
        self.producer.is_empty()
    }
}
