//! Preview clips played on a dedicated worker thread
//!
//! One [`CpalClip`] owns one worker. The worker downloads the preview,
//! decodes it and feeds the output device until the clip ends or the handle
//! is dropped. Only natural completion and failures are reported back through
//! the player event channel; a released clip goes away silently.

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use super::convert::SampleConverter;
use super::decoder::AudioDecoder;
use super::output::AudioOutput;
use super::{AudioBackend, ClipHandle, ClipId, ClipProgress, PlayerEvent, PlayerEventSender};
use crate::error::PlaybackError;
use crate::{log_api_request, log_api_result};

const DOWNLOAD_CHUNK: usize = 16 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// State shared between a clip handle, its worker and the device callback
#[derive(Default)]
pub struct ClipControl {
    paused: AtomicBool,
    stopped: AtomicBool,
    streaming: AtomicBool,
    frames_played: AtomicU64,
    output_rate: AtomicU32,
    duration_ms: Mutex<Option<u32>>,
}

impl ClipControl {
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn advance_frames(&self, frames: u64) {
        self.frames_played.fetch_add(frames, Ordering::Relaxed);
    }

    fn progress(&self) -> ClipProgress {
        let rate = self.output_rate.load(Ordering::Relaxed) as u64;
        let position_ms = if rate == 0 {
            0
        } else {
            (self.frames_played.load(Ordering::Relaxed) * 1000 / rate) as u32
        };
        ClipProgress {
            position_ms,
            duration_ms: *self.duration_ms.lock(),
        }
    }
}

enum ClipOutcome {
    Finished,
    Released,
}

/// Backend that plays previews on the default cpal output device
pub struct CpalBackend {
    events: PlayerEventSender,
}

impl CpalBackend {
    pub fn new(events: PlayerEventSender) -> Self {
        Self { events }
    }
}

impl AudioBackend for CpalBackend {
    fn open(&self, clip: ClipId, url: &str) -> Result<Box<dyn ClipHandle>, PlaybackError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| PlaybackError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PlaybackError::InvalidUrl(url.to_string()));
        }

        let control = Arc::new(ClipControl::default());
        let worker_control = control.clone();
        let events = self.events.clone();

        let worker = std::thread::Builder::new()
            .name(format!("clip-{}", clip))
            .spawn(move || run_worker(clip, parsed, worker_control, events))
            .map_err(PlaybackError::Worker)?;

        tracing::debug!(clip, "Clip worker spawned");

        Ok(Box::new(CpalClip {
            clip,
            control,
            worker: Some(worker),
        }))
    }
}

pub struct CpalClip {
    clip: ClipId,
    control: Arc<ClipControl>,
    worker: Option<JoinHandle<()>>,
}

impl ClipHandle for CpalClip {
    fn pause(&mut self) {
        self.control.paused.store(true, Ordering::Relaxed);
    }

    fn resume(&mut self) {
        self.control.paused.store(false, Ordering::Relaxed);
    }

    fn progress(&self) -> ClipProgress {
        self.control.progress()
    }
}

impl Drop for CpalClip {
    fn drop(&mut self) {
        self.control.stopped.store(true, Ordering::SeqCst);

        // A worker that is still downloading notices `stopped` before it ever
        // opens the device, so only a streaming worker has to be waited for.
        if let Some(worker) = self.worker.take() {
            if self.control.streaming.load(Ordering::SeqCst) {
                if worker.join().is_err() {
                    tracing::warn!(clip = self.clip, "Clip worker panicked");
                }
            }
        }
        tracing::debug!(clip = self.clip, "Clip released");
    }
}

fn run_worker(
    clip: ClipId,
    url: reqwest::Url,
    control: Arc<ClipControl>,
    events: PlayerEventSender,
) {
    let event = match play_clip(&url, &control) {
        Ok(ClipOutcome::Finished) => Some(PlayerEvent::Finished { clip }),
        Ok(ClipOutcome::Released) => None,
        Err(e) => Some(PlayerEvent::Failed {
            clip,
            error: e.to_string(),
        }),
    };

    if let Some(event) = event {
        // The receiver is gone during shutdown; nothing left to notify
        let _ = events.send(event);
    }
}

fn play_clip(url: &reqwest::Url, control: &Arc<ClipControl>) -> Result<ClipOutcome, PlaybackError> {
    log_api_request!("preview", url = %url);
    let downloaded = download(url, control);
    log_api_result!("preview", downloaded);
    let Some(bytes) = downloaded? else {
        return Ok(ClipOutcome::Released);
    };

    let extension = extension_hint(url);
    let mut decoder = AudioDecoder::open(bytes, extension.as_deref().or(Some("mp3")))?;
    *control.duration_ms.lock() = decoder.duration_ms();

    // Pairs with the `stopped` store in `CpalClip::drop`
    control.streaming.store(true, Ordering::SeqCst);
    if control.is_stopped() {
        return Ok(ClipOutcome::Released);
    }

    let mut output = AudioOutput::open(decoder.sample_rate(), control.clone())?;
    control.output_rate.store(output.sample_rate(), Ordering::Relaxed);
    let mut converter = SampleConverter::new(
        decoder.sample_rate(),
        decoder.channels(),
        output.sample_rate(),
        output.channels(),
    )?;

    while let Some(samples) = decoder.decode_next()? {
        let converted = converter.process(&samples)?;
        if !output.write_blocking(&converted, control) {
            return Ok(ClipOutcome::Released);
        }
    }
    if !output.write_blocking(&converter.flush()?, control) {
        return Ok(ClipOutcome::Released);
    }

    while !output.is_drained() {
        if control.is_stopped() {
            return Ok(ClipOutcome::Released);
        }
        std::thread::sleep(DRAIN_POLL);
    }

    Ok(ClipOutcome::Finished)
}

/// Container extension of the preview file, ignoring any signed query string
fn extension_hint(url: &reqwest::Url) -> Option<String> {
    url.path_segments()?
        .next_back()?
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Fetch the whole preview into memory. `None` means the clip was released meanwhile.
fn download(url: &reqwest::Url, control: &ClipControl) -> Result<Option<Vec<u8>>, PlaybackError> {
    // Built on the worker so its internal runtime never lives inside tokio
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| PlaybackError::Download(e.to_string()))?;

    let mut response = client
        .get(url.clone())
        .send()
        .map_err(|e| PlaybackError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlaybackError::Download(format!("HTTP {}", status.as_u16())));
    }

    let mut bytes = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    let mut chunk = [0u8; DOWNLOAD_CHUNK];
    loop {
        if control.is_stopped() {
            return Ok(None);
        }
        let read = response
            .read(&mut chunk)
            .map_err(|e| PlaybackError::Download(e.to_string()))?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
    }

    tracing::debug!(url = %url, bytes = bytes.len(), "Preview downloaded");
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::player_event_channel;
    use std::io::Write;
    use std::net::TcpListener;

    /// Answer exactly one request on a local port; returns the preview URL
    fn serve_once(status_line: &'static str, body: &'static [u8]) -> reqwest::Url {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        std::thread::spawn(move || {
            if let Ok((mut socket, _)) = listener.accept() {
                let mut request = vec![0u8; 4096];
                let _ = socket.read(&mut request);
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: audio/mpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes());
                let _ = socket.write_all(body);
            }
        });

        reqwest::Url::parse(&format!("http://{}/previews/clip.mp3", addr)).expect("url")
    }

    #[test]
    fn missing_preview_reports_download_failure() {
        let url = serve_once("404 Not Found", b"gone");
        let control = Arc::new(ClipControl::default());

        let result = play_clip(&url, &control);
        assert!(matches!(result, Err(PlaybackError::Download(ref msg)) if msg.contains("404")));
    }

    #[test]
    fn worker_sends_failed_event_for_its_clip() {
        let url = serve_once("404 Not Found", b"gone");
        let (tx, mut rx) = player_event_channel();

        run_worker(7, url, Arc::new(ClipControl::default()), tx);

        match rx.try_recv() {
            Ok(PlayerEvent::Failed { clip, error }) => {
                assert_eq!(clip, 7);
                assert!(error.contains("download"), "{error}");
            }
            other => panic!("expected a failure event, got {other:?}"),
        }
    }

    #[test]
    fn non_audio_body_is_a_decode_failure() {
        let url = serve_once("200 OK", b"<html>definitely not an mp3</html>");
        let control = Arc::new(ClipControl::default());

        let result = play_clip(&url, &control);
        assert!(matches!(result, Err(PlaybackError::Decode(_))));
        assert!(!control.streaming.load(Ordering::SeqCst));
    }

    #[test]
    fn released_clip_goes_away_silently() {
        let url = serve_once("200 OK", b"partial preview bytes");
        let control = Arc::new(ClipControl::default());
        control.stopped.store(true, Ordering::SeqCst);
        let (tx, mut rx) = player_event_channel();

        assert!(matches!(play_clip(&url, &control), Ok(ClipOutcome::Released)));

        let url = serve_once("200 OK", b"partial preview bytes");
        run_worker(3, url, control, tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn extension_comes_from_the_path_not_the_signature() {
        let url = reqwest::Url::parse(
            "https://cdnt-preview.dzcdn.net/api/1/1/a/b/c/0/abc.mp3?hdnea=exp=1700000000~acl=/api/1/1/a/b/c/0/abc.mp3*~data=user_id=0,application_id=42~hmac=ff",
        )
        .expect("url");
        assert_eq!(extension_hint(&url).as_deref(), Some("mp3"));

        let bare = reqwest::Url::parse("https://cdn.example/preview").expect("url");
        assert_eq!(extension_hint(&bare), None);
    }

    #[test]
    fn rejects_urls_that_cannot_be_fetched() {
        let (tx, _rx) = player_event_channel();
        let backend = CpalBackend::new(tx);

        for url in ["", "not a url", "file:///tmp/clip.mp3"] {
            let result = backend.open(1, url);
            assert!(matches!(result, Err(PlaybackError::InvalidUrl(_))), "{url:?} should be rejected");
        }
    }

    #[test]
    fn progress_uses_output_rate() {
        let control = ClipControl::default();
        assert_eq!(control.progress(), ClipProgress::default());

        control.output_rate.store(48_000, Ordering::Relaxed);
        control.advance_frames(24_000);
        *control.duration_ms.lock() = Some(30_000);
        assert_eq!(
            control.progress(),
            ClipProgress {
                position_ms: 500,
                duration_ms: Some(30_000),
            }
        );
    }
}
