//! Test helpers shared by the durafill integration suites
//!
//! - `MockFetcher`: canned per-URL responses, call and concurrency counters
//! - `TextProber`: reads the duration written into the temp file by `MockFetcher`
//! - WAV generation and a local HTTP server for end-to-end tests

#![allow(dead_code)]

use async_trait::async_trait;
use durafill::error::TaskError;
use durafill::fetcher::{FetchedAudio, Fetcher};
use durafill::prober::Prober;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Canned response for one URL
#[derive(Debug, Clone)]
pub enum MockAudio {
    /// Download succeeds; the prober will report this many seconds
    Seconds(f64),
    /// Server answers with this HTTP status
    Status(u16),
    /// Download succeeds but the bytes are not audio
    Garbage,
}

pub struct MockFetcher {
    responses: HashMap<String, MockAudio>,
    temp_dir: PathBuf,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub fn new(temp_dir: &Path) -> Self {
        Self {
            responses: HashMap::new(),
            temp_dir: temp_dir.to_path_buf(),
            delay: Duration::from_millis(0),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn respond(mut self, url: &str, audio: MockAudio) -> Self {
        self.responses.insert(url.to_string(), audio);
        self
    }

    /// Hold each download open for `delay` so overlap can be observed
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn temp_with(&self, contents: &str) -> Result<FetchedAudio, TaskError> {
        let mut file = tempfile::Builder::new()
            .prefix("mock-")
            .suffix(".mp3")
            .tempfile_in(&self.temp_dir)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(FetchedAudio::new(file, contents.len() as u64))
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedAudio, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(url) {
            Some(MockAudio::Seconds(seconds)) => self.temp_with(&seconds.to_string()),
            Some(MockAudio::Garbage) => self.temp_with("not audio"),
            Some(MockAudio::Status(code)) => {
                Err(TaskError::Fetch(format!("HTTP {} for {}", code, url)))
            }
            None => Err(TaskError::Fetch(format!("connection refused: {}", url))),
        }
    }
}

/// Prober that parses the seconds `MockFetcher` wrote into the file
pub struct TextProber;

impl Prober for TextProber {
    fn probe(&self, path: &Path) -> Result<f64, TaskError> {
        let text = std::fs::read_to_string(path)?;
        text.trim()
            .parse::<f64>()
            .map_err(|e| TaskError::Decode(format!("not audio: {}", e)))
    }
}

/// Number of files left in a directory
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// 16-bit PCM WAV bytes holding a 440 Hz tone
pub fn wav_bytes(seconds: f64, sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (seconds * sample_rate as f64) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample =
                (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Serve `routes` (path → (status, body)) on an ephemeral local port
///
/// Returns the base URL, e.g. `http://127.0.0.1:41234`.
pub async fn serve(routes: Vec<(&'static str, u16, Vec<u8>)>) -> String {
    use axum::http::StatusCode;
    use axum::routing::get;

    let mut app = axum::Router::new();
    for (path, status, body) in routes {
        let status = StatusCode::from_u16(status).unwrap();
        app = app.route(
            path,
            get(move || {
                let body = body.clone();
                async move { (status, body) }
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}
