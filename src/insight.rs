use crate::model::Track;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(4);

/// Mood, description and palette for a track, as produced by the insight
/// service or by the fixed local fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInsight {
    pub mood: String,
    pub description: String,
    pub color_palette: Vec<String>,
}

impl TrackInsight {
    /// The deterministic stand-in used whenever the service is missing,
    /// slow or broken. The UI must never block on an insight.
    pub fn fallback() -> Self {
        Self {
            mood: String::from("Energetic"),
            description: String::from(
                "A pulsating rhythm that drives you forward through the digital landscape.",
            ),
            color_palette: vec![
                String::from("#8b5cf6"),
                String::from("#ec4899"),
                String::from("#3b82f6"),
            ],
        }
    }
}

/// Optional collaborator that describes a track. Implementations may fail
/// freely; callers always recover with `TrackInsight::fallback`.
pub trait InsightService {
    fn analyze(&mut self, title: &str, artist: &str, genre: &str) -> Result<TrackInsight>;
}

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    title: &'a str,
    artist: &'a str,
    genre: &'a str,
}

/// Line-delimited JSON over TCP: one request line out, one insight line
/// back.
pub struct TcpInsightService {
    addr: String,
}

impl TcpInsightService {
    pub fn new(addr: &str) -> Self {
        Self {
            addr: addr.to_string(),
        }
    }
}

impl InsightService for TcpInsightService {
    fn analyze(&mut self, title: &str, artist: &str, genre: &str) -> Result<TrackInsight> {
        let mut stream = TcpStream::connect(&self.addr)
            .with_context(|| format!("failed to connect to insight service at {}", self.addr))?;
        stream
            .set_read_timeout(Some(IO_TIMEOUT))
            .context("failed to set read timeout")?;
        stream
            .set_write_timeout(Some(IO_TIMEOUT))
            .context("failed to set write timeout")?;

        let request = InsightRequest {
            title,
            artist,
            genre,
        };
        let mut payload = serde_json::to_string(&request).context("failed to encode request")?;
        payload.push('\n');
        stream
            .write_all(payload.as_bytes())
            .context("failed to send insight request")?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .context("failed to read insight response")?;
        if read == 0 {
            anyhow::bail!("insight service closed the connection");
        }

        let insight: TrackInsight =
            serde_json::from_str(line.trim_end()).context("malformed insight response")?;
        Ok(insight)
    }
}

/// Best-effort analysis: any service failure, or no service at all,
/// degrades to the fixed fallback. Never errors.
pub fn analyze_or_fallback(
    service: Option<&mut dyn InsightService>,
    track: &Track,
) -> TrackInsight {
    match service {
        Some(service) => service
            .analyze(&track.title, &track.artist, &track.genre)
            .unwrap_or_else(|_| TrackInsight::fallback()),
        None => TrackInsight::fallback(),
    }
}
