//! Google Translate text-to-speech.
//!
//! The endpoint accepts short inputs only, so text is split into sentence
//! chunks of at most `chunk_chars` characters. Each chunk comes back as MP3,
//! is decoded with rodio, and the PCM is concatenated.

use std::io::Cursor;

use reqwest::Client;
use rodio::{Decoder, Source};
use tracing::{debug, warn};

use super::pitch::resample;
use super::{PcmAudio, SpeechSynthesizer};
use crate::config::SpeechConfig;
use crate::error::{NaviError, NaviResult};

pub struct GoogleTts {
    client: Client,
    host: String,
    chunk_chars: usize,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> NaviResult<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| NaviError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: config.host(),
            chunk_chars: config.chunk_chars.max(1),
        })
    }

    async fn fetch_chunk(&self, text: &str, language: &str, idx: usize, total: usize) -> NaviResult<Vec<u8>> {
        let url = format!("{}/translate_tts", self.host);
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = text.chars().count().to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", text),
                ("tl", language),
                ("client", "tw-ob"),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("TTS endpoint returned status {status}");
            return Err(NaviError::Upstream(format!("TTS returned {status}")));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> NaviResult<PcmAudio> {
        let chunks = split_chunks(text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(NaviError::EmptyInput("nothing to speak".into()));
        }

        let mut combined: Option<PcmAudio> = None;
        for (i, chunk) in chunks.iter().enumerate() {
            let mp3 = self.fetch_chunk(chunk, language, i, chunks.len()).await?;
            debug!("TTS chunk {}/{}: {} bytes", i + 1, chunks.len(), mp3.len());
            let decoded = tokio::task::spawn_blocking(move || decode_mp3(mp3))
                .await
                .map_err(|e| NaviError::Audio(format!("decode task failed: {e}")))??;
            combined = Some(match combined {
                None => decoded,
                Some(acc) => append_audio(acc, decoded)?,
            });
        }

        combined.ok_or_else(|| NaviError::EmptyInput("nothing to speak".into()))
    }
}

pub fn decode_mp3(bytes: Vec<u8>) -> NaviResult<PcmAudio> {
    let decoder = Decoder::new(Cursor::new(bytes))?;
    let channels: u16 = decoder.channels().into();
    let sample_rate: u32 = decoder.sample_rate().into();
    let samples: Vec<f32> = decoder.collect();
    Ok(PcmAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// Concatenate `next` onto `acc`, resampling it to `acc`'s rate if needed.
fn append_audio(mut acc: PcmAudio, next: PcmAudio) -> NaviResult<PcmAudio> {
    if next.channels != acc.channels {
        return Err(NaviError::Audio(format!(
            "channel count changed between chunks ({} → {})",
            acc.channels, next.channels
        )));
    }
    if next.sample_rate == acc.sample_rate {
        acc.samples.extend(next.samples);
    } else {
        let converted = resample(
            &next.samples,
            next.channels.max(1) as usize,
            next.sample_rate,
            acc.sample_rate,
        );
        acc.samples.extend(converted);
    }
    Ok(acc)
}

/// Split text into chunks of at most `max_chars` characters, breaking
/// between sentences where possible, then between words, then inside words.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in split_sentences(text).into_iter().flat_map(|s| split_long(s, max_chars)) {
        let needed = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + 1 + piece.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split text into sentences at .!? boundaries.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'.' || b == b'!' || b == b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            let end = i + 1;
            let s = text[start..end].trim();
            if !s.is_empty() {
                sentences.push(s);
            }
            start = end;
        }
    }

    let s = text[start..].trim();
    if !s.is_empty() {
        sentences.push(s);
    }
    sentences
}

/// Break one sentence into word-packed pieces no longer than `max_chars`.
fn split_long(sentence: &str, max_chars: usize) -> Vec<String> {
    if sentence.chars().count() <= max_chars {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            pieces.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let len = current.chars().count();
        if !current.is_empty() && len + 1 + word_len > max_chars {
            pieces.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
