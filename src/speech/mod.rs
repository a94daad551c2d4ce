//! Speech rendering: text → synthesized voice → pitch-lowered WAV file.
//!
//! Components:
//! - `google`: Google Translate TTS client (MP3 chunks decoded with rodio)
//! - `pitch`: resampling pitch transform and WAV output (hound)
//! - `playback`: rodio playback that waits on the sink's end signal

pub mod google;
pub mod pitch;
pub mod playback;
#[cfg(test)]
pub mod tone;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{NaviError, NaviResult};

/// Decoded interleaved PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl PcmAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate.max(1) as f64
    }
}

/// Backend that turns text into audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// `language` is a two-letter code such as `en` or `fr`.
    async fn synthesize(&self, text: &str, language: &str) -> NaviResult<PcmAudio>;
}

pub struct SpeechRenderer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    pitch_ratio: f32,
    output_dir: Option<PathBuf>,
}

impl SpeechRenderer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, pitch_ratio: f32) -> Self {
        Self {
            synthesizer,
            pitch_ratio,
            output_dir: None,
        }
    }

    /// Write rendered files to `dir` instead of the system temp directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Synthesize `text`, lower its pitch and write it to a new temporary
    /// WAV file. Does not play anything.
    pub async fn render(&self, text: &str, language: &str) -> NaviResult<PathBuf> {
        if text.trim().is_empty() {
            return Err(NaviError::EmptyInput(
                "no text provided for audio conversion".into(),
            ));
        }

        let t_start = Instant::now();
        let audio = self.synthesizer.synthesize(text, language).await?;
        debug!(
            "Synthesized {:.1}s of audio at {}Hz ({} channels)",
            audio.duration_secs(),
            audio.sample_rate,
            audio.channels
        );

        let ratio = self.pitch_ratio;
        let output_dir = self.output_dir.clone();
        let path = tokio::task::spawn_blocking(move || {
            let lowered = pitch::lower_pitch(&audio, ratio);
            let path = new_temp_wav(output_dir.as_deref())?;
            pitch::write_wav(&path, &lowered)?;
            Ok::<_, NaviError>(path)
        })
        .await
        .map_err(|e| NaviError::Audio(format!("render task failed: {e}")))??;

        info!(
            "Rendered speech to {} ({:.0}ms)",
            path.display(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(path)
    }
}

fn new_temp_wav(dir: Option<&Path>) -> NaviResult<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("navi-").suffix(".wav");
    let file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.into_temp_path().keep().map_err(|e| NaviError::Io(e.error))
}
