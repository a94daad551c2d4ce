//! Sine-tone synthesizer for tests. Records each call's language code.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{PcmAudio, SpeechSynthesizer};
use crate::error::NaviResult;

#[derive(Default)]
pub struct ToneSynthesizer {
    languages: Mutex<Vec<String>>,
}

impl ToneSynthesizer {
    pub const SAMPLE_RATE: u32 = 24_000;
    pub const FRAMES: usize = 2_400;
    pub const FREQUENCY: f32 = 440.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.languages.lock().unwrap().len()
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }

    pub fn tone() -> PcmAudio {
        let samples = (0..Self::FRAMES)
            .map(|i| {
                let t = i as f32 / Self::SAMPLE_RATE as f32;
                0.5 * (2.0 * std::f32::consts::PI * Self::FREQUENCY * t).sin()
            })
            .collect();
        PcmAudio {
            samples,
            channels: 1,
            sample_rate: Self::SAMPLE_RATE,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ToneSynthesizer {
    async fn synthesize(&self, _text: &str, language: &str) -> NaviResult<PcmAudio> {
        self.languages.lock().unwrap().push(language.to_string());
        Ok(Self::tone())
    }
}
