//! Pitch lowering by resampling, and WAV output.
//!
//! The samples are reinterpreted as if recorded at `rate × ratio`, then
//! resampled back to `rate`. The result plays at the original sample rate
//! with every frequency scaled by `ratio`.

use std::path::Path;

use tracing::debug;

use super::PcmAudio;
use crate::error::NaviResult;

pub fn lower_pitch(audio: &PcmAudio, ratio: f32) -> PcmAudio {
    let spawned_rate = (audio.sample_rate as f64 * ratio as f64) as u32;
    if spawned_rate == 0 {
        return audio.clone();
    }
    let samples = resample(
        &audio.samples,
        audio.channels.max(1) as usize,
        spawned_rate,
        audio.sample_rate,
    );
    debug!(
        "Pitch ratio {ratio}: {} → {} frames at {}Hz",
        audio.frames(),
        samples.len() / audio.channels.max(1) as usize,
        audio.sample_rate
    );
    PcmAudio {
        samples,
        channels: audio.channels,
        sample_rate: audio.sample_rate,
    }
}

/// Linear-interpolation resampler over interleaved frames.
pub fn resample(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Vec<f32> {
    let frames = samples.len() / channels;
    if frames == 0 || from_rate == to_rate || from_rate == 0 {
        return samples.to_vec();
    }

    let from = from_rate as u64;
    let out_frames = ((frames as u64 * to_rate as u64 + from - 1) / from) as usize;
    let step = from_rate as f64 / to_rate as f64;

    let mut out = Vec::with_capacity(out_frames * channels);
    for i in 0..out_frames {
        let pos = i as f64 * step;
        let idx = (pos.floor() as usize).min(frames - 1);
        let next = (idx + 1).min(frames - 1);
        let frac = (pos - idx as f64) as f32;
        for c in 0..channels {
            let a = samples[idx * channels + c];
            let b = samples[next * channels + c];
            out.push(a + (b - a) * frac);
        }
    }
    out
}

/// Write 16-bit PCM WAV.
pub fn write_wav(path: &Path, audio: &PcmAudio) -> NaviResult<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &audio.samples {
        // f32 [-1, 1] → i16
        let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}
