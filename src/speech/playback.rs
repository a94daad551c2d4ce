//! Local playback of rendered speech through rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::info;

use crate::error::{NaviError, NaviResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct AudioPlayer;

impl AudioPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Play an audio file and resolve once the sink reports it has drained.
    pub async fn play_file(&self, path: &Path) -> NaviResult<Duration> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || play_blocking(&path))
            .await
            .map_err(|e| NaviError::Audio(format!("playback task failed: {e}")))?
    }
}

fn play_blocking(path: &Path) -> NaviResult<Duration> {
    let t0 = Instant::now();
    let file = File::open(path)?;
    let source = Decoder::new(BufReader::new(file))?;

    // The output stream lives only as long as this call.
    let stream = OutputStreamBuilder::open_default_stream()?;
    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.sleep_until_end();

    let elapsed = t0.elapsed();
    info!("Played {} ({:.1}s)", path.display(), elapsed.as_secs_f64());
    Ok(elapsed)
}
