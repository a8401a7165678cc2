//! Cue playback through rodio.

use breath_core::{CueBank, CuePlayer, CueToken, Error, Result, SoundMode};
use rodio::{buffer::SamplesBuffer, Decoder, OutputStream, OutputStreamHandle, Source};
use std::io::Cursor;
use std::path::Path;

/// A decoded cue kept in memory
#[derive(Clone, Debug)]
pub struct Clip {
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl Clip {
    pub fn decode(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let decoder = Decoder::new(Cursor::new(bytes))
            .map_err(|e| Error::Audio(format!("cannot decode {}: {}", path.display(), e)))?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();
        if samples.is_empty() {
            return Err(Error::Audio(format!("{} contains no audio", path.display())));
        }
        Ok(Self {
            channels,
            sample_rate,
            samples,
        })
    }

    fn source(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.clone())
    }
}

/// Default output device
///
/// `OutputStream` is not `Send`, so this stays on the main thread and must
/// outlive every `Speaker` made from it.
pub struct AudioOutput {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    pub fn open() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| Error::Audio(format!("cannot open audio output: {}", e)))?;
        tracing::info!("Audio output opened");
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Decode every asset `mode` needs and bind them to this output
    pub fn speaker(&self, assets_dir: &Path, mode: SoundMode) -> Result<Speaker> {
        let bank = CueBank::load(assets_dir, mode, Clip::decode)?;
        tracing::info!("Loaded {} cues from {:?} ({})", bank.len(), assets_dir, mode);
        Ok(Speaker {
            handle: self.handle.clone(),
            bank,
        })
    }
}

/// Mixes cues into the output stream; a new cue does not cut off the last
pub struct Speaker {
    handle: OutputStreamHandle,
    bank: CueBank<Clip>,
}

impl CuePlayer for Speaker {
    fn request_cue(&mut self, cue: &CueToken) {
        let Some(clip) = self.bank.select(cue) else {
            return;
        };
        if let Err(e) = self.handle.play_raw(clip.source().convert_samples()) {
            tracing::warn!("Failed to play cue {}: {}", cue, e);
        }
    }
}
