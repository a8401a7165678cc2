//! Sound modes and the cue bank.
//!
//! Decoding and playback live in the binary; this module decides which
//! recognized cue, if any, a request maps to.

use crate::sinks::CuePlayer;
use crate::types::{CueToken, PhaseKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which cues are audible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundMode {
    /// Never plays
    #[default]
    None,
    /// Phase names only
    Words,
    /// Countdown digits only
    Numbers,
    /// Phase names and digits
    All,
}

impl SoundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundMode::None => "none",
            SoundMode::Words => "words",
            SoundMode::Numbers => "numbers",
            SoundMode::All => "all",
        }
    }

    /// Whether any cue can play in this mode
    pub fn is_audible(&self) -> bool {
        *self != SoundMode::None
    }

    pub fn allows(&self, cue: &CueToken) -> bool {
        match self {
            SoundMode::None => false,
            SoundMode::Words => cue.is_word(),
            SoundMode::Numbers => cue.is_number(),
            SoundMode::All => true,
        }
    }
}

impl FromStr for SoundMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SoundMode::None),
            "words" => Ok(SoundMode::Words),
            "numbers" => Ok(SoundMode::Numbers),
            "all" => Ok(SoundMode::All),
            other => Err(Error::Config(format!(
                "unknown sound mode '{}' (expected none|words|numbers|all)",
                other
            ))),
        }
    }
}

impl fmt::Display for SoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every cue that has a sound asset
pub fn recognized_cues() -> Vec<CueToken> {
    let mut cues = vec![
        CueToken::Phase(PhaseKind::Inhale),
        CueToken::Phase(PhaseKind::Exhale),
        CueToken::Phase(PhaseKind::Hold),
    ];
    cues.extend((1..=9).map(CueToken::Count));
    cues
}

/// Asset file for a cue, e.g. `inhale.mp3` or `3.mp3`
pub fn asset_file_name(cue: &CueToken) -> String {
    format!("{}.mp3", cue.name().to_lowercase())
}

/// Asset paths for every recognized cue the mode can play
pub fn required_assets(dir: &Path, mode: SoundMode) -> Vec<(CueToken, PathBuf)> {
    recognized_cues()
        .into_iter()
        .filter(|cue| mode.allows(cue))
        .map(|cue| {
            let path = dir.join(asset_file_name(&cue));
            (cue, path)
        })
        .collect()
}

/// Loaded clips keyed by cue, filtered by sound mode
#[derive(Clone, Debug)]
pub struct CueBank<C> {
    mode: SoundMode,
    clips: HashMap<CueToken, C>,
}

impl<C> CueBank<C> {
    pub fn new(mode: SoundMode) -> Self {
        Self {
            mode,
            clips: HashMap::new(),
        }
    }

    /// Load a clip for every asset the mode needs
    ///
    /// The first failing asset aborts loading.
    pub fn load<F>(dir: &Path, mode: SoundMode, mut decode: F) -> Result<Self>
    where
        F: FnMut(&Path) -> Result<C>,
    {
        let mut bank = Self::new(mode);
        for (cue, path) in required_assets(dir, mode) {
            if !path.exists() {
                return Err(Error::Audio(format!(
                    "missing sound asset {}",
                    path.display()
                )));
            }
            let clip = decode(&path)?;
            tracing::debug!("Loaded cue {} from {:?}", cue, path);
            bank.insert(cue, clip);
        }
        Ok(bank)
    }

    pub fn mode(&self) -> SoundMode {
        self.mode
    }

    pub fn insert(&mut self, cue: CueToken, clip: C) {
        self.clips.insert(cue, clip);
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clip to play for a request, if the mode allows it and it is known
    pub fn select(&self, cue: &CueToken) -> Option<&C> {
        if !self.mode.allows(cue) {
            return None;
        }
        self.clips.get(cue)
    }
}

/// Cue player used when sound is off
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl CuePlayer for Silent {
    fn request_cue(&mut self, _cue: &CueToken) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bank(mode: SoundMode) -> CueBank<String> {
        let mut bank = CueBank::new(mode);
        for cue in recognized_cues() {
            bank.insert(cue, cue.name());
        }
        bank
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("none".parse::<SoundMode>().unwrap(), SoundMode::None);
        assert_eq!("Words".parse::<SoundMode>().unwrap(), SoundMode::Words);
        assert_eq!("numbers".parse::<SoundMode>().unwrap(), SoundMode::Numbers);
        assert_eq!("all".parse::<SoundMode>().unwrap(), SoundMode::All);
        assert!("some".parse::<SoundMode>().is_err());
    }

    #[test]
    fn test_mode_filtering() {
        let inhale = CueToken::Phase(PhaseKind::Inhale);
        let three = CueToken::Count(3);

        assert!(bank(SoundMode::None).select(&inhale).is_none());
        assert!(bank(SoundMode::Words).select(&inhale).is_some());
        assert!(bank(SoundMode::Words).select(&three).is_none());
        assert!(bank(SoundMode::Numbers).select(&three).is_some());
        assert!(bank(SoundMode::Numbers).select(&inhale).is_none());
        assert!(bank(SoundMode::All).select(&three).is_some());
    }

    #[test]
    fn test_unrecognized_cue_is_ignored() {
        assert!(bank(SoundMode::All).select(&CueToken::Count(12)).is_none());
        assert!(bank(SoundMode::All).select(&CueToken::Count(0)).is_none());
    }

    #[test]
    fn test_asset_names() {
        assert_eq!(
            asset_file_name(&CueToken::Phase(PhaseKind::Inhale)),
            "inhale.mp3"
        );
        assert_eq!(asset_file_name(&CueToken::Count(7)), "7.mp3");
    }

    #[test]
    fn test_required_assets_follow_mode() {
        let dir = Path::new("/sounds");
        assert!(required_assets(dir, SoundMode::None).is_empty());
        assert_eq!(required_assets(dir, SoundMode::Words).len(), 3);
        assert_eq!(required_assets(dir, SoundMode::Numbers).len(), 9);
        assert_eq!(required_assets(dir, SoundMode::All).len(), 12);
    }

    #[test]
    fn test_load_fails_on_missing_asset() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("inhale.mp3"), b"x").unwrap();

        let result = CueBank::<()>::load(dir.path(), SoundMode::Words, |_| Ok(()));
        assert!(matches!(result, Err(Error::Audio(_))));
    }

    #[test]
    fn test_load_propagates_decode_error() {
        let dir = TempDir::new().unwrap();
        for name in ["inhale.mp3", "exhale.mp3", "hold.mp3"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let result = CueBank::<()>::load(dir.path(), SoundMode::Words, |path| {
            Err(Error::Audio(format!("cannot decode {}", path.display())))
        });
        assert!(result.is_err());

        let bank = CueBank::load(dir.path(), SoundMode::Words, |path| {
            Ok(path.to_path_buf())
        })
        .unwrap();
        assert_eq!(bank.len(), 3);
    }

    #[test]
    fn test_load_with_mode_none_needs_nothing() {
        let dir = TempDir::new().unwrap();
        let bank = CueBank::<()>::load(dir.path(), SoundMode::None, |_| Ok(())).unwrap();
        assert!(bank.is_empty());
    }
}
