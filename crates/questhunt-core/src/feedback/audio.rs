//! Audio cue resources.
//!
//! A session owns exactly one cue. The scheduler rewinds it before every
//! playback and releases it on teardown.

use std::io::Write;

use crate::error::AudioError;

/// A short sound that can be replayed from the start.
pub trait AudioCue: Send {
    /// Seek back to the beginning.
    fn rewind(&mut self) -> Result<(), AudioError>;

    /// Start playback from the current position.
    fn play(&mut self) -> Result<(), AudioError>;

    /// Stop any playback in progress.
    fn stop(&mut self);

    /// Free the underlying resource. Later calls to `play` fail.
    fn release(&mut self);
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct TerminalBell {
    released: bool,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioCue for TerminalBell {
    fn rewind(&mut self) -> Result<(), AudioError> {
        if self.released {
            return Err(AudioError::Released);
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.released {
            return Err(AudioError::Released);
        }
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }

    fn stop(&mut self) {}

    fn release(&mut self) {
        self.released = true;
    }
}

/// Plays nothing. Used when audio is disabled.
#[derive(Debug, Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn rewind(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self) {}

    fn release(&mut self) {}
}
