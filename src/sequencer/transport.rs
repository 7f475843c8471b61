// Transport - playback state and the host position snapshot

/// Playback state of the step timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

impl PlayState {
    /// Check if the timer is running
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayState::Playing)
    }
}

impl Default for PlayState {
    fn default() -> Self {
        PlayState::Stopped
    }
}

/// Host transport position, delivered once per audio block
///
/// `ppq_position` is the host playhead in quarter notes; it may move
/// discontinuously (seek, loop, start), which the timer detects and
/// corrects for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportSnapshot {
    pub bpm: f64,
    pub time_sig_numerator: u8,
    pub time_sig_denominator: u8,
    pub ppq_position: f64,
    pub is_playing: bool,
}

impl TransportSnapshot {
    /// A playing snapshot at the given tempo and position, 4/4
    pub fn playing(bpm: f64, ppq_position: f64) -> Self {
        Self {
            bpm,
            ppq_position,
            is_playing: true,
            ..Self::default()
        }
    }

    /// A stopped snapshot at the given tempo, 4/4
    pub fn stopped(bpm: f64) -> Self {
        Self {
            bpm,
            ..Self::default()
        }
    }
}

impl Default for TransportSnapshot {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            time_sig_numerator: 4,
            time_sig_denominator: 4,
            ppq_position: 0.0,
            is_playing: false,
        }
    }
}
