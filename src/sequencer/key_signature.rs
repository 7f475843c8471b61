// Key signature - scale membership and edit filtering mode

/// Scale type selecting the interval pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    Major,
    Minor,
}

impl ScaleType {
    const MAJOR_INTERVALS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
    const MINOR_INTERVALS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

    /// Semitone offsets from the root
    pub fn intervals(&self) -> &'static [u8; 7] {
        match self {
            ScaleType::Major => &Self::MAJOR_INTERVALS,
            ScaleType::Minor => &Self::MINOR_INTERVALS,
        }
    }

    /// Resolve a control index; None for unknown values
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(ScaleType::Major),
            1 => Some(ScaleType::Minor),
            _ => None,
        }
    }
}

impl Default for ScaleType {
    fn default() -> Self {
        ScaleType::Major
    }
}

/// How out-of-key rows are treated by the editor
///
/// Highlight is advisory (display only); Lock rejects new activations
/// on out-of-key rows. Neither mode ever filters playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Highlight,
    Lock,
}

impl FilterMode {
    /// Resolve a control index; None for unknown values
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(FilterMode::Highlight),
            1 => Some(FilterMode::Lock),
            _ => None,
        }
    }
}

impl Default for FilterMode {
    fn default() -> Self {
        FilterMode::Highlight
    }
}

/// Current key: root pitch class, scale type, and filter mode, with the
/// derived set of in-key pitch classes
///
/// The scale is recomputed when the root or scale type changes and never
/// mutated directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    root_note: u8,
    scale_type: ScaleType,
    filter_mode: FilterMode,
    current_scale: [u8; 7],
}

impl KeySignature {
    /// C major, highlight mode
    pub fn new() -> Self {
        let mut key = Self {
            root_note: 0,
            scale_type: ScaleType::Major,
            filter_mode: FilterMode::Highlight,
            current_scale: [0; 7],
        };
        key.update_scale();
        key
    }

    /// Root pitch class, 0 = C
    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// The seven in-key pitch classes
    pub fn scale(&self) -> &[u8; 7] {
        &self.current_scale
    }

    /// Change the root pitch class; unchanged or out-of-range values
    /// are ignored
    pub fn set_root_note(&mut self, root_note: u8) {
        if root_note != self.root_note && root_note < 12 {
            self.root_note = root_note;
            self.update_scale();
        }
    }

    /// Change the scale type; an unchanged value is ignored
    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        if scale_type != self.scale_type {
            self.scale_type = scale_type;
            self.update_scale();
        }
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        self.filter_mode = filter_mode;
    }

    /// Check whether a note (modulo octave) belongs to the current scale
    pub fn is_in_key(&self, note: u8) -> bool {
        let pitch_class = note % 12;
        self.current_scale.contains(&pitch_class)
    }

    fn update_scale(&mut self) {
        let intervals = self.scale_type.intervals();
        for (slot, &interval) in self.current_scale.iter_mut().zip(intervals) {
            *slot = (self.root_note + interval) % 12;
        }
    }
}

impl Default for KeySignature {
    fn default() -> Self {
        Self::new()
    }
}
