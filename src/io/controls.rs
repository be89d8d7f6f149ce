//! Raw control-line readings.
//!
//! The voice reads four pots as integers in `0..=RAW_MAX`. How those numbers
//! are acquired (ADC, MIDI CC, a UI slider) is up to the host; the engine
//! only sees a [`ControlSource`].

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest raw reading (10-bit ADC).
pub const RAW_MAX: u16 = 1023;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLine {
    Release,
    ModSpeed,
    Intensity,
    FilterCutoff,
}

impl ControlLine {
    pub const ALL: [ControlLine; 4] = [
        ControlLine::Release,
        ControlLine::ModSpeed,
        ControlLine::Intensity,
        ControlLine::FilterCutoff,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            ControlLine::Release => 0,
            ControlLine::ModSpeed => 1,
            ControlLine::Intensity => 2,
            ControlLine::FilterCutoff => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlLine::Release => "release",
            ControlLine::ModSpeed => "mod speed",
            ControlLine::Intensity => "intensity",
            ControlLine::FilterCutoff => "cutoff",
        }
    }
}

/// Anything the control update can sample raw readings from.
pub trait ControlSource {
    fn read(&self, line: ControlLine) -> u16;
}

impl<T: ControlSource + ?Sized> ControlSource for &T {
    fn read(&self, line: ControlLine) -> u16 {
        (**self).read(line)
    }
}

impl<T: ControlSource + ?Sized> ControlSource for Arc<T> {
    fn read(&self, line: ControlLine) -> u16 {
        (**self).read(line)
    }
}

/// A plain snapshot of all four lines.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlReadings {
    pub release: u16,
    pub mod_speed: u16,
    pub intensity: u16,
    pub filter_cutoff: u16,
}

impl ControlReadings {
    /// Every pot at the same position.
    pub const fn uniform(raw: u16) -> Self {
        Self {
            release: raw,
            mod_speed: raw,
            intensity: raw,
            filter_cutoff: raw,
        }
    }

    pub fn set(&mut self, line: ControlLine, raw: u16) {
        let raw = raw.min(RAW_MAX);
        match line {
            ControlLine::Release => self.release = raw,
            ControlLine::ModSpeed => self.mod_speed = raw,
            ControlLine::Intensity => self.intensity = raw,
            ControlLine::FilterCutoff => self.filter_cutoff = raw,
        }
    }
}

impl Default for ControlReadings {
    /// Pots centred.
    fn default() -> Self {
        Self::uniform(RAW_MAX / 2 + 1)
    }
}

impl ControlSource for ControlReadings {
    fn read(&self, line: ControlLine) -> u16 {
        match line {
            ControlLine::Release => self.release,
            ControlLine::ModSpeed => self.mod_speed,
            ControlLine::Intensity => self.intensity,
            ControlLine::FilterCutoff => self.filter_cutoff,
        }
    }
}

/// Lock-free panel of readings shared between a writer (UI, ADC poller)
/// and the thread running control updates.
///
/// Each line is its own atomic, so a reader never sees a torn value and never
/// waits on the writer. Lines are independent; no cross-line snapshot
/// consistency is promised.
#[derive(Debug)]
pub struct ControlPanel {
    lines: [AtomicU16; 4],
}

impl ControlPanel {
    pub fn new(initial: ControlReadings) -> Self {
        Self {
            lines: [
                AtomicU16::new(initial.release),
                AtomicU16::new(initial.mod_speed),
                AtomicU16::new(initial.intensity),
                AtomicU16::new(initial.filter_cutoff),
            ],
        }
    }

    /// Store a reading, clamped to `RAW_MAX`.
    #[inline]
    pub fn set(&self, line: ControlLine, raw: u16) {
        self.lines[line.index()].store(raw.min(RAW_MAX), Ordering::Release);
    }

    /// Move a line by `delta`, staying inside `0..=RAW_MAX`. Returns the new value.
    pub fn nudge(&self, line: ControlLine, delta: i32) -> u16 {
        let current = self.read(line) as i32;
        let next = (current + delta).clamp(0, RAW_MAX as i32) as u16;
        self.set(line, next);
        next
    }

    pub fn snapshot(&self) -> ControlReadings {
        ControlReadings {
            release: self.read(ControlLine::Release),
            mod_speed: self.read(ControlLine::ModSpeed),
            intensity: self.read(ControlLine::Intensity),
            filter_cutoff: self.read(ControlLine::FilterCutoff),
        }
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(ControlReadings::default())
    }
}

impl ControlSource for ControlPanel {
    #[inline]
    fn read(&self, line: ControlLine) -> u16 {
        self.lines[line.index()].load(Ordering::Acquire)
    }
}
