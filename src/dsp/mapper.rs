//! Linear rescaling of raw control readings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Parameter Mapping
=================

Knobs arrive as raw ADC readings (0..=1023). Every control line needs them in
its own units: milliseconds for release, 0..=255 for filter cutoff, and so on.

    out = out_min + (out_max - out_min) * (raw - in_min) / (in_max - in_min)

The division is integer and truncates toward zero, so both endpoints map
exactly and the result is monotonic in `raw`.

Inverted ranges are legal and common: with out_min > out_max turning the knob
up lowers the value (e.g. "more knob, shorter release").

Readings outside [in_min, in_max] are clamped before mapping. A noisy pot
that reports 1024 must not produce a cutoff outside the table.


Auto-ranging
------------

Real pots rarely reach both rails. `AutoMap` tracks the smallest and largest
reading seen so far and maps that observed span onto the output, so a pot that
only travels 40..980 still sweeps the full output range. The tracker starts
inverted (min at the expected maximum and vice versa). Each reading moves at
most one bound: a new maximum is checked first, and only a reading that is not
a new maximum can lower the minimum. So the very first reading raises the max
alone, leaving the span still inverted, and maps to out_max.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterMap {
    pub in_min: i32,
    pub in_max: i32,
    pub out_min: i32,
    pub out_max: i32,
}

impl ParameterMap {
    pub const fn new(in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> Self {
        Self {
            in_min,
            in_max,
            out_min,
            out_max,
        }
    }

    /// Map `raw` into the output range. A degenerate input range yields `out_min`.
    #[inline]
    pub fn map(&self, raw: i32) -> i32 {
        map_range(raw, self.in_min, self.in_max, self.out_min, self.out_max)
    }

    pub fn is_inverted(&self) -> bool {
        self.out_min > self.out_max
    }
}

#[inline]
fn map_range(raw: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    if in_min == in_max {
        return out_min;
    }

    let raw = raw.clamp(in_min.min(in_max), in_min.max(in_max)) as i64;
    let (in_min, in_max) = (in_min as i64, in_max as i64);
    let (out_min, out_max) = (out_min as i64, out_max as i64);

    (out_min + (out_max - out_min) * (raw - in_min) / (in_max - in_min)) as i32
}

/// Running min/max of the readings seen on one control line.
#[derive(Debug, Clone, Copy)]
pub struct AutoRange {
    min: i32,
    max: i32,
}

impl AutoRange {
    pub fn new(expected_min: i32, expected_max: i32) -> Self {
        Self {
            min: expected_max,
            max: expected_min,
        }
    }

    /// Widen one bound with `raw`. The max takes priority.
    #[inline]
    pub fn observe(&mut self, raw: i32) {
        if raw > self.max {
            self.max = raw;
        } else if raw < self.min {
            self.min = raw;
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn span(&self) -> i32 {
        self.max.saturating_sub(self.min).max(0)
    }
}

/// Maps readings from their observed range onto a fixed output range.
#[derive(Debug, Clone, Copy)]
pub struct AutoMap {
    range: AutoRange,
    out_min: i32,
    out_max: i32,
}

impl AutoMap {
    pub fn new(expected: ParameterMap) -> Self {
        Self {
            range: AutoRange::new(expected.in_min, expected.in_max),
            out_min: expected.out_min,
            out_max: expected.out_max,
        }
    }

    /// Widen the observed range with `raw`, then map it.
    #[inline]
    pub fn next(&mut self, raw: i32) -> i32 {
        self.range.observe(raw);
        map_range(
            raw,
            self.range.min(),
            self.range.max(),
            self.out_min,
            self.out_max,
        )
    }

    pub fn range(&self) -> &AutoRange {
        &self.range
    }
}

/// Per-line choice between a fixed and an auto-ranging map.
#[derive(Debug, Clone, Copy)]
pub enum ControlMapping {
    Fixed(ParameterMap),
    Auto(AutoMap),
}

impl ControlMapping {
    pub fn new(map: ParameterMap, auto_range: bool) -> Self {
        if auto_range {
            Self::Auto(AutoMap::new(map))
        } else {
            Self::Fixed(map)
        }
    }

    #[inline]
    pub fn next(&mut self, raw: i32) -> i32 {
        match self {
            Self::Fixed(map) => map.map(raw),
            Self::Auto(map) => map.next(raw),
        }
    }
}
