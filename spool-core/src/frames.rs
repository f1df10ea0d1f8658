//! Frame set expressions
//!
//! A frame expression is a comma-separated list of chunks:
//! - `N` - a single frame
//! - `A-B` - every frame from A to B (either direction)
//! - `A-BxS` - every S-th frame starting at A
//! - `A-ByS` - the frames of `A-B` that `A-BxS` leaves out
//! - `A-B:S` - every frame of `A-B`, staggered by S
//!
//! Frames are kept sorted and unique, so the first frame of a set is its
//! lowest frame regardless of how the expression was written.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a frame expression
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameRangeError {
    /// The expression contained no frames at all
    #[error("frame range is empty")]
    Empty,

    /// A chunk could not be parsed
    #[error("invalid frame range chunk '{0}'")]
    InvalidChunk(String),

    /// A stepped chunk used a step of zero or less
    #[error("invalid step {step} in frame range chunk '{chunk}'")]
    InvalidStep { chunk: String, step: i32 },

    /// A chunk spans more frames than a single layer may hold
    #[error("frame range chunk '{chunk}' spans more than {limit} frames")]
    TooManyFrames { chunk: String, limit: u32 },
}

/// Largest span a single chunk may cover
pub const MAX_CHUNK_FRAMES: u32 = 1_000_000;

/// A resolved, ordered set of frame numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSet {
    frames: Vec<i32>,
}

impl FrameSet {
    /// Parses a frame expression such as `1-10`, `1-100x5` or `1,3,5-7`
    pub fn parse(expr: &str) -> Result<Self, FrameRangeError> {
        let mut frames = BTreeSet::new();

        for chunk in expr.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            parse_chunk(chunk, &mut frames)?;
        }

        if frames.is_empty() {
            return Err(FrameRangeError::Empty);
        }

        Ok(Self {
            frames: frames.into_iter().collect(),
        })
    }

    /// Returns the frames present in both sets
    pub fn intersection(&self, other: &FrameSet) -> FrameSet {
        let other: BTreeSet<i32> = other.frames.iter().copied().collect();
        FrameSet {
            frames: self
                .frames
                .iter()
                .copied()
                .filter(|f| other.contains(f))
                .collect(),
        }
    }

    /// Lowest frame in the set
    pub fn first(&self) -> Option<i32> {
        self.frames.first().copied()
    }

    pub fn last(&self) -> Option<i32> {
        self.frames.last().copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, frame: i32) -> bool {
        self.frames.binary_search(&frame).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.frames.iter().copied()
    }
}

impl FromStr for FrameSet {
    type Err = FrameRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FrameSet {
    /// Writes the set back as a compact expression (`1-10`, `1-9x2`, `4,12`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frames = &self.frames;
        let mut parts = Vec::new();
        let mut i = 0;

        while i < frames.len() {
            let start = frames[i];

            if i + 1 < frames.len() {
                let step = frames[i + 1].abs_diff(start);
                let mut end = i + 1;
                while end + 1 < frames.len() && frames[end + 1].abs_diff(frames[end]) == step {
                    end += 1;
                }

                if step == 1 {
                    parts.push(format!("{}-{}", start, frames[end]));
                    i = end + 1;
                    continue;
                }
                if end - i >= 2 {
                    parts.push(format!("{}-{}x{}", start, frames[end], step));
                    i = end + 1;
                    continue;
                }
            }

            parts.push(start.to_string());
            i += 1;
        }

        write!(f, "{}", parts.join(","))
    }
}

fn parse_chunk(chunk: &str, frames: &mut BTreeSet<i32>) -> Result<(), FrameRangeError> {
    let invalid = || FrameRangeError::InvalidChunk(chunk.to_string());

    let (start, rest) = take_int(chunk).ok_or_else(invalid)?;
    if rest.is_empty() {
        frames.insert(start);
        return Ok(());
    }

    let rest = rest.strip_prefix('-').ok_or_else(invalid)?;
    let (end, rest) = take_int(rest).ok_or_else(invalid)?;

    let (modifier, step) = match rest.chars().next() {
        None => (None, 1),
        Some(m @ ('x' | 'y' | ':')) => {
            let step: i32 = rest[1..].parse().map_err(|_| invalid())?;
            (Some(m), step)
        }
        Some(_) => return Err(invalid()),
    };

    if step <= 0 {
        return Err(FrameRangeError::InvalidStep {
            chunk: chunk.to_string(),
            step,
        });
    }

    let (low, high) = if start <= end { (start, end) } else { (end, start) };
    if high.abs_diff(low) >= MAX_CHUNK_FRAMES {
        return Err(FrameRangeError::TooManyFrames {
            chunk: chunk.to_string(),
            limit: MAX_CHUNK_FRAMES,
        });
    }

    let step = step.unsigned_abs();
    let stepped = |frame: i32| frame.abs_diff(start) % step == 0;

    for frame in low..=high {
        let keep = match modifier {
            Some('x') => stepped(frame),
            Some('y') => !stepped(frame),
            _ => true,
        };
        if keep {
            frames.insert(frame);
        }
    }

    Ok(())
}

/// Splits a leading, optionally negative integer off `input`
fn take_int(input: &str) -> Option<(i32, &str)> {
    let sign_len = usize::from(input.starts_with('-'));
    let digits = input[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len() - sign_len);
    if digits == 0 {
        return None;
    }

    let (number, rest) = input.split_at(sign_len + digits);
    number.parse().ok().map(|n| (n, rest))
}
