//! Aspect ratio configuration

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Serialize;

/// A named output size, eg `9x16` -> 576x1024.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct AspectRatioSpec {
    /// Ratio identifier, used for directory and file names.
    pub name: String,
    /// Canvas width in pixels.
    pub width: NonZeroU32,
    /// Canvas height in pixels.
    pub height: NonZeroU32,
}

impl AspectRatioSpec {
    /// Builds a spec, returns `None` when either side is zero.
    pub fn new(name: &str, width: u32, height: u32) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    /// `(width, height)` as plain integers.
    pub fn size(&self) -> (u32, u32) {
        (self.width.get(), self.height.get())
    }

    /// Human readable dimensions, eg `1024x576`.
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Errors returned when parsing a `NAME=WIDTHxHEIGHT` ratio argument.
#[derive(Debug, Eq, PartialEq)]
pub enum RatioParseError {
    /// No `=` separator, or an empty name.
    MissingName(String),
    /// The size part wasn't `WIDTHxHEIGHT`.
    InvalidSize(String),
    /// Width or height was zero.
    ZeroDimension(String),
}

impl fmt::Display for RatioParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName(input) => {
                write!(f, "Expected NAME=WIDTHxHEIGHT, got {input:?}")
            }
            Self::InvalidSize(input) => write!(f, "Invalid size in ratio {input:?}"),
            Self::ZeroDimension(input) => write!(f, "Ratio {input:?} has a zero dimension"),
        }
    }
}

impl std::error::Error for RatioParseError {}

impl FromStr for AspectRatioSpec {
    type Err = RatioParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, size) = input
            .split_once('=')
            .ok_or_else(|| RatioParseError::MissingName(input.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RatioParseError::MissingName(input.to_string()));
        }
        let (width, height) = size
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| RatioParseError::InvalidSize(input.to_string()))?;
        let width: u32 = width
            .trim()
            .parse()
            .map_err(|_| RatioParseError::InvalidSize(input.to_string()))?;
        let height: u32 = height
            .trim()
            .parse()
            .map_err(|_| RatioParseError::InvalidSize(input.to_string()))?;
        Self::new(name, width, height)
            .ok_or_else(|| RatioParseError::ZeroDimension(input.to_string()))
    }
}

/// Ordered table of output ratios. Order is the processing and listing order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatioTable {
    specs: Vec<AspectRatioSpec>,
}

impl RatioTable {
    /// Builds a table, later entries replace earlier ones with the same name.
    pub fn new(specs: impl IntoIterator<Item = AspectRatioSpec>) -> Self {
        let mut table = Self { specs: Vec::new() };
        for spec in specs {
            table.insert(spec);
        }
        table
    }

    /// Adds a spec, or replaces the size of an existing one in place.
    pub fn insert(&mut self, spec: AspectRatioSpec) {
        match self.specs.iter_mut().find(|existing| existing.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    /// Looks up a ratio by name.
    pub fn get(&self, name: &str) -> Option<&AspectRatioSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Iterates in table order.
    pub fn iter(&self) -> impl Iterator<Item = &AspectRatioSpec> {
        self.specs.iter()
    }

    /// Number of configured ratios.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for RatioTable {
    /// The square / story / landscape trio.
    fn default() -> Self {
        Self::new(
            [("1x1", 1024, 1024), ("9x16", 576, 1024), ("16x9", 1024, 576)]
                .into_iter()
                .filter_map(|(name, width, height)| AspectRatioSpec::new(name, width, height)),
        )
    }
}
