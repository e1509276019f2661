//! Remembered strategy choices per `(length, precision)`.
//!
//! Wisdom is only consulted when a plan asks for [`KernelStrategy::Auto`], and
//! an entry whose strategy cannot serve its length is ignored at lookup time.
//! The text form is one `length precision strategy` triple per line, which is
//! what `to_text`/`from_text` exchange; file handling is left to the caller.

use core::fmt;
use core::str::FromStr;
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::error::ParseError;
use crate::kernels::KernelStrategy;
use crate::num::Precision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WisdomEntry {
    pub len: usize,
    pub precision: Precision,
    pub strategy: KernelStrategy,
}

impl fmt::Display for WisdomEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.len, self.precision, self.strategy)
    }
}

impl FromStr for WisdomEntry {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(len), Some(precision), Some(strategy), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::new("wisdom entry", s));
        };
        Ok(Self {
            len: len.parse().map_err(|_| ParseError::new("length", len))?,
            precision: precision.parse()?,
            strategy: strategy.parse()?,
        })
    }
}

#[derive(Default)]
pub struct Wisdom {
    map: RwLock<HashMap<(usize, Precision), KernelStrategy>>,
}

impl fmt::Debug for Wisdom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wisdom").field("entries", &self.len()).finish()
    }
}

impl Wisdom {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store consulted by plans that do not carry their own.
    pub fn global() -> &'static Arc<Wisdom> {
        static GLOBAL: OnceLock<Arc<Wisdom>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Wisdom::new()))
    }

    /// Remembers `strategy` for `(len, precision)`. `Auto` is not a choice and
    /// is ignored.
    pub fn record(&self, len: usize, precision: Precision, strategy: KernelStrategy) {
        if strategy == KernelStrategy::Auto {
            return;
        }
        self.map.write().insert((len, precision), strategy);
    }

    /// The stored strategy, if it can serve `len`.
    pub fn lookup(&self, len: usize, precision: Precision) -> Option<KernelStrategy> {
        self.map
            .read()
            .get(&(len, precision))
            .copied()
            .filter(|s| s.fits(len))
    }

    pub fn forget(&self, len: usize, precision: Precision) -> Option<KernelStrategy> {
        self.map.write().remove(&(len, precision))
    }

    pub fn clear(&self) {
        self.map.write().clear();
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Every entry, sorted by length then precision.
    pub fn export(&self) -> Vec<WisdomEntry> {
        let mut out: Vec<_> = self
            .map
            .read()
            .iter()
            .map(|(&(len, precision), &strategy)| WisdomEntry {
                len,
                precision,
                strategy,
            })
            .collect();
        out.sort();
        out
    }

    /// Merges `entries`, later entries winning over existing ones.
    pub fn import(&self, entries: &[WisdomEntry]) {
        let mut map = self.map.write();
        for e in entries {
            if e.strategy != KernelStrategy::Auto {
                map.insert((e.len, e.precision), e.strategy);
            }
        }
        crate::trace!("wisdom import: {} entries, {} stored", entries.len(), map.len());
    }

    pub fn to_text(&self) -> String {
        let mut s = String::new();
        for e in self.export() {
            s.push_str(&e.to_string());
            s.push('\n');
        }
        s
    }

    /// Parses and imports the text form. Blank lines and `#` comments are
    /// skipped; nothing is imported if any line fails to parse.
    pub fn from_text(&self, text: &str) -> Result<usize, ParseError> {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::parse::<WisdomEntry>)
            .collect::<Result<Vec<_>, _>>()?;
        self.import(&entries);
        Ok(entries.len())
    }
}
