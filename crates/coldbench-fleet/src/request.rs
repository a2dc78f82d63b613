//! Run request: which action, on which provider, for which replicas

use crate::error::{FleetError, Result};
use coldbench_cloud::{FleetAction, ProviderKind, ReplicaId};
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Half-open range `[start, end)` of replica indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaRange {
    start: u32,
    end: u32,
}

impl ReplicaRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(FleetError::configuration(format!(
                "range start {} is greater than end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Consecutive batches of at most `size` replicas; the last one may be shorter
    pub fn batches(&self, size: NonZeroUsize) -> Batches {
        Batches {
            next: self.start,
            end: self.end,
            size: u32::try_from(size.get()).unwrap_or(u32::MAX),
        }
    }
}

impl FromStr for ReplicaRange {
    type Err = FleetError;

    /// Parse `<start>_<end>`, e.g. `0_300`
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || {
            FleetError::configuration(format!(
                "invalid range '{}': expected <start>_<end> with non-negative integers",
                s
            ))
        };

        let (start, end) = s.trim().split_once('_').ok_or_else(malformed)?;
        let start = start.trim().parse::<u32>().map_err(|_| malformed())?;
        let end = end.trim().parse::<u32>().map_err(|_| malformed())?;
        Self::new(start, end)
    }
}

impl std::fmt::Display for ReplicaRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.start, self.end)
    }
}

/// Iterator returned by [`ReplicaRange::batches`]
#[derive(Debug, Clone)]
pub struct Batches {
    next: u32,
    end: u32,
    size: u32,
}

impl Iterator for Batches {
    type Item = Vec<ReplicaId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let stop = self.next.saturating_add(self.size).min(self.end);
        let batch = (self.next..stop).map(ReplicaId).collect();
        self.next = stop;
        Some(batch)
    }
}

/// Everything one run needs, fixed before the first dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: FleetAction,
    pub provider: ProviderKind,
    pub range: ReplicaRange,
    pub concurrency: NonZeroUsize,
}

impl ActionRequest {
    pub fn new(
        action: FleetAction,
        provider: ProviderKind,
        range: ReplicaRange,
        concurrency: usize,
    ) -> Result<Self> {
        let concurrency = NonZeroUsize::new(concurrency)
            .ok_or_else(|| FleetError::configuration("concurrency must be at least 1"))?;

        Ok(Self {
            action,
            provider,
            range,
            concurrency,
        })
    }

    /// Build a request from raw command-line values
    ///
    /// Every malformed value is reported as [`FleetError::Configuration`].
    pub fn parse(action: &str, provider: &str, range: &str, concurrency: usize) -> Result<Self> {
        let action = action
            .parse::<FleetAction>()
            .map_err(|e| FleetError::configuration(e.to_string()))?;
        let provider = provider
            .parse::<ProviderKind>()
            .map_err(|e| FleetError::configuration(e.to_string()))?;
        let range = range.parse::<ReplicaRange>()?;

        Self::new(action, provider, range, concurrency)
    }

    /// Number of batches the run will go through
    pub fn batch_count(&self) -> usize {
        self.range.len().div_ceil(self.concurrency.get())
    }
}
