//! Pull-based sample sequence returned by the drivers

use super::floating_ip::FloatingIpSamples;
use super::switch_port::SwitchPortSamples;
use crate::error::Result;
use crate::models::Sample;

enum Source {
    Empty,
    FloatingIp(Box<FloatingIpSamples>),
    SwitchPort(Box<SwitchPortSamples>),
}

/// Samples of one meter for one polling invocation.
///
/// Nothing is fetched before the first call to [`SampleStream::next`]. The
/// stream is finite and cannot be restarted: once it has returned the end or
/// an error, every further call returns `Ok(None)`. Ask the driver again for
/// a fresh fetch.
pub struct SampleStream {
    source: Source,
    finished: bool,
}

impl SampleStream {
    /// Stream with no samples, for meters a driver does not implement
    pub fn empty() -> Self {
        Self {
            source: Source::Empty,
            finished: true,
        }
    }

    pub(crate) fn floating_ip(samples: FloatingIpSamples) -> Self {
        Self {
            source: Source::FloatingIp(Box::new(samples)),
            finished: false,
        }
    }

    pub(crate) fn switch_port(samples: SwitchPortSamples) -> Self {
        Self {
            source: Source::SwitchPort(Box::new(samples)),
            finished: false,
        }
    }

    /// Next sample, `Ok(None)` at the end of the sequence.
    pub async fn next(&mut self) -> Result<Option<Sample>> {
        if self.finished {
            return Ok(None);
        }
        let next = match &mut self.source {
            Source::Empty => Ok(None),
            Source::FloatingIp(samples) => samples.next().await,
            Source::SwitchPort(samples) => samples.next().await,
        };
        if !matches!(next, Ok(Some(_))) {
            self.finished = true;
        }
        next
    }

    /// Drain the stream, failing on the first error.
    pub async fn collect(mut self) -> Result<Vec<Sample>> {
        let mut samples = Vec::new();
        while let Some(sample) = self.next().await? {
            samples.push(sample);
        }
        Ok(samples)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
