//! Latency statistics over repeated samples of the same call.

use std::time::Duration;

use serde::Serialize;

use crate::error::CheckError;

#[derive(Default)]
struct RunningStats {
    count: u64,
    mean: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }
}

/// Min/avg/max of a set of latency samples, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: u64,
    pub min_secs: f64,
    pub avg_secs: f64,
    pub max_secs: f64,
}

impl LatencySummary {
    pub fn from_samples(samples: &[Duration]) -> Result<Self, CheckError> {
        if samples.is_empty() {
            return Err(CheckError::Internal("no latency samples collected".to_string()));
        }

        let mut stats = RunningStats::default();
        for sample in samples {
            stats.add(sample.as_secs_f64());
        }

        Ok(Self {
            count: stats.count,
            min_secs: stats.min,
            avg_secs: stats.mean,
            max_secs: stats.max,
        })
    }

    pub fn average(&self) -> Duration {
        Duration::from_secs_f64(self.avg_secs)
    }
}
