use indexmap::IndexMap;
use std::time::Duration;

/// Per-step durations for a single frame, kept in execution order.
#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    step_durations: IndexMap<&'static str, Duration>,
}

impl FrameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: &'static str, duration: Duration) {
        *self.step_durations.entry(step).or_default() += duration;
    }

    pub fn step_duration(&self, step: &str) -> Option<Duration> {
        self.step_durations.get(step).copied()
    }

    pub fn steps(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.step_durations.iter().map(|(name, d)| (*name, *d))
    }

    pub fn total(&self) -> Duration {
        self.step_durations.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_keep_insertion_order_and_accumulate() {
        let mut metrics = FrameMetrics::new();
        metrics.record("detect", Duration::from_micros(30));
        metrics.record("render", Duration::from_micros(5));
        metrics.record("detect", Duration::from_micros(10));
        let names: Vec<_> = metrics.steps().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["detect", "render"]);
        assert_eq!(metrics.step_duration("detect"), Some(Duration::from_micros(40)));
        assert_eq!(metrics.total(), Duration::from_micros(45));
    }
}
