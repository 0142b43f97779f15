use std::time::{Duration, Instant};

/// Wall-clock time per flow step, in the order the steps ran.
#[derive(Debug, Clone)]
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: Vec<(String, Instant)>,
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: Vec::new(),
            phase_durations: Vec::new(),
        }
    }

    /// Marks the start of a step.
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times
            .push((phase_name.to_string(), Instant::now()));
    }

    /// Closes a step opened with `start_phase`.
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let index = self
            .phase_start_times
            .iter()
            .position(|(name, _)| name == phase_name)?;
        let (name, start_time) = self.phase_start_times.remove(index);
        let duration = start_time.elapsed();
        self.phase_durations.push((name, duration));
        Some(duration)
    }

    pub fn total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "Total time: {:.2}s\n",
            self.total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\nPer step:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}s\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_reported_in_order() {
        let mut timing = TimingScope::new();
        timing.start_phase("receive_user_inputs");
        timing.end_phase("receive_user_inputs");
        timing.start_phase("run_research_crew");
        timing.end_phase("run_research_crew");

        let names: Vec<&str> = timing
            .phase_durations()
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["receive_user_inputs", "run_research_crew"]);

        let report = timing.generate_timing_report();
        assert!(report.starts_with("Total time:"));
        assert!(report.contains("- run_research_crew:"));
    }

    #[test]
    fn test_ending_unknown_phase_returns_none() {
        let mut timing = TimingScope::new();
        assert!(timing.end_phase("never_started").is_none());
        assert!(timing.phase_durations().is_empty());
    }
}
