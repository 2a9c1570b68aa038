//! Threshold evaluation over a single snapshot.
//!
//! Strictly greater-than semantics: a reading exactly at its limit does not
//! alert. No state is carried between evaluations.

use crate::sampler::HealthSnapshot;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
    Processes,
}

/// One threshold breach, ready to be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub metric: Metric,
    pub message: String,
}

fn check_cpu(snapshot: &HealthSnapshot, limits: &Thresholds) -> Option<Alert> {
    (snapshot.cpu_percent > limits.cpu_percent).then(|| Alert {
        metric: Metric::Cpu,
        message: format!("High CPU usage detected: {:.1}%", snapshot.cpu_percent),
    })
}

fn check_memory(snapshot: &HealthSnapshot, limits: &Thresholds) -> Option<Alert> {
    (snapshot.mem_percent > limits.memory_percent).then(|| Alert {
        metric: Metric::Memory,
        message: format!("High Memory usage detected: {:.1}%", snapshot.mem_percent),
    })
}

fn check_disk(snapshot: &HealthSnapshot, limits: &Thresholds) -> Option<Alert> {
    (snapshot.disk_percent > limits.disk_percent).then(|| Alert {
        metric: Metric::Disk,
        message: format!("Low Disk space detected: {:.1}% used", snapshot.disk_percent),
    })
}

fn check_processes(snapshot: &HealthSnapshot, limits: &Thresholds) -> Option<Alert> {
    (snapshot.process_count > limits.process_count).then(|| Alert {
        metric: Metric::Processes,
        message: format!(
            "High number of running processes detected: {}",
            snapshot.process_count
        ),
    })
}

/// Run all four checks against one snapshot.
pub fn evaluate(snapshot: &HealthSnapshot, limits: &Thresholds) -> Vec<Alert> {
    [
        check_cpu(snapshot, limits),
        check_memory(snapshot, limits),
        check_disk(snapshot, limits),
        check_processes(snapshot, limits),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_snapshot() -> HealthSnapshot {
        HealthSnapshot {
            cpu_percent: 10.0,
            mem_percent: 10.0,
            disk_percent: 10.0,
            process_count: 100,
        }
    }

    #[test]
    fn high_cpu_raises_one_alert_with_value() {
        let snapshot = HealthSnapshot {
            cpu_percent: 85.0,
            ..quiet_snapshot()
        };

        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, Metric::Cpu);
        assert!(alerts[0].message.contains("85.0"));
    }

    #[test]
    fn cpu_below_threshold_is_quiet() {
        let snapshot = HealthSnapshot {
            cpu_percent: 79.9,
            ..quiet_snapshot()
        };

        assert!(evaluate(&snapshot, &Thresholds::default()).is_empty());
    }

    #[test]
    fn disk_exactly_at_threshold_is_quiet() {
        let snapshot = HealthSnapshot {
            disk_percent: 80.0,
            ..quiet_snapshot()
        };

        assert!(evaluate(&snapshot, &Thresholds::default()).is_empty());
    }

    #[test]
    fn process_count_is_strictly_greater_than() {
        let at_limit = HealthSnapshot {
            process_count: 300,
            ..quiet_snapshot()
        };
        let over_limit = HealthSnapshot {
            process_count: 301,
            ..quiet_snapshot()
        };

        assert!(evaluate(&at_limit, &Thresholds::default()).is_empty());
        let alerts = evaluate(&over_limit, &Thresholds::default());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("301"));
    }

    #[test]
    fn every_breached_metric_alerts_independently() {
        let snapshot = HealthSnapshot {
            cpu_percent: 95.0,
            mem_percent: 91.5,
            disk_percent: 88.0,
            process_count: 400,
        };

        let alerts = evaluate(&snapshot, &Thresholds::default());
        assert_eq!(alerts.len(), 4);
        assert!(alerts.iter().any(|a| a.message.contains("91.5")));
        assert!(alerts.iter().any(|a| a.message.contains("% used")));
    }
}
