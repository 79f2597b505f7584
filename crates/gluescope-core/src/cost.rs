use serde::{Deserialize, Serialize};

use crate::model::{CostEstimate, JobDetail, JobRun};

/// Hourly USD rate per DPU-equivalent for each Glue worker type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRates {
    pub standard: f64,
    pub g1x: f64,
    pub g2x: f64,
    pub g4x: f64,
    pub g8x: f64,
    pub z2x: f64,
    pub usd_to_brl: f64,
}

impl Default for WorkerRates {
    fn default() -> Self {
        Self {
            standard: 0.44,
            g1x: 0.44,
            g2x: 0.88,
            g4x: 1.76,
            g8x: 3.52,
            z2x: 1.00,
            usd_to_brl: 5.2,
        }
    }
}

impl WorkerRates {
    pub fn hourly_rate(&self, worker_type: &str) -> f64 {
        match worker_type {
            "Standard" | "G.1X" => self.g1x,
            "G.2X" => self.g2x,
            "G.4X" => self.g4x,
            "G.8X" => self.g8x,
            "Z.2X" => self.z2x,
            _ => self.standard,
        }
    }
}

/// Quick cost projection without any metric lookups.
///
/// Capacity falls back from `MaxCapacity` to `NumberOfWorkers` to a default
/// of two workers. Monthly figures assume the average recent run duration
/// recurs once a day.
pub fn quick_estimate(rates: &WorkerRates, detail: &JobDetail, runs: &[JobRun]) -> CostEstimate {
    let worker_type = detail.worker_type.as_deref().unwrap_or("Standard");
    let num_workers = detail.number_of_workers.unwrap_or(2) as f64;
    let capacity = detail.max_capacity.filter(|c| *c > 0.0).unwrap_or(num_workers);

    let hourly_usd = rates.hourly_rate(worker_type) * capacity;

    let timed: Vec<f64> = runs
        .iter()
        .filter(|r| r.execution_seconds > 0)
        .map(|r| r.execution_seconds as f64)
        .collect();

    let monthly_usd = if timed.is_empty() {
        0.0
    } else {
        let avg_hours = timed.iter().sum::<f64>() / timed.len() as f64 / 3600.0;
        hourly_usd * avg_hours * 30.0
    };

    CostEstimate {
        hourly_usd,
        monthly_usd,
        monthly_brl: monthly_usd * rates.usd_to_brl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(worker_type: &str, workers: Option<i32>, max_capacity: Option<f64>) -> JobDetail {
        JobDetail {
            name: "job".into(),
            worker_type: Some(worker_type.into()),
            number_of_workers: workers,
            max_capacity,
            ..Default::default()
        }
    }

    fn run(seconds: i32) -> JobRun {
        JobRun {
            state: "SUCCEEDED".into(),
            started_on: None,
            completed_on: None,
            execution_seconds: seconds,
        }
    }

    #[test]
    fn hourly_rate_scales_with_capacity() {
        let rates = WorkerRates::default();
        let est = quick_estimate(&rates, &detail("G.2X", Some(10), None), &[]);
        assert!((est.hourly_usd - 8.8).abs() < 1e-9);
    }

    #[test]
    fn max_capacity_wins_over_worker_count() {
        let rates = WorkerRates::default();
        let est = quick_estimate(&rates, &detail("G.1X", Some(10), Some(4.0)), &[]);
        assert!((est.hourly_usd - 0.44 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_worker_type_uses_standard_rate() {
        let rates = WorkerRates::default();
        let est = quick_estimate(&rates, &detail("G.16X", Some(2), None), &[]);
        assert!((est.hourly_usd - 0.88).abs() < 1e-9);
    }

    #[test]
    fn monthly_cost_from_average_run_time() {
        let rates = WorkerRates::default();
        // Two workers of G.1X, one-hour average runs: 0.88/h * 1h * 30 days.
        let est = quick_estimate(&rates, &detail("G.1X", Some(2), None), &[run(3600), run(3600)]);
        assert!((est.monthly_usd - 26.4).abs() < 1e-6);
        assert!((est.monthly_brl - 26.4 * 5.2).abs() < 1e-6);
    }

    #[test]
    fn no_timed_runs_means_zero_monthly() {
        let rates = WorkerRates::default();
        let est = quick_estimate(&rates, &detail("G.1X", Some(2), None), &[run(0)]);
        assert_eq!(est.monthly_usd, 0.0);
        assert!(est.hourly_usd > 0.0);
    }
}
