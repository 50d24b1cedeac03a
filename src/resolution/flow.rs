//! Stochastic passenger arrival flow generation.
//!
//! Turns a flight schedule into the discrete demand signal `d[j][t]` the
//! model consumes: every passenger gets a normally distributed arrival time
//! ahead of departure, arrivals are binned per interval, and arrivals
//! falling before the flight's check-in window opens become the window's
//! initial backlog instead of demand.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use crate::config::{AcpConfig, LateArrivalPolicy};
use crate::error::AcpError;
use crate::instance::AcpInstance;

use super::window::{CheckInWindow, Horizon};

/// Per-flight, per-interval arrival counts plus the too-early backlog.
///
/// For every flight `j`, `d[j].iter().sum() + too_early[j]` is at most the
/// flight's passenger count; the difference is the mass dropped by the
/// late-arrival policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalFlow {
    pub d: Vec<Vec<u32>>,
    pub too_early: Vec<u32>,
}

impl ArrivalFlow {
    /// Draws one realization of the arrival process. Deterministic for a
    /// given `rng`; callers that need reproducibility must seed it.
    pub fn generate(
        instance: &AcpInstance,
        horizon: &Horizon,
        windows: &[CheckInWindow],
        config: &AcpConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, AcpError> {
        if !(config.arrival_std_min > 0.0) || !config.arrival_std_min.is_finite() {
            return Err(AcpError::Configuration(format!(
                "arrival standard deviation must be positive, got {} min",
                config.arrival_std_min
            )));
        }
        if windows.len() != instance.nb_flights() {
            return Err(AcpError::Configuration(format!(
                "{} windows for {} flights",
                windows.len(),
                instance.nb_flights()
            )));
        }

        let n = horizon.nb_intervals();
        let im = horizon.interval_minutes();
        let tot_m = horizon.total_minutes();

        let mut d = Vec::with_capacity(instance.nb_flights());
        let mut too_early = Vec::with_capacity(instance.nb_flights());

        for (j, flight) in instance.flights.iter().enumerate() {
            let window = windows[j];
            let mean = flight.departure as f64 - config.mean_early_min;
            let normal = Normal::new(mean, config.arrival_std_min)
                .map_err(|e| AcpError::Configuration(format!("flight {j}: invalid arrival distribution: {e}")))?;

            let mut bins = vec![0_u32; n];
            for _ in 0..flight.passengers {
                if let Some(bin) = interval_of(normal.sample(rng), im, tot_m, n) {
                    bins[bin] += 1;
                }
            }

            // arrivals up to and including the opening interval become the
            // initial queue content rather than demand
            let mut early = 0_u32;
            for bin in bins.iter_mut().take(window.open + 1) {
                early += *bin;
                *bin = 0;
            }

            let late: u32 = bins[window.close..].iter().sum();
            if late > 0 {
                match config.late_arrivals {
                    LateArrivalPolicy::Discard => {
                        for bin in bins[window.close..].iter_mut() {
                            *bin = 0;
                        }
                    }
                    LateArrivalPolicy::Reject => {
                        return Err(AcpError::Configuration(format!(
                            "flight {j}: {late} passengers arrive after the last check-in interval"
                        )));
                    }
                }
            }

            debug!(flight = j, too_early = early, too_late = late, "generated arrival flow");
            too_early.push(early);
            d.push(bins);
        }

        Ok(Self { d, too_early })
    }
}

/// Interval containing an arrival minute. Arrivals outside `[0, tot_m]`
/// fall off the horizon; the inclusive right edge of the last whole
/// interval belongs to that interval.
fn interval_of(arrival: f64, interval_minutes: f64, total_minutes: f64, n: usize) -> Option<usize> {
    if arrival < 0.0 || arrival > total_minutes || n == 0 {
        return None;
    }
    match (arrival / interval_minutes).floor() as usize {
        bin if bin < n => Some(bin),
        bin if bin == n && arrival <= n as f64 * interval_minutes => Some(n - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;
    use crate::instance::Flight;
    use crate::resolution::window::windows_for;

    fn config(arrival_std_min: f64) -> AcpConfig {
        AcpConfig { arrival_std_min, ..AcpConfig::default() }
    }

    fn generate(
        flights: Vec<Flight>,
        config: &AcpConfig,
        seed: u64,
    ) -> Result<(ArrivalFlow, AcpInstance), AcpError> {
        let instance = AcpInstance { flights };
        let horizon = config.horizon()?;
        let windows = windows_for(&instance, &horizon, config)?;
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let flow = ArrivalFlow::generate(&instance, &horizon, &windows, config, &mut rng)?;
        Ok((flow, instance))
    }

    #[test]
    fn seeded_draw_lands_inside_the_window() {
        // 10 passengers aiming 2 hrs before a minute-600 departure with a
        // tight spread: the whole mass sits far from both window edges
        let config = config(10.0);
        let (flow, _) = generate(vec![Flight { departure: 600, passengers: 10 }], &config, 42).unwrap();

        assert_eq!(flow.too_early[0], 0);
        assert_eq!(flow.d[0].iter().sum::<u32>(), 10);
        for (t, &count) in flow.d[0].iter().enumerate() {
            if count > 0 {
                assert!(t > 72 && t < 111, "arrival bin {t} outside the check-in window");
            }
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_fixed_seed() {
        let config = config(22.5);
        let flights = vec![
            Flight { departure: 600, passengers: 176 },
            Flight { departure: 800, passengers: 114 },
        ];
        let (a, _) = generate(flights.clone(), &config, 7).unwrap();
        let (b, _) = generate(flights, &config, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flow_plus_backlog_never_exceeds_capacity() {
        let config = config(60.0);
        let flights = vec![
            Flight { departure: 420, passengers: 200 },
            Flight { departure: 1200, passengers: 330 },
        ];
        let (flow, instance) = generate(flights, &config, 3).unwrap();
        for (j, flight) in instance.flights.iter().enumerate() {
            let total = flow.d[j].iter().sum::<u32>() + flow.too_early[j];
            assert!(total <= flight.passengers);
        }
    }

    #[test]
    fn early_mass_becomes_backlog() {
        // everyone aims 5 hrs ahead while check-in opens 4 hrs ahead
        let config = AcpConfig { mean_early_min: 300.0, arrival_std_min: 5.0, ..AcpConfig::default() };
        let (flow, _) = generate(vec![Flight { departure: 600, passengers: 20 }], &config, 11).unwrap();
        assert_eq!(flow.too_early[0], 20);
        assert_eq!(flow.d[0].iter().sum::<u32>(), 0);
    }

    #[test]
    fn late_mass_is_discarded_by_default() {
        // everyone aims at the departure minute itself, well past the
        // 45-minute check-in deadline
        let config = AcpConfig { mean_early_min: 0.0, arrival_std_min: 5.0, ..AcpConfig::default() };
        let (flow, _) = generate(vec![Flight { departure: 600, passengers: 15 }], &config, 5).unwrap();
        assert_eq!(flow.too_early[0], 0);
        assert_eq!(flow.d[0].iter().sum::<u32>(), 0);
    }

    #[test]
    fn late_mass_can_be_rejected_instead() {
        let config = AcpConfig {
            mean_early_min: 0.0,
            arrival_std_min: 5.0,
            late_arrivals: LateArrivalPolicy::Reject,
            ..AcpConfig::default()
        };
        let result = generate(vec![Flight { departure: 600, passengers: 15 }], &config, 5);
        assert!(matches!(result, Err(AcpError::Configuration(_))));
    }

    #[test]
    fn zero_passenger_flight_yields_an_empty_row() {
        let config = config(22.5);
        let (flow, _) = generate(vec![Flight { departure: 600, passengers: 0 }], &config, 1).unwrap();
        assert_eq!(flow.too_early[0], 0);
        assert!(flow.d[0].iter().all(|&c| c == 0));
    }

    #[test]
    fn horizon_end_belongs_to_the_last_interval() {
        // 24 hrs of 5-minute intervals: minute 1440 is the inclusive right
        // edge of bin 287, not a 289th bin
        assert_eq!(interval_of(1440.0, 5.0, 1440.0, 288), Some(287));
        assert_eq!(interval_of(1439.9, 5.0, 1440.0, 288), Some(287));
        assert_eq!(interval_of(0.0, 5.0, 1440.0, 288), Some(0));
        assert_eq!(interval_of(-0.1, 5.0, 1440.0, 288), None);
        assert_eq!(interval_of(1440.1, 5.0, 1440.0, 288), None);
        // a horizon whose last partial interval was cut off: the edge of the
        // last whole interval is still inclusive, anything beyond is dropped
        assert_eq!(interval_of(20.0, 10.0, 25.0, 2), Some(1));
        assert_eq!(interval_of(22.0, 10.0, 25.0, 2), None);
    }

    #[test]
    fn bad_distribution_parameters_are_rejected() {
        let config = config(0.0);
        let result = generate(vec![Flight { departure: 600, passengers: 10 }], &config, 1);
        assert!(matches!(result, Err(AcpError::Configuration(_))));
    }
}
