//! Discretized planning horizon and per-flight check-in windows.

use crate::config::AcpConfig;
use crate::error::AcpError;
use crate::instance::AcpInstance;

/// A planning horizon of `total_hours` split into intervals of
/// `interval_hours`; trailing time that does not fill a whole interval is
/// cut off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    pub total_hours: f64,
    pub interval_hours: f64,
}

impl Horizon {
    pub fn new(total_hours: f64, interval_hours: f64) -> Result<Self, AcpError> {
        if !(total_hours > 0.0) || !(interval_hours > 0.0) || interval_hours > total_hours {
            return Err(AcpError::Configuration(format!(
                "horizon must satisfy 0 < l <= T, got T = {total_hours} hrs, l = {interval_hours} hrs"
            )));
        }
        Ok(Self { total_hours, interval_hours })
    }

    pub fn nb_intervals(&self) -> usize {
        (self.total_hours / self.interval_hours).floor() as usize
    }

    pub fn interval_minutes(&self) -> f64 {
        self.interval_hours * 60.0
    }

    pub fn total_minutes(&self) -> f64 {
        self.total_hours * 60.0
    }
}

/// The contiguous range of intervals, inclusive on both ends, in which a
/// flight's passengers are allowed to check in. The complement of this range
/// is the flight's non-check-in set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInWindow {
    pub open: usize,
    pub close: usize,
}

impl CheckInWindow {
    /// Places the window relative to the departure time: it opens
    /// `earliest_checkin_min` and closes `last_checkin_min` before departure,
    /// both ends clamped to the horizon. A window that closes before it
    /// opens, or lies entirely outside the horizon, is a configuration error.
    pub fn for_flight(
        flight: usize,
        departure: u32,
        horizon: &Horizon,
        earliest_checkin_min: f64,
        last_checkin_min: f64,
    ) -> Result<Self, AcpError> {
        let n = horizon.nb_intervals() as i64;
        let im = horizon.interval_minutes();
        let dep_idx = (departure as f64 / im).round() as i64;
        let open = dep_idx - (earliest_checkin_min / im).round() as i64;
        let close = dep_idx - (last_checkin_min / im).round() as i64;
        if close < open {
            return Err(AcpError::Configuration(format!(
                "flight {flight}: check-in window closes (interval {close}) before it opens (interval {open})"
            )));
        }
        if close < 0 || open >= n {
            return Err(AcpError::Configuration(format!(
                "flight {flight}: check-in window [{open}, {close}] lies outside the horizon of {n} intervals"
            )));
        }
        Ok(Self {
            open: open.clamp(0, n - 1) as usize,
            close: close.clamp(0, n - 1) as usize,
        })
    }

    /// First interval in which checking in is possible. The initial-queue
    /// condition, the recurrence bounds and the flow generator all anchor on
    /// this one value.
    pub fn t_open(&self) -> usize {
        self.open
    }

    pub fn contains(&self, t: usize) -> bool {
        (self.open..=self.close).contains(&t)
    }

    /// Iterates over the non-check-in set of the flight.
    pub fn non_checkin_intervals(self, n: usize) -> impl Iterator<Item = usize> {
        (0..n).filter(move |&t| !self.contains(t))
    }
}

/// One window per flight of the schedule, in flight order.
pub fn windows_for(
    instance: &AcpInstance,
    horizon: &Horizon,
    config: &AcpConfig,
) -> Result<Vec<CheckInWindow>, AcpError> {
    instance
        .flights
        .iter()
        .enumerate()
        .map(|(j, f)| {
            CheckInWindow::for_flight(j, f.departure, horizon, config.earliest_checkin_min, config.last_checkin_min)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_minute_day() -> Horizon {
        Horizon::new(24.0, 1.0 / 12.0).unwrap()
    }

    #[test]
    fn window_for_mid_morning_departure() {
        let horizon = five_minute_day();
        assert_eq!(horizon.nb_intervals(), 288);

        // departs at minute 600: check-in from 4 hrs to 45 min before
        let w = CheckInWindow::for_flight(0, 600, &horizon, 240.0, 45.0).unwrap();
        assert_eq!(w.open, 72);
        assert_eq!(w.close, 111);
        assert_eq!(w.t_open(), 72);
        assert!(w.contains(72) && w.contains(111));
        assert!(!w.contains(71) && !w.contains(112));
    }

    #[test]
    fn non_checkin_set_is_the_complement() {
        let horizon = five_minute_day();
        let w = CheckInWindow::for_flight(0, 600, &horizon, 240.0, 45.0).unwrap();
        let tj: Vec<usize> = w.non_checkin_intervals(288).collect();
        assert_eq!(tj.len(), 288 - 40);
        assert!(tj.iter().all(|&t| t < 72 || t > 111));
    }

    #[test]
    fn early_departure_is_clamped_to_the_horizon_start() {
        let horizon = five_minute_day();
        // departs at minute 120: the 4-hour limit would open the window at -24
        let w = CheckInWindow::for_flight(0, 120, &horizon, 240.0, 45.0).unwrap();
        assert_eq!(w.open, 0);
        assert_eq!(w.close, 15);
    }

    #[test]
    fn collapsed_or_outside_windows_are_rejected() {
        let horizon = five_minute_day();
        // closing offset beyond the opening offset collapses the window
        assert!(matches!(
            CheckInWindow::for_flight(0, 600, &horizon, 45.0, 240.0),
            Err(AcpError::Configuration(_))
        ));
        // departing 30 minutes after midnight puts the whole window before t = 0
        assert!(matches!(
            CheckInWindow::for_flight(0, 30, &horizon, 240.0, 45.0),
            Err(AcpError::Configuration(_))
        ));
    }

    #[test]
    fn degenerate_horizons_are_rejected() {
        assert!(Horizon::new(0.0, 1.0).is_err());
        assert!(Horizon::new(24.0, 0.0).is_err());
        assert!(Horizon::new(1.0, 2.0).is_err());
    }
}
