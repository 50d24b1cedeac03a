//! Parameter set for one model construction. An [`AcpConfig`] is built once,
//! validated against the chosen formulation, and then only read; repeated
//! solves with tweaked parameters each get their own copy.

use serde::{Serialize, Deserialize};

use crate::error::AcpError;
use crate::resolution::window::Horizon;

/// Which formulation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Fixed per-interval desk capacity, per-flight opening indicator cost
    Static,
    /// Desk count decided by the model, with per-desk open/close tracking
    /// and a minimum consecutive-open-duration rule
    Dynamic,
}

/// What to do with passengers whose drawn arrival falls at or after the last
/// check-in interval of their flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateArrivalPolicy {
    /// Drop them from the demand signal entirely
    #[default]
    Discard,
    /// Refuse to generate a flow that loses passengers
    Reject,
}

/// How the minimum-open-duration rule treats desks opened so close to the
/// end of the horizon that the full duration no longer fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPolicy {
    /// Openings in the last `minimum_desk_time - 1` intervals are exempt
    #[default]
    Exempt,
    /// The desk must stay open through the end of the horizon instead
    Clamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcpConfig {
    /// Service time per passenger [hrs]
    pub p: f64,
    /// Desk pool size: per-interval capacity (static) or number of physical
    /// desks (dynamic)
    pub c: usize,
    /// Length of one time interval [hrs]
    pub l: f64,
    /// Total planning horizon [hrs]
    pub total_hours: f64,
    /// Cost of one waiting passenger for one interval
    pub h0: f64,
    /// Per-flight, per-interval desk opening cost (static variant)
    pub s: Option<f64>,
    /// Cost of one desk opening event (dynamic variant)
    pub s_open: Option<f64>,
    /// Cost of one open desk for one interval (dynamic variant)
    pub s_operate: Option<f64>,
    /// Minimum number of consecutive intervals a desk stays open (dynamic variant)
    pub minimum_desk_time: Option<usize>,
    /// How long before departure passengers aim to arrive [minutes]
    pub mean_early_min: f64,
    /// Standard deviation of the arrival time draw [minutes]
    pub arrival_std_min: f64,
    /// Check-in opens this long before departure [minutes]
    pub earliest_checkin_min: f64,
    /// Check-in closes this long before departure [minutes]
    pub last_checkin_min: f64,
    #[serde(default)]
    pub late_arrivals: LateArrivalPolicy,
    #[serde(default)]
    pub tail_policy: TailPolicy,
}

impl Default for AcpConfig {
    fn default() -> Self {
        Self {
            p: 1.0,
            c: 400,
            l: 1.0 / 12.0,
            total_hours: 24.0,
            h0: 10.0,
            s: Some(100.0),
            s_open: Some(100.0),
            s_operate: Some(10.0),
            minimum_desk_time: Some(4),
            mean_early_min: 120.0,
            arrival_std_min: 22.5,
            earliest_checkin_min: 240.0,
            last_checkin_min: 45.0,
            late_arrivals: LateArrivalPolicy::default(),
            tail_policy: TailPolicy::default(),
        }
    }
}

impl AcpConfig {
    /// Checks that every key the chosen variant relies on is present and
    /// sane. Run before any model is assembled.
    pub fn validate(&self, variant: Variant) -> Result<(), AcpError> {
        if !(self.p > 0.0) || !self.p.is_finite() {
            return Err(AcpError::Configuration(format!("service time p must be positive, got {}", self.p)));
        }
        if self.c == 0 {
            return Err(AcpError::Configuration("desk pool size c must be positive".into()));
        }
        if !(self.l > 0.0) || !(self.total_hours > 0.0) {
            return Err(AcpError::Configuration(format!(
                "horizon must be positive, got T = {} hrs, l = {} hrs",
                self.total_hours, self.l
            )));
        }
        if !(self.h0 >= 0.0) || !self.h0.is_finite() {
            return Err(AcpError::Configuration(format!("waiting cost h0 must be non-negative, got {}", self.h0)));
        }
        match variant {
            Variant::Static => {
                if self.s.is_none() {
                    return Err(AcpError::Configuration("static variant requires the opening cost `s`".into()));
                }
            }
            Variant::Dynamic => {
                if self.s_open.is_none() || self.s_operate.is_none() {
                    return Err(AcpError::Configuration(
                        "dynamic variant requires the `s_open` and `s_operate` costs".into(),
                    ));
                }
                match self.minimum_desk_time {
                    None => {
                        return Err(AcpError::Configuration("dynamic variant requires `minimum_desk_time`".into()))
                    }
                    Some(0) => {
                        return Err(AcpError::Configuration("`minimum_desk_time` must be at least one interval".into()))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }

    pub fn horizon(&self) -> Result<Horizon, AcpError> {
        Horizon::new(self.total_hours, self.l)
    }
}
