//! Time-indexed MILP formulation of the check-in desk allocation problem.
//!
//! Two variants share the queueing core. The static variant takes the
//! per-interval capacity as a given constant and only decides which flights
//! are being served. The dynamic variant also decides how many desks to
//! operate, tracks each physical desk's open/closed state and enforces a
//! minimum consecutive-open duration per opening event.

use good_lp::{constraint, variable, variables, Constraint, Expression, ProblemVariables, Variable};
use tracing::debug;

use crate::config::{AcpConfig, TailPolicy, Variant};
use crate::error::AcpError;
use crate::instance::AcpInstance;

use super::flow::ArrivalFlow;
use super::window::{CheckInWindow, Horizon};

/// Handles to every decision variable of a built model.
pub struct AcpVariables {
    /// `q[j][t]`: passengers of flight `j` whose check-in completes in `t`
    pub accepted: Vec<Vec<Variable>>,
    /// `I[j][t]`: passengers of flight `j` still queued at the end of `t`
    pub queue: Vec<Vec<Variable>>,
    /// `x[j][t]`: flight `j` is being served in `t` (static variant)
    pub served: Option<Vec<Vec<Variable>>>,
    /// `B[t]`: number of desks operating in `t` (dynamic variant)
    pub desks: Option<Vec<Variable>>,
    /// `desk[i][t]`: physical desk `i` is open in `t` (dynamic variant)
    pub desk_open: Option<Vec<Vec<Variable>>>,
    /// `y[i][t]`: desk `i` transitions closed to open at `t` (dynamic variant)
    pub openings: Option<Vec<Vec<Variable>>>,
}

/// A fully assembled problem: variables, constraints and objective, ready to
/// hand across the solver boundary. Owns its variable arrays exclusively for
/// one build/solve cycle.
pub struct AcpModel {
    pub variant: Variant,
    pub nb_flights: usize,
    pub nb_intervals: usize,
    pub problem: ProblemVariables,
    pub vars: AcpVariables,
    pub constraints: Vec<Constraint>,
    pub objective: Expression,
}

impl AcpModel {
    pub fn build(
        variant: Variant,
        instance: &AcpInstance,
        horizon: &Horizon,
        flow: &ArrivalFlow,
        windows: &[CheckInWindow],
        config: &AcpConfig,
    ) -> Result<Self, AcpError> {
        config.validate(variant)?;

        let n = horizon.nb_intervals();
        let nb_flights = instance.nb_flights();
        if windows.len() != nb_flights || flow.d.len() != nb_flights || flow.too_early.len() != nb_flights {
            return Err(AcpError::Configuration(format!(
                "schedule of {nb_flights} flights given {} windows and {} flow rows",
                windows.len(),
                flow.d.len()
            )));
        }
        for (j, window) in windows.iter().enumerate() {
            if window.t_open() >= n {
                return Err(AcpError::Configuration(format!(
                    "flight {j}: window opens at interval {} outside the horizon of {n} intervals",
                    window.t_open()
                )));
            }
            if flow.d[j].len() != n {
                return Err(AcpError::Configuration(format!(
                    "flight {j}: arrival flow covers {} intervals instead of {n}",
                    flow.d[j].len()
                )));
            }
        }

        let mut problem = variables!();

        let accepted: Vec<Vec<Variable>> = (0..nb_flights)
            .map(|_| (0..n).map(|_| problem.add(variable().integer().min(0))).collect())
            .collect();
        let queue: Vec<Vec<Variable>> = (0..nb_flights)
            .map(|_| (0..n).map(|_| problem.add(variable().integer().min(0))).collect())
            .collect();

        let mut constraints = Vec::new();

        // initial queue content at the window opening, then the recurrence
        // I[t] = I[t-1] + d[t] - q[t] strictly after it
        for j in 0..nb_flights {
            let t_open = windows[j].t_open();
            constraints.push(constraint!(queue[j][t_open] == flow.too_early[j] as f64));
            for t in (t_open + 1)..n {
                constraints
                    .push(constraint!(queue[j][t] == queue[j][t - 1] + flow.d[j][t] as f64 - accepted[j][t]));
            }
        }

        // outside the check-in window the queue is empty and nobody is
        // served; the opening interval itself only carries the backlog
        for j in 0..nb_flights {
            for t in windows[j].non_checkin_intervals(n) {
                constraints.push(constraint!(queue[j][t] == 0.0));
                constraints.push(constraint!(accepted[j][t] == 0.0));
            }
            constraints.push(constraint!(accepted[j][windows[j].t_open()] == 0.0));
        }

        let p = config.p;
        let vars;
        let objective;

        match variant {
            Variant::Static => {
                let served: Vec<Vec<Variable>> = (0..nb_flights)
                    .map(|_| (0..n).map(|_| problem.add(variable().binary())).collect())
                    .collect();

                let capacity = config.c as f64;
                for t in 0..n {
                    let mut service_time = Expression::from(0.0);
                    for j in 0..nb_flights {
                        service_time += p * accepted[j][t];
                    }
                    constraints.push(constraint!(service_time <= capacity));
                }
                // serving a flight requires its opening indicator to be paid
                for j in 0..nb_flights {
                    for t in 0..n {
                        constraints.push(constraint!(p * accepted[j][t] <= capacity * served[j][t]));
                    }
                }

                let s = config.s.unwrap_or_default();
                let mut cost = Expression::from(0.0);
                for j in 0..nb_flights {
                    for t in 0..n {
                        cost += config.h0 * queue[j][t] + s * served[j][t];
                    }
                }
                objective = cost;
                vars = AcpVariables {
                    accepted,
                    queue,
                    served: Some(served),
                    desks: None,
                    desk_open: None,
                    openings: None,
                };
            }
            Variant::Dynamic => {
                let nb_desks = config.c;
                let minimum_desk_time = config.minimum_desk_time.unwrap_or_default();

                let desks: Vec<Variable> = (0..n)
                    .map(|_| problem.add(variable().integer().min(0).max(nb_desks as f64)))
                    .collect();
                let desk_open: Vec<Vec<Variable>> = (0..nb_desks)
                    .map(|_| (0..n).map(|_| problem.add(variable().binary())).collect())
                    .collect();
                let openings: Vec<Vec<Variable>> = (0..nb_desks)
                    .map(|_| (0..n).map(|_| problem.add(variable().binary())).collect())
                    .collect();

                // capacity follows the number of open desks
                let throughput = horizon.interval_hours;
                for t in 0..n {
                    let mut service_time = Expression::from(0.0);
                    for j in 0..nb_flights {
                        service_time += p * accepted[j][t];
                    }
                    constraints.push(constraint!(service_time <= throughput * desks[t]));
                }

                // the desk count is the number of open physical desks
                for t in 0..n {
                    let mut open_desks = Expression::from(0.0);
                    for row in &desk_open {
                        open_desks += row[t];
                    }
                    constraints.push(constraint!(desks[t] == open_desks));
                }

                // an opening event fires exactly when a desk is open right
                // after a closed interval (or open at t = 0)
                for i in 0..nb_desks {
                    constraints.push(constraint!(openings[i][0] == desk_open[i][0]));
                    for t in 1..n {
                        constraints.push(constraint!(openings[i][t] >= desk_open[i][t] - desk_open[i][t - 1]));
                        constraints.push(constraint!(openings[i][t] <= desk_open[i][t]));
                        constraints.push(constraint!(openings[i][t] <= 1.0 - desk_open[i][t - 1]));
                    }
                }

                // a desk that opens stays open for minimum_desk_time intervals
                for i in 0..nb_desks {
                    for t in 0..n {
                        let end = t + minimum_desk_time;
                        let end = if end > n {
                            match config.tail_policy {
                                TailPolicy::Exempt => continue,
                                TailPolicy::Clamp => n,
                            }
                        } else {
                            end
                        };
                        let mut open_run = Expression::from(0.0);
                        for k in t..end {
                            open_run += desk_open[i][k];
                        }
                        constraints.push(constraint!(open_run >= (end - t) as f64 * openings[i][t]));
                    }
                }

                let s_open = config.s_open.unwrap_or_default();
                let s_operate = config.s_operate.unwrap_or_default();
                let mut cost = Expression::from(0.0);
                for j in 0..nb_flights {
                    for t in 0..n {
                        cost += config.h0 * queue[j][t];
                    }
                }
                for t in 0..n {
                    cost += s_operate * desks[t];
                    for row in &openings {
                        cost += s_open * row[t];
                    }
                }
                objective = cost;
                vars = AcpVariables {
                    accepted,
                    queue,
                    served: None,
                    desks: Some(desks),
                    desk_open: Some(desk_open),
                    openings: Some(openings),
                };
            }
        }

        debug!(
            ?variant,
            nb_flights,
            nb_intervals = n,
            nb_constraints = constraints.len(),
            "assembled check-in model"
        );

        Ok(Self {
            variant,
            nb_flights,
            nb_intervals: n,
            problem,
            vars,
            constraints,
            objective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Flight;
    use crate::resolution::window::windows_for;

    fn toy_config() -> AcpConfig {
        AcpConfig {
            p: 0.1,
            c: 2,
            l: 0.25,
            total_hours: 3.0,
            h0: 1.0,
            s: Some(10.0),
            s_open: Some(50.0),
            s_operate: Some(5.0),
            minimum_desk_time: Some(3),
            earliest_checkin_min: 120.0,
            last_checkin_min: 30.0,
            ..AcpConfig::default()
        }
    }

    fn toy_inputs(config: &AcpConfig) -> (AcpInstance, Horizon, Vec<CheckInWindow>, ArrivalFlow) {
        let instance = AcpInstance { flights: vec![Flight { departure: 150, passengers: 6 }] };
        let horizon = config.horizon().unwrap();
        let windows = windows_for(&instance, &horizon, config).unwrap();
        let n = horizon.nb_intervals();
        let mut d = vec![0_u32; n];
        d[3] = 3;
        d[4] = 1;
        let flow = ArrivalFlow { d: vec![d], too_early: vec![2] };
        (instance, horizon, windows, flow)
    }

    #[test]
    fn toy_window_sits_where_expected() {
        let config = toy_config();
        let (_, _, windows, _) = toy_inputs(&config);
        assert_eq!(windows[0], CheckInWindow { open: 2, close: 8 });
    }

    #[test]
    fn static_model_assembles() {
        let config = toy_config();
        let (instance, horizon, windows, flow) = toy_inputs(&config);
        let model = AcpModel::build(Variant::Static, &instance, &horizon, &flow, &windows, &config).unwrap();

        assert_eq!(model.nb_intervals, 12);
        assert_eq!(model.vars.accepted.len(), 1);
        assert_eq!(model.vars.accepted[0].len(), 12);
        assert!(model.vars.served.is_some());
        assert!(model.vars.desks.is_none());
        // initial condition + 9 recurrence steps + 2 * 5 window zeros
        // + 1 opening-interval zero + 12 capacity + 12 gating
        assert_eq!(model.constraints.len(), 1 + 9 + 10 + 1 + 12 + 12);
    }

    #[test]
    fn dynamic_model_assembles() {
        let config = toy_config();
        let (instance, horizon, windows, flow) = toy_inputs(&config);
        let model = AcpModel::build(Variant::Dynamic, &instance, &horizon, &flow, &windows, &config).unwrap();

        assert!(model.vars.desks.is_some());
        assert_eq!(model.vars.desk_open.as_ref().unwrap().len(), 2);
        assert_eq!(model.vars.openings.as_ref().unwrap()[0].len(), 12);
    }

    #[test]
    fn missing_cost_keys_fail_the_build() {
        let config = AcpConfig { s: None, ..toy_config() };
        let (instance, horizon, windows, flow) = toy_inputs(&config);
        let result = AcpModel::build(Variant::Static, &instance, &horizon, &flow, &windows, &config);
        assert!(matches!(result, Err(AcpError::Configuration(_))));
    }

    #[test]
    fn mismatched_flow_fails_the_build() {
        let config = toy_config();
        let (instance, horizon, windows, _) = toy_inputs(&config);
        let flow = ArrivalFlow { d: vec![vec![0; 5]], too_early: vec![0] };
        let result = AcpModel::build(Variant::Static, &instance, &horizon, &flow, &windows, &config);
        assert!(matches!(result, Err(AcpError::Configuration(_))));
    }
}
