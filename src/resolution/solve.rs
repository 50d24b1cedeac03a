//! Solver boundary and post-solve extraction.
//!
//! The model is handed to the backing MILP solver as one blocking call; the
//! builder never looks inside the solver and every non-optimal status comes
//! back as a distinct [`AcpError`] variant. After an optimal solve the
//! variable values are rounded back to counts and the cost split and the
//! maximum-waiting-time KPI are reconstructed.

use std::{fs::File, io::BufReader};

use clap::Args;
use good_lp::{default_solver, ResolutionError, Solution, SolverModel};
use tracing::info;

use crate::config::{AcpConfig, Variant};
use crate::error::AcpError;
use crate::generate::seeded_rng;
use crate::instance::AcpInstance;

use super::flow::ArrivalFlow;
use super::kpi::{self, WaitingTimeKpi};
use super::model::{AcpModel, AcpVariables};
use super::window::{windows_for, Horizon};

/// Solved assignment plus the derived KPIs.
#[derive(Debug, Clone)]
pub struct AcpSolution {
    pub variant: Variant,
    pub objective: f64,
    /// `q[j][t]`: accepted passengers per flight and interval
    pub accepted: Vec<Vec<i64>>,
    /// `I[j][t]`: queue length per flight and interval
    pub queue: Vec<Vec<i64>>,
    /// `B[t]`: open desk count per interval (dynamic variant)
    pub desks: Option<Vec<i64>>,
    /// `desk[i][t]`: per-desk open state (dynamic variant)
    pub desk_open: Option<Vec<Vec<i64>>>,
    /// `y[i][t]`: per-desk opening events (dynamic variant)
    pub openings: Option<Vec<Vec<i64>>>,
    /// `x[j][t]`: per-flight service indicators (static variant)
    pub served: Option<Vec<Vec<i64>>>,
    pub waiting_cost: f64,
    pub opening_cost: f64,
    pub operating_cost: f64,
    pub kpi: WaitingTimeKpi,
    /// KPI scaled from intervals to minutes
    pub max_waiting_minutes: Option<f64>,
}

/// Hands the assembled model to the backing solver and reconstructs the
/// solution. Consumes the model: variable arrays live for exactly one
/// build/solve cycle.
pub fn solve_model(model: AcpModel, horizon: &Horizon, config: &AcpConfig) -> Result<AcpSolution, AcpError> {
    let AcpModel {
        variant,
        nb_flights,
        nb_intervals,
        problem,
        vars,
        constraints,
        objective,
    } = model;

    info!(?variant, nb_flights, nb_intervals, nb_constraints = constraints.len(), "handing model to the solver");

    let mut solver = problem.minimise(objective).using(default_solver);
    for constraint in constraints {
        solver = solver.with(constraint);
    }

    let solution = solver.solve().map_err(map_resolution_error)?;

    let round_row = |row: &[good_lp::Variable]| -> Vec<i64> {
        row.iter().map(|&v| solution.value(v).round() as i64).collect()
    };
    let round_grid = |grid: &[Vec<good_lp::Variable>]| -> Vec<Vec<i64>> {
        grid.iter().map(|row| round_row(row)).collect()
    };

    let AcpVariables { accepted, queue, served, desks, desk_open, openings } = vars;
    let accepted = round_grid(&accepted);
    let queue = round_grid(&queue);
    let served = served.map(|grid| round_grid(&grid));
    let desks = desks.map(|row| round_row(&row));
    let desk_open = desk_open.map(|grid| round_grid(&grid));
    let openings = openings.map(|grid| round_grid(&grid));

    let waiting_cost = config.h0 * queue.iter().flatten().sum::<i64>() as f64;
    let opening_cost = match variant {
        Variant::Static => {
            config.s.unwrap_or_default()
                * served.as_ref().map(|grid| grid.iter().flatten().sum::<i64>()).unwrap_or(0) as f64
        }
        Variant::Dynamic => {
            config.s_open.unwrap_or_default()
                * openings.as_ref().map(|grid| grid.iter().flatten().sum::<i64>()).unwrap_or(0) as f64
        }
    };
    let operating_cost = match variant {
        Variant::Static => 0.0,
        Variant::Dynamic => {
            config.s_operate.unwrap_or_default()
                * desks.as_ref().map(|row| row.iter().sum::<i64>()).unwrap_or(0) as f64
        }
    };

    // aggregate the per-flight series into one FIFO channel
    let mut q_total = vec![0_i64; nb_intervals];
    let mut i_total = vec![0_i64; nb_intervals];
    for j in 0..nb_flights {
        for t in 0..nb_intervals {
            q_total[t] += accepted[j][t];
            i_total[t] += queue[j][t];
        }
    }
    let kpi = kpi::longest_queue_time(&q_total, &i_total);
    let max_waiting_minutes = kpi.max_waiting_intervals.map(|w| w as f64 * horizon.interval_minutes());

    // integral solution, so the cost split reassembles the objective exactly
    Ok(AcpSolution {
        variant,
        objective: waiting_cost + opening_cost + operating_cost,
        accepted,
        queue,
        desks,
        desk_open,
        openings,
        served,
        waiting_cost,
        opening_cost,
        operating_cost,
        kpi,
        max_waiting_minutes,
    })
}

fn map_resolution_error(error: ResolutionError) -> AcpError {
    match error {
        ResolutionError::Infeasible => AcpError::Infeasible { conflicting: None },
        ResolutionError::Unbounded => AcpError::Unbounded,
        other => classify_solver_message(other.to_string()),
    }
}

fn classify_solver_message(msg: String) -> AcpError {
    let lower = msg.to_lowercase();
    if lower.contains("time") && lower.contains("limit") {
        AcpError::SolverTimeout(msg)
    } else if lower.contains("infeasible") && lower.contains("unbounded") {
        AcpError::InfeasibleOrUnbounded
    } else {
        AcpError::Solver(msg)
    }
}

#[derive(Debug, Args)]
pub struct Solve {
    /// The path to the instance file
    #[clap(short, long)]
    pub instance: String,
    /// The formulation to solve
    #[clap(short, long, value_enum, default_value = "dynamic")]
    pub variant: Variant,
    /// Optional path to a JSON parameter file; defaults apply otherwise
    #[clap(short, long)]
    pub params: Option<String>,
    /// An optional seed for the passenger arrival draw
    #[clap(short, long)]
    pub seed: Option<u128>,
}

impl Solve {
    pub fn solve(&self) -> Result<(), AcpError> {
        let instance: AcpInstance = serde_json::from_reader(BufReader::new(File::open(&self.instance)?))?;
        let config: AcpConfig = match &self.params {
            Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
            None => AcpConfig::default(),
        };

        let horizon = config.horizon()?;
        let windows = windows_for(&instance, &horizon, &config)?;
        let mut rng = seeded_rng(self.seed);
        let flow = ArrivalFlow::generate(&instance, &horizon, &windows, &config, &mut rng)?;
        let model = AcpModel::build(self.variant, &instance, &horizon, &flow, &windows, &config)?;
        let solution = solve_model(model, &horizon, &config)?;

        println!("objective {}", solution.objective);
        println!("waiting cost {}", solution.waiting_cost);
        println!("opening cost {}", solution.opening_cost);
        println!("operating cost {}", solution.operating_cost);
        match solution.max_waiting_minutes {
            Some(minutes) => println!("max waiting time {minutes} min"),
            None => println!("max waiting time undefined: nobody was served"),
        }
        if solution.kpi.join_discrepancy {
            println!("warning: negative join counts clamped during KPI reconstruction");
        }
        if let Some(desks) = &solution.desks {
            println!("desks per interval {:?}", desks);
        }
        Ok(())
    }
}
