//! This module defines an abstract representation of an ACP instance.

use serde::{Serialize, Deserialize};

/// A single departing flight. Flights are identified by their position in
/// [`AcpInstance::flights`] (0-based, contiguous).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Scheduled departure, in minutes from the start of the planning horizon
    pub departure: u32,
    /// Total number of passengers expected to check in for this flight
    pub passengers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcpInstance {
    pub flights: Vec<Flight>,
}

impl AcpInstance {
    pub fn nb_flights(&self) -> usize {
        self.flights.len()
    }
}
