use std::{time::{SystemTime, UNIX_EPOCH}, fs::File, io::Write};

use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use rand_distr::{Uniform, Distribution};

use crate::error::AcpError;
use crate::instance::{AcpInstance, Flight};

/// Seat capacities of the fleet a schedule is drawn from.
const FLEET: &[(&str, u32)] = &[
    ("B737-800", 176),
    ("B737-700", 149),
    ("B737-900", 189),
    ("A321neo", 220),
    ("A330-300", 440),
    ("E190", 100),
    ("E190-E2", 114),
    ("E195-E2", 146),
    ("B777-200", 396),
    ("B787-9", 290),
];

#[derive(Debug, Args)]
pub struct AcpGenerator {
    /// An optional seed to kickstart the instance generation
    #[clap(short='s', long)]
    seed: Option<u128>,
    /// The number of departing flights
    #[clap(short='n', long, default_value="20")]
    nb_flights: usize,
    /// Earliest departure in the schedule [minutes from the horizon start]
    #[clap(long, default_value="300")]
    first_departure: u32,
    /// Latest departure in the schedule [minutes from the horizon start]
    #[clap(long, default_value="1380")]
    last_departure: u32,
    /// Name of the file where to generate the acp instance
    #[clap(short, long)]
    output: Option<String>,
}

impl AcpGenerator {

    pub fn generate(&mut self) -> Result<(), AcpError> {
        if self.first_departure > self.last_departure {
            return Err(AcpError::Configuration(format!(
                "departure range [{}, {}] is empty",
                self.first_departure, self.last_departure
            )));
        }

        let mut rng = seeded_rng(self.seed);

        let rand_departure = Uniform::new_inclusive(self.first_departure, self.last_departure);
        let rand_aircraft = Uniform::new(0, FLEET.len());

        let mut flights = Vec::with_capacity(self.nb_flights);
        for _ in 0..self.nb_flights {
            flights.push(Flight {
                departure: rand_departure.sample(&mut rng),
                passengers: FLEET[rand_aircraft.sample(&mut rng)].1,
            });
        }
        flights.sort_unstable_by_key(|f| f.departure);

        let instance = AcpInstance { flights };
        let instance = serde_json::to_string_pretty(&instance)?;

        if let Some(output) = self.output.as_ref() {
            File::create(output)?.write_all(instance.as_bytes())?;
        } else {
            println!("{instance}");
        }
        Ok(())
    }

}

/// ChaCha generator from an explicit seed, falling back to the wall clock
/// when none is given.
pub(crate) fn seeded_rng(seed: Option<u128>) -> ChaChaRng {
    let init = seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default()
    });
    let mut seed = [0_u8; 32];
    seed.iter_mut().zip(init.to_be_bytes().into_iter()).for_each(|(s, i)| *s = i);
    seed.iter_mut().rev().zip(init.to_le_bytes().into_iter()).for_each(|(s, i)| *s = i);
    ChaChaRng::from_seed(seed)
}
