//! Parallel DEVS kernel: typed ports and message bags, atomic and coupled
//! models, a discrete event simulator and a wall clock runner.

pub mod error;
pub mod io;
pub mod modeling;
pub mod simulation;
pub mod time;
pub mod utils;

pub use error::Error;
pub use time::Time;
