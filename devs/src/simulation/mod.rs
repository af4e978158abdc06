pub mod realtime;
pub mod simulator;

pub use realtime::RealTimeRunner;
pub use simulator::Simulator;
