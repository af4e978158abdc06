#[allow(clippy::module_inception)]
pub mod parameters;
pub mod supervisor_params;

pub use parameters::{Error, Parameter, ParameterMap, ParameterTree, parse_string, parse_table};
pub use supervisor_params::{Conversions, LandCriteria, SupervisorParams};
