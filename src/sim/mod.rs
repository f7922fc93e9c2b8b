pub mod driver;

pub use driver::{Sim, SimParams};
