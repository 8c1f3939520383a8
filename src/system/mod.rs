pub mod collector;
pub mod process;
pub mod rate;
pub mod sampler;
pub mod snapshot;
