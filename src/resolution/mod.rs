pub mod flow;
pub mod kpi;
pub mod model;
pub mod solve;
pub mod window;

pub use solve::Solve;
