pub mod config;
pub mod dashboard;
pub mod solver;
pub mod week;
