pub mod analyze;
pub mod state;
