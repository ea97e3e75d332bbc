pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod io;
pub mod paths;
pub mod pipeline;
pub mod progress;
pub mod quality;
pub mod report;
pub mod session;
pub mod stages;
pub mod state;
pub mod validation;

pub use error::{RecipeError, Result};
