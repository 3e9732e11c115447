//! Cart session

mod debounce;
pub mod errors;
mod service;
mod state;

pub use errors::CartSessionError;
pub use service::*;
