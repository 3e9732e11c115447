//! Cart

pub mod models;
mod view;

pub use models::*;
pub use view::{CartLineView, CartView};
