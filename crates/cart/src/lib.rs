//! Storefront Cart
//!
//! Client-side cart session for a storefront REST API: a persisted anonymous cart
//! identity, optimistic quantity updates with debounced commits, stock
//! reconciliation and a shared badge count.

pub mod badge;
pub mod cart;
pub mod context;
pub mod gateway;
pub mod identity;
pub mod ids;
pub mod notices;
pub mod reconciler;
pub mod session;

#[cfg(test)]
mod test;
