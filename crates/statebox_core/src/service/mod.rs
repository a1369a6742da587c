//! Use-case services over the store engine.
//!
//! # Responsibility
//! - Expose the cart and to-do mutation APIs.
//! - Translate caller input into validated model values before mutating.
//!
//! # Invariants
//! - Services never touch storage directly; every write goes through
//!   `Store::mutate`.

pub mod cart_service;
pub mod todo_service;
