// src/lib.rs

//! REST backend for an e-commerce marketplace: users, catalog, inventory,
//! addresses, comments, and the order-placement transaction that ties
//! pricing, stock reservation and optional payment-intent creation into one
//! atomic unit.

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod web;
