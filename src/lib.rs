//! Ticket lifecycle and sales analytics engine for event organizers.
//!
//! The [`services`] module holds the engine proper: at-most-once check-in,
//! cancellation and validation of tickets, plus sales and dashboard
//! aggregates. It runs against the [`store::TicketStore`] contract, backed by
//! PostgreSQL in production and by memory in tests. [`routes`] exposes the
//! operations over HTTP.

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;
