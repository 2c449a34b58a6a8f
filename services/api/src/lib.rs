pub mod adapters;
pub mod booking_flow;
pub mod config;
pub mod error;
pub mod web;
