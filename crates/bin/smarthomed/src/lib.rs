//! Library half of the daemon: configuration and startup seeding, shared by
//! `main` and the end-to-end tests.

pub mod config;
pub mod seed;
