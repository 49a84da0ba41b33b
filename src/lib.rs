// src/lib.rs
//! Command line front end for the tessera layout engine.

pub mod fixture;

pub use fixture::Fixture;
