//! Application Layer
//!
//! Contains the services the binary and library users call into. This layer
//! orchestrates the flow between the API client and the domain entities.

pub mod services;
