//! API Integration Tests
//!
//! Each module drives the client against a wiremock server.

mod download_tests;
mod entity_graph_tests;
mod pagination_tests;
mod transport_tests;
