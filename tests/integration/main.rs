//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the search API and run full
//! sessions end-to-end through the HTTP search client.

mod harvest_tests;
