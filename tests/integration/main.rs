//! Integration tests for Shiori
//!
//! These tests use wiremock to serve both the search engine and the target
//! site, and drive the locator and the capture stage end-to-end.

mod capture_tests;
mod locate_tests;
