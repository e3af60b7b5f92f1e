//! REST API endpoint tests.

mod health_tests;
mod message_tests;
