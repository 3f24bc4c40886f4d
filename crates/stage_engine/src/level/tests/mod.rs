//! Integration tests across pool, carver and level composition

mod level_integration;
