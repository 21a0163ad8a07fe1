//! Configuration tests.

mod validation_tests;
