//! Gradient correctness tests for the op library


mod prop_basic;
