//! Tests for the variable substituter, split by concern

use super::*;

// Shared data contexts
mod helpers;


// valueRef / iterate mappings
mod references;
