//! Common test utilities for regrid.
//!
//! This module provides shared utilities for testing the regridding pipeline.

// Not every test binary uses every helper
#![allow(dead_code)]

pub mod assertions;
pub mod test_data;
