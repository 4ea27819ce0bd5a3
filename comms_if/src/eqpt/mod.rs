//! # Equipment Interface
//!
//! This module defines the interface structures which are handed to the equipment drivers.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod servo;
