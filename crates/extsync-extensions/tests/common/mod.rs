//! Common test utilities for extsync-extensions
//!
//! This module provides shared test infrastructure including:
//! - Constants and configuration
//! - Descriptor and feed builders
//! - Mock host collaborators that record every call
//! - wiremock helpers for feed and gallery endpoints

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod mock_server;
pub mod mocks;

pub use builders::*;
pub use constants::*;
pub use mock_server::*;
pub use mocks::*;
