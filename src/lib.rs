//! pbx-recordings - bulk download of PBX call recordings
//!
//! This crate pages through the call history of a PBX REST API for a date
//! range, picks the calls that carry a recording and downloads each one into
//! a directory tree mirroring the recording reference.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Call records, filters, download targets, run outcomes and errors
//! - **Application**: The export use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (PBX REST API, SSO login, filesystem, config)
//! - **CLI**: Command-line interface, argument parsing, logging and progress output

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
