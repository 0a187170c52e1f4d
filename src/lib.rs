//! # Profilo (User Profile Management API)
//!
//! `profilo` stores user profiles in PostgreSQL and authenticates them with
//! salted PBKDF2 password hashing.
//!
//! - [`password`] turns plaintext passwords into self-describing credential
//!   envelopes and verifies candidates against stored ones.
//! - [`profile`] holds the domain: models, response envelopes, the
//!   validation/classification service, and the persistence collaborator.
//! - [`profilo`] wires the axum HTTP surface; [`cli`] parses configuration
//!   and installs telemetry.

pub mod cli;
pub mod password;
pub mod profile;
pub mod profilo;
