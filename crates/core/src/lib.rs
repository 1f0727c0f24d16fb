//! Core logic for Blobmail.
//!
//! This crate holds the upload pipeline and everything that reacts to a
//! stored file. It has no web dependencies.
//!
//! # Modules
//!
//! - `storage` - Upload validation, key derivation, signed URLs, metadata
//! - `notify` - The "link to your file" email
//! - `trigger` - Handler for "blob landed in storage" events

pub mod notify;
pub mod storage;
pub mod trigger;
