//! # comprt-core
//!
//! Chroot lifecycle primitives for compartments.
//!
//! This crate provides safe abstractions over:
//! - **Mounts**: binding the pseudo-filesystems a chroot needs (`/sys`,
//!   `/proc`, `/dev`, `/dev/pts`) into a target tree, and releasing them
//!   with a bounded retry for transiently busy mount points.
//! - **Sessions**: entering a target directory as the new process root and
//!   later restoring the caller's original root and working directory,
//!   including under partial failure.
//! - **Lookup**: line-oriented field lookup in `/etc/passwd`-shaped files.
//!
//! The process root and working directory are process-global, so at most
//! one [`chroot::ChrootSession`] may be open per process at any time.

pub mod chroot;
pub mod locate;
pub mod mount;
