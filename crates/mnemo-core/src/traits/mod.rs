// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the memory engine's seams.
//!
//! The persistence collaborator and the extraction heuristic are the
//! two substitutable dependencies; everything else is concrete.

pub mod extract;
pub mod store;

pub use extract::FragmentExtractor;
pub use store::FragmentStore;
