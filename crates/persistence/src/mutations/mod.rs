// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event persistence
//! - `entities`: One write per `Mutation` variant
//! - `transition`: Transactional orchestration (`persist_transition`)

pub mod audit;
pub mod entities;
pub mod transition;

pub use transition::{PersistTransitionResult, persist_transition};
