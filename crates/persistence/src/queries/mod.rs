// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event and timeline retrieval
//! - `directory`: Reference data (clients, users, sites, contracts, ...)
//! - `lifecycle`: Demandes, tickets, interventions, satisfactions
//! - `messaging`: Conversation logs

pub mod audit;
pub mod directory;
pub mod lifecycle;
pub mod messaging;
