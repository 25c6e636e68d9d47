// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use fieldops_audit::StateSnapshot;
use fieldops_domain::{Demande, Intervention, Site, Ticket, format_timestamp};

pub fn demande(d: &Demande) -> StateSnapshot {
    StateSnapshot::new(format!(
        "status={},site_id={},ticket_id={},title={:?}",
        d.status.as_str(),
        d.site_id,
        d.ticket_id.map_or_else(|| String::from("none"), |id| id.to_string()),
        d.title
    ))
}

pub fn ticket(t: &Ticket) -> StateSnapshot {
    StateSnapshot::new(format!(
        "state={},responsable_id={},ended_at={}",
        t.state,
        t.responsable_id
            .map_or_else(|| String::from("none"), |id| id.to_string()),
        t.ended_at
            .map_or_else(|| String::from("none"), format_timestamp)
    ))
}

pub fn intervention(i: &Intervention) -> StateSnapshot {
    StateSnapshot::new(format!(
        "status={},ended_at={}",
        i.status,
        i.ended_at
            .map_or_else(|| String::from("none"), format_timestamp)
    ))
}

pub fn site(s: &Site) -> StateSnapshot {
    StateSnapshot::new(format!(
        "status={},client_id={},responsible_agent_id={}",
        s.status,
        s.client_id.map_or_else(|| String::from("none"), |id| id.to_string()),
        s.responsible_agent_id
            .map_or_else(|| String::from("none"), |id| id.to_string())
    ))
}

/// Snapshot for a freshly created entity, naming it.
pub fn created(label: &str) -> StateSnapshot {
    StateSnapshot::new(format!("created {label}"))
}
