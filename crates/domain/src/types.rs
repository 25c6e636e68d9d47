// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// A postal address shared by clients, sites and associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub address_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: Option<String>,
}

impl Address {
    /// Returns a single-line rendering suitable for list views.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts: Vec<&str> = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.trim().is_empty()) {
            parts.push(line2);
        }
        let locality = format!("{} {}", self.postal_code, self.city);
        let mut rendered = parts.join(", ");
        rendered.push_str(", ");
        rendered.push_str(locality.trim());
        if let Some(country) = self.country.as_deref().filter(|c| !c.trim().is_empty()) {
            rendered.push_str(", ");
            rendered.push_str(country);
        }
        rendered
    }
}

/// Primary contact person of a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A customer of the service company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub client_id: i64,
    pub name: String,
    pub contact: Contact,
    pub comment: Option<String>,
    pub address_id: Option<i64>,
}

/// A named person acting for a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    pub representative_id: i64,
    pub client_id: i64,
    pub name: String,
    pub function: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Operational status of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    #[default]
    Active,
    Inactive,
}

impl SiteStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for SiteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(DomainError::UnknownStatus {
                family: "site",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical location where work is carried out.
///
/// `has_open_ticket` is not part of the entity; it is derived by the
/// relation views from the site's tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub site_id: i64,
    /// Unset while the site is not yet attached to a client.
    pub client_id: Option<i64>,
    pub name: String,
    pub address_id: Option<i64>,
    pub status: SiteStatus,
    /// User id of the agent responsible for the site.
    pub responsible_agent_id: Option<i64>,
    pub comment: Option<String>,
}

/// A service contract covering one or more sites over a date window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub contract_id: i64,
    pub client_id: i64,
    pub title: String,
    pub start_date: Date,
    pub end_date: Date,
    pub comment: Option<String>,
}

impl Contract {
    /// Returns true if the contract covers `date` (inclusive on both ends).
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A billing / grouping entity spanning several sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub association_id: i64,
    pub title: String,
    pub billing_email: String,
    pub address_id: Option<i64>,
}

/// Role of a user of the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Back-office staff with full authority.
    Admin,
    /// Field agent working interventions.
    Agent,
    /// Customer-side user bound to one client.
    Client,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agent => "agent",
            Self::Client => "client",
        }
    }

    /// Staff users can be assigned to tickets and associations.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin | Self::Agent)
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "agent" => Ok(Self::Agent),
            "client" => Ok(Self::Client),
            _ => Err(DomainError::UnknownStatus {
                family: "user role",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person who can act on the system or take part in a conversation.
///
/// Agents are identified in assignments by their matricule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub login: String,
    pub display_name: String,
    pub role: UserRole,
    /// Required for `UserRole::Client`, absent for staff.
    pub client_id: Option<i64>,
    pub matricule: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// How a staff user is attached to a ticket or association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// Formally accountable for the work.
    Responsable,
    /// Carries out the work.
    Agent,
}

impl AssignmentKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Responsable => "responsable",
            Self::Agent => "agent",
        }
    }
}

impl FromStr for AssignmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "responsable" => Ok(Self::Responsable),
            "agent" => Ok(Self::Agent),
            _ => Err(DomainError::UnknownStatus {
                family: "assignment",
                value: s.to_string(),
            }),
        }
    }
}

/// A join row linking a user to a ticket or association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub user_id: i64,
    pub kind: AssignmentKind,
    pub role_label: Option<String>,
}

impl Assignment {
    /// True if this row already attaches `user_id` as `kind` under the same
    /// role label. Blank labels compare equal to no label.
    #[must_use]
    pub fn matches(&self, user_id: i64, kind: AssignmentKind, role_label: Option<&str>) -> bool {
        fn normalize(label: Option<&str>) -> Option<&str> {
            label.map(str::trim).filter(|l| !l.is_empty())
        }

        self.user_id == user_id
            && self.kind == kind
            && normalize(self.role_label.as_deref()) == normalize(role_label)
    }
}

/// Works-documentation record of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doe {
    pub doe_id: i64,
    pub site_id: i64,
    pub title: String,
}

/// Business case used to classify tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affaire {
    pub affaire_id: i64,
    pub title: String,
    pub client_id: Option<i64>,
}
