//! Branch-level aggregation.
//!
//! Groups canonical terminal records by branch and derives one health label
//! per branch. The health rule (confirmed with operations as the intended
//! business rule):
//!
//! - 3+ terminals: at least 2 OK with any ERRO present → AVISO (degraded but
//!   mostly up); at least 2 OK and no ERRO → OK; otherwise → ERRO.
//! - fewer than 3 terminals: any ERRO → ERRO, else OK.
//!
//! Grouping is order-insensitive: reordering the input changes neither group
//! membership nor the computed health.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime};

use crate::model::{TerminalState, TerminalStatus};

/// Group name for records that arrive without any branch identifier.
pub const UNASSIGNED_BRANCH: &str = "SEM FILIAL";

// ---------------------------------------------------------------------------
// Branch health
// ---------------------------------------------------------------------------

/// Aggregate health of a branch, derived from its terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchHealth {
    Ok,
    Aviso,
    Erro,
}

impl BranchHealth {
    /// Severity rank for sorting: most severe first.
    pub fn severity(self) -> u8 {
        match self {
            Self::Erro => 1,
            Self::Aviso => 2,
            Self::Ok => 3,
        }
    }

    /// Display class for the rendering layer (1:1 with the enum).
    pub fn display_class(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Aviso => "aviso",
            Self::Erro => "erro",
        }
    }

    /// Parse a user-supplied filter value. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "AVISO" => Some(Self::Aviso),
            "ERRO" => Some(Self::Erro),
            _ => None,
        }
    }
}

impl fmt::Display for BranchHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Aviso => write!(f, "AVISO"),
            Self::Erro => write!(f, "ERRO"),
        }
    }
}

// ---------------------------------------------------------------------------
// Branch group
// ---------------------------------------------------------------------------

/// All terminals of one branch plus the derived health.
///
/// Recomputed from scratch on every refresh or filter change; never cached
/// across fetches.
#[derive(Debug, Clone)]
pub struct BranchGroup {
    /// Branch display name (or [`UNASSIGNED_BRANCH`]).
    pub branch: String,
    /// Branch code for the logs/command endpoints; falls back to the name
    /// when the API never sent one.
    pub code: String,
    /// Members in input order.
    pub terminals: Vec<TerminalStatus>,
    pub health: BranchHealth,
    /// Most recent `last_run` among the members ("-" when none parse).
    pub last_run: String,
}

/// Group records by branch and compute each group's health.
///
/// Groups come out in branch-name order (BTreeMap iteration), which gives the
/// pipeline a deterministic tie order before the severity sort.
pub fn group_by_branch(records: &[TerminalStatus]) -> Vec<BranchGroup> {
    let mut groups: BTreeMap<String, Vec<&TerminalStatus>> = BTreeMap::new();
    for record in records {
        let key = if record.branch.is_empty() {
            UNASSIGNED_BRANCH.to_string()
        } else {
            record.branch.clone()
        };
        groups.entry(key).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(branch, members)| build_group(branch, &members))
        .collect()
}

fn build_group(branch: String, members: &[&TerminalStatus]) -> BranchGroup {
    let code = members
        .iter()
        .find(|t| !t.code.is_empty())
        .map(|t| t.code.clone())
        .unwrap_or_else(|| branch.clone());

    BranchGroup {
        code,
        health: compute_health(members),
        last_run: latest_run(members),
        terminals: members.iter().map(|t| (*t).clone()).collect(),
        branch,
    }
}

/// Derive a branch's health from its member states.
fn compute_health(members: &[&TerminalStatus]) -> BranchHealth {
    let total = members.len();
    let count_ok = members
        .iter()
        .filter(|t| t.state == TerminalState::Ok)
        .count();
    let count_err = members
        .iter()
        .filter(|t| t.state == TerminalState::Erro)
        .count();

    if total >= 3 {
        if count_ok >= 2 && count_err > 0 {
            BranchHealth::Aviso
        } else if count_ok >= 2 {
            BranchHealth::Ok
        } else {
            BranchHealth::Erro
        }
    } else if count_err == 0 {
        BranchHealth::Ok
    } else {
        BranchHealth::Erro
    }
}

/// Pick the member `last_run` with the most recent parsed timestamp.
///
/// Unparsable timestamps (including `"-"` and empty) rank as epoch 0; ties
/// keep the first-encountered member (max_by_key returns the last maximum,
/// so we compare strictly greater while scanning). Returns `"-"` for an
/// empty group.
fn latest_run(members: &[&TerminalStatus]) -> String {
    let mut best: Option<(i64, &str)> = None;
    for t in members {
        let ts = parse_timestamp(&t.last_run);
        match best {
            Some((best_ts, _)) if ts <= best_ts => {}
            _ => best = Some((ts, t.last_run.as_str())),
        }
    }
    match best {
        Some((_, raw)) if !raw.is_empty() => raw.to_string(),
        _ => "-".to_string(),
    }
}

/// Parse a wire timestamp into epoch seconds; anything unparsable is 0.
///
/// The API has emitted RFC 3339, `YYYY-MM-DD HH:MM:SS`, and the Brazilian
/// `DD/MM/YYYY HH:MM:SS` over its lifetime.
pub fn parse_timestamp(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        return 0;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return naive.and_utc().timestamp();
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
