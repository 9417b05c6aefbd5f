//! Filter/sort pipeline over branch groups.
//!
//! Two independent predicates plus a final ordering:
//! 1. free-text search — applied to raw records *before* grouping, so a
//!    branch survives if its name or code contains the term;
//! 2. health filter — exact match against the aggregate, applied *after*
//!    grouping (it needs the computed health);
//! 3. severity sort — most severe first, stable, so ties keep the
//!    branch-name order the aggregator produced.

use crate::aggregate::{self, BranchGroup, BranchHealth};
use crate::model::TerminalStatus;

/// User-selected view filters. An empty search and `None` health mean
/// "show everything".
#[derive(Debug, Clone, Default)]
pub struct StatusFilter {
    pub search: String,
    pub health: Option<BranchHealth>,
}

impl StatusFilter {
    /// Case-insensitive substring match against branch name or code.
    fn matches_record(&self, record: &TerminalStatus) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        record.branch.to_lowercase().contains(&term)
            || record.code.to_lowercase().contains(&term)
    }

    fn matches_group(&self, group: &BranchGroup) -> bool {
        match self.health {
            Some(health) => group.health == health,
            None => true,
        }
    }
}

/// Run the full pipeline: search → group/aggregate → health filter →
/// severity sort.
pub fn run(records: &[TerminalStatus], filter: &StatusFilter) -> Vec<BranchGroup> {
    let visible: Vec<TerminalStatus> = records
        .iter()
        .filter(|r| filter.matches_record(r))
        .cloned()
        .collect();

    let mut groups: Vec<BranchGroup> = aggregate::group_by_branch(&visible)
        .into_iter()
        .filter(|g| filter.matches_group(g))
        .collect();

    groups.sort_by_key(|g| g.health.severity());
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TerminalState;

    fn terminal(branch: &str, code: &str, state: TerminalState) -> TerminalStatus {
        TerminalStatus {
            branch: branch.to_string(),
            code: code.to_string(),
            terminal: "T01".to_string(),
            state,
            detail: String::new(),
            last_run: String::new(),
        }
    }

    fn fixture() -> Vec<TerminalStatus> {
        vec![
            terminal("Centro", "001", TerminalState::Ok),
            terminal("Norte", "002", TerminalState::Erro),
            terminal("Sul", "003", TerminalState::Ok),
            terminal("Sul", "003", TerminalState::Ok),
            terminal("Sul", "003", TerminalState::Erro),
        ]
    }

    #[test]
    fn empty_filter_returns_all_groups() {
        let groups = run(&fixture(), &StatusFilter::default());
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn search_matches_branch_name_case_insensitive() {
        let filter = StatusFilter {
            search: "cen".to_string(),
            ..Default::default()
        };
        let groups = run(&fixture(), &filter);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].branch, "Centro");
    }

    #[test]
    fn search_matches_branch_code() {
        let filter = StatusFilter {
            search: "002".to_string(),
            ..Default::default()
        };
        let groups = run(&fixture(), &filter);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].branch, "Norte");
    }

    #[test]
    fn health_filter_keeps_only_matching_groups() {
        let filter = StatusFilter {
            health: Some(BranchHealth::Erro),
            ..Default::default()
        };
        let groups = run(&fixture(), &filter);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].branch, "Norte");
        assert!(groups.iter().all(|g| g.health == BranchHealth::Erro));
    }

    #[test]
    fn sort_orders_most_severe_first() {
        // Centro: 1 terminal OK → OK; Norte: 1 ERRO → ERRO;
        // Sul: 3 terminals, 2 OK + 1 ERRO → AVISO.
        let groups = run(&fixture(), &StatusFilter::default());
        let healths: Vec<BranchHealth> = groups.iter().map(|g| g.health).collect();
        assert_eq!(
            healths,
            vec![BranchHealth::Erro, BranchHealth::Aviso, BranchHealth::Ok]
        );
    }

    #[test]
    fn sort_ties_keep_branch_name_order() {
        let records = vec![
            terminal("Oeste", "004", TerminalState::Ok),
            terminal("Leste", "005", TerminalState::Ok),
        ];
        let groups = run(&records, &StatusFilter::default());
        assert_eq!(groups[0].branch, "Leste");
        assert_eq!(groups[1].branch, "Oeste");
    }
}
