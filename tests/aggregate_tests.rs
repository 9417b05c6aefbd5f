//! Normalization and aggregation tests.
//!
//! Covers the canonical record defaults, the branch health rule at its
//! documented thresholds, and order-insensitivity of grouping. Pipeline and
//! retry behavior live in `pipeline_tests.rs` and `controller_tests.rs`.

use vigia::aggregate::{self, BranchHealth, UNASSIGNED_BRANCH};
use vigia::model::{self, RawStatusRecord, TerminalState, TerminalStatus};

fn records_from_json(json: &str) -> Vec<TerminalStatus> {
    let raw: Vec<RawStatusRecord> = serde_json::from_str(json).unwrap();
    model::normalize_all(raw)
}

fn terminal(branch: &str, state: TerminalState) -> TerminalStatus {
    TerminalStatus {
        branch: branch.to_string(),
        code: String::new(),
        terminal: String::new(),
        state,
        detail: String::new(),
        last_run: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn every_normalized_record_has_string_fields_and_uppercased_state() {
    let records = records_from_json(
        r#"[
            {"filial": "Centro", "terminal": "T01", "status": "ok"},
            {"branch": "Norte", "device": "T02", "status": "Erro", "detail": "disco cheio"},
            {},
            {"status": "desconhecido", "ultima_execucao": "2025-01-10 08:00:00"}
        ]"#,
    );

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].state, TerminalState::Ok);
    assert_eq!(records[1].state, TerminalState::Erro);
    assert_eq!(records[1].detail, "disco cheio");

    // The all-empty record still comes out with every field defaulted.
    let empty = &records[2];
    assert_eq!(empty.branch, "");
    assert_eq!(empty.code, "");
    assert_eq!(empty.terminal, "");
    assert_eq!(empty.detail, "");
    assert_eq!(empty.last_run, "");
    assert_eq!(empty.state, TerminalState::Desconhecido);

    assert_eq!(records[3].last_run, "2025-01-10 08:00:00");
}

#[test]
fn mixed_naming_conventions_group_together() {
    let records = records_from_json(
        r#"[
            {"filial": "Centro", "status": "OK"},
            {"branch": "Centro", "status": "OK"}
        ]"#,
    );
    let groups = aggregate::group_by_branch(&records);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].terminals.len(), 2);
}

// ---------------------------------------------------------------------------
// Health rule thresholds
// ---------------------------------------------------------------------------

#[test]
fn three_terminals_two_ok_one_erro_is_aviso() {
    let records = vec![
        terminal("F1", TerminalState::Ok),
        terminal("F1", TerminalState::Ok),
        terminal("F1", TerminalState::Erro),
    ];
    assert_eq!(aggregate::group_by_branch(&records)[0].health, BranchHealth::Aviso);
}

#[test]
fn one_terminal_no_erro_is_ok() {
    let records = vec![terminal("F1", TerminalState::Ok)];
    assert_eq!(aggregate::group_by_branch(&records)[0].health, BranchHealth::Ok);
}

#[test]
fn five_terminals_only_one_ok_is_erro() {
    let records = vec![
        terminal("F1", TerminalState::Ok),
        terminal("F1", TerminalState::Erro),
        terminal("F1", TerminalState::Desconhecido),
        terminal("F1", TerminalState::Erro),
        terminal("F1", TerminalState::Desconhecido),
    ];
    assert_eq!(aggregate::group_by_branch(&records)[0].health, BranchHealth::Erro);
}

#[test]
fn two_terminals_one_erro_is_erro() {
    let records = vec![
        terminal("F1", TerminalState::Ok),
        terminal("F1", TerminalState::Erro),
    ];
    assert_eq!(aggregate::group_by_branch(&records)[0].health, BranchHealth::Erro);
}

// ---------------------------------------------------------------------------
// Grouping properties
// ---------------------------------------------------------------------------

#[test]
fn reordering_input_preserves_health_and_membership() {
    let base = vec![
        terminal("Norte", TerminalState::Erro),
        terminal("Sul", TerminalState::Ok),
        terminal("Norte", TerminalState::Ok),
        terminal("Sul", TerminalState::Ok),
        terminal("Norte", TerminalState::Ok),
    ];

    let reference = aggregate::group_by_branch(&base);

    // A few deterministic shuffles: reversed and rotated.
    let mut reversed = base.clone();
    reversed.reverse();
    let mut rotated = base.clone();
    rotated.rotate_left(2);

    for variant in [reversed, rotated] {
        let groups = aggregate::group_by_branch(&variant);
        assert_eq!(groups.len(), reference.len());
        for (a, b) in groups.iter().zip(&reference) {
            assert_eq!(a.branch, b.branch);
            assert_eq!(a.health, b.health);
            assert_eq!(a.terminals.len(), b.terminals.len());
        }
    }
}

#[test]
fn branchless_records_land_in_the_sentinel_group() {
    let records = records_from_json(r#"[{"status": "OK"}, {"status": "ERRO"}]"#);
    let groups = aggregate::group_by_branch(&records);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].branch, UNASSIGNED_BRANCH);
    assert_eq!(groups[0].terminals.len(), 2);
}

#[test]
fn group_last_run_is_most_recent_parseable_timestamp() {
    let records = records_from_json(
        r#"[
            {"filial": "F1", "status": "OK", "ultima_execucao": "2025-03-01 10:00:00"},
            {"filial": "F1", "status": "OK", "ultima_execucao": "2025-03-02T08:00:00Z"},
            {"filial": "F1", "status": "OK", "ultima_execucao": "-"}
        ]"#,
    );
    let groups = aggregate::group_by_branch(&records);
    assert_eq!(groups[0].last_run, "2025-03-02T08:00:00Z");
}
