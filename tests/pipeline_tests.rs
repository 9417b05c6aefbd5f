//! Filter/sort pipeline and renderer projection tests.

use vigia::aggregate::BranchHealth;
use vigia::model::{TerminalState, TerminalStatus};
use vigia::pipeline::{self, StatusFilter};
use vigia::render;

fn terminal(branch: &str, code: &str, state: TerminalState, detail: &str) -> TerminalStatus {
    TerminalStatus {
        branch: branch.to_string(),
        code: code.to_string(),
        terminal: "T01".to_string(),
        state,
        detail: detail.to_string(),
        last_run: "2025-01-10 08:00:00".to_string(),
    }
}

/// Centro → OK (1 terminal), Norte → ERRO (1 ERRO), Sul → AVISO (2 OK + 1 ERRO).
fn fixture() -> Vec<TerminalStatus> {
    vec![
        terminal("Centro", "001", TerminalState::Ok, ""),
        terminal("Norte", "002", TerminalState::Erro, "sem resposta"),
        terminal("Sul", "003", TerminalState::Ok, ""),
        terminal("Sul", "003", TerminalState::Ok, ""),
        terminal("Sul", "003", TerminalState::Erro, "impressora off"),
    ]
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[test]
fn empty_filter_returns_every_group() {
    let groups = pipeline::run(&fixture(), &StatusFilter::default());
    assert_eq!(groups.len(), 3);
}

#[test]
fn health_filter_erro_returns_only_erro_groups() {
    let filter = StatusFilter {
        health: Some(BranchHealth::Erro),
        ..Default::default()
    };
    let groups = pipeline::run(&fixture(), &filter);
    assert!(!groups.is_empty());
    assert!(groups.iter().all(|g| g.health == BranchHealth::Erro));
    assert_eq!(groups[0].branch, "Norte");
}

#[test]
fn search_is_case_insensitive_and_matches_name_or_code() {
    let by_name = StatusFilter {
        search: "SUL".to_string(),
        ..Default::default()
    };
    let groups = pipeline::run(&fixture(), &by_name);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].branch, "Sul");

    let by_code = StatusFilter {
        search: "001".to_string(),
        ..Default::default()
    };
    let groups = pipeline::run(&fixture(), &by_code);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].branch, "Centro");
}

#[test]
fn search_and_health_filters_compose() {
    let filter = StatusFilter {
        search: "sul".to_string(),
        health: Some(BranchHealth::Ok),
    };
    // Sul aggregates to AVISO, so the composed filter matches nothing.
    assert!(pipeline::run(&fixture(), &filter).is_empty());
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn groups_render_most_severe_first() {
    let groups = pipeline::run(&fixture(), &StatusFilter::default());
    let healths: Vec<BranchHealth> = groups.iter().map(|g| g.health).collect();
    assert_eq!(
        healths,
        vec![BranchHealth::Erro, BranchHealth::Aviso, BranchHealth::Ok]
    );
}

// ---------------------------------------------------------------------------
// Renderer projection
// ---------------------------------------------------------------------------

#[test]
fn table_rows_mirror_pipeline_order() {
    let groups = pipeline::run(&fixture(), &StatusFilter::default());
    let rows = render::project_table(&groups);
    let names: Vec<&str> = rows.iter().map(|r| r.branch.as_str()).collect();
    assert_eq!(names, vec!["Norte", "Sul", "Centro"]);
    assert_eq!(rows[0].class, "erro");
    assert_eq!(rows[1].class, "aviso");
    assert_eq!(rows[2].class, "ok");
}

#[test]
fn detail_view_lists_every_terminal_with_multiline_detail() {
    let records = vec![terminal(
        "Centro",
        "001",
        TerminalState::Erro,
        "linha 1\nlinha 2",
    )];
    let groups = pipeline::run(&records, &StatusFilter::default());
    let view = render::project_detail(&groups[0]);

    assert_eq!(view.branch, "Centro");
    assert_eq!(view.code, "001");
    assert_eq!(view.terminals.len(), 1);
    assert_eq!(view.terminals[0].detail_lines, vec!["linha 1", "linha 2"]);
}

#[test]
fn hostile_payload_cannot_inject_terminal_control_sequences() {
    let records = vec![terminal(
        "Cen\x1b[2Jtro",
        "001",
        TerminalState::Ok,
        "<script>alert(1)</script>\x1b]0;pwned\x07",
    )];
    let groups = pipeline::run(&records, &StatusFilter::default());

    let rows = render::project_table(&groups);
    assert!(!rows[0].branch.contains('\x1b'));

    let view = render::project_detail(&groups[0]);
    for line in &view.terminals[0].detail_lines {
        assert!(!line.contains('\x1b'));
        assert!(!line.contains('\x07'));
    }
    // Inert markup passes through as plain text.
    assert!(view.terminals[0].detail_lines[0].contains("<script>"));
}
