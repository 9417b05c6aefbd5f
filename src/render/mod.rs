//! Pure projection from branch groups to row view-models.
//!
//! No terminal output happens here — `cli` binds these view-models to
//! `colored` println calls. Keeping the projection pure lets the table and
//! detail views be asserted on directly in tests.
//!
//! Every displayed field passes through [`sanitize`]: the API payload is
//! untrusted, and a stray ESC byte in a detail message must not be able to
//! inject terminal control sequences.

use crate::aggregate::BranchGroup;

/// Which view is on screen. Replaces the implicit "is the modal open"
/// question with an explicit state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Table,
    /// Detail view for one branch, selected by name or code.
    Detail(String),
}

// ---------------------------------------------------------------------------
// View-models
// ---------------------------------------------------------------------------

/// One row of the branch status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRow {
    pub branch: String,
    pub last_run: String,
    pub health: String,
    /// Display class derived 1:1 from the health enum (`ok`/`aviso`/`erro`).
    pub class: &'static str,
    pub terminal_count: usize,
}

/// Detail view for one branch: every terminal with its multi-line detail
/// preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub branch: String,
    pub code: String,
    pub health: String,
    pub class: &'static str,
    pub terminals: Vec<TerminalRow>,
}

/// One terminal inside a detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalRow {
    pub terminal: String,
    pub state: String,
    /// Detail lines, newlines intact (split for the rendering layer).
    pub detail_lines: Vec<String>,
    pub last_run: String,
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// Project the visible groups into table rows.
pub fn project_table(groups: &[BranchGroup]) -> Vec<BranchRow> {
    groups
        .iter()
        .map(|g| BranchRow {
            branch: sanitize(&g.branch),
            last_run: sanitize(&g.last_run),
            health: g.health.to_string(),
            class: g.health.display_class(),
            terminal_count: g.terminals.len(),
        })
        .collect()
}

/// Project one group into its detail view.
pub fn project_detail(group: &BranchGroup) -> DetailView {
    DetailView {
        branch: sanitize(&group.branch),
        code: sanitize(&group.code),
        health: group.health.to_string(),
        class: group.health.display_class(),
        terminals: group
            .terminals
            .iter()
            .map(|t| TerminalRow {
                terminal: sanitize(&t.terminal),
                state: t.state.to_string(),
                detail_lines: t.detail.lines().map(sanitize).collect(),
                last_run: sanitize(&t.last_run),
            })
            .collect(),
    }
}

/// Flatten a multi-line detail for single-row table display.
pub fn flatten_detail(detail: &str) -> String {
    sanitize(detail).split('\n').collect::<Vec<_>>().join("; ")
}

/// Strip ASCII control characters (except the newline, handled by callers).
///
/// This is the terminal analogue of HTML escaping: `<script>` is harmless
/// here, ESC/CSI bytes are not.
pub fn sanitize(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
