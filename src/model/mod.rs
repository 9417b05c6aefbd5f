//! Canonical data model for terminal status records.
//!
//! The monitoring API has grown two field-naming conventions over time
//! (`filial`/`branch`, `terminal`/`device`, ...). Raw records deserialize
//! tolerant of both via serde aliases; [`RawStatusRecord::normalize`] maps
//! them into an immutable [`TerminalStatus`] with every field defaulted to
//! an empty string. Normalization never fails — absent fields are silently
//! empty, unknown status strings become [`TerminalState::Desconhecido`].

use serde::Deserialize;
use std::fmt;

// ---------------------------------------------------------------------------
// Raw wire record
// ---------------------------------------------------------------------------

/// One raw record as returned by `GET /api/status`.
///
/// Every field is optional; aliases cover the older English field names
/// alongside the current Portuguese ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatusRecord {
    #[serde(default, alias = "branch")]
    pub filial: Option<String>,
    #[serde(default, alias = "code")]
    pub codigo: Option<String>,
    #[serde(default, alias = "device")]
    pub terminal: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "detail")]
    pub detalhe: Option<String>,
    #[serde(default, alias = "last_run")]
    pub ultima_execucao: Option<String>,
}

impl RawStatusRecord {
    /// Normalize into a canonical [`TerminalStatus`].
    pub fn normalize(self) -> TerminalStatus {
        let status = self.status.unwrap_or_default().to_uppercase();
        TerminalStatus {
            branch: self.filial.unwrap_or_default(),
            code: self.codigo.unwrap_or_default(),
            terminal: self.terminal.unwrap_or_default(),
            state: TerminalState::parse(&status),
            detail: self.detalhe.unwrap_or_default(),
            last_run: self.ultima_execucao.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// Execution state reported by a single terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Ok,
    Erro,
    Desconhecido,
}

impl TerminalState {
    /// Map an (already upper-cased) wire string to a state.
    fn parse(s: &str) -> Self {
        match s {
            "OK" => Self::Ok,
            "ERRO" => Self::Erro,
            _ => Self::Desconhecido,
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Erro => write!(f, "ERRO"),
            Self::Desconhecido => write!(f, "DESCONHECIDO"),
        }
    }
}

/// Canonical per-terminal status record.
///
/// Immutable once created; the whole set is discarded and rebuilt on every
/// refresh. `last_run` stays a string here — timestamp parsing happens only
/// where recency matters (group aggregation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStatus {
    /// Branch display name (may be empty — see the aggregator's sentinel).
    pub branch: String,
    /// Branch code used in the logs/command endpoints. Empty when the API
    /// only sent a name.
    pub code: String,
    pub terminal: String,
    pub state: TerminalState,
    pub detail: String,
    /// Raw timestamp string, or `"-"`/empty when the terminal never ran.
    pub last_run: String,
}

/// Normalize a whole payload in input order.
pub fn normalize_all(records: Vec<RawStatusRecord>) -> Vec<TerminalStatus> {
    records.into_iter().map(RawStatusRecord::normalize).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_missing_fields_to_empty() {
        let raw = RawStatusRecord::default();
        let ts = raw.normalize();
        assert_eq!(ts.branch, "");
        assert_eq!(ts.code, "");
        assert_eq!(ts.terminal, "");
        assert_eq!(ts.detail, "");
        assert_eq!(ts.last_run, "");
        assert_eq!(ts.state, TerminalState::Desconhecido);
    }

    #[test]
    fn normalize_uppercases_status() {
        let raw: RawStatusRecord =
            serde_json::from_str(r#"{"filial": "Centro", "status": "ok"}"#).unwrap();
        assert_eq!(raw.normalize().state, TerminalState::Ok);

        let raw: RawStatusRecord =
            serde_json::from_str(r#"{"filial": "Centro", "status": "erro"}"#).unwrap();
        assert_eq!(raw.normalize().state, TerminalState::Erro);
    }

    #[test]
    fn normalize_accepts_both_naming_conventions() {
        let pt: RawStatusRecord = serde_json::from_str(
            r#"{"filial": "Centro", "terminal": "T01", "detalhe": "tudo certo",
                "ultima_execucao": "2025-01-10 08:00:00", "status": "OK"}"#,
        )
        .unwrap();
        let en: RawStatusRecord = serde_json::from_str(
            r#"{"branch": "Centro", "device": "T01", "detail": "tudo certo",
                "last_run": "2025-01-10 08:00:00", "status": "OK"}"#,
        )
        .unwrap();
        assert_eq!(pt.normalize(), en.normalize());
    }

    #[test]
    fn unknown_status_maps_to_desconhecido() {
        let raw: RawStatusRecord =
            serde_json::from_str(r#"{"status": "pendente"}"#).unwrap();
        assert_eq!(raw.normalize().state, TerminalState::Desconhecido);
    }

    #[test]
    fn state_display_matches_wire_strings() {
        assert_eq!(TerminalState::Ok.to_string(), "OK");
        assert_eq!(TerminalState::Erro.to_string(), "ERRO");
        assert_eq!(TerminalState::Desconhecido.to_string(), "DESCONHECIDO");
    }
}
