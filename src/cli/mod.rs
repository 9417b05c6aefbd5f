//! CLI command implementations for vigia.
//!
//! Provides subcommand handlers for:
//! - `vigia status` — branch health table / per-branch detail view
//! - `vigia watch` — continuous dashboard with polling and retry
//! - `vigia logs <branch>` — execution log for one branch
//! - `vigia run <branch>` — trigger an on-demand run
//! - `vigia config show|init|set|reset|pull|push` — local + remote config
//! - `vigia health` — connectivity and config checklist

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::aggregate::BranchGroup;
use crate::api::MonitorClient;
use crate::config::{self, VigiaConfig};
use crate::controller::Refresher;
use crate::pipeline::{self, StatusFilter};
use crate::render::{self, BranchRow, View};

/// Output format for the status command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Build a client from config, failing with a setup hint when the base URL
/// was never configured.
fn client_from_config(cfg: &VigiaConfig) -> Result<MonitorClient> {
    if cfg.api.base_url.is_empty() {
        anyhow::bail!(
            "monitoring API URL not configured. Run `vigia config init` and set \
             api.base_url, or export VIGIA_API_URL."
        );
    }
    Ok(MonitorClient::from_config(cfg))
}

// ---------------------------------------------------------------------------
// vigia status
// ---------------------------------------------------------------------------

/// One-shot status view: table, or detail when `--branch` selects one.
pub fn run_status(
    search: Option<&str>,
    health: Option<&str>,
    branch: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let cfg = config::load();
    if !cfg.display.color {
        colored::control::set_override(false);
    }
    let client = client_from_config(&cfg)?;
    let refresher = Refresher::new(
        client,
        Duration::from_secs(cfg.refresh.retry_delay_secs),
        cfg.refresh.retry_attempts,
    );

    let filter = build_filter(search, health)?;
    let view = match branch {
        Some(b) => View::Detail(b.to_string()),
        None => View::Table,
    };

    let outcome = refresher.refresh_with_retry(|err, delay| {
        print_error_row(&err.to_string());
        eprintln!(
            "{}",
            format!("  tentando novamente em {}s...", delay.as_secs()).dimmed()
        );
        thread::sleep(delay);
    });

    let records = match outcome.result {
        Ok(records) => records,
        Err(err) => {
            print_error_row(&err.to_string());
            anyhow::bail!("não foi possível carregar o status das filiais");
        }
    };

    let groups = pipeline::run(&records, &filter);

    match view {
        View::Table => print_groups(&groups, &cfg, format)?,
        View::Detail(selector) => {
            let group = find_branch(&groups, &selector).with_context(|| {
                format!("filial '{selector}' não encontrada (confira nome ou código)")
            })?;
            print_detail(group, format)?;
        }
    }

    Ok(())
}

fn build_filter(search: Option<&str>, health: Option<&str>) -> Result<StatusFilter> {
    let health = match health {
        Some(h) => Some(
            crate::aggregate::BranchHealth::parse(h)
                .with_context(|| format!("status inválido '{h}' (use OK, AVISO ou ERRO)"))?,
        ),
        None => None,
    };
    Ok(StatusFilter {
        search: search.unwrap_or_default().to_string(),
        health,
    })
}

/// Select a group by branch name or code, case-insensitive.
fn find_branch<'a>(groups: &'a [BranchGroup], selector: &str) -> Option<&'a BranchGroup> {
    let needle = selector.to_lowercase();
    groups
        .iter()
        .find(|g| g.branch.to_lowercase() == needle || g.code.to_lowercase() == needle)
}

// ---------------------------------------------------------------------------
// vigia watch
// ---------------------------------------------------------------------------

/// Continuous dashboard: clear, render, sleep, repeat. Retries on failure
/// with the configured delay; Ctrl+C ends it.
pub fn run_watch(interval: Option<u64>, search: Option<&str>, health: Option<&str>) -> Result<()> {
    let cfg = config::load();
    if !cfg.display.color {
        colored::control::set_override(false);
    }
    let client = client_from_config(&cfg)?;
    let refresher = Refresher::new(
        client,
        Duration::from_secs(cfg.refresh.retry_delay_secs),
        cfg.refresh.retry_attempts,
    );
    let filter = build_filter(search, health)?;
    let poll = Duration::from_secs(interval.unwrap_or(cfg.refresh.poll_interval_secs));

    loop {
        let outcome = refresher.refresh_with_retry(|err, delay| {
            print_error_row(&err.to_string());
            eprintln!(
                "{}",
                format!("  tentando novamente em {}s...", delay.as_secs()).dimmed()
            );
            thread::sleep(delay);
        });

        // Clear only right before redrawing, so errors stay visible while
        // the retry timer runs.
        match outcome.result {
            Ok(records) => {
                let groups = pipeline::run(&records, &filter);
                clear_screen();
                println!(
                    "{}  {}",
                    "vigia — status das filiais".bold().cyan(),
                    chrono::Local::now().format("%H:%M:%S").to_string().dimmed()
                );
                print_groups(&groups, &cfg, OutputFormat::Table)?;
                println!(
                    "{}",
                    format!("atualizando a cada {}s — Ctrl+C para sair", poll.as_secs()).dimmed()
                );
            }
            Err(err) => print_error_row(&err.to_string()),
        }

        thread::sleep(poll);
    }
}

fn clear_screen() {
    // ANSI clear + home; good enough for a cooperative dashboard loop.
    print!("\x1b[2J\x1b[H");
}

// ---------------------------------------------------------------------------
// Table / detail printing
// ---------------------------------------------------------------------------

fn print_groups(groups: &[BranchGroup], cfg: &VigiaConfig, format: OutputFormat) -> Result<()> {
    let rows = render::project_table(groups);

    match format {
        OutputFormat::Json => print_rows_json(&rows)?,
        OutputFormat::Csv => print_rows_csv(&rows),
        OutputFormat::Table => print_rows_table(&rows, groups, cfg),
    }
    Ok(())
}

fn print_rows_table(rows: &[BranchRow], groups: &[BranchGroup], cfg: &VigiaConfig) {
    if rows.is_empty() {
        println!("{}", "Nenhuma filial corresponde ao filtro.".yellow());
        return;
    }

    println!(
        "  {:<24} {:>9} {:<20} {:<7} Detalhe",
        "Filial", "Terminais", "Última execução", "Status"
    );
    println!("  {}", "-".repeat(78));

    for (row, group) in rows.iter().zip(groups) {
        // First terminal's detail, flattened, as a one-line hint; the full
        // text lives in the detail view.
        let hint = group
            .terminals
            .first()
            .map(|t| render::flatten_detail(&t.detail))
            .unwrap_or_default();
        println!(
            "  {:<24} {:>9} {:<20} {} {}",
            truncate(&row.branch, 24),
            row.terminal_count,
            truncate(&row.last_run, 20),
            colorize_health(&pad(&row.health, 7), row.class),
            truncate(&hint, cfg.display.max_detail_width).dimmed(),
        );
    }

    println!();
    println!(
        "  {}",
        "use `vigia status --branch <nome|código>` para ver os terminais".dimmed()
    );
}

fn print_rows_json(rows: &[BranchRow]) -> Result<()> {
    let values: Vec<_> = rows
        .iter()
        .map(|r| {
            serde_json::json!({
                "filial": r.branch,
                "terminais": r.terminal_count,
                "ultima_execucao": r.last_run,
                "status": r.health,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

fn print_rows_csv(rows: &[BranchRow]) {
    println!("filial,terminais,ultima_execucao,status");
    for r in rows {
        println!(
            "{},{},{},{}",
            r.branch, r.terminal_count, r.last_run, r.health
        );
    }
}

fn print_detail(group: &BranchGroup, format: OutputFormat) -> Result<()> {
    let view = render::project_detail(group);

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "filial": view.branch,
            "codigo": view.code,
            "status": view.health,
            "terminais": view.terminals.iter().map(|t| serde_json::json!({
                "terminal": t.terminal,
                "status": t.state,
                "detalhe": t.detail_lines.join("\n"),
                "ultima_execucao": t.last_run,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        view.branch.bold().cyan(),
        format!("({})", view.code).dimmed(),
        colorize_health(&view.health, view.class),
    );
    println!("{}", "=".repeat(60));

    for t in &view.terminals {
        println!(
            "  {} {} {}",
            pad(&t.terminal, 16).bold(),
            colorize_health(&pad(&t.state, 13), state_class(&t.state)),
            t.last_run.dimmed(),
        );
        for line in &t.detail_lines {
            println!("      {line}");
        }
    }

    Ok(())
}

fn state_class(state: &str) -> &'static str {
    match state {
        "OK" => "ok",
        "ERRO" => "erro",
        _ => "aviso",
    }
}

/// Render a visible inline error row.
fn print_error_row(msg: &str) {
    eprintln!("  {} {}", "✗".red().bold(), msg.red());
}

// ---------------------------------------------------------------------------
// vigia logs
// ---------------------------------------------------------------------------

/// Print the execution log for one branch: `[timestamp] STATUS - detail`.
pub fn run_logs(branch: &str) -> Result<()> {
    let cfg = config::load();
    let client = client_from_config(&cfg)?;

    let logs = client
        .fetch_logs(branch)
        .map_err(|e| anyhow::anyhow!("erro ao buscar logs: {e}"))?;

    if logs.is_empty() {
        println!("{}", "Nenhum log encontrado.".yellow());
        return Ok(());
    }

    for entry in &logs {
        let status = render::sanitize(&entry.status);
        println!(
            "[{}] {} - {}",
            render::sanitize(&entry.data_execucao).dimmed(),
            colorize_health(&status, state_class(&status)),
            render::sanitize(&entry.detalhe),
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// vigia run
// ---------------------------------------------------------------------------

/// Trigger an on-demand run for a branch and echo the API's JSON reply.
pub fn run_trigger(branch: &str) -> Result<()> {
    let cfg = config::load();
    let client = client_from_config(&cfg)?;

    let reply = client
        .send_command(branch)
        .map_err(|e| anyhow::anyhow!("erro ao enviar comando: {e}"))?;

    println!(
        "{} comando enviado para {}",
        "✓".green().bold(),
        branch.bold()
    );
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// vigia config show | init | set | reset | pull | push
// ---------------------------------------------------------------------------

/// Show the effective (merged) local configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Configuração efetiva do vigia".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Fontes (maior precedência por último):".dimmed());
    println!("  {} padrões embutidos", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.vigia/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.vigia/config.toml (não encontrado)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".vigia.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".vigia.toml (não encontrado)".dimmed());
    }
    println!("  {} {}", "·".dimmed(), "variáveis VIGIA_*".dimmed());

    Ok(())
}

/// Write the default config file at `~/.vigia/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} configuração criada em {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "edite api.base_url para apontar para sua API".dimmed());
    Ok(())
}

/// Set a single key in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset the local config to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} configuração restaurada em {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Fetch and print the *remote* pipeline config (`GET /api/config`).
pub fn run_config_pull() -> Result<()> {
    let cfg = config::load();
    let client = client_from_config(&cfg)?;
    let remote = client
        .fetch_config()
        .map_err(|e| anyhow::anyhow!("erro ao carregar configuração remota: {e}"))?;
    println!("{}", serde_json::to_string_pretty(&remote)?);
    Ok(())
}

/// Push a JSON file as the new remote pipeline config (`POST /api/config`).
pub fn run_config_push(file: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("falha ao ler {file}"))?;
    let body: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("{file} não é JSON válido"))?;

    let cfg = config::load();
    let client = client_from_config(&cfg)?;
    let reply = client
        .save_config(&body)
        .map_err(|e| anyhow::anyhow!("erro ao salvar configuração: {e}"))?;

    println!(
        "{} {}",
        "✓".green().bold(),
        reply.msg.as_deref().unwrap_or("Configuração salva!")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// vigia health
// ---------------------------------------------------------------------------

/// Connectivity and config checklist.
pub fn run_health() -> Result<()> {
    println!("{}", "vigia — verificação de saúde".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Config global",
        global_exists,
        if global_exists {
            "~/.vigia/config.toml encontrado"
        } else {
            "não encontrado (rode `vigia config init`)"
        },
    );
    print_health_item(
        "Config do projeto",
        project_exists,
        if project_exists {
            ".vigia.toml encontrado"
        } else {
            "nenhum (opcional)"
        },
    );

    let url_set = !cfg.api.base_url.is_empty();
    print_health_item(
        "API configurada",
        url_set,
        if url_set {
            &cfg.api.base_url
        } else {
            "api.base_url vazio — defina ou exporte VIGIA_API_URL"
        },
    );

    if url_set {
        let client = MonitorClient::from_config(&cfg);
        let reachable = client.is_reachable();
        print_health_item(
            "API alcançável",
            reachable,
            if reachable {
                "GET /api/status respondeu"
            } else {
                "sem resposta — a API está no ar?"
            },
        );

        if reachable {
            match client.fetch_status() {
                Ok(records) => {
                    let records = crate::model::normalize_all(records);
                    let groups = crate::aggregate::group_by_branch(&records);
                    print_health_item(
                        "Dados",
                        true,
                        &format!("{} terminais em {} filiais", records.len(), groups.len()),
                    );
                }
                Err(e) => print_health_item("Dados", false, &e.to_string()),
            }
        }
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<22} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Pad a plain label to a fixed column width *before* colorizing it. Width
/// specifiers applied to an already-colored string count the ANSI escape
/// bytes and misalign the column.
fn pad(label: &str, width: usize) -> String {
    format!("{label:<width$}")
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Colorize a health/state label by its display class.
fn colorize_health(label: &str, class: &str) -> colored::ColoredString {
    match class {
        "ok" => label.green(),
        "aviso" => label.yellow(),
        "erro" => label.red(),
        _ => label.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("tabela")),
            OutputFormat::Table
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("filial", 10), "filial");
        assert_eq!(truncate("São João do Sul", 8), "São Joã…");
    }

    #[test]
    fn build_filter_rejects_unknown_health() {
        assert!(build_filter(None, Some("TALVEZ")).is_err());
        let filter = build_filter(Some("centro"), Some("erro")).unwrap();
        assert_eq!(filter.search, "centro");
        assert_eq!(filter.health, Some(crate::aggregate::BranchHealth::Erro));
    }

    #[test]
    fn pad_fixes_column_width_before_colorizing() {
        // Padding must happen on the plain label: every health label comes
        // out the same width regardless of its length.
        assert_eq!(pad("OK", 7).len(), 7);
        assert_eq!(pad("AVISO", 7).len(), 7);
        assert_eq!(pad("ERRO", 7), "ERRO   ");
        // Labels longer than the width are left intact, not cut.
        assert_eq!(pad("DESCONHECIDO", 7), "DESCONHECIDO");
    }

    #[test]
    fn state_class_maps_known_states() {
        assert_eq!(state_class("OK"), "ok");
        assert_eq!(state_class("ERRO"), "erro");
        assert_eq!(state_class("DESCONHECIDO"), "aviso");
    }
}
