//! `rfgate replay`: drive a script of Action groups through the store.

use std::fmt::Write as _;
use std::io::Read;
use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::{debug, warn};

use rfgate_core::{ActionGroup, Store, TopState, UndoManager, ValidationErrors};

use crate::cli::ReplayArgs;
use crate::commands::Context;
use crate::error::CliError;
use crate::output;

/// One entry of a replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    /// A user edit: applied, validated and recorded for undo.
    Enact(ActionGroup),
    /// A gateway-originated change: applied and validated, never recorded.
    Server(ActionGroup),
    Undo,
    Redo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayReport {
    steps: usize,
    undo_depth: usize,
    redo_depth: usize,
    validation_errors: ValidationErrors,
    validation_global_errors: ValidationErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<Arc<TopState>>,
}

impl ReplayReport {
    fn error_count(&self) -> usize {
        self.validation_errors.message_count() + self.validation_global_errors.message_count()
    }
}

#[derive(Tabled)]
struct ErrorRow {
    #[tabled(rename = "Scope")]
    scope: &'static str,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Collection")]
    collection: &'static str,
    #[tabled(rename = "Records")]
    records: usize,
}

pub fn handle(args: &ReplayArgs, ctx: &Context) -> Result<(), CliError> {
    let steps = read_script(args)?;
    let limit = args.undo_limit.unwrap_or(ctx.config.history.undo_limit);
    if limit == 0 {
        return Err(CliError::Validation {
            field: "--undo-limit".into(),
            reason: "must be at least 1".into(),
        });
    }

    let mut store = Store::new(ctx.config.store_config());
    let mut undo = UndoManager::new(limit);
    let total = steps.len();
    run(&mut store, &mut undo, steps)?;

    let state = store.top_state();
    let report = ReplayReport {
        steps: total,
        undo_depth: undo.undo_len(),
        redo_depth: undo.redo_len(),
        validation_errors: state.validation_errors.clone(),
        validation_global_errors: state.validation_global_errors.clone(),
        state: args.state.then_some(state),
    };
    store.shutdown();

    let color = ctx.color;
    let out = output::render(
        ctx.output,
        &report,
        |r| render_table(r, color),
        render_plain,
    )?;
    output::print_output(&out, ctx.quiet);

    let count = report.error_count();
    if args.strict && count > 0 {
        return Err(CliError::InvalidTopology { count });
    }
    Ok(())
}

fn read_script(args: &ReplayArgs) -> Result<Vec<ReplayStep>, CliError> {
    let path = args.script.display().to_string();
    let io_err = |source| CliError::ScriptIo {
        path: path.clone(),
        source,
    };

    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).map_err(io_err)?;
        buf
    } else {
        std::fs::read_to_string(&args.script).map_err(io_err)?
    };
    serde_json::from_str(&text).map_err(|source| CliError::Script { source })
}

/// Apply every step in order. Stops at the first step the store rejects.
fn run(store: &mut Store, undo: &mut UndoManager, steps: Vec<ReplayStep>) -> Result<(), CliError> {
    for (index, step) in steps.into_iter().enumerate() {
        let step_no = index + 1;
        let rejected = |source| CliError::Rejected {
            step: step_no,
            source,
        };

        match step {
            ReplayStep::Enact(group) => {
                debug!(step = step_no, description = %group.description, "enact");
                undo.enact(store, group).map_err(rejected)?;
            }
            ReplayStep::Server(group) => {
                debug!(step = step_no, description = %group.description, "server update");
                undo.apply_server(store, &group).map_err(rejected)?;
            }
            ReplayStep::Undo => {
                if !undo.undo(store).map_err(rejected)? {
                    warn!(step = step_no, "nothing to undo");
                }
            }
            ReplayStep::Redo => {
                if !undo.redo(store).map_err(rejected)? {
                    warn!(step = step_no, "nothing to redo");
                }
            }
        }
    }
    Ok(())
}

fn error_rows(report: &ReplayReport) -> Vec<ErrorRow> {
    let scoped = [
        ("field", &report.validation_errors),
        ("topology", &report.validation_global_errors),
    ];
    scoped
        .into_iter()
        .flat_map(|(scope, errors)| {
            errors.iter().flat_map(move |(key, messages)| {
                messages.iter().map(move |message| ErrorRow {
                    scope,
                    key: key.to_owned(),
                    message: message.clone(),
                })
            })
        })
        .collect()
}

fn count_rows(state: &TopState) -> Vec<CountRow> {
    let counts = [
        ("ap", usize::from(state.ap.is_some())),
        ("radios", state.radios.len()),
        ("repeaters", state.map_repeaters.len()),
        ("sensors", state.map_sensors.len()),
        ("tray", state.tray_devices.len()),
        ("zones", state.sensor_zones.len()),
        ("sdlc banks", state.sdlc_banks.len()),
        ("apgi cards", state.apgi_cards.len()),
        ("sts cards", state.sts_cards.len()),
        ("ex cards", state.ex_cards.len()),
    ];
    counts
        .into_iter()
        .map(|(collection, records)| CountRow {
            collection,
            records,
        })
        .collect()
}

fn render_table(report: &ReplayReport, color: bool) -> String {
    let mut out = String::new();
    if let Some(state) = &report.state {
        let _ = writeln!(out, "{}", output::table(&count_rows(state)));
    }

    let rows = error_rows(report);
    let summary = format!(
        "{} step(s) applied, undo depth {}, redo depth {}",
        report.steps, report.undo_depth, report.redo_depth
    );
    if rows.is_empty() {
        let ok = "No validation errors";
        let ok = if color { ok.green().to_string() } else { ok.to_owned() };
        let _ = write!(out, "{summary}\n{ok}");
    } else {
        let bad = format!("{} validation error(s)", rows.len());
        let bad = if color { bad.red().bold().to_string() } else { bad };
        let _ = write!(out, "{}\n{summary}\n{bad}", output::table(&rows));
    }
    out
}

fn render_plain(report: &ReplayReport) -> String {
    error_rows(report)
        .iter()
        .map(|row| format!("{}\t{}", row.key, row.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn steps(json: &str) -> Vec<ReplayStep> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn script_steps_parse() {
        let parsed = steps(
            r#"[
                {"enact": {"description": "add radio", "actions": [
                    {"objectType": "RADIO", "objectId": "SPP0", "updateType": "ADD",
                     "newData": {"info": {"channel": 3}}}
                ]}},
                "undo",
                "redo",
                {"server": {"description": "fw", "actions": []}}
            ]"#,
        );
        assert_eq!(parsed.len(), 4);
        assert!(matches!(parsed[0], ReplayStep::Enact(ref g) if g.actions.len() == 1));
        assert!(matches!(parsed[1], ReplayStep::Undo));
        assert!(matches!(parsed[3], ReplayStep::Server(_)));
    }

    #[test]
    fn run_reports_rejected_step() {
        let mut store = Store::default();
        let mut undo = UndoManager::default();
        let script = steps(
            r#"[
                {"enact": {"description": "ok", "actions": [
                    {"objectType": "RADIO", "objectId": "SPP0", "updateType": "ADD", "newData": {}}
                ]}},
                {"enact": {"description": "bad", "actions": [
                    {"objectType": "RADIO", "objectId": "SPP1", "updateType": "ADD", "newData": 7}
                ]}}
            ]"#,
        );
        let err = run(&mut store, &mut undo, script).unwrap_err();
        assert!(matches!(err, CliError::Rejected { step: 2, .. }));
        assert!(store.state().radios.contains("SPP0"));
    }

    #[test]
    fn plain_lists_every_message() {
        let mut store = Store::default();
        let mut undo = UndoManager::default();
        let script = steps(
            r#"[
                {"enact": {"description": "orphan", "actions": [
                    {"objectType": "MAP_REPEATER", "objectId": "6001", "updateType": "ADD", "newData": {}}
                ]}}
            ]"#,
        );
        run(&mut store, &mut undo, script).unwrap();
        let state = store.top_state();
        let report = ReplayReport {
            steps: 1,
            undo_depth: undo.undo_len(),
            redo_depth: undo.redo_len(),
            validation_errors: state.validation_errors.clone(),
            validation_global_errors: state.validation_global_errors.clone(),
            state: None,
        };
        let plain = render_plain(&report);
        assert!(plain.contains("MAP_REPEATER-6001\tRepeater 6001 needs an RF link"));
        assert!(plain.contains("no RF connection to a Radio"));
        assert_eq!(report.error_count(), plain.lines().count());
    }
}
