//! `ume batch`: apply a bulk action to selected users and save the snapshot.

use super::export::select_ids;
use super::{Collection, FilterArgs, view_of};
use crate::output::{CliError, OutputMode, batch_report, fail, field, render_mode};
use crate::store::UserStore;
use clap::{Args, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use ume_core::config::UmeConfig;
use ume_core::error::ErrorCode;
use ume_core::password;
use ume_core::{BatchAction, BatchReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    Activate,
    Deactivate,
    Delete,
    ResetPassword,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON array of users. Rewritten in place when records change.
    #[arg(short, long, value_name = "PATH")]
    pub file: PathBuf,

    /// Action to apply to every selected user.
    #[arg(short, long, value_enum)]
    pub action: ActionKind,

    /// User IDs to select.
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    /// Also select every user matching the filter flags.
    #[arg(long)]
    pub all_visible: bool,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// New password for `reset-password`. Generated when omitted.
    #[arg(long, conflicts_with = "generate")]
    pub password: Option<String>,

    /// Generate the new password with the configured policy.
    #[arg(long)]
    pub generate: bool,
}

#[derive(Debug, Serialize)]
struct BatchOutcome {
    #[serde(flatten)]
    report: BatchReport,
    /// Present only when the password was generated here.
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_password: Option<String>,
    saved: bool,
}

pub fn run_batch(args: &BatchArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()> {
    let mut store = UserStore::load(&args.file).map_err(|e| {
        fail(
            output,
            &CliError::from_code(ErrorCode::SnapshotUnreadable, format!("{e:#}")),
        )
    })?;

    let mut view = view_of(
        store.users().to_vec(),
        Collection::Users,
        &args.filters,
        None,
        config,
        output,
    )?;
    select_ids(&mut view, &args.ids, output)?;
    if args.all_visible && !view.all_visible_selected() {
        view.toggle_all_visible();
    }
    if view.selection().is_empty() {
        return Err(fail(
            output,
            &CliError::new("no users selected").with_suggestion("Pass user IDs or --all-visible."),
        ));
    }

    let (action, generated_password) = resolve_action(args, config, output)?;
    tracing::info!(action = %action, selected = view.selection().len(), "running batch");

    let report = view.run_batch(&action, &mut store);
    let saved = store.save().map_err(|e| {
        fail(
            output,
            &CliError::from_code(ErrorCode::InternalUnexpected, format!("{e:#}")),
        )
    })?;

    if !store.password_resets().is_empty() {
        tracing::info!(accounts = store.password_resets().len(), "passwords reset");
    }

    let error = view.error().map(str::to_string);
    let outcome = BatchOutcome {
        report,
        generated_password,
        saved,
    };
    render_mode(output, &outcome, render_human, render_human)?;

    match error {
        Some(message) => Err(fail(
            output,
            &CliError::from_code(ErrorCode::BatchPartialFailure, message),
        )),
        None => Ok(()),
    }
}

fn resolve_action(
    args: &BatchArgs,
    config: &UmeConfig,
    output: OutputMode,
) -> anyhow::Result<(BatchAction, Option<String>)> {
    if args.action != ActionKind::ResetPassword && (args.generate || args.password.is_some()) {
        return Err(fail(
            output,
            &CliError::new("--password and --generate only apply to reset-password"),
        ));
    }
    match args.action {
        ActionKind::Activate => Ok((BatchAction::SetActive(true), None)),
        ActionKind::Deactivate => Ok((BatchAction::SetActive(false), None)),
        ActionKind::Delete => Ok((BatchAction::Delete, None)),
        ActionKind::ResetPassword => {
            if let Some(password) = &args.password {
                return Ok((
                    BatchAction::ResetPassword {
                        password: password.clone(),
                    },
                    None,
                ));
            }
            config.password.validate().map_err(|e| {
                fail(output, &CliError::from_code(e.error_code(), e.to_string()))
            })?;
            let password = password::generate(&config.password);
            Ok((
                BatchAction::ResetPassword {
                    password: password.clone(),
                },
                Some(password),
            ))
        }
    }
}

fn render_human(outcome: &BatchOutcome, w: &mut dyn Write) -> io::Result<()> {
    batch_report(w, &outcome.report)?;
    if let Some(password) = &outcome.generated_password {
        field(w, "password", password)?;
    }
    field(w, "saved", if outcome.saved { "yes" } else { "no" })
}
