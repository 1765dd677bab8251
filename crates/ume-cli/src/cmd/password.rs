//! `ume password`: generate passwords from a policy, or score one.

use crate::output::{CliError, OutputMode, Row, fail, render_rows};
use clap::Args;
use serde::Serialize;
use std::borrow::Cow;
use std::io::{self, Write};
use ume_core::config::UmeConfig;
use ume_core::password::{self, PasswordPolicy, strength_score};
use ume_core::{Strength, evaluate_strength};

#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Password length (8-24). Defaults to `password.length` from config.
    #[arg(short, long)]
    pub length: Option<usize>,

    #[arg(long)]
    pub no_uppercase: bool,

    #[arg(long)]
    pub no_lowercase: bool,

    #[arg(long)]
    pub no_digits: bool,

    #[arg(long)]
    pub no_symbols: bool,

    /// How many passwords to generate.
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Score an existing password instead of generating one.
    #[arg(long, value_name = "PASSWORD", conflicts_with_all = ["length", "count"])]
    pub check: Option<String>,
}

impl PasswordArgs {
    fn policy(&self, base: PasswordPolicy) -> PasswordPolicy {
        PasswordPolicy {
            length: self.length.unwrap_or(base.length),
            uppercase: base.uppercase && !self.no_uppercase,
            lowercase: base.lowercase && !self.no_lowercase,
            digits: base.digits && !self.no_digits,
            symbols: base.symbols && !self.no_symbols,
        }
    }
}

#[derive(Debug, Serialize)]
struct PasswordRow {
    password: String,
    strength: Strength,
    score: u8,
}

impl PasswordRow {
    fn new(password: String) -> Self {
        Self {
            strength: evaluate_strength(&password),
            score: strength_score(&password),
            password,
        }
    }
}

impl Row for PasswordRow {
    const COLUMNS: &'static [&'static str] = &["password", "strength", "score"];

    fn cells(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(&self.password),
            Cow::Borrowed(self.strength.label()),
            Cow::Owned(self.score.to_string()),
        ]
    }

    fn pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}  ({}, score {})", self.password, self.strength, self.score)
    }
}

pub fn run_password(args: &PasswordArgs, config: &UmeConfig, output: OutputMode) -> anyhow::Result<()> {
    let rows = if let Some(candidate) = &args.check {
        vec![PasswordRow::new(candidate.clone())]
    } else {
        let policy = args.policy(config.password);
        policy
            .validate()
            .map_err(|e| fail(output, &CliError::from_code(e.error_code(), e.to_string())))?;
        tracing::debug!(length = policy.length, count = args.count, "generating passwords");
        (0..args.count)
            .map(|_| PasswordRow::new(password::generate(&policy)))
            .collect()
    };

    render_rows(output, &rows)
}
