use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{debug, warn};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

mod cli;
mod libmunje;

use crate::libmunje::bank::{self, QuestionBank};
use crate::libmunje::geomsaek::{Criteria, SortKey};
use crate::libmunje::view::ViewState;

#[derive(Parser, Debug)]
#[command(name = "문제은행 (Munje Eunhaeng)")]
#[command(version, about, long_about = None)]
struct Args {
    /// Question artifact (JSON array of questions)
    #[arg(short, long, value_name = "FILE", default_value = "data/questions.json")]
    data: PathBuf,
    /// Category-overview artifact for the `table` command
    #[arg(short, long, value_name = "FILE")]
    table: Option<PathBuf>,
    #[arg(long)]
    module: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    section: Option<String>,
    #[arg(long)]
    points: Option<u32>,
    /// number | difficulty | points | title
    #[arg(long, value_name = "KEY", default_value = "number")]
    sort: String,
    #[arg(short, long)]
    query: Option<String>,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("no questions in the artifact!")]
    EmptyBank,
    #[error(transparent)]
    Bank(#[from] bank::Error),
    #[error("terminal error")]
    Terminal(#[from] io::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let bank = QuestionBank::from_path(&args.data)?;
    if bank.is_empty() {
        println!(
            "{}",
            "No questions found. Come back when the artifact has some!".yellow()
        );
        return Err(Error::EmptyBank);
    }
    debug!("[Setup] Bank loaded from {:?}", args.data);

    let overview = match &args.table {
        Some(path) => {
            let overview = bank::load_overview(path)?;
            debug!("[Setup] Overview totals: {:?}", bank.check_overview(&overview));
            Some(overview)
        }
        None => None,
    };

    let sort = SortKey::from_str(&args.sort).unwrap_or_else(|| {
        warn!("[Setup] Unknown sort key {:?}, using number.", args.sort);
        SortKey::Number
    });
    let mut view = ViewState::new(Criteria {
        query: args.query.unwrap_or_default(),
        module: args.module,
        difficulty: args.difficulty,
        section: args.section,
        points: args.points,
        sort,
    });
    if !view.criteria.is_default() {
        debug!("[Setup] Initial criteria: {:?}", view.criteria);
    }

    println!(
        "{}",
        format!(
            "==========> 문제은행 ({} questions / {}점) <==========",
            bank.len(),
            bank.total_points()
        )
        .cyan()
    );

    cli::cli_loop(&bank, overview.as_deref(), &mut view)
}
