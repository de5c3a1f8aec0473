use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::error;
use std::path::PathBuf;
use std::process::exit;

mod libmunje;

use crate::libmunje::bank::{self, QuestionBank, TableCheck};
use crate::libmunje::munje::Question;

/// Checks a question artifact before it ships with the app: id uniqueness,
/// field coverage, per-module breakdown, and (optionally) whether the
/// category-overview table still agrees with the collection.
#[derive(Parser, Debug)]
#[command(name = "검증자 (Geomjeungja)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "data/questions.json")]
    data: PathBuf,
    #[arg(short, long, value_name = "FILE")]
    table: Option<PathBuf>,
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let bank = match QuestionBank::from_path(&args.data) {
        Ok(bank) => bank,
        Err(e) => {
            error!("{}", format!("Cannot load artifact: {}!", e).red());
            exit(1);
        }
    };

    println!(
        "{}",
        format!(
            "==========> 검증: {:?} ({}문항 / {}점) <==========",
            args.data,
            bank.len(),
            bank.total_points()
        )
        .cyan()
    );

    let mut failed = false;

    let duplicates = bank.duplicate_ids();
    if duplicates.is_empty() {
        println!("{}", "✔ id 중복 없음".green());
    } else {
        failed = true;
        for id in &duplicates {
            println!("{}", format!("✘ 중복 id: {}", id).red());
        }
    }

    println!("{}", "모듈별 분포:".bold());
    for module in bank.modules() {
        let in_module: Vec<&Question> = bank
            .questions()
            .iter()
            .filter(|q| q.module == module)
            .collect();
        let points: u32 = in_module.iter().map(|q| q.points_or_zero()).sum();
        println!(
            "{}",
            format!("├ {} ({}문항 / {}점)", module, in_module.len(), points).blue()
        );
        for section in distinct_sections(&in_module) {
            let count = in_module.iter().filter(|q| q.section == section).count();
            println!("{}", format!("│ ├ {} ({}문항)", section, count).blue());
        }
    }

    println!("{}", "난이도별 분포:".bold());
    for difficulty in bank.difficulties() {
        let count = bank
            .questions()
            .iter()
            .filter(|q| q.difficulty.as_deref() == Some(difficulty.as_str()))
            .count();
        println!("├ {}: {}문항", difficulty, count);
    }
    let unrated = bank
        .questions()
        .iter()
        .filter(|q| q.difficulty.is_none())
        .count();
    if unrated > 0 {
        println!("{}", format!("├ 난이도 없음: {}문항", unrated).yellow());
    }

    println!("{}", "필드 적재율:".bold());
    report_coverage(&bank, "questionText", |q| q.question_text.is_some());
    report_coverage(&bank, "choices", |q| {
        q.choices.as_deref().is_some_and(|c| !c.is_empty())
    });
    report_coverage(&bank, "answer", |q| q.answer.is_some());
    report_coverage(&bank, "explanation", |q| q.explanation.is_some());
    report_coverage(&bank, "keywords", |q| !q.keywords.is_empty());

    if let Some(path) = &args.table {
        match bank::load_overview(path) {
            Ok(overview) => match bank.check_overview(&overview) {
                TableCheck::Match { questions, points } => {
                    println!(
                        "{}",
                        format!("✔ 개요표 일치 ({}문항 / {}점)", questions, points).green()
                    );
                }
                TableCheck::Drift {
                    table_questions,
                    table_points,
                    actual_questions,
                    actual_points,
                } => {
                    println!(
                        "{}",
                        format!(
                            "△ 개요표 불일치: 표 {}문항/{}점, 추출 {}문항/{}점",
                            table_questions, table_points, actual_questions, actual_points
                        )
                        .yellow()
                    );
                }
            },
            Err(e) => {
                error!("{}", format!("Cannot load overview table: {}!", e).red());
                failed = true;
            }
        }
    }

    if failed {
        println!("{}", "✘ 검증 실패".red().bold());
        exit(1);
    }
    println!("{}", "✔ 검증 통과".green().bold());
}

fn distinct_sections(questions: &[&Question]) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    for q in questions {
        if !sections.iter().any(|s| s == &q.section) {
            sections.push(q.section.clone());
        }
    }
    sections
}

fn report_coverage<F: Fn(&Question) -> bool>(bank: &QuestionBank, field: &str, present: F) {
    let count = bank.questions().iter().filter(|q| present(q)).count();
    let line = format!("├ {}: {}/{}", field, count, bank.len());
    if count == bank.len() {
        println!("{}", line.green());
    } else {
        println!("{}", line);
    }
}
