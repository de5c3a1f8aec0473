use crate::libmunje::bank::{CategoryOverview, QuestionBank};
use crate::libmunje::debounce::Debouncer;
use crate::libmunje::geomsaek::{self, Criteria, Segment, SortKey};
use crate::libmunje::munje::Question;
use crate::libmunje::view::ViewState;
use crate::Error;
use colored::{ColoredString, Colorize};
use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use log::debug;
use std::io::{self, Write};
use std::time::Instant;
use text_io::read;

#[derive(Debug, PartialEq)]
enum Command {
    List,
    Search(String),
    LiveSearch,
    Module(Option<String>),
    Difficulty(Option<String>),
    Section(Option<String>),
    Points(Option<u32>),
    Sort(SortKey),
    Toggle(i64),
    Catalog,
    Table,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn from_str(input: &str) -> Command {
        let input = input.trim();
        let (head, rest) = match input.split_once(' ') {
            Some((head, rest)) => (head, rest.trim()),
            None => (input, ""),
        };
        let all_or = |value: &str| {
            if value.is_empty() || value == "all" {
                None
            } else {
                Some(value.to_string())
            }
        };
        match head {
            "" | "ls" => Command::List,
            "/" | "search" => {
                if rest.is_empty() {
                    Command::LiveSearch
                } else {
                    Command::Search(rest.to_string())
                }
            }
            "m" | "module" => Command::Module(all_or(rest)),
            "d" | "difficulty" => Command::Difficulty(all_or(rest)),
            "s" | "section" => Command::Section(all_or(rest)),
            "p" | "points" => match rest {
                "" | "all" => Command::Points(None),
                value => match value.parse::<u32>() {
                    Ok(points) => Command::Points(Some(points)),
                    Err(_) => Command::Unknown(input.to_string()),
                },
            },
            "sort" => match SortKey::from_str(rest) {
                Some(key) => Command::Sort(key),
                None => Command::Unknown(input.to_string()),
            },
            "x" | "open" => match rest.parse::<i64>() {
                Ok(id) => Command::Toggle(id),
                Err(_) => Command::Unknown(input.to_string()),
            },
            "cat" => Command::Catalog,
            "table" => Command::Table,
            "r" | "reset" => Command::Reset,
            "h" | "?" | "help" => Command::Help,
            "q" | "quit" => Command::Quit,
            _ => Command::Unknown(input.to_string()),
        }
    }
}

pub fn cli_loop(
    bank: &QuestionBank,
    overview: Option<&[CategoryOverview]>,
    view: &mut ViewState,
) -> Result<(), Error> {
    render_list(bank, view);
    loop {
        print!("{} ", "명령>".cyan());
        io::stdout().flush()?;
        let line: String = read!("{}\n");
        let command = Command::from_str(&line);
        debug!("command: {:?}", command);

        match command {
            Command::List => render_list(bank, view),
            Command::Search(query) => {
                view.criteria.query = query;
                render_list(bank, view);
            }
            Command::LiveSearch => {
                live_search(bank, view)?;
                render_list(bank, view);
            }
            Command::Module(module) => {
                view.criteria.module = module;
                render_list(bank, view);
            }
            Command::Difficulty(difficulty) => {
                view.criteria.difficulty = difficulty;
                render_list(bank, view);
            }
            Command::Section(section) => {
                view.criteria.section = section;
                render_list(bank, view);
            }
            Command::Points(points) => {
                view.criteria.points = points;
                render_list(bank, view);
            }
            Command::Sort(key) => {
                view.criteria.sort = key;
                render_list(bank, view);
            }
            Command::Toggle(id) => {
                view.toggle_expanded(id);
                debug!("{} questions expanded", view.expanded_count());
                render_list(bank, view);
            }
            Command::Catalog => render_catalogs(bank),
            Command::Table => match overview {
                Some(overview) => render_table(overview),
                None => println!(
                    "{}",
                    "No overview table loaded (pass one with --table).".yellow()
                ),
            },
            Command::Reset => {
                view.reset();
                render_list(bank, view);
            }
            Command::Help => render_help(),
            Command::Quit => {
                println!("{}", "안녕히 가세요!".cyan());
                return Ok(());
            }
            Command::Unknown(input) => {
                println!(
                    "{}",
                    format!("Unknown command {:?} (try `help`).", input).bright_red()
                );
            }
        }
    }
}

/// Incremental search: raw keystrokes feed the debouncer, and the match count
/// refreshes only once the input has been quiet for the full window. The
/// event poll sleeps exactly until the pending deadline, so there is at most
/// one timer armed and a keystroke before quiescence simply rearms it.
fn live_search(bank: &QuestionBank, view: &mut ViewState) -> Result<(), Error> {
    let mut debouncer = Debouncer::default();
    debouncer.force(&view.criteria.query);
    let mut raw = view.criteria.query.clone();
    let mut match_count = current_count(bank, view, debouncer.effective());

    enable_raw_mode()?;
    let result = live_search_loop(bank, view, &mut debouncer, &mut raw, &mut match_count);
    disable_raw_mode()?;
    println!();

    view.criteria.query = debouncer.effective().to_string();
    result
}

fn live_search_loop(
    bank: &QuestionBank,
    view: &ViewState,
    debouncer: &mut Debouncer,
    raw: &mut String,
    match_count: &mut usize,
) -> Result<(), Error> {
    draw_search_line(raw, *match_count)?;
    loop {
        let next = match debouncer.deadline() {
            Some(due) => {
                let timeout = due.saturating_duration_since(Instant::now());
                if event::poll(timeout)? {
                    Some(event::read()?)
                } else {
                    None
                }
            }
            None => Some(event::read()?),
        };

        match next {
            None => {
                if debouncer.poll(Instant::now()).is_some() {
                    *match_count = current_count(bank, view, debouncer.effective());
                    draw_search_line(raw, *match_count)?;
                }
            }
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Enter => {
                    debouncer.flush();
                    return Ok(());
                }
                KeyCode::Esc => {
                    debouncer.cancel();
                    return Ok(());
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    debouncer.cancel();
                    return Ok(());
                }
                KeyCode::Backspace => {
                    raw.pop();
                    debouncer.submit(raw, Instant::now());
                    draw_search_line(raw, *match_count)?;
                }
                KeyCode::Char(c) => {
                    raw.push(c);
                    debouncer.submit(raw, Instant::now());
                    draw_search_line(raw, *match_count)?;
                }
                _ => {}
            },
            Some(_) => {}
        }
    }
}

fn current_count(bank: &QuestionBank, view: &ViewState, query: &str) -> usize {
    let criteria = Criteria {
        query: query.to_string(),
        ..view.criteria.clone()
    };
    geomsaek::filter_and_sort(bank.questions(), &criteria).len()
}

fn draw_search_line(raw: &str, match_count: usize) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    print!(
        "{} {} {}",
        "검색>".cyan(),
        raw,
        format!("({} 일치)", match_count).bright_black()
    );
    stdout.flush()
}

fn render_list(bank: &QuestionBank, view: &ViewState) {
    let hits = geomsaek::filter_and_sort(bank.questions(), &view.criteria);
    println!();
    for question in &hits {
        render_question(question, view.is_expanded(question.id), &view.criteria.query);
    }
    render_stats(&hits, bank, &view.criteria);
}

fn render_question(question: &Question, expanded: bool, query: &str) {
    let marker = if expanded { "▾" } else { "▸" };
    print!(
        "{} {}",
        marker,
        format!("문제 #{}", question.question_number).cyan()
    );
    if let Some(difficulty) = &question.difficulty {
        print!(" {}", difficulty_colored(difficulty));
    }
    if let Some(points) = question.points {
        print!(" {}", format!("{}점", points).magenta());
    }
    print!(" {}", question.module.bright_black());
    print!(" {}", format!("› {}", question.section).blue());
    println!("  {}", paint(&question.title, query));

    if !expanded {
        return;
    }
    if let Some(body) = &question.question_text {
        println!("    {} {}", "문제:".bold(), paint(body, query));
        if let Some(choices) = &question.choices {
            for choice in choices {
                println!("      {}", paint(choice, query));
            }
        }
    }
    if let Some(answer) = &question.answer {
        println!("    {} {}", "정답:".bold(), answer.bright_green().bold());
    }
    if let Some(explanation) = &question.explanation {
        println!("    {} {}", "해설:".bold(), paint(explanation, query));
    }
    if !question.keywords.is_empty() {
        print!("    {}", "키워드:".bold());
        for keyword in &question.keywords {
            print!(" {}", format!("[{}]", keyword).yellow());
        }
        println!();
    }
}

fn render_stats(hits: &[&Question], bank: &QuestionBank, criteria: &Criteria) {
    let mut line = format!("{}개의 문제가 검색되었습니다.", hits.len());
    if !hits.is_empty() {
        line.push_str(&format!(" (총 {}점)", geomsaek::total_points(hits)));
    }
    print!("{}", line.bright_black());
    for (label, count) in geomsaek::difficulty_counts(hits, &bank.difficulties()) {
        print!("  {}", difficulty_colored(&format!("{}: {}개", label, count)));
    }
    if criteria.sort != SortKey::Number {
        print!("  {}", format!("[sort: {}]", criteria.sort.label()).bright_black());
    }
    println!();
}

fn difficulty_colored(label: &str) -> ColoredString {
    if label.starts_with("하급") || label.starts_with("low") {
        label.green()
    } else if label.starts_with("중급") || label.starts_with("medium") {
        label.yellow()
    } else if label.starts_with("상급") || label.starts_with("high") {
        label.red()
    } else {
        label.normal()
    }
}

/// Renders highlight segments for the terminal; matches go on a yellow
/// background like the original page's `<mark>`.
fn paint(text: &str, query: &str) -> String {
    geomsaek::highlight(text, query)
        .iter()
        .map(|segment| match segment {
            Segment::Plain(text) => text.to_string(),
            Segment::Match(text) => text.black().on_yellow().to_string(),
        })
        .collect()
}

fn render_catalogs(bank: &QuestionBank) {
    println!("{} {}", "모듈:".bold(), bank.modules().join(" | "));
    println!("{} {}", "난이도:".bold(), bank.difficulties().join(" | "));
    println!("{} {}", "섹션:".bold(), bank.sections().join(" | "));
    let points: Vec<String> = bank.point_values().iter().map(u32::to_string).collect();
    println!("{} {}", "점수:".bold(), points.join(" | "));
}

fn render_table(overview: &[CategoryOverview]) {
    let mut questions_total = 0;
    let mut points_total = 0;
    for category in overview {
        println!(
            "{}",
            format!(
                "├ {} ({}문항 / {}점)",
                category.category, category.total_questions, category.total_points
            )
            .blue()
        );
        for subcategory in &category.subcategories {
            println!("{}", format!("│ ├ {}", subcategory.name).blue());
            for topic in &subcategory.topics {
                println!("{} ├ {}", "│ │".blue(), topic);
            }
        }
        questions_total += category.total_questions;
        points_total += category.total_points;
    }
    println!(
        "{}",
        format!("총 예상문제 {}문항 / {}점", questions_total, points_total).cyan()
    );
}

fn render_help() {
    println!("{}", "명령어:".bold());
    println!("  ls              show the current view (also just enter)");
    println!("  /               incremental search (enter commits, esc keeps the current query)");
    println!("  search <text>   set the query directly");
    println!("  m <module|all>  module filter");
    println!("  d <level|all>   difficulty filter");
    println!("  s <label|all>   section filter");
    println!("  p <n|all>       points filter");
    println!("  sort <key>      number | difficulty | points | title");
    println!("  x <id>          expand/collapse a question");
    println!("  cat             list the labels present in the artifact");
    println!("  table           category overview (needs --table)");
    println!("  reset           back to defaults");
    println!("  q               quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_and_without_arguments() {
        assert_eq!(Command::from_str(""), Command::List);
        assert_eq!(Command::from_str("/"), Command::LiveSearch);
        assert_eq!(
            Command::from_str("search 고가용성 설계"),
            Command::Search("고가용성 설계".to_string())
        );
        assert_eq!(
            Command::from_str("m Software Architecture 핵심"),
            Command::Module(Some("Software Architecture 핵심".to_string()))
        );
        assert_eq!(Command::from_str("m all"), Command::Module(None));
        assert_eq!(Command::from_str("p 4"), Command::Points(Some(4)));
        assert_eq!(Command::from_str("p all"), Command::Points(None));
        assert_eq!(Command::from_str("sort title"), Command::Sort(SortKey::Title));
        assert_eq!(Command::from_str("x 12"), Command::Toggle(12));
        assert_eq!(Command::from_str("q"), Command::Quit);
    }

    #[test]
    fn malformed_arguments_are_unknown_not_errors() {
        assert_eq!(
            Command::from_str("p four"),
            Command::Unknown("p four".to_string())
        );
        assert_eq!(
            Command::from_str("sort points desc"),
            Command::Unknown("sort points desc".to_string())
        );
        assert_eq!(
            Command::from_str("x abc"),
            Command::Unknown("x abc".to_string())
        );
    }
}
