use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

use services::{
    Advance, AnswerOutcome, Clock, CountdownEnd, CountdownHandle, GameSession, QuizLoopService,
    SessionSnapshot, SharedSession, StartedSession, run_countdown,
};
use storage::InMemoryStore;
use tsubo_core::model::{
    AnswerType, Catalog, Category, GameMode, Meridian, PoolSelector, SessionConfig,
};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.json");

type Input = Lines<BufReader<Stdin>>;

//
// ─── ARGS ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidCategory { raw: String },
    InvalidMeridian { raw: String },
    ConflictingPools,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidCategory { raw } => write!(f, "invalid --category value: {raw}"),
            ArgsError::InvalidMeridian { raw } => write!(f, "invalid --meridian value: {raw}"),
            ArgsError::ConflictingPools => {
                write!(f, "--review, --category and --meridian are mutually exclusive")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn set_pool(slot: &mut Option<PoolSelector>, pool: PoolSelector) -> Result<(), ArgsError> {
    if slot.replace(pool).is_some() {
        return Err(ArgsError::ConflictingPools);
    }
    Ok(())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --catalog <path>      JSON catalog (defaults to the bundled sample)");
    eprintln!("  --count <n>           questions per session (default 10)");
    eprintln!("  --review              only items answered unsure or wrong");
    eprintln!("  --category <key>      head | face | upper_limb | trunk | lower_limb");
    eprintln!("  --meridian <key>      LU, LI, ST, SP, HT, SI, BL, KI, PC, TE, GB, LR, GV, CV");
    eprintln!("  --include-mastered    keep mastered items in the pool");
    eprintln!("  --survival            play until the first wrong answer");
    eprintln!("  --time-attack         per-question countdown (default 8s)");
    eprintln!("  --time-limit <secs>   countdown length; implies --time-attack");
    eprintln!("  --no-combo            disable combo bonus points");
    eprintln!("  --seed <n>            reproducible deals across runs");
    eprintln!();
    eprintln!("Answer with 1-4; append ? when unsure (e.g. 2?). q quits.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TSUBO_CATALOG, TSUBO_COUNT, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    catalog: Option<PathBuf>,
    config: SessionConfig,
    no_combo: bool,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut catalog = std::env::var("TSUBO_CATALOG").ok().map(PathBuf::from);
        let mut count = std::env::var("TSUBO_COUNT")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(SessionConfig::default().question_count);
        let mut pool = None;
        let mut include_mastered = false;
        let mut survival = false;
        let mut time_attack = false;
        let mut time_limit = None;
        let mut no_combo = false;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--catalog" => catalog = Some(PathBuf::from(require_value(args, "--catalog")?)),
                "--count" => count = parse_number(args, "--count")?,
                "--review" => set_pool(&mut pool, PoolSelector::Review)?,
                "--category" => {
                    let raw = require_value(args, "--category")?;
                    let category = raw
                        .parse::<Category>()
                        .map_err(|_| ArgsError::InvalidCategory { raw: raw.clone() })?;
                    set_pool(&mut pool, PoolSelector::Category(category))?;
                }
                "--meridian" => {
                    let raw = require_value(args, "--meridian")?;
                    let meridian = raw
                        .parse::<Meridian>()
                        .map_err(|_| ArgsError::InvalidMeridian { raw: raw.clone() })?;
                    set_pool(&mut pool, PoolSelector::Meridian(meridian))?;
                }
                "--include-mastered" => include_mastered = true,
                "--survival" => survival = true,
                "--time-attack" => time_attack = true,
                "--time-limit" => time_limit = Some(parse_number(args, "--time-limit")?),
                "--no-combo" => no_combo = true,
                "--seed" => seed = Some(parse_number(args, "--seed")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let mut config = SessionConfig::for_pool(pool.unwrap_or_default()).with_question_count(count);
        if include_mastered {
            config = config.with_exclude_mastered(false);
        }
        if survival {
            config = config.survival();
        }
        if time_attack || time_limit.is_some() {
            config = config.time_attack(time_limit);
        }

        Ok(Self {
            catalog,
            config,
            no_combo,
            seed,
        })
    }
}

//
// ─── TERMINAL LOOP ─────────────────────────────────────────────────────────────
//

enum Turn {
    Answered(AnswerOutcome),
    TimedOut(AnswerOutcome),
    Quit,
}

enum Choice {
    Pick { index: usize, unsure: bool },
    Quit,
}

fn parse_choice(line: &str) -> Option<Choice> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") {
        return Some(Choice::Quit);
    }
    let (digits, unsure) = match line.strip_suffix('?').or_else(|| line.strip_suffix('？')) {
        Some(rest) => (rest.trim(), true),
        None => (line, false),
    };
    let number: usize = digits.parse().ok()?;
    (1..=4).contains(&number).then(|| Choice::Pick {
        index: number - 1,
        unsure,
    })
}

fn lock(shared: &SharedSession) -> Result<MutexGuard<'_, GameSession>, io::Error> {
    shared
        .lock()
        .map_err(|_| io::Error::other("session lock poisoned"))
}

fn into_session(shared: SharedSession) -> Result<GameSession, io::Error> {
    Arc::try_unwrap(shared)
        .map_err(|_| io::Error::other("session still shared with a countdown"))?
        .into_inner()
        .map_err(|_| io::Error::other("session lock poisoned"))
}

/// Resolves only when the countdown forces an answer.
async fn expiry(shared: SharedSession, handle: Option<CountdownHandle>) -> AnswerOutcome {
    if let Some(handle) = handle {
        if let CountdownEnd::Expired(outcome) = run_countdown(shared, handle).await {
            return outcome;
        }
    }
    std::future::pending().await
}

fn print_question(snapshot: &SessionSnapshot<'_>) {
    let Some(question) = snapshot.question else {
        return;
    };
    let item = question.item();

    println!();
    if snapshot.config.is_some_and(|c| c.is_survival_mode) {
        println!("── サバイバル {}問目 ──", snapshot.survival_count + 1);
    } else {
        println!(
            "── 第{}問 / {}問 ──",
            snapshot.question_index + 1,
            snapshot.total_questions
        );
    }
    println!("スコア {}  コンボ {}", snapshot.score, snapshot.combo_count);
    if let Some(secs) = snapshot.time_remaining {
        println!("制限時間 {secs}秒");
    }
    println!("部位: {}", item.location());
    println!("効果: {}", item.effect());
    for (i, option) in question.options().iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
}

fn print_outcome(snapshot: &SessionSnapshot<'_>, turn: &Turn) {
    let (Turn::Answered(outcome) | Turn::TimedOut(outcome)) = turn else {
        return;
    };
    let Some(question) = snapshot.question else {
        return;
    };
    if matches!(turn, Turn::TimedOut(_)) {
        println!("時間切れ!");
    }
    match outcome.answer_type {
        AnswerType::Correct => {
            print!("正解!");
            if outcome.bonus_awarded > 0 {
                print!(" {}連続 +{}", outcome.combo_count, outcome.bonus_awarded);
            }
            println!();
        }
        AnswerType::Unsure => println!("正解 (迷い)"),
        AnswerType::Wrong => println!(
            "不正解… 正解は {}. {}",
            outcome.correct_index + 1,
            question.correct_option()
        ),
    }
    let item = question.item();
    println!("{} ({}) {}", item.name(), item.reading(), item.id());
}

async fn ask(shared: &SharedSession, handle: Option<CountdownHandle>, input: &mut Input) -> Result<Turn, io::Error> {
    let timer = expiry(Arc::clone(shared), handle);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            outcome = &mut timer => return Ok(Turn::TimedOut(outcome)),
            line = input.next_line() => {
                let Some(line) = line? else {
                    return Ok(Turn::Quit);
                };
                match parse_choice(&line) {
                    Some(Choice::Quit) => return Ok(Turn::Quit),
                    Some(Choice::Pick { index, unsure }) => {
                        let outcome = lock(shared)?.answer_question(index, unsure);
                        if let Some(outcome) = outcome {
                            return Ok(Turn::Answered(outcome));
                        }
                    }
                    None => println!("1〜4 の番号を入力してください (迷ったら末尾に ?)"),
                }
            }
        }
    }
}

/// `false` on end of input or `q`.
async fn wait_for_enter(input: &mut Input, prompt: &str) -> Result<bool, io::Error> {
    println!("{prompt}");
    Ok(input
        .next_line()
        .await?
        .is_some_and(|line| !line.trim().eq_ignore_ascii_case("q")))
}

/// Plays one session to the end; `None` when the player quits.
async fn play(started: StartedSession, input: &mut Input) -> Result<Option<GameSession>, io::Error> {
    let StartedSession { session, mut countdown } = started;
    let shared: SharedSession = Arc::new(Mutex::new(session));

    loop {
        {
            let session = lock(&shared)?;
            if session.is_finished() {
                break;
            }
            print_question(&session.snapshot());
        }

        let turn = ask(&shared, countdown, input).await?;
        if matches!(turn, Turn::Quit) {
            lock(&shared)?.reset_game();
            return Ok(None);
        }
        let finished = {
            let session = lock(&shared)?;
            print_outcome(&session.snapshot(), &turn);
            session.is_finished()
        };
        if finished {
            break;
        }

        if !wait_for_enter(input, "Enter で次へ").await? {
            lock(&shared)?.reset_game();
            return Ok(None);
        }
        match lock(&shared)?.next_question() {
            Advance::Next(handle) => countdown = handle,
            Advance::Finished | Advance::Ignored => break,
        }
    }

    into_session(shared).map(Some)
}

async fn report(
    loop_svc: &QuizLoopService,
    catalog: &Catalog,
    session: &GameSession,
) -> Result<(), Box<dyn Error>> {
    let finished = loop_svc.finish_session(session).await?;
    let result = &finished.result;

    println!();
    if result.is_empty() {
        println!("出題できるツボがありません。");
        return Ok(());
    }
    println!("── 結果 ──");
    println!(
        "正解 {}  迷い {}  不正解 {}  ({}%)",
        result.correct_answers,
        result.unsure_answers,
        result.wrong_answers,
        result.score_percent()
    );
    println!("スコア {}", session.snapshot().score);
    if result.mode == GameMode::Survival {
        println!("サバイバル記録 {}問", result.survived_answers());
        if finished.new_survival_record {
            println!("自己ベスト更新!");
        }
    }
    if let Some(rank) = finished.rank_up {
        println!("ランクアップ! {} {}", rank.emoji, rank.name);
    }

    let rank = loop_svc.ranks().load().await?;
    let current = rank.current_rank();
    match rank.next_rank() {
        Some(next) => println!(
            "ランク {} {}  次の「{}」まであと{}問",
            current.emoji,
            current.name,
            next.name,
            rank.correct_to_next_rank()
        ),
        None => println!("ランク {} {}", current.emoji, current.name),
    }

    let history = loop_svc.history().load().await?;
    let weak: Vec<&str> = history
        .weak_item_ids()
        .iter()
        .filter_map(|id| catalog.get(id))
        .map(|item| item.name())
        .collect();
    if !weak.is_empty() {
        println!("苦手なツボ: {}", weak.join("、"));
    }
    Ok(())
}

//
// ─── STARTUP ───────────────────────────────────────────────────────────────────
//

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, Box<dyn Error>> {
    let catalog = match path {
        Some(path) => Catalog::from_json(&std::fs::read_to_string(path)?)?,
        None => Catalog::from_json(SAMPLE_CATALOG)?,
    };
    Ok(catalog)
}

async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let catalog = Arc::new(load_catalog(args.catalog.as_deref())?);
    info!(items = catalog.len(), "catalog loaded");

    // Progress lives for the lifetime of the process.
    let store = Arc::new(InMemoryStore::new());
    let mut loop_svc = QuizLoopService::new(Clock::default(), Arc::clone(&catalog), store);
    if let Some(seed) = args.seed {
        loop_svc = loop_svc.with_seed(seed);
    }
    if args.no_combo && loop_svc.settings().load().await?.combo_enabled() {
        loop_svc.settings().toggle_combo().await?;
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let started = loop_svc.start_session(args.config.clone()).await?;
        let Some(session) = play(started, &mut input).await? else {
            break;
        };
        report(&loop_svc, &catalog, &session).await?;

        if !wait_for_enter(&mut input, "Enter でもう一度 / q で終了").await? {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
