mod debug_report;

use chatdispatch::{
    Collaborators, CustomQaBase, CustomRuleBase, Envelope, HandlerRegistry, KeywordScorer, NextQuery, Options, QaBase,
    Session, TaskHandler, TaskReply, Taxonomy,
};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_NAME: &str = "NCKU";
const LOG_ENV: &str = "CHATDISPATCH_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_tracing();

    let mut session = match build_session(&config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = chat_loop(&mut session, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    name: String,
    taxonomy: Option<PathBuf>,
    qa: Option<PathBuf>,
    log: Option<PathBuf>,
    caller: Option<String>,
    custom_rules: Option<PathBuf>,
    custom_qa: Option<PathBuf>,
    threshold: f64,
    verbose: bool,
    color: bool,
}

/// Lets the taxonomy's configured reply answer every confident match of a root domain.
struct ConfiguredReply;

impl TaskHandler for ConfiguredReply {
    fn respond(&mut self, _utterance: &str, _domain: &str, _target: Option<&str>) -> TaskReply {
        TaskReply::default()
    }

    fn next_query(&self) -> NextQuery {
        NextQuery::default()
    }

    fn trace(&self, _sink: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn build_session(config: &CliConfig) -> chatdispatch::Result<Session> {
    let taxonomy = match &config.taxonomy {
        Some(path) => Taxonomy::load(path)?,
        None => Taxonomy::default(),
    };
    let general_qa = match &config.qa {
        Some(path) => QaBase::load(path)?,
        None => QaBase::default(),
    };
    let taxonomy = Arc::new(taxonomy);

    let mut registry = HandlerRegistry::new();
    for root in taxonomy.roots() {
        registry.register(root.name.clone(), Box::new(ConfiguredReply));
    }

    let (custom_rules, custom_qa) = custom_bases(config)?;
    let collaborators = Collaborators {
        scorer: Arc::new(KeywordScorer::new(taxonomy.clone())),
        responses: taxonomy,
        custom_rules: Arc::new(custom_rules),
        custom_qa: Arc::new(custom_qa),
        general_qa: Arc::new(general_qa),
    };

    let options = Options::default().with_threshold(config.threshold);
    let session = Session::new(collaborators, registry, options)?;
    match &config.log {
        Some(path) => Ok(session.with_sink(chatdispatch::sink::open_diagnostic_log(path)?)),
        None => Ok(session),
    }
}

/// Custom rules and custom QA for `--caller`, loaded from the files given on the command line.
fn custom_bases(config: &CliConfig) -> chatdispatch::Result<(CustomRuleBase, CustomQaBase)> {
    let mut rules = CustomRuleBase::new(config.threshold);
    let mut qa = CustomQaBase::new();
    let Some(caller) = config.caller.as_deref() else {
        return Ok((rules, qa));
    };

    if let Some(path) = &config.custom_rules {
        rules.load(caller, path)?;
    }
    if let Some(path) = &config.custom_qa {
        qa.load(caller, path)?;
    }
    tracing::debug!(%caller, rules = rules.has_rules_for(caller), qa = qa.has_answers_for(caller), "custom bases");
    Ok((rules, qa))
}

fn chat_loop(session: &mut Session, config: &CliConfig) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Hello, I am {}", config.name)?;

    let mut pending: Option<Envelope> = None;
    for line in io::stdin().lock().lines() {
        let line = line?;
        let speech = line.trim();
        if speech.is_empty() {
            continue;
        }

        let target = pending.as_ref().and_then(|env| confirmed_target(env, speech));
        let report = session.handle_turn_verbose(speech, target.as_deref(), config.caller.as_deref());

        if config.verbose {
            debug_report::print_turn(&report, config.color);
        }

        match &report.envelope.response {
            Some(response) => writeln!(out, "{response}")?,
            None => writeln!(out, "...")?,
        }
        if let Some(candidates) = report.envelope.candidates.as_ref().filter(|c| !c.is_empty()) {
            writeln!(out, "  [{}]", candidates.join(" | "))?;
        }
        out.flush()?;

        pending = report.envelope.is_mid_task().then_some(report.envelope);
    }
    Ok(())
}

/// The slot being confirmed when `speech` is one of the previously offered candidates.
fn confirmed_target(previous: &Envelope, speech: &str) -> Option<String> {
    let candidates = previous.candidates.as_ref()?;
    candidates.iter().any(|c| c == speech).then(|| previous.target.clone()).flatten()
}

fn parse_args() -> Result<CliConfig, String> {
    let mut config = CliConfig {
        name: DEFAULT_NAME.to_string(),
        taxonomy: None,
        qa: None,
        log: None,
        caller: None,
        custom_rules: None,
        custom_qa: None,
        threshold: chatdispatch::DEFAULT_THRESHOLD,
        verbose: false,
        color: io::stderr().is_terminal(),
    };
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            inline.clone().or_else(|| args.next()).ok_or_else(|| format!("error: {name} expects a value"))
        };

        match flag.as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("chatdispatch {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-v" | "--verbose" => config.verbose = true,
            "--color" => config.color = true,
            "--no-color" => config.color = false,
            "--name" => config.name = value("--name")?,
            "--taxonomy" | "-t" => config.taxonomy = Some(PathBuf::from(value("--taxonomy")?)),
            "--qa" => config.qa = Some(PathBuf::from(value("--qa")?)),
            "--log" => config.log = Some(PathBuf::from(value("--log")?)),
            "--caller" => config.caller = Some(value("--caller")?),
            "--custom-rules" => config.custom_rules = Some(PathBuf::from(value("--custom-rules")?)),
            "--custom-qa" => config.custom_qa = Some(PathBuf::from(value("--custom-qa")?)),
            "--threshold" => {
                let raw = value("--threshold")?;
                config.threshold = parse_threshold(&raw)?;
            }
            _ => return Err(format!("error: unknown option '{arg}'\n\n{}", help_text())),
        }
    }

    check_custom_sources(&config)?;
    Ok(config)
}

fn check_custom_sources(config: &CliConfig) -> Result<(), String> {
    let flag = match (&config.custom_rules, &config.custom_qa) {
        (Some(_), _) => "--custom-rules",
        (None, Some(_)) => "--custom-qa",
        (None, None) => return Ok(()),
    };
    match config.caller {
        Some(_) => Ok(()),
        None => Err(format!("error: {flag} requires --caller <id>")),
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(t) if (0.0..=1.0).contains(&t) => Ok(t),
        _ => Err(format!("error: invalid --threshold '{raw}' (expected a number in [0, 1])")),
    }
}

fn help_text() -> String {
    format!(
        "chatdispatch {version}

Interactive conversational turn router. Reads one utterance per line from stdin.

Usage:
  chatdispatch [OPTIONS]

Options:
  -t, --taxonomy <path>      Rule taxonomy JSON (domains, concepts, children, responses).
  --qa <path>                General QA JSON (question/answer pairs).
  --log <path>               Diagnostic log task handlers trace into (truncated on start).
  --caller <id>              Caller identity used for custom rules and custom QA.
  --custom-rules <path>      Rule taxonomy JSON private to --caller.
  --custom-qa <path>         QA JSON private to --caller.
  --threshold <score>        Confidence threshold in [0, 1]. Default: {threshold}
  --name <name>              Name the bot greets with. Default: {name}
  -v, --verbose              Print a routing report for every turn (stderr).
  --color                    Force ANSI color in reports.
  --no-color                 Disable ANSI color in reports.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}        tracing filter, e.g. `chatdispatch=debug`. Default: warn

Exit codes:
  0  Success.
  1  Failed to load configuration or I/O error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        threshold = chatdispatch::DEFAULT_THRESHOLD,
        name = DEFAULT_NAME,
        log_env = LOG_ENV,
    )
}
