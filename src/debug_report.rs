use ansi::{Palette, Tone};
use chatdispatch::{Consulted, Route, TurnReport};

mod ansi {
    use chatdispatch::Route;

    const RESET: &str = "\x1b[0m";

    /// SGR codes used by the turn report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Tone {
        Bold,
        Dim,
        Heading,
        Domain,
        Score,
        Path,
        Good,
        Warn,
    }

    impl Tone {
        fn code(self) -> &'static str {
            match self {
                Tone::Bold => "\x1b[1m",
                Tone::Dim => "\x1b[2m",
                Tone::Heading => "\x1b[90m",
                Tone::Domain => "\x1b[34m",
                Tone::Score | Tone::Warn => "\x1b[33m",
                Tone::Path => "\x1b[36m",
                Tone::Good => "\x1b[32m",
            }
        }

        /// Routes that leave the caller without a task answer stand out.
        pub fn for_route(route: Route) -> Self {
            match route {
                Route::MissingHandler | Route::Fallback => Tone::Warn,
                _ => Tone::Good,
            }
        }
    }

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn tone(&self, s: impl AsRef<str>, tone: Tone) -> String {
            match self.enabled {
                true => format!("{}{}{RESET}", tone.code(), s.as_ref()),
                false => s.as_ref().to_string(),
            }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.tone(s, Tone::Dim)
        }

        pub fn heading(&self, title: &str) -> String {
            self.tone(format!("━━━ {title} ━━━"), Tone::Heading)
        }
    }

}

/// Print a routing report for one turn to stderr so stdout stays a clean transcript.
pub fn print_turn(report: &TurnReport, color: bool) {
    let palette = Palette::new(color);
    let details = &report.details;
    let state = &details.state;

    eprintln!("\n{}", palette.tone(format!("⚙  Turn: \"{}\"", report.utterance), Tone::Bold));

    eprintln!("\n{}", palette.heading("Match"));
    if state.speech_domain.is_empty() {
        eprintln!("{}", palette.dim("  No rule matched"));
    } else {
        eprintln!(
            "  {} {}  {} {}  {} {}",
            palette.dim("domain:"),
            palette.tone(&state.speech_domain, Tone::Domain),
            palette.dim("│ root:"),
            palette.tone(state.root_domain(), Tone::Domain),
            palette.dim("│ score:"),
            palette.tone(format!("{:.3}", state.similarity_score), Tone::Score),
        );
        if !state.matched_path.is_empty() {
            eprintln!("  {} {}", palette.dim("path:"), palette.tone(state.matched_path.as_str(), Tone::Path));
        }
        eprintln!("  {} {}", palette.dim("keyword:"), state.matched_keyword);
    }

    eprintln!("\n{}", palette.heading("Route"));
    eprintln!("  {} {}", palette.dim("branch:"), palette.tone(details.route.label(), Tone::for_route(details.route)));
    eprintln!("  {} {}", palette.dim("consulted:"), consulted_names(details.consulted).join(", "));
    if details.route == Route::MissingHandler {
        if let Some(domain) = &details.missing_handler {
            eprintln!("  {}", palette.tone(format!("No task handler implemented for '{domain}'"), Tone::Warn));
        }
    }

    let envelope = &report.envelope;
    if let Some(status) = &envelope.status {
        eprintln!("\n{}", palette.heading("Task"));
        eprintln!("  {} {}", palette.dim("status:"), palette.tone(status, Tone::Warn));
        if let Some(target) = &envelope.target {
            eprintln!("  {} {}", palette.dim("target:"), palette.tone(target, Tone::Domain));
        }
        for (idx, candidate) in envelope.candidates.iter().flatten().enumerate() {
            eprintln!("    {} {}", palette.dim(format!("[{idx}]")), candidate);
        }
    }

    let t = &details.timings;
    eprintln!("\n{}", palette.heading("Timing"));
    eprintln!(
        "  Total: {}  │  Gate: {}  │  Dispatch: {}  │  QA: {}",
        palette.tone(format!("{:?}", t.total), Tone::Good),
        palette.tone(format!("{:?}", t.gate), Tone::Path),
        palette.dim(format!("{:?}", t.dispatch)),
        palette.dim(format!("{:?}", t.qa)),
    );
    eprintln!();
}

fn consulted_names(consulted: Consulted) -> Vec<&'static str> {
    consulted.iter_names().map(|(name, _)| name).collect()
}
