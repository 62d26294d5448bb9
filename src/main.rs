use clap::Parser;
use tracing_subscriber::EnvFilter;

use issue_expression_matching::{ExpressionMatcher, Issue, IssueBuilder, Value};

/// Evaluate an issue expression from the command line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Expression to evaluate, e.g. `issue.severity == "high"`.
    script: String,
    /// Issue to evaluate against, as JSON.
    #[arg(long)]
    issue: Option<String>,
    /// Line number bound into the script (0 = unknown).
    #[arg(long, default_value_t = 0)]
    line: u32,
    /// File name bound into the script.
    #[arg(long, default_value = "")]
    file: String,
    /// Fallback issue (JSON) returned when evaluation cannot produce a
    /// usable result; without it the fallback is `false`.
    #[arg(long)]
    fallback: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let issue: Option<Issue> = match args.issue.as_deref() {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                eprintln!("invalid issue JSON: {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let fallback = match args.fallback.as_deref() {
        Some(raw) => match serde_json::from_str::<Issue>(raw) {
            Ok(parsed) => Value::Issue(parsed),
            Err(e) => {
                eprintln!("invalid fallback JSON: {e}");
                std::process::exit(1);
            }
        },
        None => Value::Bool(false),
    };

    let matcher = ExpressionMatcher::new(args.script, fallback);
    let verdict = matcher.run(issue.as_ref(), IssueBuilder::new(), args.line, &args.file);

    match serde_json::to_string_pretty(&verdict) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("unprintable verdict: {e}");
            std::process::exit(1);
        }
    }
}
