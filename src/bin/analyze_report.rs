use anyhow::{anyhow, Context};
use plagiview_lib::models::{DocumentPair, Emphasis, PlagiarismReport};
use plagiview_lib::services::analytics::{load_comparison, open_comparison, AnalyticsView, ComparisonDetail};
use plagiview_lib::services::{
    analyze_report, preview, AppConfig, ConfigStore, ReportClient, ReportSession,
};
use serde::Serialize;
use tracing::warn;

const USAGE: &str = "Usage:
  analyze_report --report <report.json> [--top <n>] [--pair <name1> <name2> [--documents <docs.json>]] [--out <json_path>]
  analyze_report --assignment <id> [--top <n>] [--pair <name1> <name2>] [--out <json_path>]
  analyze_report [--set-base-url <url>] [--set-token <token> | --clear-token]

Notes:
  - The report path may also be given as the first bare argument.
  - --assignment fetches from PLAGIVIEW_API_URL (or api.baseUrl in config.json).
  - --documents reads {\"document1\": ..., \"document2\": ...} for the selected pair.
  - --set-base-url / --set-token / --clear-token update config.json (a backup is kept).";

/// Flags and how many values follow each one.
const VALUE_FLAGS: &[(&str, usize)] = &[
    ("--report", 1),
    ("--assignment", 1),
    ("--top", 1),
    ("--pair", 2),
    ("--documents", 1),
    ("--out", 1),
    ("--set-base-url", 1),
    ("--set-token", 1),
];

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_arg_pair(args: &[String], key: &str) -> Option<(String, String)> {
    let i = args.iter().position(|a| a == key)?;
    Some((args.get(i + 1)?.clone(), args.get(i + 2)?.clone()))
}

/// `--report <path>`, else the first argument that is neither a flag nor a flag's value.
fn report_path(args: &[String]) -> Option<String> {
    if let Some(path) = parse_arg_value(args, "--report") {
        return Some(path);
    }

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        if let Some((_, arity)) = VALUE_FLAGS.iter().find(|(flag, _)| *flag == arg.as_str()) {
            i += 1 + arity;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg.clone());
        }
        i += 1;
    }
    None
}

/// Apply `--set-base-url`, `--set-token` and `--clear-token`. Returns true when anything was written.
fn apply_config_updates(args: &[String], store: &ConfigStore) -> anyhow::Result<bool> {
    let mut updated = false;
    if let Some(url) = parse_arg_value(args, "--set-base-url") {
        store.set_base_url(&url).map_err(|e| anyhow!(e))?;
        println!("Saved base URL: {}", url);
        updated = true;
    }
    if let Some(token) = parse_arg_value(args, "--set-token") {
        store.set_access_token(&token).map_err(|e| anyhow!(e))?;
        println!("Saved access token");
        updated = true;
    } else if args.iter().any(|a| a == "--clear-token") {
        store.clear_access_token().map_err(|e| anyhow!(e))?;
        println!("Cleared access token");
        updated = true;
    }
    Ok(updated)
}

fn load_config() -> AppConfig {
    let Some(store) = ConfigStore::open_default() else {
        return AppConfig::default();
    };
    store.load().unwrap_or_else(|e| {
        warn!("[CLI] {}; using defaults", e);
        AppConfig::default()
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {} failed", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {} failed", path))
}

fn print_view(view: &AnalyticsView) {
    println!("Assignment: {}", view.summary.assignment_title);
    println!("Total submissions: {}", view.summary.total_submissions);
    if let Some(deadline) = view.summary.deadline {
        println!("Deadline: {}", deadline.to_rfc3339());
    }
    if let Some(check_date) = view.summary.check_date {
        println!("Check date: {}", check_date.to_rfc3339());
    }
    println!();

    if !view.data_available {
        println!(
            "No plagiarism data available ({})",
            view.unavailable_reason.as_deref().unwrap_or("unknown reason")
        );
        return;
    }

    println!("Participants: {}", view.entities.len());
    for (entity, score) in view.ranked_entities() {
        println!("[E{:03}] avg={:>6.2}%  {}", entity.index, score, entity.name);
    }
    println!();

    println!("Most similar pairs:");
    for pair in &view.top_pairs {
        println!(
            "{:>6.1}% {:<8} segments={:<3} {} <-> {}",
            pair.similarity_score,
            format!("{:?}", pair.severity).to_lowercase(),
            pair.segment_count,
            pair.participant_a,
            pair.participant_b
        );
    }

    if let Some(stats) = &view.distribution {
        println!();
        println!(
            "Distribution: min={:.1} q1={:.1} median={:.1} q3={:.1} max={:.1}",
            stats.min, stats.q1, stats.median, stats.q3, stats.max
        );
        for outlier in &stats.outliers {
            println!("  outlier: {} ({:.1}%)", outlier.name, outlier.score);
        }
    }
}

fn print_detail(detail: &ComparisonDetail) {
    println!();
    println!(
        "Comparison: {} vs {} ({:.1}%, {} matching segments)",
        detail.participant_a,
        detail.participant_b,
        detail.similarity_score,
        detail.segment_count()
    );
    if let Some(err) = &detail.document_error {
        println!("Warning: {}", err);
    }

    for (title, document, emphasis) in [
        (&detail.participant_a, &detail.source, detail.source_emphasis()),
        (&detail.participant_b, &detail.target, detail.target_emphasis()),
    ] {
        println!();
        println!("--- {}'s submission ---", title);
        for (run, mark) in document.runs.iter().zip(emphasis) {
            let text = preview(&run.text, 80);
            match mark {
                Emphasis::Current => println!(">> [{}] {}", run.segment_index.unwrap_or_default(), text),
                Emphasis::Match => println!("   [{}] {}", run.segment_index.unwrap_or_default(), text),
                Emphasis::None => println!("        {}", text),
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    plagiview_lib::init_logging();

    let config_updated = match ConfigStore::open_default() {
        Some(store) => apply_config_updates(&args, &store)?,
        None => false,
    };

    let mut config = load_config();
    if let Some(top) = parse_arg_value(&args, "--top").and_then(|s| s.parse().ok()) {
        config.analytics.top_pairs = top;
    }
    let assignment = parse_arg_value(&args, "--assignment");
    let pair = parse_arg_pair(&args, "--pair");
    let documents_path = parse_arg_value(&args, "--documents");
    let out_path = parse_arg_value(&args, "--out");
    let report_file = report_path(&args);

    if assignment.is_none() && report_file.is_none() {
        if !config_updated {
            eprintln!("{}", USAGE);
        }
        return Ok(());
    }

    let client = ReportClient::new(&config.api);

    let view = match &assignment {
        Some(id) => {
            let session = ReportSession::new(config.analytics.clone());
            session.load(&client, id).await?;
            session
                .view()
                .await
                .ok_or_else(|| anyhow!("report for assignment {} was not committed", id))?
        }
        None => {
            let path = report_file.ok_or_else(|| anyhow!("no report file given"))?;
            let report: PlagiarismReport = read_json(&path)?;
            analyze_report(&report, &config.analytics)?
        }
    };

    print_view(&view);

    let mut detail: Option<ComparisonDetail> = None;
    if let Some((a, b)) = pair {
        let record = view
            .comparison_for_pair(&a, &b)
            .ok_or_else(|| anyhow!("no comparison between '{}' and '{}'", a, b))?;

        let opened = match (&documents_path, &assignment) {
            (Some(path), _) => {
                let documents: DocumentPair = read_json(path)?;
                open_comparison(record, Ok(documents), &config.analytics)
            }
            (None, Some(id)) => load_comparison(&client, id, record, &config.analytics).await,
            (None, None) => open_comparison(record, Ok(DocumentPair::default()), &config.analytics),
        };
        print_detail(&opened);
        detail = Some(opened);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output<'a> {
            view: &'a AnalyticsView,
            #[serde(skip_serializing_if = "Option::is_none")]
            comparison: Option<&'a ComparisonDetail>,
        }

        let out = Output {
            view: &view,
            comparison: detail.as_ref(),
        };

        let json = serde_json::to_string_pretty(&out)?;
        std::fs::write(&out_path, json).with_context(|| format!("write {} failed", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        std::iter::once("analyze_report")
            .chain(items.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_report_path_from_flag() {
        assert_eq!(report_path(&args(&["--report", "r.json"])).as_deref(), Some("r.json"));
        assert_eq!(
            report_path(&args(&["--top", "1", "--report", "r.json"])).as_deref(),
            Some("r.json")
        );
    }

    #[test]
    fn test_report_path_skips_flag_values() {
        assert_eq!(report_path(&args(&["--top", "1", "r.json"])).as_deref(), Some("r.json"));
        assert_eq!(report_path(&args(&["r.json", "--top", "1"])).as_deref(), Some("r.json"));
        assert_eq!(
            report_path(&args(&["--pair", "Ana", "Ben", "--out", "o.json", "r.json"])).as_deref(),
            Some("r.json")
        );
    }

    #[test]
    fn test_report_path_absent() {
        assert_eq!(report_path(&args(&["--assignment", "7", "--top", "3"])), None);
        assert_eq!(report_path(&args(&["--clear-token"])), None);
    }

    #[test]
    fn test_apply_config_updates_writes_store() {
        let dir = std::env::temp_dir().join(format!("plagiview_cli_cfg_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = ConfigStore::new(dir.clone());

        assert!(!apply_config_updates(&args(&["r.json"]), &store).unwrap());

        let updated = apply_config_updates(
            &args(&["--set-base-url", "https://checker.example.edu", "--set-token", "abc"]),
            &store,
        )
        .unwrap();
        assert!(updated);
        let config = store.load().unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("https://checker.example.edu"));
        assert_eq!(config.api.access_token.as_deref(), Some("abc"));

        assert!(apply_config_updates(&args(&["--clear-token"]), &store).unwrap());
        assert!(store.load().unwrap().api.access_token.is_none());
        assert!(dir.join("backups").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
