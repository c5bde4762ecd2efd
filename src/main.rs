use chrono::Utc;
use clap::Parser;
use jira_weekly_report::config::Config;
use jira_weekly_report::jira::JiraClient;
use jira_weekly_report::logger;
use jira_weekly_report::report::{self, RunOptions};

/// Reports the last week of comments on Jira epics.
///
/// All settings come from the environment (or a `.env` file): `JIRA_PAT` is
/// required; `JIRA_BASE_URL`, `AFFECTED_VERSION`, `JIRA_PROJECTS`,
/// `REPORT_OUTPUT_DIR` and `JIRA_REQUEST_DELAY_MS` are optional.
#[derive(Parser, Debug)]
#[command(version)]
struct Opt {
    /// Version to search for. Defaults to `AFFECTED_VERSION`, then to the
    /// current quarter (e.g. "Q3 2025").
    #[arg(long)]
    affected_version: Option<String>,

    /// If specified, the report is printed but not saved.
    #[arg(long)]
    dry_run: bool,

    /// Also list every recent comment in the console summary.
    #[arg(long)]
    show_comments: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    logger::init();

    let opt = Opt::parse();
    if let Err(err) = run(opt).await {
        tracing::error!("Error generating weekly report: {err}");
        err.chain()
            .skip(1)
            .for_each(|cause| tracing::error!("because: {cause}"));
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let jira = JiraClient::from_config(&config);
    let options = RunOptions {
        affected_version: opt.affected_version,
        dry_run: opt.dry_run,
        show_comments: opt.show_comments,
    };
    report::generate_weekly_report(&jira, &config, &options, Utc::now()).await?;
    Ok(())
}
