use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_narrative::config::{Timing, DEFAULT_REPLY_DELAY_MS, DEFAULT_SUMMARY_DELAY_MS};
use feedback_narrative::session::{ChatSession, SummaryGenerator};
use feedback_narrative::{filter, report, responder, source, stats};
use feedback_narrative::{FeedbackRecord, FilterCriteria, RatingBucket, Sender};

#[derive(Parser)]
#[command(name = "feedback-narrative")]
#[command(about = "Filter, question and summarize customer feedback records", long_about = None)]
struct Cli {
    /// CSV file with id,review_score,network_type,ratings_count columns
    #[arg(long, global = true, env = "FEEDBACK_CSV")]
    csv: Option<PathBuf>,

    #[arg(long, global = true, env = "FEEDBACK_REPLY_DELAY_MS", default_value_t = DEFAULT_REPLY_DELAY_MS)]
    reply_delay_ms: u64,

    #[arg(long, global = true, env = "FEEDBACK_SUMMARY_DELAY_MS", default_value_t = DEFAULT_SUMMARY_DELAY_MS)]
    summary_delay_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive match on network label or score
    #[arg(long, default_value = "")]
    search: String,
    /// Exact score 1-5, or "all"
    #[arg(long, default_value = "all")]
    score: String,
    /// Exact network label, or "all"
    #[arg(long, default_value = "all")]
    network: String,
    /// low|medium|high (or red|yellow|green), or "all"
    #[arg(long, default_value = "all")]
    rating: String,
}

impl FilterArgs {
    fn criteria(&self) -> anyhow::Result<FilterCriteria> {
        FilterCriteria::from_labels(&self.search, &self.score, &self.network, &self.rating)
            .context("invalid filter")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in sample dataset as CSV
    Seed {
        #[arg(long, default_value = "feedback.csv")]
        out: PathBuf,
    },
    /// List records matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show rating buckets and per-network averages
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Ask the feedback assistant a single question
    Ask { question: String },
    /// Chat with the feedback assistant over stdin
    Chat,
    /// Generate the narrative summary for the filtered records
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long, default_value = "summary.md")]
        out: PathBuf,
        /// Write the structured document as JSON instead of markup
        #[arg(long)]
        json: bool,
    },
}

fn load_records(csv: Option<&Path>) -> anyhow::Result<Vec<FeedbackRecord>> {
    match csv {
        Some(path) => source::load_csv(path)
            .with_context(|| format!("failed to load records from {}", path.display())),
        None => Ok(source::sample_records()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_narrative=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let timing = Timing::from_millis(cli.reply_delay_ms, cli.summary_delay_ms);

    match cli.command {
        Commands::Seed { out } => {
            let written = source::write_csv(&out, &source::sample_records())?;
            println!("Wrote {written} records to {}.", out.display());
        }
        Commands::List { filters } => {
            let records = load_records(cli.csv.as_deref())?;
            let filtered = filter::apply(&records, &filters.criteria()?);

            for record in &filtered {
                println!(
                    "- #{} score {} on {} ({} ratings) [{}]",
                    record.id(),
                    record.review_score(),
                    record.network_type(),
                    record.ratings_count(),
                    record.bucket()
                );
            }
            println!("Showing {} of {} results", filtered.len(), records.len());
        }
        Commands::Stats { filters } => {
            let records = load_records(cli.csv.as_deref())?;
            let filtered = filter::apply(&records, &filters.criteria()?);

            if filtered.is_empty() {
                println!("No records match these filters.");
                return Ok(());
            }

            let buckets = stats::count_by_bucket(&filtered);
            println!("Entries: {}", stats::count(&filtered));
            println!("Average score: {}", stats::average(&filtered)?);
            for bucket in [RatingBucket::High, RatingBucket::Medium, RatingBucket::Low] {
                let count = buckets.get(bucket);
                println!(
                    "- {bucket}: {count} ({}%)",
                    stats::format_percent(count, filtered.len()).unwrap_or_default()
                );
            }
            println!("Networks:");
            for summary in stats::breakdown_by_network(&filtered) {
                println!(
                    "- {}: {} entries, average {}",
                    summary.network, summary.count, summary.mean
                );
            }
        }
        Commands::Ask { question } => {
            let records = load_records(cli.csv.as_deref())?;
            println!("{}", responder::respond(&question, &records)?);
        }
        Commands::Chat => {
            let records: Arc<[FeedbackRecord]> = load_records(cli.csv.as_deref())?.into();
            chat(records, timing).await?;
        }
        Commands::Summary {
            filters,
            topic,
            out,
            json,
        } => {
            let records = load_records(cli.csv.as_deref())?;
            let filtered = filter::apply(&records, &filters.criteria()?);
            let generator = SummaryGenerator::new(timing.summary_delay);

            info!(entries = filtered.len(), "generating summary");
            let document = generator
                .request(filtered, topic)
                .context("summary generation already in progress")?
                .await
                .context("summary task failed")?;

            let contents = if json {
                serde_json::to_string_pretty(&document)?
            } else {
                report::to_markup(&document)
            };
            std::fs::write(&out, contents)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Summary written to {}.", out.display());
        }
    }

    Ok(())
}

async fn chat(records: Arc<[FeedbackRecord]>, timing: Timing) -> anyhow::Result<()> {
    let session = ChatSession::new(records, timing.reply_delay);
    info!(session = %session.id(), "chat session started");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = print_new(&session, 0);
    while let Some(line) = lines.next_line().await? {
        if session.submit(&line).is_err() {
            continue;
        }
        session.wait_for_replies().await;
        printed = print_new(&session, printed);
    }

    session.close();
    Ok(())
}

fn print_new(session: &ChatSession, printed: usize) -> usize {
    let messages = session.messages();
    for message in messages.iter().skip(printed) {
        if message.sender == Sender::Bot {
            println!("bot> {}", message.text);
        }
    }
    messages.len()
}
