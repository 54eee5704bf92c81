use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::models::{ChatMessage, FeedbackRecord, Sender, SummaryDocument};
use crate::report;
use crate::responder;

#[derive(Debug, Default)]
struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    fn append(&mut self, text: String, sender: Sender) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage {
            id,
            text,
            sender,
            timestamp: Utc::now(),
        });
        id
    }
}

fn lock(transcript: &Mutex<Transcript>) -> std::sync::MutexGuard<'_, Transcript> {
    transcript.lock().unwrap_or_else(PoisonError::into_inner)
}

struct PendingReply {
    query: String,
    due: Instant,
}

/// Chat transcript for one portal session. Replies are answered by a single
/// worker in submission order. Must be created inside a Tokio runtime;
/// dropping the session cancels replies that have not arrived yet.
pub struct ChatSession {
    id: Uuid,
    transcript: Arc<Mutex<Transcript>>,
    pending: Arc<AtomicUsize>,
    replied: Arc<Notify>,
    queue: mpsc::UnboundedSender<PendingReply>,
    reply_delay: Duration,
    worker: JoinHandle<()>,
}

impl ChatSession {
    pub fn new(records: Arc<[FeedbackRecord]>, reply_delay: Duration) -> Self {
        let id = Uuid::new_v4();
        let mut transcript = Transcript::default();
        transcript.append(responder::GREETING.to_string(), Sender::Bot);
        let transcript = Arc::new(Mutex::new(transcript));
        let pending = Arc::new(AtomicUsize::new(0));
        let replied = Arc::new(Notify::new());
        let (queue, rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run_replies(
            id,
            records,
            Arc::clone(&transcript),
            Arc::clone(&pending),
            Arc::clone(&replied),
            rx,
        ));
        debug!(session = %id, "chat session opened");

        Self {
            id,
            transcript,
            pending,
            replied,
            queue,
            reply_delay,
            worker,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Appends the user's message and schedules the bot reply. Blank input is
    /// rejected without touching the transcript.
    pub fn submit(&self, text: &str) -> Result<u64> {
        if text.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let message_id = lock(&self.transcript).append(text.to_string(), Sender::User);
        self.pending.fetch_add(1, Ordering::SeqCst);
        let reply = PendingReply {
            query: text.to_string(),
            due: Instant::now() + self.reply_delay,
        };
        if self.queue.send(reply).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(session = %self.id, "reply worker stopped; message will not be answered");
        } else {
            debug!(session = %self.id, message_id, "reply scheduled");
        }

        Ok(message_id)
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.transcript).messages.clone()
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Resolves once every submitted message has been answered.
    pub async fn wait_for_replies(&self) {
        while self.pending_replies() > 0 {
            self.replied.notified().await;
        }
    }

    /// Stops the reply worker and returns the transcript as it stands.
    pub fn close(self) -> Vec<ChatMessage> {
        self.worker.abort();
        lock(&self.transcript).messages.clone()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_replies(
    session: Uuid,
    records: Arc<[FeedbackRecord]>,
    transcript: Arc<Mutex<Transcript>>,
    pending: Arc<AtomicUsize>,
    replied: Arc<Notify>,
    mut rx: mpsc::UnboundedReceiver<PendingReply>,
) {
    while let Some(reply) = rx.recv().await {
        time::sleep_until(reply.due).await;

        let text = match responder::respond(&reply.query, &records) {
            Ok(text) => text,
            Err(err) => {
                warn!(%session, error = %err, "responder failed; sending help text");
                responder::FALLBACK_REPLY.to_string()
            }
        };
        let message_id = lock(&transcript).append(text, Sender::Bot);
        pending.fetch_sub(1, Ordering::SeqCst);
        replied.notify_one();
        debug!(%session, message_id, "reply delivered");
    }
}

// Leaves the generating state however the run ends, including abort.
struct GeneratingGuard(Arc<AtomicBool>);

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs report compilation after a fixed delay, one request at a time.
#[derive(Debug, Clone)]
pub struct SummaryGenerator {
    delay: Duration,
    generating: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<SummaryDocument>>>,
}

impl SummaryGenerator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generating: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts a generation run. Returns `None` without queueing anything when
    /// a run is already in progress.
    pub fn request(
        &self,
        records: Vec<FeedbackRecord>,
        topic: Option<String>,
    ) -> Option<JoinHandle<SummaryDocument>> {
        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("summary already generating; request ignored");
            return None;
        }

        let delay = self.delay;
        let guard = GeneratingGuard(Arc::clone(&self.generating));
        let latest = Arc::clone(&self.latest);
        Some(tokio::spawn(async move {
            let _guard = guard;
            time::sleep(delay).await;
            let document = report::compile(&records, topic.as_deref());
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(document.clone());
            info!(
                entries = records.len(),
                sections = document.sections.len(),
                "summary generated"
            );
            document
        }))
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub fn latest(&self) -> Option<SummaryDocument> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;
    use crate::source::sample_records;

    const DELAY: Duration = Duration::from_millis(500);

    fn session() -> ChatSession {
        ChatSession::new(sample_records().into(), DELAY)
    }

    fn bot_messages(messages: &[ChatMessage]) -> Vec<&str> {
        messages
            .iter()
            .filter(|message| message.sender == Sender::Bot)
            .map(|message| message.text.as_str())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn reply_arrives_after_delay_and_not_before() {
        let session = session();
        session.submit("How many entries?").unwrap();

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(session.pending_replies(), 1);

        time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(session.messages().len(), 2);

        time::sleep(Duration::from_millis(2)).await;
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            bot_messages(&messages),
            vec![
                responder::GREETING,
                "There are 10 total feedback entries in the system."
            ]
        );
        assert_eq!(session.pending_replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_keep_submission_order() {
        let session = session();
        session.submit("total").unwrap();
        time::sleep(Duration::from_millis(200)).await;
        session.submit("xyz").unwrap();
        time::sleep(Duration::from_secs(1)).await;

        let messages = session.messages();
        let senders: Vec<Sender> = messages.iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::User, Sender::Bot, Sender::Bot]
        );
        assert_eq!(messages[3].text, "There are 10 total feedback entries in the system.");
        assert_eq!(messages[4].text, responder::FALLBACK_REPLY);
        assert!(messages.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_replies_returns_after_last_answer() {
        let session = session();
        session.submit("total").unwrap();
        session.submit("best").unwrap();
        let started = Instant::now();

        session.wait_for_replies().await;
        assert!(started.elapsed() >= DELAY);
        assert_eq!(session.pending_replies(), 0);
        assert_eq!(session.messages().len(), 5);
        assert_eq!(
            session.messages()[4].text,
            "There are 3 entries with the highest rating of 5 stars."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_is_rejected() {
        let session = session();
        assert!(matches!(session.submit("   "), Err(EngineError::EmptyMessage)));
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.pending_replies(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_session_cancels_pending_replies() {
        let session = session();
        session.submit("average").unwrap();
        let transcript = Arc::clone(&session.transcript);
        drop(session);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(lock(&transcript).messages.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn summary_request_while_generating_is_a_no_op() {
        let generator = SummaryGenerator::new(Duration::from_millis(1500));
        let handle = generator
            .request(sample_records(), Some("Weekly".to_string()))
            .unwrap();
        assert!(generator.is_generating());
        assert!(generator.request(Vec::new(), None).is_none());

        time::sleep(Duration::from_millis(1499)).await;
        assert!(generator.is_generating());
        assert!(generator.latest().is_none());

        let document = handle.await.unwrap();
        assert!(!generator.is_generating());
        assert_eq!(generator.latest(), Some(document.clone()));
        assert_eq!(document, report::compile(&sample_records(), Some("Weekly")));

        let again = generator.request(Vec::new(), None).unwrap().await.unwrap();
        assert_eq!(
            again.sections,
            vec![Section::Paragraph(report::NO_DATA.to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_summary_run_releases_the_generator() {
        let generator = SummaryGenerator::new(Duration::from_millis(1500));
        let handle = generator.request(sample_records(), None).unwrap();
        assert!(generator.is_generating());

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!generator.is_generating());
        assert!(generator.latest().is_none());

        let retry = generator
            .request(sample_records(), Some("Retry".to_string()))
            .expect("generator accepts a new run after abort");
        let document = retry.await.unwrap();
        assert_eq!(generator.latest(), Some(document));
        assert!(!generator.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn summary_aborted_before_first_poll_releases_the_generator() {
        let generator = SummaryGenerator::new(Duration::from_secs(5));
        generator.request(Vec::new(), None).unwrap().abort();
        time::sleep(Duration::from_millis(1)).await;
        assert!(!generator.is_generating());
        assert!(generator.request(Vec::new(), None).is_some());
    }
}
