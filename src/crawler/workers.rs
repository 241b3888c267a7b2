//! Fixed-size worker pools for the fetch, extract and clean stages
//!
//! Each stage pulls jobs from one bounded queue shared by all of its workers
//! and pushes results to the next bounded queue:
//!
//! ```text
//! coordinator ─url─▶ fetch ─bytes─▶ extract ─words+hrefs─▶ coordinator
//! coordinator ─base+href─▶ clean ─Option<url>─▶ coordinator
//! ```
//!
//! Every job produces exactly one result, so the coordinator can count work in
//! flight exactly. Closing a stage's input queue lets its workers finish what
//! they hold and exit; the fetch pool exiting in turn closes the extract queue.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{fetch_page, FetchError};
use crate::crawler::parser::{extract_page, ExtractedPage};
use crate::url::CleanInput;
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// A fetched body (or the reason there is none) on its way to extraction
#[derive(Debug)]
pub struct FetchOutcome {
    pub url: String,
    pub body: Result<Vec<u8>, FetchError>,
}

/// What the coordinator learns about one dispatched URL
#[derive(Debug)]
pub struct ExtractionResult {
    pub url: String,
    pub page: Result<ExtractedPage, FetchError>,
}

/// Receiver shared by every worker of one pool
type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// The coordinator's ends of the two input queues
///
/// Dropping this closes both queues, which is how the coordinator tells the
/// pools that no more work is coming.
pub struct StageInputs {
    pub fetch_tx: mpsc::Sender<String>,
    pub clean_tx: mpsc::Sender<CleanInput>,
}

/// Running worker pools plus the coordinator's ends of their result queues
pub struct Pipeline {
    pub extracted_rx: mpsc::Receiver<ExtractionResult>,
    pub cleaned_rx: mpsc::Receiver<Option<String>>,
    tasks: JoinSet<()>,
}

impl Pipeline {
    /// Starts all three pools, sized and bounded by the crawler config
    pub fn start(config: &CrawlerConfig, client: Client) -> (StageInputs, Self) {
        let capacity = config.queue_capacity;
        let (fetch_tx, fetch_rx) = mpsc::channel::<String>(capacity);
        let (extract_tx, extract_rx) = mpsc::channel::<FetchOutcome>(capacity);
        let (extracted_tx, extracted_rx) = mpsc::channel::<ExtractionResult>(capacity);
        let (clean_tx, clean_rx) = mpsc::channel::<CleanInput>(capacity);
        let (cleaned_tx, cleaned_rx) = mpsc::channel::<Option<String>>(capacity);

        let mut tasks = JoinSet::new();

        let client = Arc::new(client);
        spawn_pool(&mut tasks, "fetch", config.fetch_workers, fetch_rx, move |url: String| {
            let client = Arc::clone(&client);
            let extract_tx = extract_tx.clone();
            async move {
                let body = fetch_page(&client, &url).await;
                if let Err(e) = &body {
                    tracing::debug!("Fetch failed for {}: {}", url, e);
                }
                if extract_tx.send(FetchOutcome { url, body }).await.is_err() {
                    tracing::trace!("Extract queue closed, dropping fetch result");
                }
            }
        });

        spawn_pool(&mut tasks, "extract", config.extract_workers, extract_rx, move |fetched: FetchOutcome| {
            let extracted_tx = extracted_tx.clone();
            async move {
                let FetchOutcome { url, body } = fetched;
                let page = body.map(|bytes| extract_page(&bytes));
                if extracted_tx.send(ExtractionResult { url, page }).await.is_err() {
                    tracing::trace!("Result queue closed, dropping extraction");
                }
            }
        });

        spawn_pool(&mut tasks, "clean", config.clean_workers, clean_rx, move |input: CleanInput| {
            let cleaned_tx = cleaned_tx.clone();
            async move {
                if cleaned_tx.send(input.clean()).await.is_err() {
                    tracing::trace!("Cleaned queue closed, dropping link");
                }
            }
        });

        let inputs = StageInputs { fetch_tx, clean_tx };
        let pipeline = Self {
            extracted_rx,
            cleaned_rx,
            tasks,
        };
        (inputs, pipeline)
    }

    /// Stops the pools once the [`StageInputs`] have been dropped
    ///
    /// Result queues are closed first so no worker stays blocked on a full
    /// queue nobody reads. With `abort`, workers still mid-request are
    /// cancelled instead of awaited.
    pub async fn shutdown(self, abort: bool) {
        let Pipeline {
            extracted_rx,
            cleaned_rx,
            mut tasks,
        } = self;
        drop(extracted_rx);
        drop(cleaned_rx);

        if abort {
            tasks.abort_all();
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    tracing::warn!("Worker task failed: {}", e);
                }
            }
        }
    }
}

/// Spawns `size` workers that each pull jobs from the shared queue until it
/// is closed and drained
fn spawn_pool<T, F, Fut>(
    tasks: &mut JoinSet<()>,
    stage: &'static str,
    size: usize,
    rx: mpsc::Receiver<T>,
    handler: F,
) where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let rx: SharedReceiver<T> = Arc::new(Mutex::new(rx));
    let handler = Arc::new(handler);

    for worker in 0..size {
        let rx = Arc::clone(&rx);
        let handler = Arc::clone(&handler);
        tasks.spawn(async move {
            loop {
                let job = rx.lock().await.recv().await;
                match job {
                    Some(job) => handler(job).await,
                    None => break,
                }
            }
            tracing::trace!("{} worker {} exiting", stage, worker);
        });
    }
    tracing::debug!("Started {} {} workers", size, stage);
}
