use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{self, JoinSet};
use tokio::time::Instant;
use tracing::Instrument;

use crate::application::ports::{EncodeSession, MediaTranscoder, TranscodeError};
use crate::domain::{BatchId, BatchRun, ClipJob, ClipJobId, ClipPhase, PhaseKind};

use super::clip_job_runner::{ClipJobRunner, JobOutcome, PhaseEvent};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(65);
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub rate_limit_backoff: Duration,
    pub max_rate_limit_retries: u32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("batch contains no clips")]
    NoJobs,
    #[error("batch size must be at least 1")]
    InvalidBatchSize,
    #[error("could not open encode session: {0}")]
    Session(#[from] TranscodeError),
    #[error("batch driver has stopped")]
    DriverStopped,
}

/// Schedules clip jobs onto runners with bounded concurrency and backs off
/// when the encode service rate-limits us.
pub struct BatchCoordinator {
    runner: Arc<ClipJobRunner>,
    transcoder: Arc<dyn MediaTranscoder>,
    settings: BatchSettings,
}

impl BatchCoordinator {
    pub fn new(
        runner: Arc<ClipJobRunner>,
        transcoder: Arc<dyn MediaTranscoder>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            runner,
            transcoder,
            settings,
        }
    }

    pub async fn start(
        &self,
        jobs: Vec<ClipJob>,
        batch_size: usize,
    ) -> Result<BatchRunHandle, BatchError> {
        if jobs.is_empty() {
            return Err(BatchError::NoJobs);
        }
        if batch_size == 0 {
            return Err(BatchError::InvalidBatchSize);
        }

        let session = Arc::new(self.transcoder.open_session().await?);
        let run = BatchRun::new(jobs);
        let id = run.id;
        tracing::info!(
            batch_id = %id.as_uuid(),
            clips = run.jobs.len(),
            batch_size,
            session = session.id(),
            "Batch started"
        );

        let (snapshot_tx, snapshot_rx) = watch::channel(run.clone());
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);

        let driver = BatchDriver {
            queue: run.jobs.iter().map(|j| j.id).collect(),
            run,
            batch_size,
            settings: self.settings.clone(),
            runner: self.runner.clone(),
            session,
            in_flight: JoinSet::new(),
            tasks: HashMap::new(),
            paused_until: None,
            snapshot_tx,
            commands: command_rx,
            event_tx,
            events: event_rx,
        };
        let span = tracing::info_span!("batch", batch_id = %id.as_uuid());
        tokio::spawn(driver.drive().instrument(span));

        Ok(BatchRunHandle {
            id,
            snapshots: snapshot_rx,
            commands: command_tx,
        })
    }
}

enum Command {
    RetryFailed(oneshot::Sender<usize>),
}

/// Caller side of a running batch. Cheap to clone.
#[derive(Clone)]
pub struct BatchRunHandle {
    id: BatchId,
    snapshots: watch::Receiver<BatchRun>,
    commands: mpsc::Sender<Command>,
}

impl BatchRunHandle {
    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn progress(&self) -> BatchRun {
        self.snapshots.borrow().clone()
    }

    /// Re-enqueues every failed job. Returns how many were re-enqueued.
    pub async fn retry_failed(&self) -> Result<usize, BatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::RetryFailed(reply_tx))
            .await
            .map_err(|_| BatchError::DriverStopped)?;
        reply_rx.await.map_err(|_| BatchError::DriverStopped)
    }

    /// Resolves once every job is `Done` or `Failed`.
    pub async fn wait(&self) -> BatchRun {
        let mut snapshots = self.snapshots.clone();
        if let Ok(run) = snapshots.wait_for(|run| run.finished).await {
            return run.clone();
        }
        // Driver gone: its last snapshot is final.
        snapshots.borrow().clone()
    }
}

/// Sole owner of the `BatchRun`. Runners report to it over channels.
struct BatchDriver {
    run: BatchRun,
    queue: VecDeque<ClipJobId>,
    batch_size: usize,
    settings: BatchSettings,
    runner: Arc<ClipJobRunner>,
    session: Arc<EncodeSession>,
    in_flight: JoinSet<JobOutcome>,
    tasks: HashMap<task::Id, ClipJobId>,
    paused_until: Option<Instant>,
    snapshot_tx: watch::Sender<BatchRun>,
    commands: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<PhaseEvent>,
    events: mpsc::Receiver<PhaseEvent>,
}

impl BatchDriver {
    async fn drive(mut self) {
        let mut commands_open = true;
        loop {
            self.launch_ready();
            self.refresh_finished();
            self.publish();

            if self.run.finished && !commands_open {
                break;
            }

            let tick_at = self
                .paused_until
                .map(|until| until.min(Instant::now() + COUNTDOWN_TICK));
            let has_in_flight = !self.in_flight.is_empty();

            tokio::select! {
                Some(event) = self.events.recv() => self.apply_phase(event),
                Some(joined) = self.in_flight.join_next_with_id(), if has_in_flight => {
                    self.drain_events();
                    match joined {
                        Ok((task_id, outcome)) => {
                            self.tasks.remove(&task_id);
                            self.apply_outcome(outcome);
                        }
                        Err(e) => self.apply_crash(e),
                    }
                }
                command = self.commands.recv(), if commands_open => match command {
                    Some(Command::RetryFailed(reply)) => {
                        let count = self.retry_failed();
                        self.publish();
                        let _ = reply.send(count);
                    }
                    None => commands_open = false,
                },
                _ = sleep_until_opt(tick_at), if tick_at.is_some() => self.tick_countdown(),
            }
        }

        tracing::info!(batch_id = %self.run.id.as_uuid(), "Batch driver stopped");
    }

    fn launch_ready(&mut self) {
        if self.paused_until.is_some() {
            return;
        }
        while self.in_flight.len() < self.batch_size {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            let Some(job) = self.run.job(id).cloned() else {
                continue;
            };
            tracing::debug!(clip = %job.name, "Launching clip job");

            let runner = self.runner.clone();
            let session = self.session.clone();
            let events = self.event_tx.clone();
            let handle = self
                .in_flight
                .spawn(async move { runner.run(job, &session, events).await });
            self.tasks.insert(handle.id(), id);
        }
    }

    fn apply_phase(&mut self, event: PhaseEvent) {
        let Some(job) = self.run.job_mut(event.job_id) else {
            return;
        };
        let previous = job.phase;
        let name = job.name.clone();
        job.advance(event.phase);

        if let Some(kind) = PhaseKind::of(previous) {
            self.run.phase_mut(kind).succeed(event.job_id, &name);
        }
        if let Some(kind) = PhaseKind::of(event.phase) {
            self.run.phase_mut(kind).start(event.job_id, &name);
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply_phase(event);
        }
    }

    fn apply_outcome(&mut self, outcome: JobOutcome) {
        let id = outcome.job().id;
        let Some(previous) = self.run.job(id).map(|j| j.phase) else {
            return;
        };

        match outcome {
            JobOutcome::Finished(job) => {
                let kind = PhaseKind::of(previous).unwrap_or(PhaseKind::Extract);
                match job.phase {
                    ClipPhase::Done => self.run.phase_mut(kind).succeed(id, &job.name),
                    _ => {
                        let error = job.error.clone().unwrap_or_default();
                        self.run.phase_mut(kind).fail(id, &job.name, &error);
                    }
                }
                self.replace(job);
            }
            JobOutcome::RateLimited(mut job) => {
                job.rate_limit_hits += 1;
                if job.rate_limit_hits > self.settings.max_rate_limit_retries {
                    let kind = PhaseKind::of(previous).unwrap_or(PhaseKind::Extract);
                    let error = format!(
                        "rate limited by encode service {} times, giving up",
                        job.rate_limit_hits
                    );
                    tracing::warn!(clip = %job.name, "Clip job exhausted rate limit retries");
                    self.run.phase_mut(kind).fail(id, &job.name, &error);
                    job.fail(error);
                    self.replace(job);
                    return;
                }

                for kind in PhaseKind::ALL {
                    self.run.phase_mut(kind).forget(id);
                }
                job.reset();
                self.queue.push_front(job.id);
                self.replace(job);
                self.pause();
            }
        }
    }

    /// A runner task died without reporting. Its job fails in the phase it
    /// had reached.
    fn apply_crash(&mut self, error: task::JoinError) {
        let Some(id) = self.tasks.remove(&error.id()) else {
            tracing::error!(error = %error, "Untracked clip job task ended abnormally");
            return;
        };
        let Some(job) = self.run.job_mut(id) else {
            return;
        };
        let kind = PhaseKind::of(job.phase).unwrap_or(PhaseKind::Extract);
        let name = job.name.clone();
        let message = format!("clip job task panicked: {}", error);
        tracing::error!(clip = %name, error = %error, "Clip job task panicked");
        job.fail(message.clone());
        self.run.phase_mut(kind).fail(id, &name, &message);
    }

    fn replace(&mut self, job: ClipJob) {
        if let Some(slot) = self.run.job_mut(job.id) {
            *slot = job;
        }
    }

    fn pause(&mut self) {
        let until = Instant::now() + self.settings.rate_limit_backoff;
        let until = match self.paused_until {
            Some(current) if current > until => current,
            _ => until,
        };
        tracing::warn!(
            backoff_secs = self.settings.rate_limit_backoff.as_secs(),
            "Encode service rate limited, pausing new clip jobs"
        );
        self.paused_until = Some(until);
        self.update_countdown();
    }

    fn tick_countdown(&mut self) {
        match self.paused_until {
            Some(until) if Instant::now() >= until => {
                tracing::info!("Rate limit backoff elapsed, resuming");
                self.paused_until = None;
                self.run.rate_limit_countdown_secs = None;
            }
            Some(_) => self.update_countdown(),
            None => self.run.rate_limit_countdown_secs = None,
        }
    }

    fn update_countdown(&mut self) {
        self.run.rate_limit_countdown_secs = self.paused_until.map(|until| {
            let remaining = until.saturating_duration_since(Instant::now());
            remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
        });
    }

    fn retry_failed(&mut self) -> usize {
        let failed = self.run.failed_ids();
        for id in &failed {
            let Some(job) = self.run.job_mut(*id) else {
                continue;
            };
            job.reset();
            job.rate_limit_hits = 0;
            for kind in PhaseKind::ALL {
                self.run.phase_mut(kind).forget(*id);
            }
            self.queue.push_back(*id);
        }
        if !failed.is_empty() {
            tracing::info!(count = failed.len(), "Retrying failed clip jobs");
            self.run.mark_finished(false);
        }
        failed.len()
    }

    fn refresh_finished(&mut self) {
        let finished =
            self.queue.is_empty() && self.in_flight.is_empty() && self.run.all_terminal();
        self.run.mark_finished(finished);
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.run.clone());
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
