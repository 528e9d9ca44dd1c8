//! Drives the pipeline: channel list, then per channel fetch, transform
//! and the two uploads, strictly one step at a time.

use crate::error::{SyncError, SyncResult};
use chrono::NaiveDate;
use indicatif::ProgressBar;
use serde::Serialize;
use std::{fmt, sync::Arc};
use stratosphere_common::{format_date, ChannelSource, DateZone, Handle, RecordSink, StatsSource, TableId};
use stratosphere_stats::{transform_stats, UploadRecord};
use tracing::{debug, error, info, instrument};

/// Where the orchestrator currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Not running
    Idle,
    /// Reading the channel list
    FetchingChannelList,
    /// Fetching one channel's statistics
    Fetching,
    /// Reshaping statistics into rows
    Transforming,
    /// Uploading state rows
    UploadingState,
    /// Uploading timeseries rows
    UploadingTimeseries,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FetchingChannelList => "fetching channel list",
            Self::Fetching => "fetching",
            Self::Transforming => "transforming",
            Self::UploadingState => "uploading state",
            Self::UploadingTimeseries => "uploading timeseries",
        };
        f.write_str(name)
    }
}

/// Destination tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTables {
    /// State snapshots
    pub state: TableId,
    /// Daily timeseries
    pub timeseries: TableId,
}

/// Outcome of one upload phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Rows inserted
    pub inserted: usize,
    /// Rows skipped because the key already existed
    pub already_present: usize,
    /// Rows skipped for a missing handle
    pub skipped: usize,
}

impl UploadSummary {
    /// Total rows seen.
    pub fn total(&self) -> usize {
        self.inserted + self.already_present + self.skipped
    }

    fn absorb(&mut self, other: UploadSummary) {
        self.inserted += other.inserted;
        self.already_present += other.already_present;
        self.skipped += other.skipped;
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Channels processed end to end
    pub channels: usize,
    /// State table outcome
    pub state: UploadSummary,
    /// Timeseries table outcome
    pub timeseries: UploadSummary,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} channels: state {} inserted / {} present / {} skipped, timeseries {} inserted / {} present / {} skipped",
            self.channels,
            self.state.inserted,
            self.state.already_present,
            self.state.skipped,
            self.timeseries.inserted,
            self.timeseries.already_present,
            self.timeseries.skipped
        )
    }
}

/// Sequential sync pipeline over the collaborator traits.
pub struct Orchestrator {
    channels: Arc<dyn ChannelSource>,
    stats: Arc<dyn StatsSource>,
    sink: Arc<dyn RecordSink>,
    tables: SyncTables,
    zone: DateZone,
    run_date: Option<NaiveDate>,
    progress: ProgressBar,
    echo: bool,
    phase: Phase,
    history: Vec<Phase>,
}

impl Orchestrator {
    /// Creates an idle orchestrator. Progress is hidden until
    /// [`Orchestrator::with_progress`] is called.
    pub fn new(
        channels: Arc<dyn ChannelSource>,
        stats: Arc<dyn StatsSource>,
        sink: Arc<dyn RecordSink>,
        tables: SyncTables,
        zone: DateZone,
    ) -> Self {
        Self {
            channels,
            stats,
            sink,
            tables,
            zone,
            run_date: None,
            progress: ProgressBar::hidden(),
            echo: false,
            phase: Phase::Idle,
            history: Vec::new(),
        }
    }

    /// Pins the run date instead of reading the clock.
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    /// Reports channel progress on `progress` and prints user-facing
    /// lines to stdout.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self.echo = true;
        self
    }

    fn say(&self, line: impl AsRef<str>) {
        if self.echo {
            self.progress.suspend(|| println!("{}", line.as_ref()));
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every phase entered so far, in order.
    pub fn phase_history(&self) -> &[Phase] {
        &self.history
    }

    fn enter(&mut self, phase: Phase, handle: Option<&Handle>) {
        match handle {
            Some(handle) => debug!(from = %self.phase, to = %phase, %handle, "Phase transition"),
            None => debug!(from = %self.phase, to = %phase, "Phase transition"),
        }
        self.phase = phase;
        self.history.push(phase);
    }

    fn today(&self) -> NaiveDate {
        self.run_date.unwrap_or_else(|| self.zone.today())
    }

    /// Processes every channel in list order. The first error aborts the
    /// run.
    pub async fn run(&mut self) -> SyncResult<RunSummary> {
        let result = self.run_inner().await;
        self.enter(Phase::Idle, None);
        self.progress.finish_and_clear();
        result
    }

    async fn run_inner(&mut self) -> SyncResult<RunSummary> {
        self.enter(Phase::FetchingChannelList, None);
        self.say("Fetching channels to process...");

        let channels = self
            .channels
            .channels_to_process()
            .await
            .map_err(SyncError::ChannelList)?;

        let names: Vec<&str> = channels.iter().map(Handle::as_str).collect();
        info!(?names, "Channels to process");
        self.say(format!("Channels to process: {:?}", names));
        self.progress.set_length(channels.len() as u64);

        let mut summary = RunSummary::default();
        for handle in &channels {
            self.progress.set_message(handle.to_string());
            let (state, timeseries) = self.process_channel(handle).await?;
            summary.channels += 1;
            summary.state.absorb(state);
            summary.timeseries.absorb(timeseries);
            self.progress.inc(1);
        }

        info!(%summary, "All channels processed");
        Ok(summary)
    }

    /// Fetches, transforms and uploads one channel.
    #[instrument(skip(self), fields(handle = %handle))]
    pub async fn process_channel(&mut self, handle: &Handle) -> SyncResult<(UploadSummary, UploadSummary)> {
        info!("Processing channel {}", handle);
        self.say(format!("Processing channel {}", handle));

        self.enter(Phase::Fetching, Some(handle));
        let stats = self
            .stats
            .get_stats(handle)
            .await
            .map_err(|source| SyncError::Channel {
                handle: handle.to_string(),
                source,
            })?;

        self.enter(Phase::Transforming, Some(handle));
        let rows = transform_stats(handle, &stats, self.today(), &self.zone).map_err(|source| SyncError::Channel {
            handle: handle.to_string(),
            source,
        })?;

        self.enter(Phase::UploadingState, Some(handle));
        self.say(format!("Uploading {} state entries to Notion...", rows.state.len()));
        let state_table = self.tables.state.clone();
        let state = self.upload(&state_table, &rows.state).await?;

        self.enter(Phase::UploadingTimeseries, Some(handle));
        self.say(format!(
            "Uploading {} timeseries entries to Notion...",
            rows.timeseries.len()
        ));
        let timeseries_table = self.tables.timeseries.clone();
        let timeseries = self.upload(&timeseries_table, &rows.timeseries).await?;

        Ok((state, timeseries))
    }

    /// Uploads records one at a time, checking the `(handle, date)` key
    /// right before each insert.
    pub async fn upload<R: UploadRecord>(&self, table: &TableId, records: &[R]) -> SyncResult<UploadSummary> {
        let mut summary = UploadSummary::default();
        let total = records.len();
        info!(table = %table, "Uploading {} entries", total);

        for (index, record) in records.iter().enumerate() {
            let handle = record.handle();
            let date = record.date();
            debug!("{}/{} - Processing date {} for handle {}", index + 1, total, date, handle);

            if handle.is_blank() {
                error!(table = %table, date = %format_date(date), "Handle is not set for entry, skipping");
                summary.skipped += 1;
                continue;
            }

            let upload_error = |source| SyncError::Upload {
                table: table.clone(),
                handle: handle.to_string(),
                date,
                source,
            };

            if self
                .sink
                .exists(table, handle.as_str(), date)
                .await
                .map_err(upload_error)?
            {
                debug!("Entry for date {} for handle {} is already present", date, handle);
                summary.already_present += 1;
                continue;
            }

            debug!("Entry for date {} for handle {} is not present, adding", date, handle);
            self.sink
                .insert(table, &record.to_row_fields())
                .await
                .map_err(upload_error)?;
            summary.inserted += 1;
        }

        info!(
            table = %table,
            inserted = summary.inserted,
            already_present = summary.already_present,
            skipped = summary.skipped,
            "Upload finished"
        );
        Ok(summary)
    }
}
