//! Dashboard view state: data loading, derived views, and export.
//!
//! Loads run as spawned tasks that report back over a channel, the same way
//! the UI polls async results. Each load is stamped with a request epoch and
//! only the result of the latest request is applied, so a slow response for
//! an earlier range can never overwrite newer data.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::AttendanceSource;
use crate::dates::DateRange;
use crate::error::Result;
use crate::export::{self, ExportFormat, ReportTable};
use crate::geocode::{AddressCache, resolve_addresses};
use crate::models::{AttendanceEvent, LeaveRequest, LeaveStatus, User};
use crate::report::{
    self, AttendanceLogRow, AttendanceTrend, BasicReportRow, MonthlyReportRow, ReportInput, ReportOptions,
    ReportType, TodayStats,
};
use crate::theme::Theme;

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Raw data behind the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub users: Vec<User>,
    pub events: Vec<AttendanceEvent>,
    pub leaves: Vec<LeaveRequest>,
}

/// Messages from async tasks to the dashboard.
pub enum DashboardMessage {
    DataLoaded { epoch: u64, data: DashboardData },
    AddressesResolved(AddressCache),
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// Transient notification shown to the user.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub created_at: Instant,
}

/// Fetch users, events, and approved leave for `range`.
///
/// A failed fetch is logged and replaced by an empty list so the dashboard
/// still renders whatever did load.
pub async fn load_data<S: AttendanceSource>(source: &S, range: DateRange, options: &ReportOptions) -> DashboardData {
    let (start, end) = range.utc_bounds(options.utc_offset);

    let (users, events, leaves) = tokio::join!(
        source.get_users(),
        source.get_all_attendance_events(start, end),
        source.get_leave_requests(range.start(), range.end(), LeaveStatus::Approved),
    );

    DashboardData {
        users: or_empty("users", users),
        events: or_empty("attendance events", events),
        leaves: or_empty("leave requests", leaves),
    }
}

fn or_empty<T>(what: &str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to load {what}: {e}");
            Vec::new()
        }
    }
}

/// Dashboard state for one view.
pub struct Dashboard<S> {
    // Runtime and data source
    rt: Handle,
    source: Arc<S>,

    // Message channel for async communication
    tx: mpsc::UnboundedSender<DashboardMessage>,
    rx: mpsc::UnboundedReceiver<DashboardMessage>,

    // Settings
    options: ReportOptions,
    theme: Theme,
    geocode_batch_size: usize,

    // Selection
    range: DateRange,
    today: NaiveDate,
    selected_user: Option<String>,
    report_type: ReportType,

    // Cached data
    data: DashboardData,
    addresses: AddressCache,

    // Loading states
    epoch: u64,
    is_loading: bool,
    tasks: Vec<JoinHandle<()>>,

    toasts: Vec<Toast>,
}

impl<S: AttendanceSource + 'static> Dashboard<S> {
    pub fn new(
        rt: Handle,
        source: Arc<S>,
        options: ReportOptions,
        theme: Theme,
        geocode_batch_size: usize,
        range: DateRange,
        today: NaiveDate,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rt,
            source,
            tx,
            rx,
            options,
            theme,
            geocode_batch_size,
            range,
            today,
            selected_user: None,
            report_type: ReportType::default(),
            data: DashboardData::default(),
            addresses: AddressCache::new(),
            epoch: 0,
            is_loading: false,
            tasks: Vec::new(),
            toasts: Vec::new(),
        }
    }

    /// Select a new range and start loading it together with `today`.
    ///
    /// Returns the epoch of the new request.
    pub fn request_range(&mut self, range: DateRange, today: NaiveDate) -> u64 {
        self.range = range;
        self.today = today;
        self.epoch += 1;
        self.is_loading = true;

        let epoch = self.epoch;
        let fetch_range = range.including(today);
        let source = Arc::clone(&self.source);
        let options = self.options.clone();
        let tx = self.tx.clone();

        info!("Loading attendance {} to {} (request {epoch})", fetch_range.start(), fetch_range.end());
        self.tasks.push(self.rt.spawn(async move {
            let data = load_data(source.as_ref(), fetch_range, &options).await;
            let _ = tx.send(DashboardMessage::DataLoaded { epoch, data });
        }));

        epoch
    }

    /// Reload the current selection.
    pub fn refresh(&mut self) -> u64 {
        self.request_range(self.range, self.today)
    }

    pub fn select_user(&mut self, user_id: Option<String>) {
        self.selected_user = user_id;
    }

    pub fn select_report(&mut self, report_type: ReportType) {
        self.report_type = report_type;
        if report_type == ReportType::Log {
            self.resolve_pending_addresses();
        }
    }

    fn resolve_pending_addresses(&mut self) {
        if self.addresses.unresolved(&self.data.events).is_empty() {
            return;
        }

        let source = Arc::clone(&self.source);
        let events = self.data.events.clone();
        let mut cache = self.addresses.clone();
        let batch_size = self.geocode_batch_size;
        let tx = self.tx.clone();

        self.tasks.push(self.rt.spawn(async move {
            resolve_addresses(source.as_ref(), &mut cache, &events, batch_size).await;
            let _ = tx.send(DashboardMessage::AddressesResolved(cache));
        }));
    }

    /// Apply one async result.
    pub fn apply(&mut self, message: DashboardMessage) {
        match message {
            DashboardMessage::DataLoaded { epoch, data } => {
                if epoch != self.epoch {
                    debug!("Dropping stale result for request {epoch} (current {})", self.epoch);
                    return;
                }
                info!(
                    "Loaded {} users, {} events, {} leave requests",
                    data.users.len(),
                    data.events.len(),
                    data.leaves.len()
                );
                self.data = data;
                self.is_loading = false;
                if self.report_type == ReportType::Log {
                    self.resolve_pending_addresses();
                }
            }
            DashboardMessage::AddressesResolved(cache) => {
                self.addresses.extend(cache);
            }
        }
    }

    /// Poll async operation results without blocking.
    pub fn poll(&mut self) {
        // Prune first: a finished task has already sent its message
        self.tasks.retain(|task| !task.is_finished());
        self.drain();
        self.finish_if_idle();
    }

    /// Wait until every spawned task has finished and apply its result.
    pub async fn settle(&mut self) {
        while !self.tasks.is_empty() {
            for task in std::mem::take(&mut self.tasks) {
                if let Err(e) = task.await {
                    error!("Background task failed: {e}");
                }
            }
            // Applying a load may spawn address lookups
            self.drain();
        }
        self.finish_if_idle();
    }

    fn drain(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
        }
    }

    fn finish_if_idle(&mut self) {
        if self.is_loading && self.tasks.is_empty() {
            warn!("Request {} ended without a result", self.epoch);
            self.is_loading = false;
        }
    }

    /// Write the selected report to `dir` and report the outcome as a toast.
    pub fn export(&mut self, format: ExportFormat, dir: &Path) -> Option<PathBuf> {
        let table = self.report_table();
        let path = dir.join(export::generate_export_filename(
            self.report_type.file_prefix(),
            format.extension(),
        ));

        match export::write_table(&table, &path, format, &self.theme) {
            Ok(()) => {
                self.push_toast(ToastLevel::Success, format!("Exported to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                error!("Export failed: {e}");
                self.push_toast(ToastLevel::Error, format!("Export failed: {e}"));
                None
            }
        }
    }

    fn push_toast(&mut self, level: ToastLevel, message: String) {
        self.toasts.push(Toast {
            level,
            message,
            created_at: Instant::now(),
        });
    }

    /// Visible toasts.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Drop toasts older than [`TOAST_TTL`].
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| now.duration_since(t.created_at) < TOAST_TTL);
    }
}

impl<S> Dashboard<S> {
    fn input(&self) -> ReportInput<'_> {
        ReportInput {
            events: &self.data.events,
            leaves: &self.data.leaves,
            users: &self.data.users,
            range: self.range,
            selected_user: self.selected_user.as_deref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn addresses(&self) -> &AddressCache {
        &self.addresses
    }

    /// Stat tiles for the current day.
    pub fn today_stats(&self) -> TodayStats {
        report::today_stats(&self.input(), &self.options, self.today)
    }

    /// Chart series over the selected range.
    pub fn trend(&self) -> AttendanceTrend {
        report::build_trend(&self.input(), &self.options)
    }

    pub fn basic_report(&self) -> Vec<BasicReportRow> {
        report::build_basic_report(&self.input(), &self.options)
    }

    pub fn log_report(&self) -> Vec<AttendanceLogRow> {
        report::build_log_report(&self.input(), &self.options, &self.addresses)
    }

    pub fn monthly_report(&self) -> Vec<MonthlyReportRow> {
        report::build_monthly_report(&self.input(), &self.options)
    }

    /// The selected report flattened for display or export.
    pub fn report_table(&self) -> ReportTable {
        match self.report_type {
            ReportType::Basic => export::basic_table(&self.basic_report()),
            ReportType::Log => export::log_table(&self.log_report()),
            ReportType::Monthly => export::monthly_table(&self.monthly_report(), self.range),
        }
    }
}
