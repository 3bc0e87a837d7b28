//! Metrics collection using Prometheus
//!
//! Counters and histograms for match submissions, rejections and the
//! rating-history writes they commit.

use crate::error::ErrorKind;
use crate::store::{CommitSummary, StoreStats};
use crate::types::MatchType;
use anyhow::Result;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the match rating service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Match submission metrics
    match_metrics: MatchMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,

    /// Component health status
    pub component_health: IntGaugeVec,

    /// Documents held by the store, by collection
    pub stored_documents: IntGaugeVec,
}

/// Match submission metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Matches created, by match type
    pub matches_created_total: IntCounterVec,

    /// Matches edited, by match type
    pub matches_edited_total: IntCounterVec,

    /// Rejected submissions and lookups, by operation and error kind
    pub rejections_total: IntCounterVec,

    /// Rating history writes, by operation (pull / upsert)
    pub history_mutations_total: IntCounterVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// End-to-end submission time, by operation
    pub submission_duration: HistogramVec,

    /// Rating calculation time
    pub rating_calculation_duration: Histogram,

    /// Store commit time
    pub commit_duration: Histogram,
}

fn match_type_label(match_type: MatchType) -> &'static str {
    match match_type {
        MatchType::ClubTeam => "club",
        MatchType::NationalTeam => "national",
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let match_metrics = MatchMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            match_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a committed match creation
    pub fn record_match_created(&self, match_type: MatchType, duration: Duration) {
        self.match_metrics
            .matches_created_total
            .with_label_values(&[match_type_label(match_type)])
            .inc();
        self.performance_metrics
            .submission_duration
            .with_label_values(&["create"])
            .observe(duration.as_secs_f64());
    }

    /// Record a committed match edit
    pub fn record_match_edited(&self, match_type: MatchType, duration: Duration) {
        self.match_metrics
            .matches_edited_total
            .with_label_values(&[match_type_label(match_type)])
            .inc();
        self.performance_metrics
            .submission_duration
            .with_label_values(&["edit"])
            .observe(duration.as_secs_f64());
    }

    /// Record a classified failure of `operation`
    pub fn record_rejection(&self, operation: &str, kind: ErrorKind) {
        self.match_metrics
            .rejections_total
            .with_label_values(&[operation, kind.as_str()])
            .inc();
    }

    /// Record the history writes a commit applied
    pub fn record_commit(&self, summary: &CommitSummary, duration: Duration) {
        self.match_metrics
            .history_mutations_total
            .with_label_values(&["pull"])
            .inc_by(summary.history_pulled as u64);
        self.match_metrics
            .history_mutations_total
            .with_label_values(&["upsert"])
            .inc_by(summary.history_upserted as u64);
        self.performance_metrics
            .commit_duration
            .observe(duration.as_secs_f64());
    }

    /// Record rating calculation duration
    pub fn record_rating_calculation(&self, duration: Duration) {
        self.performance_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    /// Update document gauges from store stats
    pub fn update_from_store_stats(&self, stats: &StoreStats) {
        let gauges = &self.service_metrics.stored_documents;
        gauges.with_label_values(&["matches"]).set(stats.matches as i64);
        gauges.with_label_values(&["players"]).set(stats.players as i64);
        gauges.with_label_values(&["clubs"]).set(stats.clubs as i64);
        gauges
            .with_label_values(&["national_teams"])
            .set(stats.national_teams as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Update component health
    pub fn update_component_health(&self, component: &str, healthy: bool) {
        let status = if healthy { 1 } else { 0 };
        self.service_metrics
            .component_health
            .with_label_values(&[component])
            .set(status);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("touchline_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "touchline_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        let component_health = IntGaugeVec::new(
            Opts::new("touchline_component_health", "Component health status"),
            &["component"],
        )?;
        registry.register(Box::new(component_health.clone()))?;

        let stored_documents = IntGaugeVec::new(
            Opts::new("touchline_stored_documents", "Documents held by the store"),
            &["collection"],
        )?;
        registry.register(Box::new(stored_documents.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
            component_health,
            stored_documents,
        })
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let matches_created_total = IntCounterVec::new(
            Opts::new("touchline_matches_created_total", "Total matches created"),
            &["match_type"],
        )?;
        registry.register(Box::new(matches_created_total.clone()))?;

        let matches_edited_total = IntCounterVec::new(
            Opts::new("touchline_matches_edited_total", "Total matches edited"),
            &["match_type"],
        )?;
        registry.register(Box::new(matches_edited_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("touchline_rejections_total", "Rejected requests by error kind"),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let history_mutations_total = IntCounterVec::new(
            Opts::new(
                "touchline_history_mutations_total",
                "Rating history entries written",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(history_mutations_total.clone()))?;

        Ok(Self {
            matches_created_total,
            matches_edited_total,
            rejections_total,
            history_mutations_total,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let submission_duration = HistogramVec::new(
            HistogramOpts::new(
                "touchline_submission_duration_seconds",
                "Match submission processing time",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(submission_duration.clone()))?;

        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "touchline_rating_calculation_duration_seconds",
                "Rating calculation time",
            )
            .buckets(vec![0.000001, 0.00001, 0.0001, 0.001, 0.01]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        let commit_duration = Histogram::with_opts(
            HistogramOpts::new(
                "touchline_commit_duration_seconds",
                "Unit of work commit time",
            )
            .buckets(vec![0.0001, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        )?;
        registry.register(Box::new(commit_duration.clone()))?;

        Ok(Self {
            submission_duration,
            rating_calculation_duration,
            commit_duration,
        })
    }
}
