//! Prometheus metrics for flow activity.
//!
//! The [`FlowMetrics`] struct owns a dedicated [`Registry`]; there is no
//! HTTP exposition here — callers encode the registry wherever they surface
//! metrics.

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

/// Counters covering both sides of the flow protocol.
pub struct FlowMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Flows this node initiated.
    pub flows_started: IntCounter,
    /// Initiated flows that reached notarized finality.
    pub flows_committed: IntCounter,
    /// Initiated flows that failed (rejection, timeout, conflict, caller error).
    pub flows_rejected: IntCounter,
    /// Failures that were notarization conflicts specifically.
    pub notarization_conflicts: IntCounter,
    /// Incoming sessions this node responded to.
    pub sessions_responded: IntCounter,
    /// Committed transactions recorded via responder sessions.
    pub transactions_recorded: IntCounter,
}

impl FlowMetrics {
    /// Create a fresh set of metrics registered under a new [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let flows_started = register_int_counter_with_registry!(
            Opts::new("accord_flows_started_total", "Flows initiated by this node"),
            registry
        )
        .expect("failed to register flows_started counter");

        let flows_committed = register_int_counter_with_registry!(
            Opts::new(
                "accord_flows_committed_total",
                "Initiated flows that reached finality"
            ),
            registry
        )
        .expect("failed to register flows_committed counter");

        let flows_rejected = register_int_counter_with_registry!(
            Opts::new("accord_flows_rejected_total", "Initiated flows that failed"),
            registry
        )
        .expect("failed to register flows_rejected counter");

        let notarization_conflicts = register_int_counter_with_registry!(
            Opts::new(
                "accord_notarization_conflicts_total",
                "Flow failures caused by conflicting input consumption"
            ),
            registry
        )
        .expect("failed to register notarization_conflicts counter");

        let sessions_responded = register_int_counter_with_registry!(
            Opts::new(
                "accord_sessions_responded_total",
                "Incoming flow sessions handled"
            ),
            registry
        )
        .expect("failed to register sessions_responded counter");

        let transactions_recorded = register_int_counter_with_registry!(
            Opts::new(
                "accord_transactions_recorded_total",
                "Committed transactions recorded from responder sessions"
            ),
            registry
        )
        .expect("failed to register transactions_recorded counter");

        Self {
            registry,
            flows_started,
            flows_committed,
            flows_rejected,
            notarization_conflicts,
            sessions_responded,
            transactions_recorded,
        }
    }
}

impl Default for FlowMetrics {
    fn default() -> Self {
        Self::new()
    }
}
