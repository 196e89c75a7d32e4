//! Prometheus counters for the gate pass workflow.
//!
//! Exposed at `/metrics`. Each recorder owns its own registry so several app
//! instances (e.g. in tests) can coexist in one process.

use prometheus::{opts, Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};

use crate::models::Outcome;

pub struct PassMetrics {
    registry: Registry,
    submissions_total: IntCounter,
    decisions_total: IntCounterVec,
    verifications_total: IntCounterVec,
}

impl PassMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions_total = IntCounter::with_opts(opts!(
            "gatepass_submissions_total",
            "Total pass requests submitted"
        ))?;
        let decisions_total = IntCounterVec::new(
            opts!("gatepass_decisions_total", "Total moderator decisions applied"),
            &["outcome"],
        )?;
        let verifications_total = IntCounterVec::new(
            opts!("gatepass_verifications_total", "Total gate verifications by result"),
            &["result"],
        )?;

        registry.register(Box::new(submissions_total.clone()))?;
        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(verifications_total.clone()))?;

        Ok(Self {
            registry,
            submissions_total,
            decisions_total,
            verifications_total,
        })
    }

    pub fn record_submission(&self) {
        self.submissions_total.inc();
    }

    pub fn record_decision(&self, outcome: Outcome) {
        self.decisions_total.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn record_verification(&self, valid: bool) {
        let result = if valid { "valid" } else { "invalid" };
        self.verifications_total.with_label_values(&[result]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}
