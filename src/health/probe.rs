//! Background health probe over the resolution cache.
//!
//! # Responsibilities
//! - Periodically re-check every cached target
//! - Evict targets whose freshness window has closed
//! - Publish per-target health gauges

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;
use crate::resolver::{ResolutionCache, ServiceResolver};

/// Tally of one probe round.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub evicted: usize,
    pub checked: usize,
    pub unhealthy: usize,
    pub timed_out: usize,
}

pub struct HealthProbe {
    resolver: Arc<ServiceResolver>,
    cache: ResolutionCache,
    interval: Duration,
    check_budget: Duration,
}

impl HealthProbe {
    /// `check_budget` bounds each individual health check.
    pub fn new(
        resolver: Arc<ServiceResolver>,
        cache: ResolutionCache,
        interval: Duration,
        check_budget: Duration,
    ) -> Self {
        Self {
            resolver,
            cache,
            interval,
            check_budget,
        }
    }

    /// Probe until the shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            resolver = self.resolver.kind(),
            "Health probe starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.check_all().await;
                    let stats = self.cache.stats();
                    tracing::debug!(
                        checked = report.checked,
                        unhealthy = report.unhealthy,
                        timed_out = report.timed_out,
                        evicted = report.evicted,
                        cached = stats.total_entries,
                        "Health probe round finished"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health probe received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One round: evict, then check every remaining target.
    pub async fn check_all(&self) -> ProbeReport {
        let mut report = ProbeReport {
            evicted: self.cache.evict_expired(),
            ..ProbeReport::default()
        };

        for mut target in self.cache.snapshot() {
            let was_healthy = target.healthy;
            let check = self.resolver.health_check(&mut target);
            let result = time::timeout(self.check_budget, check).await;

            let healthy = match result {
                Ok(healthy) => healthy,
                Err(_) => {
                    report.timed_out += 1;
                    target.mark_checked(false);
                    false
                }
            };

            report.checked += 1;
            if !healthy {
                report.unhealthy += 1;
            }
            if healthy != was_healthy {
                tracing::warn!(
                    namespace = %target.namespace,
                    service = %target.service,
                    healthy,
                    "Target health changed"
                );
            }

            if self.cache.update_health(&target) {
                metrics::record_target_health(&target.namespace, &target.service, healthy);
            } else {
                tracing::debug!(
                    namespace = %target.namespace,
                    service = %target.service,
                    "Target left the cache during the probe"
                );
            }
        }

        report
    }
}
