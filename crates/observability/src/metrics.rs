//! 广播与登记指标收集模块
//!
//! 基于 DeliveryReport 收集和统计广播运行指标。

use std::collections::BTreeMap;
use std::fmt;

use contracts::{DeliveryOutcome, DeliveryReport};
use metrics::{counter, gauge, histogram};

/// 从 DeliveryReport 记录指标
///
/// 每次广播完成时调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_broadcast;
///
/// let report = dispatcher.broadcast(&job.message).await?;
/// record_broadcast(&job.job_id, &report);
/// ```
pub fn record_broadcast(job_id: &str, report: &DeliveryReport) {
    counter!("chat_relay_broadcasts_total", "job" => job_id.to_string()).increment(1);

    histogram!("chat_relay_broadcast_destinations").record(report.attempted() as f64);

    let delivered = report.delivered() as u64;
    if delivered > 0 {
        counter!(
            "chat_relay_deliveries_total",
            "job" => job_id.to_string(),
            "status" => "delivered"
        )
        .increment(delivered);
    }

    let failed = report.failed() as u64;
    if failed > 0 {
        counter!(
            "chat_relay_deliveries_total",
            "job" => job_id.to_string(),
            "status" => "failed"
        )
        .increment(failed);

        for (_, error) in report.failures() {
            counter!("chat_relay_delivery_failures_total", "kind" => error.kind()).increment(1);
        }
    }
}

/// 记录广播整体失败 (registry 不可读)
pub fn record_broadcast_error(job_id: &str) {
    counter!("chat_relay_broadcast_errors_total", "job" => job_id.to_string()).increment(1);
}

/// 记录 chat 登记结果 (`added` / `already_known` / `failed`)
pub fn record_registration(outcome: &'static str) {
    counter!("chat_relay_registrations_total", "outcome" => outcome).increment(1);
}

/// 记录 registry 条目数
pub fn record_registry_size(entries: usize) {
    gauge!("chat_relay_registry_entries").set(entries as f64);
}

/// 记录处理的命令
pub fn record_command(command: &'static str) {
    counter!("chat_relay_commands_total", "command" => command).increment(1);
}

/// 广播指标聚合器
///
/// 在内存中聚合多次广播的结果，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BroadcastStats {
    /// 广播次数
    pub broadcasts: u64,

    /// 发送尝试总数
    pub attempted: u64,

    /// 成功发送数
    pub delivered: u64,

    /// 失败发送数
    pub failed: u64,

    /// 每次广播的目标数
    pub destinations: RunningStats,

    /// 各失败类型次数
    pub failure_kinds: BTreeMap<&'static str, u64>,
}

impl BroadcastStats {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, report: &DeliveryReport) {
        self.broadcasts += 1;
        self.attempted += report.attempted() as u64;
        self.destinations.push(report.attempted() as f64);

        for record in report.records() {
            match &record.outcome {
                DeliveryOutcome::Delivered => self.delivered += 1,
                DeliveryOutcome::Failed { error } => {
                    self.failed += 1;
                    *self.failure_kinds.entry(error.kind()).or_insert(0) += 1;
                }
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> BroadcastSummary {
        BroadcastSummary {
            broadcasts: self.broadcasts,
            attempted: self.attempted,
            delivered: self.delivered,
            failed: self.failed,
            delivery_rate: if self.attempted > 0 {
                self.delivered as f64 / self.attempted as f64 * 100.0
            } else {
                0.0
            },
            destinations: StatsSummary::from(&self.destinations),
            failure_kinds: self.failure_kinds.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 广播摘要
#[derive(Debug, Clone, Default)]
pub struct BroadcastSummary {
    pub broadcasts: u64,
    pub attempted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub delivery_rate: f64,
    pub destinations: StatsSummary,
    pub failure_kinds: BTreeMap<&'static str, u64>,
}

impl fmt::Display for BroadcastSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Broadcast Summary ===")?;
        writeln!(f, "Broadcasts: {}", self.broadcasts)?;
        writeln!(
            f,
            "Delivered: {}/{} ({:.2}%)",
            self.delivered, self.attempted, self.delivery_rate
        )?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Destinations per broadcast: {}", self.destinations)?;

        if !self.failure_kinds.is_empty() {
            writeln!(f, "Failures by kind:")?;
            for (kind, count) in &self.failure_kinds {
                writeln!(f, "  {kind}: {count}")?;
            }
        }

        Ok(())
    }
}

/// 在线统计 (计数、极值、均值)
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.0}, max={:.0}, mean={:.1} (n={})",
                self.min, self.max, self.mean, self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DeliveryError, RegistryEntry};

    fn report(outcomes: &[Option<DeliveryError>]) -> DeliveryReport {
        let mut report = DeliveryReport::new();
        for (i, failure) in outcomes.iter().enumerate() {
            let entry = RegistryEntry::new(i.to_string(), None);
            let outcome = match failure {
                None => DeliveryOutcome::Delivered,
                Some(error) => DeliveryOutcome::Failed {
                    error: error.clone(),
                },
            };
            report.record(entry, outcome);
        }
        report
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_stats_update() {
        let mut stats = BroadcastStats::new();

        stats.update(&report(&[
            None,
            Some(DeliveryError::rejected("1", 403, "blocked")),
            None,
        ]));
        stats.update(&report(&[Some(DeliveryError::unreachable("0", "timeout"))]));

        assert_eq!(stats.broadcasts, 2);
        assert_eq!(stats.attempted, 4);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.failure_kinds.get("rejected"), Some(&1));
        assert_eq!(stats.failure_kinds.get("unreachable"), Some(&1));
        assert_eq!(stats.destinations.max(), 3.0);
    }

    #[test]
    fn test_summary_display() {
        let mut stats = BroadcastStats::new();
        stats.update(&report(&[
            None,
            Some(DeliveryError::invalid_destination("1", "bad id")),
        ]));

        let output = format!("{}", stats.summary());
        assert!(output.contains("Delivered: 1/2 (50.00%)"));
        assert!(output.contains("invalid_destination: 1"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = BroadcastStats::new().summary();
        assert_eq!(summary.delivery_rate, 0.0);
        assert_eq!(summary.destinations.to_string(), "N/A");
    }

    #[test]
    fn test_record_functions_without_recorder() {
        // No recorder installed: calls are no-ops
        record_broadcast("job", &report(&[None]));
        record_broadcast_error("job");
        record_registration("added");
        record_registry_size(3);
        record_command("start");
    }
}
