use std::time::Duration;

use crate::proto;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Data retention settings of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionOptions {
    pub retention_period: Duration,
    pub block_size: Duration,
    pub buffer_future: Duration,
    pub buffer_past: Duration,
    pub block_data_expiry: bool,
    pub block_data_expiry_after_not_accessed_period: Duration,
}

impl Default for RetentionOptions {
    fn default() -> Self {
        Self {
            retention_period: Duration::from_secs(2 * 24 * 3600),
            block_size: Duration::from_secs(2 * 3600),
            buffer_future: Duration::from_secs(10 * 60),
            buffer_past: Duration::from_secs(10 * 60),
            block_data_expiry: true,
            block_data_expiry_after_not_accessed_period: Duration::from_secs(5 * 60),
        }
    }
}

impl RetentionOptions {
    pub fn with_retention_period(
        mut self,
        period: Duration,
    ) -> Self {
        self.retention_period = period;
        self
    }

    pub fn with_block_size(
        mut self,
        block_size: Duration,
    ) -> Self {
        self.block_size = block_size;
        self
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.retention_period.is_zero() {
            return Err("retention period must be positive".into());
        }
        if self.block_size.is_zero() {
            return Err("block size must be positive".into());
        }
        if self.buffer_future >= self.block_size {
            return Err(format!(
                "buffer future {:?} must be smaller than block size {:?}",
                self.buffer_future, self.block_size
            ));
        }
        if self.buffer_past >= self.block_size {
            return Err(format!(
                "buffer past {:?} must be smaller than block size {:?}",
                self.buffer_past, self.block_size
            ));
        }
        if self.retention_period < self.block_size {
            return Err(format!(
                "retention period {:?} must not be shorter than block size {:?}",
                self.retention_period, self.block_size
            ));
        }
        Ok(())
    }

    pub(crate) fn from_proto(p: &proto::RetentionOptions) -> std::result::Result<Self, String> {
        Ok(Self {
            retention_period: nanos_to_duration("retention period", p.retention_period_nanos)?,
            block_size: nanos_to_duration("block size", p.block_size_nanos)?,
            buffer_future: nanos_to_duration("buffer future", p.buffer_future_nanos)?,
            buffer_past: nanos_to_duration("buffer past", p.buffer_past_nanos)?,
            block_data_expiry: p.block_data_expiry,
            block_data_expiry_after_not_accessed_period: nanos_to_duration(
                "block data expiry period",
                p.block_data_expiry_after_not_accessed_period_nanos,
            )?,
        })
    }

    pub(crate) fn to_proto(&self) -> proto::RetentionOptions {
        proto::RetentionOptions {
            retention_period_nanos: duration_to_nanos(self.retention_period),
            block_size_nanos: duration_to_nanos(self.block_size),
            buffer_future_nanos: duration_to_nanos(self.buffer_future),
            buffer_past_nanos: duration_to_nanos(self.buffer_past),
            block_data_expiry: self.block_data_expiry,
            block_data_expiry_after_not_accessed_period_nanos: duration_to_nanos(
                self.block_data_expiry_after_not_accessed_period,
            ),
        }
    }
}

/// Reverse index settings of a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    pub enabled: bool,
    pub block_size: Duration,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            block_size: Duration::from_secs(2 * 3600),
        }
    }
}

impl IndexOptions {
    pub(crate) fn from_proto(p: &proto::IndexOptions) -> std::result::Result<Self, String> {
        Ok(Self {
            enabled: p.enabled,
            block_size: nanos_to_duration("index block size", p.block_size_nanos)?,
        })
    }

    pub(crate) fn to_proto(&self) -> proto::IndexOptions {
        proto::IndexOptions {
            enabled: self.enabled,
            block_size_nanos: duration_to_nanos(self.block_size),
        }
    }
}

/// Full set of per-namespace options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceOptions {
    pub bootstrap_enabled: bool,
    pub flush_enabled: bool,
    pub writes_to_commit_log: bool,
    pub cleanup_enabled: bool,
    pub repair_enabled: bool,
    pub snapshot_enabled: bool,
    pub cold_writes_enabled: bool,
    pub retention: RetentionOptions,
    pub index: IndexOptions,
}

impl Default for NamespaceOptions {
    fn default() -> Self {
        Self {
            bootstrap_enabled: true,
            flush_enabled: true,
            writes_to_commit_log: true,
            cleanup_enabled: true,
            repair_enabled: false,
            snapshot_enabled: true,
            cold_writes_enabled: false,
            retention: RetentionOptions::default(),
            index: IndexOptions::default(),
        }
    }
}

impl NamespaceOptions {
    pub fn with_retention(
        mut self,
        retention: RetentionOptions,
    ) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_index(
        mut self,
        index: IndexOptions,
    ) -> Self {
        self.index = index;
        self
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        self.retention.validate()?;

        if !self.index.enabled {
            return Ok(());
        }
        if self.index.block_size.is_zero() {
            return Err("index block size must be positive".into());
        }
        if self.index.block_size.as_nanos() % self.retention.block_size.as_nanos() != 0 {
            return Err(format!(
                "index block size {:?} must be a multiple of data block size {:?}",
                self.index.block_size, self.retention.block_size
            ));
        }
        Ok(())
    }

    /// Converts the wire message. The caller checks that the retention
    /// section is present.
    pub(crate) fn from_proto(
        p: &proto::NamespaceOptions,
        retention: &proto::RetentionOptions,
    ) -> std::result::Result<Self, String> {
        let index = match &p.index_options {
            Some(index) => IndexOptions::from_proto(index)?,
            None => IndexOptions::default(),
        };
        Ok(Self {
            bootstrap_enabled: p.bootstrap_enabled,
            flush_enabled: p.flush_enabled,
            writes_to_commit_log: p.writes_to_commit_log,
            cleanup_enabled: p.cleanup_enabled,
            repair_enabled: p.repair_enabled,
            snapshot_enabled: p.snapshot_enabled,
            cold_writes_enabled: p.cold_writes_enabled,
            retention: RetentionOptions::from_proto(retention)?,
            index,
        })
    }

    pub(crate) fn to_proto(&self) -> proto::NamespaceOptions {
        proto::NamespaceOptions {
            bootstrap_enabled: self.bootstrap_enabled,
            flush_enabled: self.flush_enabled,
            writes_to_commit_log: self.writes_to_commit_log,
            cleanup_enabled: self.cleanup_enabled,
            repair_enabled: self.repair_enabled,
            retention_options: Some(self.retention.to_proto()),
            snapshot_enabled: self.snapshot_enabled,
            index_options: Some(self.index.to_proto()),
            cold_writes_enabled: self.cold_writes_enabled,
        }
    }
}

fn nanos_to_duration(
    field: &str,
    nanos: i64,
) -> std::result::Result<Duration, String> {
    if nanos < 0 {
        return Err(format!("{field} must be non-negative, got {nanos}ns"));
    }
    Ok(Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    ))
}

fn duration_to_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}
