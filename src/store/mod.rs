mod profiles;
mod thunderbird;
use self::profiles::locate_cache;
use self::thunderbird::ThunderbirdCache;
use crate::event::Event;
use crate::timerange::{from_timestamp, TimeZone};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// A raw row as returned by an [`EventSource`], with timestamps in the
/// source's native unit.  Any field may be missing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EventRow {
    pub(crate) source_id: Option<String>,
    pub(crate) event_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) start: Option<i64>,
    pub(crate) end: Option<i64>,
}

pub(crate) trait EventSource: fmt::Debug {
    /// Number of native timestamp units in one second
    fn ticks_per_second(&self) -> i64;

    /// Returns the rows whose start lies strictly between `after` and
    /// `before`, in ascending order of start
    fn query(&self, after: i64, before: i64) -> Result<Vec<EventRow>, SourceError>;
}

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("calendar cache query failed")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum MalformedRow {
    #[error("event row has no {0}")]
    Missing(&'static str),
    #[error("event row timestamps are out of range")]
    OutOfRange,
    #[error("event row ends before it starts")]
    EndsBeforeStart,
}

/// Read-only access to the configured calendar data.  With no source
/// configured, every month is empty.
#[derive(Debug, Default)]
pub(crate) struct EventStore {
    source: Option<Box<dyn EventSource>>,
}

impl EventStore {
    pub(crate) fn new(source: Box<dyn EventSource>) -> EventStore {
        EventStore {
            source: Some(source),
        }
    }

    /// Opens the calendar cache at `database` or, if that is `None`, the one
    /// found through the Thunderbird profile list.  Falls back to an empty
    /// store if there is no usable cache.
    pub(crate) fn open(database: Option<&Path>) -> EventStore {
        let located = match database {
            Some(p) => Ok(p.to_path_buf()),
            None => locate_cache(),
        };
        let path = match located {
            Ok(p) => p,
            Err(e) => {
                info!(error = %e, "no calendar cache found; showing an empty calendar");
                return EventStore::default();
            }
        };
        match ThunderbirdCache::open(&path) {
            Ok(cache) => {
                debug!(path = %path.display(), "opened calendar cache");
                EventStore::new(Box::new(cache))
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to open calendar cache; showing an empty calendar"
                );
                EventStore::default()
            }
        }
    }

    /// Loads the events that start strictly between `first` and `last`,
    /// ordered by start and with duplicate event IDs removed (first one
    /// wins).  Event times are converted to local time in `zone`.  Failures
    /// of the underlying source are logged and produce an empty list.
    pub(crate) fn load(
        &self,
        first: OffsetDateTime,
        last: OffsetDateTime,
        zone: &dyn TimeZone,
    ) -> Vec<Event> {
        let Some(source) = self.source.as_deref() else {
            return Vec::new();
        };
        let ticks = source.ticks_per_second();
        let (Some(after), Some(before)) = (
            first.unix_timestamp().checked_mul(ticks),
            last.unix_timestamp().checked_mul(ticks),
        ) else {
            warn!(%first, %last, "month bounds do not fit the calendar source's timestamps");
            return Vec::new();
        };
        let rows = match source.query(after, before) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "failed to load events");
                return Vec::new();
            }
        };
        let mut seen = HashSet::new();
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            match materialize(row, ticks, zone) {
                Ok((event_id, event)) => {
                    if seen.insert(event_id) {
                        events.push(event);
                    }
                }
                Err(e) => warn!(error = %e, "skipping event row"),
            }
        }
        debug!(%first, %last, count = events.len(), "loaded events");
        events
    }
}

fn materialize(
    row: EventRow,
    ticks: i64,
    zone: &dyn TimeZone,
) -> Result<(String, Event), MalformedRow> {
    let source_id = row.source_id.ok_or(MalformedRow::Missing("calendar ID"))?;
    let event_id = row.event_id.ok_or(MalformedRow::Missing("event ID"))?;
    let title = row.title.ok_or(MalformedRow::Missing("title"))?;
    let start = row.start.ok_or(MalformedRow::Missing("start"))?;
    let end = row.end.ok_or(MalformedRow::Missing("end"))?;
    let to_local = |t: i64| {
        t.checked_div_euclid(ticks)
            .and_then(|secs| from_timestamp(secs, zone))
            .ok_or(MalformedRow::OutOfRange)
    };
    let start = to_local(start)?;
    let end = to_local(end)?;
    if end < start {
        return Err(MalformedRow::EndsBeforeStart);
    }
    Ok((event_id, Event::new(source_id, title, start, end)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// An in-memory source that filters and sorts its rows the way the
    /// calendar cache query does
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub(crate) struct MemorySource {
        pub(crate) ticks: i64,
        pub(crate) rows: Vec<EventRow>,
    }

    impl MemorySource {
        pub(crate) fn seconds(rows: Vec<EventRow>) -> MemorySource {
            MemorySource { ticks: 1, rows }
        }
    }

    impl EventSource for MemorySource {
        fn ticks_per_second(&self) -> i64 {
            self.ticks
        }

        fn query(&self, after: i64, before: i64) -> Result<Vec<EventRow>, SourceError> {
            let mut rows = self
                .rows
                .iter()
                .filter(|r| r.start.is_some_and(|s| after < s && s < before))
                .cloned()
                .collect::<Vec<_>>();
            rows.sort_by_key(|r| r.start);
            Ok(rows)
        }
    }

    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub(crate) struct BrokenSource;

    impl EventSource for BrokenSource {
        fn ticks_per_second(&self) -> i64 {
            1
        }

        fn query(&self, _after: i64, _before: i64) -> Result<Vec<EventRow>, SourceError> {
            Err(SourceError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    pub(crate) fn row(
        source_id: &str,
        event_id: &str,
        title: &str,
        start: i64,
        end: i64,
    ) -> EventRow {
        EventRow {
            source_id: Some(source_id.into()),
            event_id: Some(event_id.into()),
            title: Some(title.into()),
            start: Some(start),
            end: Some(end),
        }
    }
}
