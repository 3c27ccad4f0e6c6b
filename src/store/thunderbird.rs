use super::{EventRow, EventSource, SourceError};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::Path;

/// Thunderbird stores event times in microseconds since the epoch
const TICKS_PER_SECOND: i64 = 1_000_000;

static EVENTS_SQL: &str = "SELECT cal_id, id, title, event_start, event_end
FROM cal_events
WHERE event_start > ?1 AND event_start < ?2
ORDER BY event_start";

/// Thunderbird's `calendar-data/cache.sqlite`, opened read-only
#[derive(Debug)]
pub(crate) struct ThunderbirdCache {
    conn: Connection,
}

impl ThunderbirdCache {
    pub(crate) fn open(path: &Path) -> Result<ThunderbirdCache, SourceError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(ThunderbirdCache::from_connection(conn))
    }

    pub(crate) fn from_connection(conn: Connection) -> ThunderbirdCache {
        ThunderbirdCache { conn }
    }
}

impl EventSource for ThunderbirdCache {
    fn ticks_per_second(&self) -> i64 {
        TICKS_PER_SECOND
    }

    fn query(&self, after: i64, before: i64) -> Result<Vec<EventRow>, SourceError> {
        let mut stmt = self.conn.prepare_cached(EVENTS_SQL)?;
        let rows = stmt
            .query_map(params![after, before], |row| Ok(event_row(row)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

// NULLs and values of the wrong type both come out as missing fields
fn event_row(row: &Row<'_>) -> EventRow {
    EventRow {
        source_id: row.get(0).ok().flatten(),
        event_id: row.get(1).ok().flatten(),
        title: row.get(2).ok().flatten(),
        start: row.get(3).ok().flatten(),
        end: row.get(4).ok().flatten(),
    }
}
