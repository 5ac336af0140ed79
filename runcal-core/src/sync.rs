//! Full-replace reconciliation against the calendar sink.
//!
//! Every run wipes the target calendar and reinserts the freshly
//! computed graph. There is no diffing or tagging of managed events, so
//! the calendar must be dedicated to runcal.

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{info, warn};

use crate::error::RuncalResult;
use crate::graph::ScheduleGraph;
use crate::source::{Attachment, CalendarEntry, CalendarSink, DriveSource};

/// Fixed local-time window every materialized event occupies.
const START_HOUR: u32 = 9;
const END_HOUR: u32 = 17;

/// Single-occurrence marker, so calendar UIs treat each entry as a
/// one-off rather than an open-ended series.
const SINGLE_OCCURRENCE_RULE: &str = "RRULE:FREQ=DAILY;COUNT=1";

/// Time placement applied to every materialized event.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// IANA zone name sent to the calendar.
    pub time_zone: String,
    /// Fixed UTC offset used to place the 09:00-17:00 window.
    pub utc_offset: FixedOffset,
}

/// Counters reported after a full-replace run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub deleted: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// Delete every event on the target calendar, then insert one event per
/// anchor followed by one per task. A task whose anchor key is missing
/// from the anchor collection is skipped rather than inserted as an
/// orphan.
pub async fn full_replace<C, D>(
    graph: &ScheduleGraph,
    calendar: &C,
    drive: &D,
    options: &SyncOptions,
) -> RuncalResult<SyncStats>
where
    C: CalendarSink,
    D: DriveSource,
{
    let mut stats = SyncStats::default();

    let existing = calendar.list_event_ids().await?;
    info!("deleting {} existing calendar event(s)", existing.len());
    for id in &existing {
        calendar.delete_event(id).await?;
        stats.deleted += 1;
    }

    for anchor in graph.anchors.values() {
        let attachment = fetch_attachment(drive, anchor.doc_id()).await;
        let entry = materialize(
            &anchor.name,
            anchor.event_date(),
            anchor.description(),
            attachment,
            options,
        );
        calendar.insert_event(&entry).await?;
        stats.inserted += 1;
    }

    for task in graph.tasks.values() {
        if !graph.anchors.contains_key(&task.anchor) {
            warn!(
                "task '{}' references unknown anchor '{}', skipping",
                task.name, task.anchor
            );
            stats.skipped += 1;
            continue;
        }
        let attachment = fetch_attachment(drive, Some(task.doc_id())).await;
        let entry = materialize(
            &task.name,
            task.event_date(),
            task.description(),
            attachment,
            options,
        );
        calendar.insert_event(&entry).await?;
        stats.inserted += 1;
    }

    Ok(stats)
}

/// Attachment lookup is best-effort: a failed lookup degrades to an
/// event without an attachment instead of failing the run.
async fn fetch_attachment<D: DriveSource>(drive: &D, file_id: Option<&str>) -> Option<Attachment> {
    let file_id = file_id?;
    match drive.fetch_attachment(file_id).await {
        Ok(attachment) => Some(attachment),
        Err(err) => {
            warn!("attachment lookup for '{file_id}' failed: {err}");
            None
        }
    }
}

/// Map a graph entity onto the fixed calendar template: a 09:00-17:00
/// window on the resolved date, a single-occurrence recurrence rule, and
/// an optional runbook attachment.
fn materialize(
    summary: &str,
    date: NaiveDate,
    description: String,
    attachment: Option<Attachment>,
    options: &SyncOptions,
) -> CalendarEntry {
    CalendarEntry {
        summary: summary.to_string(),
        description,
        start: window_time(date, START_HOUR, options.utc_offset),
        end: window_time(date, END_HOUR, options.utc_offset),
        time_zone: options.time_zone.clone(),
        recurrence: vec![SINGLE_OCCURRENCE_RULE.to_string()],
        attachment,
    }
}

fn window_time(date: NaiveDate, hour: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    date.and_hms_opt(hour, 0, 0)
        .unwrap()
        .and_local_timezone(offset)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuncalError;
    use crate::event::{AnchorEvent, AnchorKey, DependentTask, Direction};
    use crate::graph::ScheduleGraph;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Timelike};
    use std::sync::Mutex;

    struct FakeCalendar {
        existing: Vec<String>,
        deleted: Mutex<Vec<String>>,
        inserted: Mutex<Vec<CalendarEntry>>,
    }

    impl FakeCalendar {
        fn empty() -> Self {
            Self::with_existing(&[])
        }

        fn with_existing(ids: &[&str]) -> Self {
            FakeCalendar {
                existing: ids.iter().map(|s| s.to_string()).collect(),
                deleted: Mutex::new(Vec::new()),
                inserted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CalendarSink for FakeCalendar {
        async fn list_event_ids(&self) -> RuncalResult<Vec<String>> {
            Ok(self.existing.clone())
        }

        async fn delete_event(&self, event_id: &str) -> RuncalResult<()> {
            self.deleted.lock().unwrap().push(event_id.to_string());
            Ok(())
        }

        async fn insert_event(&self, entry: &CalendarEntry) -> RuncalResult<()> {
            self.inserted.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct FakeDrive {
        fail: bool,
    }

    #[async_trait]
    impl DriveSource for FakeDrive {
        async fn fetch_attachment(&self, file_id: &str) -> RuncalResult<Attachment> {
            if self.fail {
                return Err(RuncalError::Provider("file not found".to_string()));
            }
            Ok(Attachment {
                title: format!("Runbook {file_id}"),
                mime_type: "application/vnd.google-apps.document".to_string(),
                file_url: format!("https://docs/x/{file_id}/edit"),
            })
        }
    }

    fn options() -> SyncOptions {
        SyncOptions {
            time_zone: "America/New_York".to_string(),
            utc_offset: FixedOffset::west_opt(4 * 3600).unwrap(),
        }
    }

    fn retro_graph() -> ScheduleGraph {
        let mut graph = ScheduleGraph::default();
        let anchor = AnchorEvent::new(
            "Retro",
            "https://docs/x/AAA/edit",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        let task = DependentTask::new(
            "Send survey",
            "BBB",
            anchor.key(),
            Direction::Before,
            10,
        );
        graph.tasks.insert(task.key(), task);
        graph.anchors.insert(anchor.key(), anchor);
        graph
    }

    #[tokio::test]
    async fn empty_calendar_gets_two_inserts_and_no_deletes() {
        let calendar = FakeCalendar::empty();
        let drive = FakeDrive { fail: false };

        let stats = full_replace(&retro_graph(), &calendar, &drive, &options())
            .await
            .unwrap();

        assert_eq!(
            stats,
            SyncStats {
                deleted: 0,
                inserted: 2,
                skipped: 0
            }
        );

        let inserted = calendar.inserted.lock().unwrap();
        let anchor_entry = inserted.iter().find(|e| e.summary == "Retro").unwrap();
        assert_eq!(anchor_entry.description, "");
        assert_eq!(anchor_entry.start.hour(), 9);
        assert_eq!(anchor_entry.end.hour(), 17);
        assert_eq!(anchor_entry.recurrence, vec![SINGLE_OCCURRENCE_RULE]);
        assert_eq!(
            anchor_entry.attachment.as_ref().unwrap().title,
            "Runbook AAA"
        );

        let task_entry = inserted.iter().find(|e| e.summary == "Send survey").unwrap();
        assert_eq!(
            task_entry.start.date_naive(),
            NaiveDate::from_ymd_opt(2024, 5, 22).unwrap()
        );
        assert!(task_entry.description.contains("Retro-240601"));
    }

    #[tokio::test]
    async fn existing_events_are_all_deleted_first() {
        let calendar = FakeCalendar::with_existing(&["a", "b", "c"]);
        let drive = FakeDrive { fail: false };

        let stats = full_replace(&retro_graph(), &calendar, &drive, &options())
            .await
            .unwrap();

        assert_eq!(stats.deleted, 3);
        assert_eq!(calendar.deleted.lock().unwrap().len(), 3);
        assert_eq!(stats.inserted, 2);
    }

    #[tokio::test]
    async fn orphaned_task_is_skipped() {
        let mut graph = retro_graph();
        let dangling = AnchorKey::new("Offsite", NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        let orphan = DependentTask::new("Book venue", "CCC", dangling, Direction::Before, 30);
        graph.tasks.insert(orphan.key(), orphan);

        let calendar = FakeCalendar::empty();
        let drive = FakeDrive { fail: false };

        let stats = full_replace(&graph, &calendar, &drive, &options())
            .await
            .unwrap();

        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.skipped, 1);
        assert!(calendar
            .inserted
            .lock()
            .unwrap()
            .iter()
            .all(|e| e.summary != "Book venue"));
    }

    #[tokio::test]
    async fn failed_attachment_lookup_still_inserts_event() {
        let calendar = FakeCalendar::empty();
        let drive = FakeDrive { fail: true };

        let stats = full_replace(&retro_graph(), &calendar, &drive, &options())
            .await
            .unwrap();

        assert_eq!(stats.inserted, 2);
        assert!(calendar
            .inserted
            .lock()
            .unwrap()
            .iter()
            .all(|e| e.attachment.is_none()));
    }
}
