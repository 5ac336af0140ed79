//! Builds the scheduling graph: anchors from the events sheet, tasks
//! from each anchor's runbook tables.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::date::{normalize_date, offset_to_days, parse_canonical};
use crate::error::RuncalResult;
use crate::event::{doc_id_from_link, AnchorEvent, AnchorKey, DependentTask, Direction, TaskKey};
use crate::source::{DocSource, DocTable, SheetRow, SheetSource};

/// Sheet column positions: name, runbook link, then one column per
/// scheduled occurrence.
const COL_NAME: usize = 0;
const COL_LINK: usize = 1;
const COL_FIRST_DATE: usize = 2;

/// Runbook table positions: the direction header sits at (0, 2), data
/// rows carry the task link in column 1 and the offset phrase in
/// column 2.
const HEADER_ROW: usize = 0;
const COL_TASK: usize = 1;
const COL_OFFSET: usize = 2;

/// The complete computed graph for one run: every anchor occurrence and
/// every task keyed to one of them. Rebuilt from scratch each run; the
/// sheet and its documents are the sole source of truth.
#[derive(Debug, Default)]
pub struct ScheduleGraph {
    pub anchors: HashMap<AnchorKey, AnchorEvent>,
    pub tasks: HashMap<TaskKey, DependentTask>,
}

impl ScheduleGraph {
    /// Tasks whose anchor key has no matching anchor. These can only
    /// come from hand-built graphs or future parsing changes; the
    /// synchronizer refuses to insert them.
    pub fn orphaned_tasks(&self) -> Vec<&DependentTask> {
        self.tasks
            .values()
            .filter(|t| !self.anchors.contains_key(&t.anchor))
            .collect()
    }
}

/// Build the full graph: fetch the sheet rows, construct anchors, then
/// walk each anchor's runbook document for task tables. Document fetches
/// happen one anchor at a time; a failed fetch aborts the run.
pub async fn build_graph<S, D>(sheet: &S, docs: &D) -> RuncalResult<ScheduleGraph>
where
    S: SheetSource,
    D: DocSource,
{
    let rows = sheet.fetch_rows().await?;
    let anchors = collect_anchors(&rows);

    let mut tasks = HashMap::new();
    for (key, anchor) in &anchors {
        let Some(doc_id) = anchor.doc_id() else {
            warn!("anchor '{key}' has a runbook link without an id segment, skipping its tasks");
            continue;
        };
        let tables = docs.fetch_tables(doc_id).await?;
        debug!("anchor '{key}': {} table(s) in runbook", tables.len());
        for table in &tables {
            collect_tasks(table, key, &mut tasks);
        }
    }

    Ok(ScheduleGraph { anchors, tasks })
}

/// One anchor per non-empty date cell; the header row is skipped. A
/// repeated (name, date) pair overwrites the earlier entry, so exactly
/// one anchor survives per key.
pub fn collect_anchors(rows: &[SheetRow]) -> HashMap<AnchorKey, AnchorEvent> {
    let mut anchors = HashMap::new();

    for row in rows.iter().skip(1) {
        let Some(name) = row.text(COL_NAME) else {
            warn!("sheet row without an event name, skipping");
            continue;
        };
        let Some(link) = row.hyperlink(COL_LINK) else {
            warn!("event '{name}' has no runbook link, skipping");
            continue;
        };

        for ix in COL_FIRST_DATE..row.len() {
            let Some(raw) = row.text(ix) else {
                continue;
            };
            let canon = normalize_date(raw);
            let Some(date) = parse_canonical(&canon) else {
                warn!("event '{name}' has unparseable date '{raw}', skipping that occurrence");
                continue;
            };
            let anchor = AnchorEvent::new(name, link, date);
            anchors.insert(anchor.key(), anchor);
        }
    }

    anchors
}

/// Read one runbook table into tasks bound to `anchor`. The header cell
/// decides before/after for every data row beneath it; rows missing a
/// usable name, link, or offset phrase are skipped.
fn collect_tasks(
    table: &DocTable,
    anchor: &AnchorKey,
    tasks: &mut HashMap<TaskKey, DependentTask>,
) {
    let direction = table
        .text(HEADER_ROW, COL_OFFSET)
        .map(Direction::from_header)
        .unwrap_or(Direction::After);

    for row_ix in 1..table.row_count() {
        let Some(name) = table.text(row_ix, COL_TASK) else {
            warn!("table row {row_ix} under '{anchor}' has no task name, skipping");
            continue;
        };
        let Some(link) = table.hyperlink(row_ix, COL_TASK) else {
            warn!("task '{name}' under '{anchor}' has no document link, skipping");
            continue;
        };
        let Some(doc_id) = doc_id_from_link(link) else {
            warn!("task '{name}' under '{anchor}' has a link without an id segment, skipping");
            continue;
        };
        let Some(offset) = table.text(row_ix, COL_OFFSET).and_then(parse_offset_phrase) else {
            warn!("task '{name}' under '{anchor}' has no usable offset phrase, skipping");
            continue;
        };

        let task = DependentTask::new(name, doc_id, anchor.clone(), direction, offset);
        tasks.insert(task.key(), task);
    }
}

/// Split a "<number> <unit>" phrase into a day count. `None` when the
/// leading number is missing or unparseable; an unknown unit still
/// yields the 30-day fallback from [`offset_to_days`].
fn parse_offset_phrase(phrase: &str) -> Option<i64> {
    let mut parts = phrase.split_whitespace();
    let amount: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next().unwrap_or("");
    Some(offset_to_days(amount, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceCell;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FakeSheet {
        rows: Vec<SheetRow>,
    }

    #[async_trait]
    impl SheetSource for FakeSheet {
        async fn fetch_rows(&self) -> RuncalResult<Vec<SheetRow>> {
            Ok(self.rows.clone())
        }
    }

    struct FakeDocs {
        tables: HashMap<String, Vec<DocTable>>,
    }

    #[async_trait]
    impl DocSource for FakeDocs {
        async fn fetch_tables(&self, doc_id: &str) -> RuncalResult<Vec<DocTable>> {
            Ok(self.tables.get(doc_id).cloned().unwrap_or_default())
        }
    }

    fn header_row() -> SheetRow {
        SheetRow(vec![
            SourceCell::with_text("Event"),
            SourceCell::with_text("Runbook"),
            SourceCell::with_text("Dates"),
        ])
    }

    fn retro_row(dates: &[&str]) -> SheetRow {
        let mut cells = vec![
            SourceCell::with_text("Retro"),
            SourceCell::with_link("Runbook", "https://docs/x/AAA/edit"),
        ];
        cells.extend(dates.iter().map(|d| SourceCell::with_text(d)));
        SheetRow(cells)
    }

    fn survey_table(header: &str) -> DocTable {
        DocTable {
            rows: vec![
                vec![
                    SourceCell::with_text("Step"),
                    SourceCell::with_text("Task"),
                    SourceCell::with_text(header),
                ],
                vec![
                    SourceCell::with_text("1"),
                    SourceCell::with_link("Send survey", "https://docs/x/BBB/edit"),
                    SourceCell::with_text("10 days"),
                ],
            ],
        }
    }

    #[test]
    fn collects_one_anchor_per_date_cell() {
        let anchors = collect_anchors(&[header_row(), retro_row(&["6/1/2024", "9/1/2024"])]);
        assert_eq!(anchors.len(), 2);
        let key = AnchorKey::new("Retro", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(anchors[&key].doc_link, "https://docs/x/AAA/edit");
    }

    #[test]
    fn duplicate_anchor_keys_overwrite() {
        let anchors = collect_anchors(&[header_row(), retro_row(&["6/1/2024", "6/1/2024"])]);
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn skips_rows_without_name_or_link() {
        let nameless = SheetRow(vec![
            SourceCell::default(),
            SourceCell::with_link("Runbook", "https://docs/x/AAA/edit"),
            SourceCell::with_text("6/1/2024"),
        ]);
        let linkless = SheetRow(vec![
            SourceCell::with_text("Retro"),
            SourceCell::with_text("Runbook"),
            SourceCell::with_text("6/1/2024"),
        ]);
        let anchors = collect_anchors(&[header_row(), nameless, linkless]);
        assert!(anchors.is_empty());
    }

    #[test]
    fn skips_unparseable_date_cells() {
        let anchors = collect_anchors(&[header_row(), retro_row(&["someday", "6/1/2024"])]);
        assert_eq!(anchors.len(), 1);
    }

    #[tokio::test]
    async fn builds_anchor_and_task_end_to_end() {
        let sheet = FakeSheet {
            rows: vec![header_row(), retro_row(&["6/1/2024"])],
        };
        let docs = FakeDocs {
            tables: HashMap::from([("AAA".to_string(), vec![survey_table("Days before event")])]),
        };

        let graph = build_graph(&sheet, &docs).await.unwrap();

        assert_eq!(graph.anchors.len(), 1);
        assert_eq!(graph.tasks.len(), 1);

        let anchor_key = AnchorKey::new("Retro", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(anchor_key.to_string(), "Retro-240601");

        let task = graph.tasks.values().next().unwrap();
        assert_eq!(task.name, "Send survey");
        assert_eq!(task.doc_id(), "BBB");
        assert_eq!(task.direction, Direction::Before);
        assert_eq!(task.event_date().format("%y%m%d").to_string(), "240522");
        assert!(graph.orphaned_tasks().is_empty());
    }

    #[tokio::test]
    async fn header_without_before_schedules_after() {
        let sheet = FakeSheet {
            rows: vec![header_row(), retro_row(&["6/1/2024"])],
        };
        let docs = FakeDocs {
            tables: HashMap::from([("AAA".to_string(), vec![survey_table("Days after event")])]),
        };

        let graph = build_graph(&sheet, &docs).await.unwrap();
        let task = graph.tasks.values().next().unwrap();
        assert_eq!(task.direction, Direction::After);
        assert_eq!(task.event_date().format("%y%m%d").to_string(), "240611");
    }

    #[tokio::test]
    async fn skips_task_rows_missing_fields() {
        let broken_table = DocTable {
            rows: vec![
                vec![
                    SourceCell::with_text("Step"),
                    SourceCell::with_text("Task"),
                    SourceCell::with_text("Days before"),
                ],
                // No hyperlink on the task cell.
                vec![
                    SourceCell::with_text("1"),
                    SourceCell::with_text("Send survey"),
                    SourceCell::with_text("10 days"),
                ],
                // No offset phrase.
                vec![
                    SourceCell::with_text("2"),
                    SourceCell::with_link("Book room", "https://docs/x/CCC/edit"),
                    SourceCell::default(),
                ],
            ],
        };
        let sheet = FakeSheet {
            rows: vec![header_row(), retro_row(&["6/1/2024"])],
        };
        let docs = FakeDocs {
            tables: HashMap::from([("AAA".to_string(), vec![broken_table])]),
        };

        let graph = build_graph(&sheet, &docs).await.unwrap();
        assert!(graph.tasks.is_empty());
    }

    #[test]
    fn offset_phrase_requires_leading_number() {
        assert_eq!(parse_offset_phrase("10 days"), Some(10));
        assert_eq!(parse_offset_phrase("2 weeks"), Some(14));
        assert_eq!(parse_offset_phrase("soon"), None);
        // Unknown unit still resolves through the 30-day fallback.
        assert_eq!(parse_offset_phrase("1 fortnight"), Some(30));
    }
}
