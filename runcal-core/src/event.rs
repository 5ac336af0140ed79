//! Anchor events, dependent tasks, and the typed keys that join them.

use std::cell::OnceCell;
use std::fmt;

use chrono::{Duration, NaiveDate};

/// Identity of one dated occurrence of a named recurring event.
///
/// This is the map key for the anchor collection and the join key every
/// task carries. Its `Display` form is the string key used in task
/// descriptions and logs: spaces in the name replaced with dashes,
/// followed by a dash and the `yymmdd` date (e.g. `Board-Meeting-240601`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorKey {
    name: String,
    date: NaiveDate,
}

impl AnchorKey {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        AnchorKey {
            name: name.into(),
            date,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.name.replace(' ', "-"),
            self.date.format("%y%m%d")
        )
    }
}

/// Composite identity for a task. Two tasks with the same name under
/// different anchors are distinct; the same name under the same anchor
/// overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub name: String,
    pub anchor: AnchorKey,
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.name, self.anchor)
    }
}

/// Whether a task is scheduled before or after its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Before,
    After,
}

impl Direction {
    /// Day multiplier applied to the offset: -1 before, +1 after.
    pub fn day_sign(self) -> i64 {
        match self {
            Direction::Before => -1,
            Direction::After => 1,
        }
    }

    /// Read a direction from a table header phrase. Case-insensitive
    /// substring match for "before"; anything else schedules after.
    pub fn from_header(text: &str) -> Self {
        if text.to_lowercase().contains("before") {
            Direction::Before
        } else {
            Direction::After
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Direction::Before => "before",
            Direction::After => "after",
        }
    }
}

/// Extract a document id from a link: the second-to-last `/`-segment,
/// the conventional position in a Drive edit URL. `None` when the link
/// has too few segments to carry one.
pub fn doc_id_from_link(link: &str) -> Option<&str> {
    let segments: Vec<&str> = link.split('/').collect();
    if segments.len() < 2 {
        return None;
    }
    let id = segments[segments.len() - 2];
    (!id.is_empty()).then_some(id)
}

/// One scheduled occurrence of a named recurring event, read from the
/// events sheet. Immutable after construction; lives for one run.
#[derive(Debug, Clone)]
pub struct AnchorEvent {
    pub name: String,
    pub doc_link: String,
    pub date: NaiveDate,
}

impl AnchorEvent {
    pub fn new(name: impl Into<String>, doc_link: impl Into<String>, date: NaiveDate) -> Self {
        AnchorEvent {
            name: name.into(),
            doc_link: doc_link.into(),
            date,
        }
    }

    pub fn key(&self) -> AnchorKey {
        AnchorKey::new(self.name.clone(), self.date)
    }

    /// The runbook document id carried in the doc link.
    pub fn doc_id(&self) -> Option<&str> {
        doc_id_from_link(&self.doc_link)
    }

    pub fn event_date(&self) -> NaiveDate {
        self.date
    }

    /// Anchors carry no generated description; whatever text they need
    /// is authored in the runbook document itself.
    pub fn description(&self) -> String {
        String::new()
    }
}

/// A checklist item scheduled at a day offset before or after one anchor
/// occurrence. Holds only the anchor's key, not the anchor itself, so
/// tasks can be parsed independently of anchor construction.
#[derive(Debug, Clone)]
pub struct DependentTask {
    pub name: String,
    pub doc_id: String,
    pub anchor: AnchorKey,
    pub direction: Direction,
    pub offset_days: i64,
    resolved: OnceCell<NaiveDate>,
}

impl DependentTask {
    pub fn new(
        name: impl Into<String>,
        doc_id: impl Into<String>,
        anchor: AnchorKey,
        direction: Direction,
        offset_days: i64,
    ) -> Self {
        DependentTask {
            name: name.into(),
            doc_id: doc_id.into(),
            anchor,
            direction,
            offset_days,
            resolved: OnceCell::new(),
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey {
            name: self.name.clone(),
            anchor: self.anchor.clone(),
        }
    }

    /// Unlike the anchor's lazy link parsing, the task's document id was
    /// already extracted at construction.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// The task's concrete date, computed once from the anchor's date
    /// and the signed offset and cached. Later calls return the stored
    /// value without recomputation.
    pub fn event_date(&self) -> NaiveDate {
        *self
            .resolved
            .get_or_init(|| resolve_task_date(&self.anchor, self.direction, self.offset_days))
    }

    /// Display template for the task's calendar entry, naming the anchor
    /// occurrence it supports.
    pub fn description(&self) -> String {
        format!(
            "Event: {}\ncomplete {} days {} the event {}",
            self.name,
            self.offset_days,
            self.direction.phrase(),
            self.anchor
        )
    }
}

/// Pure date arithmetic behind [`DependentTask::event_date`].
fn resolve_task_date(anchor: &AnchorKey, direction: Direction, offset_days: i64) -> NaiveDate {
    anchor.date() + Duration::days(direction.day_sign() * offset_days)
}
