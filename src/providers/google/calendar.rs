//! Calendar sink backed by the Google Calendar API client.

use async_trait::async_trait;
use chrono::Utc;
use google_calendar::types::{EventAttachment, EventDateTime, OrderBy, SendUpdates};
use google_calendar::Client;

use runcal_core::source::{CalendarEntry, CalendarSink};
use runcal_core::RuncalResult;

use super::provider_err;

pub struct GoogleCalendar {
    client: Client,
    calendar_id: String,
}

impl GoogleCalendar {
    pub fn new(client: Client, calendar_id: &str) -> Self {
        GoogleCalendar {
            client,
            calendar_id: calendar_id.to_string(),
        }
    }
}

/// Map a materialized entry onto the wire type. Timestamps go out as
/// UTC instants with the zone name alongside.
fn to_google_event(entry: &CalendarEntry) -> google_calendar::types::Event {
    let attachments = entry
        .attachment
        .iter()
        .map(|a| EventAttachment {
            file_id: String::new(),
            file_url: a.file_url.clone(),
            icon_link: String::new(),
            mime_type: a.mime_type.clone(),
            title: a.title.clone(),
        })
        .collect();

    google_calendar::types::Event {
        summary: entry.summary.clone(),
        description: entry.description.clone(),
        start: Some(EventDateTime {
            date: None,
            date_time: Some(entry.start.with_timezone(&Utc)),
            time_zone: entry.time_zone.clone(),
        }),
        end: Some(EventDateTime {
            date: None,
            date_time: Some(entry.end.with_timezone(&Utc)),
            time_zone: entry.time_zone.clone(),
        }),
        recurrence: entry.recurrence.clone(),
        attachments,
        ..Default::default()
    }
}

#[async_trait]
impl CalendarSink for GoogleCalendar {
    async fn list_event_ids(&self) -> RuncalResult<Vec<String>> {
        let response = self
            .client
            .events()
            .list_all(
                &self.calendar_id,
                "",                 // i_cal_uid
                0,                  // max_attendees
                OrderBy::default(), // order_by
                &[],                // private_extended_property
                "",                 // q (search query)
                &[],                // shared_extended_property
                false,              // show_deleted
                false,              // show_hidden_invitations
                true,               // single_events
                "",                 // time_max
                "",                 // time_min
                "",                 // time_zone
                "",                 // updated_min
            )
            .await
            .map_err(provider_err)?;

        Ok(response
            .body
            .into_iter()
            .filter(|e| !e.id.is_empty())
            .map(|e| e.id)
            .collect())
    }

    async fn delete_event(&self, event_id: &str) -> RuncalResult<()> {
        self.client
            .events()
            .delete(&self.calendar_id, event_id, false, SendUpdates::None)
            .await
            .map_err(provider_err)?;
        Ok(())
    }

    async fn insert_event(&self, entry: &CalendarEntry) -> RuncalResult<()> {
        let event = to_google_event(entry);

        self.client
            .events()
            .insert(
                &self.calendar_id,
                0,                 // conference_data_version
                0,                 // max_attendees
                false,             // send_notifications
                SendUpdates::None, // send_updates
                true,              // supports_attachments
                &event,
            )
            .await
            .map_err(provider_err)?;

        Ok(())
    }
}
