use anyhow::Result;

use runcal_core::graph::build_graph;
use runcal_core::sync::{full_replace, SyncOptions};

use crate::config;
use crate::providers::google::auth;
use crate::providers::google::calendar::GoogleCalendar;
use crate::providers::google::docs::GoogleDocs;
use crate::providers::google::drive::GoogleDrive;
use crate::providers::google::sheets::GoogleSheets;

/// Build the graph and run the full-replace protocol against the
/// configured calendar.
pub async fn run() -> Result<()> {
    let config = config::load_config()?;
    let tokens = auth::valid_tokens(&config.google).await?;

    let sheets = GoogleSheets::new(&tokens.access_token, &config.sheet_id);
    let docs = GoogleDocs::new(&tokens.access_token);

    let graph = build_graph(&sheets, &docs).await?;

    println!(
        "Computed {} event(s) and {} task(s)",
        graph.anchors.len(),
        graph.tasks.len()
    );

    let client = auth::create_client(&config.google, &tokens);
    let calendar = GoogleCalendar::new(client, &config.calendar_id);
    let drive = GoogleDrive::new(&tokens.access_token);

    let options = SyncOptions {
        time_zone: config.time_zone.clone(),
        utc_offset: config.utc_offset(),
    };

    let stats = full_replace(&graph, &calendar, &drive, &options).await?;

    println!(
        "Deleted {} event(s), inserted {} ({} skipped)",
        stats.deleted, stats.inserted, stats.skipped
    );

    Ok(())
}
