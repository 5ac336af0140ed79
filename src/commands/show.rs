use anyhow::Result;

use runcal_core::graph::build_graph;

use crate::config;
use crate::providers::google::auth;
use crate::providers::google::docs::GoogleDocs;
use crate::providers::google::sheets::GoogleSheets;

/// Build the graph and print every anchor and task with its resolved
/// date. Reads the sheet and runbooks but touches nothing else.
pub async fn run() -> Result<()> {
    let config = config::load_config()?;
    let tokens = auth::valid_tokens(&config.google).await?;

    let sheets = GoogleSheets::new(&tokens.access_token, &config.sheet_id);
    let docs = GoogleDocs::new(&tokens.access_token);

    let graph = build_graph(&sheets, &docs).await?;

    println!(
        "{} event(s), {} task(s)\n",
        graph.anchors.len(),
        graph.tasks.len()
    );

    for anchor in graph.anchors.values() {
        println!(
            "{} scheduled on {}",
            anchor.name,
            anchor.event_date().format("%y%m%d")
        );
    }

    for task in graph.tasks.values() {
        println!(
            "{} on {}",
            task.description().replace('\n', " "),
            task.event_date().format("%y%m%d")
        );
    }

    Ok(())
}
