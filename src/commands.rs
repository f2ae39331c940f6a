//! CLI command implementations.
//!
//! Each command performs one full load through [`reload`], so the CLI
//! exercises the same lifecycle a long-lived client would. Output goes to
//! stdout; a failed load is still rendered (summary plus error) and reported
//! to the caller as `Ok(false)` so the binary can set its exit status.

use anyhow::Result;
use std::io::{self, Write};
use tokio::sync::Mutex;

use crate::columns::LogicalField;
use crate::config::Config;
use crate::directory::{reload, Directory};
use crate::loader::SourceLoader;
use crate::normalize::Normalizer;
use crate::render::{render_cards, render_vocabulary};

async fn load_directory(config: &Config) -> Result<Directory> {
    let loader = SourceLoader::from_config(config)?;
    let directory = Mutex::new(Directory::new(Normalizer::from_config(config)));
    reload(&directory, &loader).await;
    Ok(directory.into_inner())
}

/// `sheetdir list`: load, apply tag selection and query, print the cards.
pub async fn run_list(
    config: &Config,
    tags: &[String],
    query: Option<&str>,
    json: bool,
) -> Result<bool> {
    let mut directory = load_directory(config).await?;
    for tag in tags {
        if !directory.vocabulary().contains(tag) {
            tracing::warn!(tag = %tag, "tag is not in the current vocabulary");
        }
        directory.select_tag(tag);
    }
    if let Some(q) = query {
        directory.set_query(q);
    }

    let view = directory.view();
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &view)?;
        writeln!(out)?;
    } else {
        render_cards(&view, &mut out)?;
    }
    Ok(view.error.is_none())
}

/// `sheetdir tags`: print the active tag axis and its vocabulary.
pub async fn run_tags(config: &Config, json: bool) -> Result<bool> {
    let directory = load_directory(config).await?;
    let view = directory.view();
    let mut out = io::stdout().lock();

    if json {
        let body = serde_json::json!({
            "axis": view.axis,
            "tags": view.vocabulary,
            "error": view.error,
        });
        serde_json::to_writer_pretty(&mut out, &body)?;
        writeln!(out)?;
    } else {
        render_vocabulary(&view, &mut out)?;
    }
    Ok(view.error.is_none())
}

/// `sheetdir columns`: show which header each logical field resolved to.
pub async fn run_columns(config: &Config) -> Result<bool> {
    let loader = SourceLoader::from_config(config)?;
    let result = loader.load().await;
    let mut out = io::stdout().lock();

    let loaded = match result {
        Ok(loaded) => loaded,
        Err(e) => {
            writeln!(out, "error: {}", e)?;
            return Ok(false);
        }
    };

    let columns = Normalizer::from_config(config).resolve(&loaded.table);
    writeln!(out, "source: {} ({})", loaded.variant, loaded.url)?;
    writeln!(out, "{:<16} HEADER", "FIELD")?;
    for field in LogicalField::ALL {
        writeln!(
            out,
            "{:<16} {}",
            field.name(),
            columns.header(field).unwrap_or("-")
        )?;
    }
    Ok(true)
}
