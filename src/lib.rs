//! # Sheet Directory
//!
//! A searchable, filterable directory built from a spreadsheet published to
//! the web.
//!
//! Sheet Directory fetches the sheet (as an HTML table export or as CSV, with
//! ordered fallbacks), maps whatever column names the current revision uses
//! onto a fixed set of logical fields, normalizes every row into a
//! display-ready card, and filters the cards by tag and free-text search. A
//! small relay service lets browser clients fetch the sheet cross-origin.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ SourceLoader │──▶│   Columns    │──▶│  Normalizer  │──▶│ Filter/Search│
//! │ html → csv   │   │  resolver    │   │ CanonicalRow │   │  TagAxis     │
//! └──────┬───────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!        │ via                                                    ▼
//!  ┌─────▼─────┐                                          ┌──────────────┐
//!  │   Relay   │                                          │  Directory   │
//!  │  /proxy   │                                          │ view + render│
//!  └───────────┘                                          └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sheetdir serve relay                      # start the relay
//! sheetdir list                             # load and print every card
//! sheetdir list --tag Art --query nft       # filter and search
//! sheetdir tags                             # show the filter vocabulary
//! sheetdir columns                          # show which header fed each field
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Raw and canonical row types |
//! | [`slug`] | Slug normalization |
//! | [`columns`] | Header → logical field resolution |
//! | [`csv`] | Delimited-text parsing |
//! | [`html_table`] | HTML table scraping |
//! | [`normalize`] | Row normalization and fallbacks |
//! | [`loader`] | Ordered multi-source fetching |
//! | [`filter`] | Tag vocabulary, selection and search |
//! | [`directory`] | Directory state and load lifecycle |
//! | [`render`] | Terminal card rendering |
//! | [`server`] | Pass-through relay HTTP server |
//! | [`commands`] | CLI command implementations |
//! | [`logging`] | `tracing` subscriber setup |

pub mod columns;
pub mod commands;
pub mod config;
pub mod csv;
pub mod directory;
pub mod filter;
pub mod html_table;
pub mod loader;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod render;
pub mod server;
pub mod slug;
