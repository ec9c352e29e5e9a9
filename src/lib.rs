//! mangacrawl - concurrent chapter and page downloader for web comic hosts.
//!
//! A series root page lists chapter links such as
//! `Claymore, Vol.1 Chapter 3: The Slashing Witch`. Each link is parsed into a
//! [`models::ChapterIdentity`], filtered to the configured series, and its
//! page images are written to `<volume>/<chapter>[: <title>]/<index>.<ext>`
//! under the series directory.

pub mod config;
pub mod models;
pub mod scrapers;
pub mod services;
pub mod storage;
