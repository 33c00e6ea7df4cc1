//! El País opinion-section scraping, one step per module.
//!
//! | Step | Module | Failure mode |
//! |------|--------|--------------|
//! | Open site, accept cookies, go to `/opinion` | [`navigator`] | page-load errors propagate |
//! | Collect today's/yesterday's article links | [`links`] | empty list on any failure |
//! | Extract title, paragraphs, image | [`article`] | `None` on any failure |
//!
//! All steps drive a [`crate::browser::PageSession`] and use the selectors in
//! [`crate::config::Selectors`].

pub mod article;
pub mod links;
pub mod navigator;
