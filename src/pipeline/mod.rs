//! Pipeline stages of one submission.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ upload ──▶ poll ──▶ render
//! (name)    (POST)     (GET×N)  (panel / HTML)
//! ```
//!
//! 1. [`input`]  — the named file handle and the `matches.json` check
//! 2. [`upload`] — one multipart POST, acknowledged by `{"success": …}`
//! 3. [`poll`]   — bounded fixed-interval GET loop for the results document
//! 4. [`render`] — resolve plot URLs against the API base, build panel items

pub mod input;
pub mod poll;
pub mod render;
pub mod upload;
