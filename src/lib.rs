//! # ruffle-patch
//!
//! Batch-inject the [Ruffle] Flash emulator loader into legacy HTML sites.
//!
//! Old sites embed SWF content with `<object>`/`<embed>` tags that modern
//! browsers no longer render. Ruffle's JavaScript polyfill swaps those tags
//! for its own player at page load, so the only change a site needs is one
//! `<script>` reference per page. This crate sweeps a directory tree and
//! splices that reference into every HTML/HTM file that lacks it.
//!
//! ## Guarantees
//!
//! - **Idempotent**: a page already referencing Ruffle is left untouched,
//!   so the sweep can be re-run over the same tree safely.
//! - **Encoding-preserving**: pages are decoded with the charset they
//!   declare (windows-1251 trees are common) and written back in that same
//!   encoding, byte-exact outside the inserted fragment.
//!
//! ## Insertion point
//!
//! The fragment lands immediately before the first `</head>`, else before
//! the first `</body>`, else at the very start of the file.
//!
//! ## Example
//!
//! ```rust
//! use ruffle_patch::{inject, PatchResult, RUFFLE_SCRIPT};
//!
//! let page = "<html><head></head><body></body></html>";
//! match inject(page) {
//!     PatchResult::Patched(text) => assert!(text.contains(RUFFLE_SCRIPT)),
//!     PatchResult::Unchanged => unreachable!(),
//! }
//! ```
//!
//! [Ruffle]: https://ruffle.rs

pub mod encoding;
pub mod inject;
#[cfg(feature = "walkdir")]
pub mod patcher;

pub use encoding::{resolve, CharsetHint, EncodeError, TextEncoding};
pub use inject::{already_patched, inject, PatchResult, RUFFLE_SCRIPT};
#[cfg(feature = "walkdir")]
pub use patcher::{patch_file, run, FileOutcome, PatchOptions, PatchStats, IGNORE_DIRS};
