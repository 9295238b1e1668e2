//! Search query language
//!
//! Search text is parsed into a [`Query`] by [`parse`] and evaluated per
//! gallery by [`matches`]. The language is deliberately small:
//!
//! - plain words: `love drama`
//! - quoted phrases, joined with underscores: `"war zone"` → `war_zone`
//! - negated terms: `-action`, `-"bad ending"`, `"-horror"`
//! - one rating constraint: `rating:>=4`, `rating:=3`, `rating:!=2.5`
//!
//! Malformed input never fails; it just yields a looser query.

pub mod matcher;
pub mod parser;
pub mod types;

pub use matcher::{GalleryFilterExt, GalleryTokens, matches};
pub use parser::parse;
pub use types::{Comparator, Query, RatingFilter};
