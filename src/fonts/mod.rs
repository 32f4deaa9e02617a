//! Fonts Module
//!
//! Font catalog providers, their on-disk snapshots and licenses, the parsed
//! font cache and preview rendering.

mod font_cache;
mod google;
pub mod license;
pub mod preview;
mod provider;
pub mod snapshot;
mod types;
mod variants;

pub use font_cache::{FontCache, LoadedFont};
pub use google::GoogleFontsProvider;
pub use preview::{PreviewSize, ResultType};
pub use provider::{FamilyCache, FontProvider};
pub use types::{
    path_safe_name, FamilyAndVariant, FontFamily, FontFilters, FontOrder, FontSelector,
    FontVariant, PreviewLinks, DEFAULT_VARIANT,
};
pub use variants::sort_variants;

#[cfg(test)]
pub(crate) use types::fixtures;
