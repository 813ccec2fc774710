//! Call-number browsing.
//!
//! Call numbers are browsed over their numeric encoding, so the anchor must be a `Long`.
//! The open side of each range is then bounded by a configured offset to keep the engine
//! from scanning the whole index.

use super::{BrowseContext, BrowseContextBuilder, BrowseRequest};
use crate::{CompileError, SearchQuery};

/// Recovers call-number browse state and bounds its ranges.
pub struct CallNumberBrowseBuilder<'r> {
    /// Shape matcher shared with general browsing.
    inner: BrowseContextBuilder<'r>,
    /// Distance from the anchor at which open ranges are closed.
    range_offset: u64,
}

impl<'r> CallNumberBrowseBuilder<'r> {
    /// Creates a builder for one request.
    pub fn new(request: &'r BrowseRequest, range_offset: u64) -> Self {
        Self {
            inner: BrowseContextBuilder::new(request),
            range_offset,
        }
    }

    /// Builds the context, requiring a numeric anchor.
    pub fn build(&self, search: &SearchQuery) -> Result<BrowseContext, CompileError> {
        let context = self.inner.build(search)?;
        if context.anchor.as_long().is_none() {
            return Err(self.inner.invalid(format!(
                "call-number anchor '{}' is not numeric",
                context.anchor
            )));
        }
        Ok(context.with_range_offset(self.range_offset))
    }
}
