//! Listing pages and the LIMIT/OFFSET windows they select.

use serde::{Deserialize, Serialize};

/// Largest OFFSET PostgreSQL accepts (`bigint`)
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-indexed page of `size` rows.
///
/// The row window is derived on demand, so capping the size always happens
/// before the offset is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    /// Page `number` of `size` rows; page 0 is read as the first page
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size,
        }
    }

    pub fn capped(self, max_size: u32) -> Self {
        Self {
            number: self.number,
            size: self.size.min(max_size),
        }
    }

    /// Rows skipped before this page, clamped to what PostgreSQL accepts
    pub fn offset(&self) -> u64 {
        let skipped = u64::from(self.number.saturating_sub(1)) * u64::from(self.size);
        skipped.min(MAX_OFFSET)
    }

    pub fn window(&self) -> Pagination {
        Pagination {
            limit: Some(self.size),
            offset: Some(self.offset()),
        }
    }
}

/// LIMIT/OFFSET window appended to a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn to_sql(&self) -> String {
        let limit = self.limit.map(|limit| format!(" LIMIT {limit}"));
        let offset = self.offset.map(|offset| format!(" OFFSET {offset}"));
        [limit, offset].into_iter().flatten().collect()
    }
}
