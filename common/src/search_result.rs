use serde::{Deserialize, Serialize};


/// One page of rows plus the number of records matching the filters,
/// independent of the requested page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<R> {
    pub rows: Vec<R>,
    pub total_count: u64,
}

impl<R> ResultPage<R> {
    pub fn new(rows: Vec<R>, total_count: u64) -> Self {
        Self { rows, total_count }
    }

    pub fn empty() -> Self {
        Self { rows: Vec::new(), total_count: 0 }
    }
}

impl<R> Default for ResultPage<R> {
    fn default() -> Self {
        Self::empty()
    }
}
