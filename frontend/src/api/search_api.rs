//! The query service seam between the listing engine and the data store.

use std::future::Future;

use common::{search_query::QueryDescriptor, search_result::ResultPage};

/// Anything that can answer a [`QueryDescriptor`] with one page of rows and
/// the total match count. Calls are read-only and may overlap freely.
pub trait QueryService: Send + Sync + 'static {
    type Row: Clone + Send + Sync + 'static;

    fn count_and_fetch(&self, query: QueryDescriptor) -> impl Future<Output = anyhow::Result<ResultPage<Self::Row>>> + Send;
}

#[cfg(feature = "server")]
pub use server::{ClickhouseQueryService, listing_changes};

#[cfg(feature = "server")]
mod server {
    use std::{future::Future, time::Duration};

    use backend::api::search::DirectoryRecord;
    use common::{listing_schema::ListingSchema, search_query::QueryDescriptor, search_result::ResultPage};
    use futures_util::stream::Stream;

    use super::QueryService;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct ClickhouseQueryService;

    impl QueryService for ClickhouseQueryService {
        type Row = DirectoryRecord;

        fn count_and_fetch(&self, query: QueryDescriptor) -> impl Future<Output = anyhow::Result<ResultPage<DirectoryRecord>>> + Send {
            backend::api::search::count_and_fetch(query)
        }
    }

    /// Change notifications for the schema's table, for [`crate::listing::DirectoryListing::watch_changes`].
    pub fn listing_changes(schema: &ListingSchema, period: Duration) -> impl Stream<Item = ()> + Send + use<> {
        backend::api::search::poll_table_changes(schema.table.clone(), schema.id_column.clone(), period)
    }
}
