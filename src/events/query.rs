use alloy::{
    providers::{DynProvider, Provider},
    rpc::types::Log,
};
use anyhow::{Context, Result};
use futures::{stream, StreamExt, TryStreamExt};
use log::debug;

use crate::{
    config::EventSettings,
    events::{filters::TypedEventFilter, parser::ContractEvent},
    utils::block_ranges,
};

/// Fetch every log matching `filter` in `[from, to]`, split into chunks of at
/// most `max_block_range` blocks. Logs come back in block order.
pub async fn fetch_logs<E: ContractEvent>(
    provider: &DynProvider,
    filter: &TypedEventFilter<E>,
    from: u64,
    to: u64,
    settings: &EventSettings,
) -> Result<Vec<Log>> {
    let ranges = block_ranges(from, to, settings.max_block_range);
    debug!(
        "Fetching logs for blocks {}..={} in {} chunk(s)",
        from,
        to,
        ranges.len()
    );

    let chunks: Vec<Vec<Log>> = stream::iter(ranges)
        .map(|(start, end)| {
            let chunk_filter = filter.between(start, end);
            async move {
                provider
                    .get_logs(&chunk_filter)
                    .await
                    .with_context(|| format!("Failed to fetch logs for blocks {start}..={end}"))
            }
        })
        .buffered(settings.query_concurrency.max(1))
        .try_collect()
        .await?;

    Ok(chunks.into_iter().flatten().collect())
}
