use std::time::Duration;

use alloy::providers::{DynProvider, Provider};
use anyhow::{Context, Result};
use log::{info, warn};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::EventSettings,
    events::{
        filters::TypedEventFilter,
        parser::{decode_logs, ContractEvent, DecodedEvent},
        query::fetch_logs,
    },
};

/// Capacity of the channel between the polling task and its consumer
const CHANNEL_CAPACITY: usize = 256;

/// What a single poll did to the cursor.
enum PollOutcome {
    /// Nothing new below the safe head
    Idle,
    /// Everything up to the safe head was delivered; the value is the next block to read
    Advanced(u64),
    /// The receiver went away while events were being delivered
    Closed,
}

/// Polls the node for new logs matching a filter and forwards the decoded
/// events over a channel.
///
/// Without an explicit start block only events mined after the first
/// successful poll are delivered. The watcher stays `confirmations` blocks
/// behind the head.
pub struct EventWatcher<E> {
    provider: DynProvider,
    filter: TypedEventFilter<E>,
    poll_interval: Duration,
    settings: EventSettings,
    start_block: Option<u64>,
}

impl<E: ContractEvent> EventWatcher<E> {
    pub fn new(
        provider: DynProvider,
        filter: TypedEventFilter<E>,
        settings: &EventSettings,
    ) -> Self {
        Self {
            provider,
            filter,
            poll_interval: Duration::from_millis(settings.poll_interval_milliseconds),
            settings: settings.clone(),
            start_block: None,
        }
    }

    /// Replay from `block` before following the head.
    pub fn from_block(mut self, block: u64) -> Self {
        self.start_block = Some(block);
        self
    }

    /// Run the watcher on its own task.
    pub fn spawn(
        self,
        cancellation_token: CancellationToken,
    ) -> (mpsc::Receiver<DecodedEvent<E>>, JoinHandle<Result<()>>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(self.run(sender, cancellation_token));
        (receiver, handle)
    }

    /// Wait for the first matching event, then stop.
    pub async fn once(
        self,
        cancellation_token: &CancellationToken,
    ) -> Result<Option<DecodedEvent<E>>> {
        let token = cancellation_token.child_token();
        let (mut receiver, handle) = self.spawn(token.clone());

        let event = receiver.recv().await;
        token.cancel();
        drop(receiver);

        handle.await.context("Event watcher task panicked")??;
        Ok(event)
    }

    async fn safe_head(&self) -> Result<u64> {
        let head = self
            .provider
            .get_block_number()
            .await
            .context("Failed to fetch block number")?;
        Ok(head.saturating_sub(self.settings.confirmations))
    }

    async fn poll(
        &self,
        next_block: Option<u64>,
        sender: &mpsc::Sender<DecodedEvent<E>>,
    ) -> Result<PollOutcome> {
        let head = self.safe_head().await?;

        let Some(from) = next_block else {
            info!("Event watcher started at block {}", head + 1);
            return Ok(PollOutcome::Advanced(head + 1));
        };

        if head < from {
            return Ok(PollOutcome::Idle);
        }

        let logs = fetch_logs(&self.provider, &self.filter, from, head, &self.settings).await?;

        for event in decode_logs::<E>(&logs) {
            if sender.send(event).await.is_err() {
                return Ok(PollOutcome::Closed);
            }
        }

        Ok(PollOutcome::Advanced(head + 1))
    }

    /// Poll until cancelled or until the receiving side hangs up.
    ///
    /// A failed poll, including the very first one, is logged and retried on
    /// the next tick without moving the cursor.
    pub async fn run(
        self,
        sender: mpsc::Sender<DecodedEvent<E>>,
        cancellation_token: CancellationToken,
    ) -> Result<()> {
        let mut next_block = self.start_block;
        if let Some(block) = next_block {
            info!("Event watcher replaying from block {}", block);
        }

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Event watcher received cancellation signal");
                    break;
                }
                _ = sender.closed() => {
                    info!("Event watcher receiver dropped");
                    break;
                }
                _ = ticker.tick() => {}
            }

            // Cancellation also interrupts a poll blocked on the node or on a full channel
            let outcome = tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Event watcher received cancellation signal");
                    break;
                }
                outcome = self.poll(next_block, &sender) => outcome,
            };

            match outcome {
                Ok(PollOutcome::Idle) => {},
                Ok(PollOutcome::Advanced(block)) => next_block = Some(block),
                Ok(PollOutcome::Closed) => {
                    info!("Event watcher receiver dropped");
                    break;
                },
                Err(e) => warn!("Event watcher: {:#}. Retrying next poll.", e),
            }
        }

        match next_block {
            Some(block) => info!("Event watcher stopped at block {}", block),
            None => info!("Event watcher stopped before its first poll succeeded"),
        }
        Ok(())
    }
}
