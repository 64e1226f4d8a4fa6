//! The bounded intent queue.

use crate::error::{ExecError, ExecResult};
use std::collections::VecDeque;
use tracing::warn;
use vigil_core::TradeIntent;

/// Outcome of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    Queued,
    /// Queue at capacity; the intent was dropped.
    QueueFull,
}

/// Bounded FIFO of trade intents awaiting submission.
#[derive(Debug)]
pub struct ExecutionQueue {
    intents: VecDeque<TradeIntent>,
    capacity: usize,
}

impl ExecutionQueue {
    pub fn new(capacity: usize) -> ExecResult<Self> {
        if capacity == 0 {
            return Err(ExecError::InvalidCapacity(capacity));
        }
        Ok(Self {
            intents: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Push an intent, dropping it when the queue is full.
    pub fn enqueue(&mut self, intent: TradeIntent) -> EnqueueResult {
        if self.intents.len() >= self.capacity {
            warn!(
                symbol = %intent.symbol,
                direction = %intent.direction,
                capacity = self.capacity,
                "execution queue full, intent dropped"
            );
            return EnqueueResult::QueueFull;
        }
        self.intents.push_back(intent);
        EnqueueResult::Queued
    }

    /// Pop all queued intents in FIFO order.
    pub fn drain(&mut self) -> Vec<TradeIntent> {
        self.intents.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
