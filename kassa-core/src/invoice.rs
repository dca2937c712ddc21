//! Invoice id allocation.
//!
//! The gateway identifies a payment attempt by a positive integer that
//! must fit a signed 32-bit field. Ids are drawn uniformly at random from
//! the full range and pre-checked against the store; the draw loop is
//! bounded and collision on every attempt is a reported failure, never a
//! silent reuse and never an unbounded retry.
//!
//! The pre-check is advisory: two concurrent allocations can both pass it
//! for the same id. The UNIQUE constraint enforced at insert time is the
//! actual collision guarantee, and an insert-time violation triggers
//! re-allocation in the caller.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::store::{OrderStore, StoreError};

/// Smallest invoice id handed to the gateway.
pub const INVOICE_ID_MIN: i64 = 100_000;
/// Largest invoice id the gateway's 32-bit field accepts.
pub const INVOICE_ID_MAX: i64 = i32::MAX as i64;
/// Draw attempts before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Errors produced by invoice allocation.
#[derive(Debug, thiserror::Error)]
pub enum AllocateError {
    /// Every drawn candidate already existed. Astronomically rare at
    /// realistic order volumes given the width of the id range.
    #[error("no free invoice id after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Draws random invoice ids that do not yet exist in the store.
#[derive(Debug, Clone)]
pub struct InvoiceAllocator {
    range: RangeInclusive<i64>,
    max_attempts: u32,
}

impl Default for InvoiceAllocator {
    fn default() -> Self {
        Self {
            range: INVOICE_ID_MIN..=INVOICE_ID_MAX,
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }
}

impl InvoiceAllocator {
    /// Allocator over a custom range, for tests and tooling.
    pub fn with_range(range: RangeInclusive<i64>, max_attempts: u32) -> Self {
        Self {
            range,
            max_attempts,
        }
    }

    /// Draw an invoice id that is free in `store` at the time of the
    /// check.
    pub async fn allocate<S: OrderStore>(&self, store: &S) -> Result<i64, AllocateError> {
        for _ in 0..self.max_attempts {
            let candidate = rand::rng().random_range(self.range.clone());
            if !store.invoice_id_exists(candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AllocateError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}
