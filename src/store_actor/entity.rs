//! [`ActorEntity`] implementation for [`Counter`].
//!
//! Counters behave like store integers: an increment or decrement on a key that was
//! never set starts from zero.

use super::actions::{CounterAction, CounterActionResult};
use super::error::StoreError;
use crate::framework::ActorEntity;
use crate::model::{Counter, CounterKey, CounterSeed, CounterUpdate};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for Counter {
    type Id = CounterKey;
    type Create = CounterSeed;
    type Update = CounterUpdate;
    type Action = CounterAction;
    type ActionResult = CounterActionResult;
    type Context = ();
    type Error = StoreError;

    fn id(&self) -> CounterKey {
        self.key
    }

    /// Builds the counter for a `SET`. Negative seeds are rejected.
    fn from_create_params(params: CounterSeed) -> Result<Self, StoreError> {
        if params.value < 0 {
            return Err(StoreError::NegativeValue {
                key: params.key,
                value: params.value,
            });
        }
        Ok(Counter::new(params.key, params.value))
    }

    fn materialize(id: &CounterKey) -> Option<Self> {
        Some(Counter::new(*id, 0))
    }

    /// Overwrites an existing counter. Seeding goes through `Create`, which upserts,
    /// so nothing in the store client routes here today.
    async fn on_update(&mut self, update: CounterUpdate, _ctx: &()) -> Result<(), StoreError> {
        if update.value < 0 {
            return Err(StoreError::NegativeValue {
                key: self.key,
                value: update.value,
            });
        }
        self.value = update.value;
        Ok(())
    }

    /// # Actions
    /// - `Increment`: adds the amount unless the result would overflow, returns the new value
    /// - `Decrement`: subtracts the amount if enough is available, returns the new value
    async fn handle_action(
        &mut self,
        action: CounterAction,
        _ctx: &(),
    ) -> Result<CounterActionResult, StoreError> {
        match action {
            CounterAction::Increment(amount) => {
                if amount < 0 {
                    return Err(StoreError::InvalidAmount(amount));
                }
                self.value = self.value.checked_add(amount).ok_or(StoreError::Overflow {
                    key: self.key,
                    value: self.value,
                    amount,
                })?;
                Ok(CounterActionResult::Increment(self.value))
            }
            CounterAction::Decrement(amount) => {
                if amount < 0 {
                    return Err(StoreError::InvalidAmount(amount));
                }
                if self.value < amount {
                    return Err(StoreError::InsufficientStock {
                        key: self.key,
                        requested: amount,
                        available: self.value,
                    });
                }
                self.value -= amount;
                Ok(CounterActionResult::Decrement(self.value))
            }
        }
    }
}
