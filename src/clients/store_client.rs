use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Counter, CounterKey, CounterSeed};
use crate::store_actor::{CounterAction, CounterActionResult, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Client for the shared counter store.
///
/// Every mutation is a single atomic request; callers never read-modify-write.
#[derive(Clone)]
pub struct StoreClient {
    inner: ResourceClient<Counter>,
}

impl StoreClient {
    pub fn new(inner: ResourceClient<Counter>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Counter> for StoreClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Counter> {
        &self.inner
    }

    /// Entity errors come back as the [`StoreError`] they were; anything else is a
    /// communication failure.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<StoreError>() {
            Some(store_error) => store_error.clone(),
            None => StoreError::ActorCommunicationError(e.to_string()),
        }
    }
}

impl StoreClient {
    /// Current value, `0` for a key that was never set.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn quantity(&self, key: CounterKey) -> Result<i64, StoreError> {
        Ok(self.get(key).await?.map(|c| c.value).unwrap_or(0))
    }

    /// Overwrite the value (`SET`).
    #[instrument(skip(self), fields(key = %key))]
    pub async fn set(&self, key: CounterKey, value: i64) -> Result<(), StoreError> {
        debug!(value, "Sending request");
        self.inner
            .create(CounterSeed { key, value })
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Add `amount`, returning the new value.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn increment(&self, key: CounterKey, amount: i64) -> Result<i64, StoreError> {
        debug!(amount, "Sending request");
        match self
            .inner
            .perform_action(key, CounterAction::Increment(amount))
            .await
            .map_err(Self::map_error)?
        {
            CounterActionResult::Increment(value) => Ok(value),
            other => Err(StoreError::ActorCommunicationError(format!(
                "Unexpected response {:?}",
                other
            ))),
        }
    }

    /// Subtract `amount`, returning the new value. Rejected if it would go negative.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn decrement(&self, key: CounterKey, amount: i64) -> Result<i64, StoreError> {
        debug!(amount, "Sending request");
        match self
            .inner
            .perform_action(key, CounterAction::Decrement(amount))
            .await
            .map_err(Self::map_error)?
        {
            CounterActionResult::Decrement(value) => Ok(value),
            other => Err(StoreError::ActorCommunicationError(format!(
                "Unexpected response {:?}",
                other
            ))),
        }
    }

    /// Subtract `amount` from every key in order, or from none of them.
    ///
    /// If one decrement fails, the ones already applied are restored and the
    /// original error is returned.
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    pub async fn decrement_all(&self, keys: &[CounterKey], amount: i64) -> Result<(), StoreError> {
        for (done, &key) in keys.iter().enumerate() {
            if let Err(e) = self.decrement(key, amount).await {
                warn!(%key, error = %e, "Decrement failed, restoring");
                for &restored in &keys[..done] {
                    self.increment(restored, amount).await?;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Every counter, ordered by key.
    pub async fn snapshot(&self) -> Result<BTreeMap<CounterKey, i64>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|c| (c.key, c.value))
            .collect())
    }

    /// Round-trip to the store actor.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.get(CounterKey::Product(0)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, expect_get, MockClient};

    #[tokio::test]
    async fn test_quantity_defaults_to_zero() {
        let mut mock = MockClient::<Counter>::new();
        mock.expect_get(CounterKey::Product(1)).return_ok(None);
        mock.expect_get(CounterKey::Product(2))
            .return_ok(Some(Counter::new(CounterKey::Product(2), 40)));

        let store = StoreClient::new(mock.client());
        assert_eq!(store.quantity(CounterKey::Product(1)).await.unwrap(), 0);
        assert_eq!(store.quantity(CounterKey::Product(2)).await.unwrap(), 40);
        mock.verify();
    }

    #[tokio::test]
    async fn test_decrement_surfaces_insufficient_stock() {
        let key = CounterKey::WarehousePart(3);
        let rejection = StoreError::InsufficientStock {
            key,
            requested: 50,
            available: 10,
        };

        let mut mock = MockClient::<Counter>::new();
        mock.expect_action(key)
            .return_err(FrameworkError::EntityError(Box::new(rejection.clone())));
        mock.expect_action(key)
            .return_ok(CounterActionResult::Decrement(0));

        let store = StoreClient::new(mock.client());
        assert_eq!(store.decrement(key, 50).await, Err(rejection));
        assert_eq!(store.decrement(key, 10).await, Ok(0));
        mock.verify();
    }

    #[tokio::test]
    async fn test_increment_sends_the_right_action() {
        let (client, mut rx) = create_mock_client::<Counter>(10);
        let store = StoreClient::new(client);
        let key = CounterKey::LinePart {
            factory: 1,
            line: 2,
            part: 5,
        };

        let handle = tokio::spawn(async move { store.increment(key, 1440).await });

        let (id, action, respond_to) = expect_action(&mut rx).await.unwrap();
        assert_eq!(id, key);
        assert_eq!(action, CounterAction::Increment(1440));
        respond_to.send(Ok(CounterActionResult::Increment(1440))).unwrap();

        assert_eq!(handle.await.unwrap(), Ok(1440));
    }

    #[tokio::test]
    async fn test_closed_store_is_a_communication_error() {
        let (client, mut rx) = create_mock_client::<Counter>(10);
        let store = StoreClient::new(client);

        let handle = tokio::spawn(async move { store.ping().await });

        // Drop the reply channel without answering
        let (id, respond_to) = expect_get(&mut rx).await.unwrap();
        assert_eq!(id, CounterKey::Product(0));
        drop(respond_to);

        assert!(matches!(
            handle.await.unwrap(),
            Err(StoreError::ActorCommunicationError(_))
        ));
    }

    #[tokio::test]
    async fn test_decrement_all_restores_applied_decrements() {
        let (client, mut rx) = create_mock_client::<Counter>(10);
        let store = StoreClient::new(client);
        let keys = [
            CounterKey::WarehousePart(0),
            CounterKey::WarehousePart(1),
            CounterKey::WarehousePart(2),
        ];
        let rejection = StoreError::InsufficientStock {
            key: keys[1],
            requested: 10,
            available: 4,
        };

        let handle = tokio::spawn(async move { store.decrement_all(&keys, 10).await });

        let (id, action, respond_to) = expect_action(&mut rx).await.unwrap();
        assert_eq!((id, action), (keys[0], CounterAction::Decrement(10)));
        respond_to.send(Ok(CounterActionResult::Decrement(0))).unwrap();

        let (id, action, respond_to) = expect_action(&mut rx).await.unwrap();
        assert_eq!((id, action), (keys[1], CounterAction::Decrement(10)));
        respond_to
            .send(Err(FrameworkError::EntityError(Box::new(rejection.clone()))))
            .unwrap();

        // Only the first key was applied, so only it comes back
        let (id, action, respond_to) = expect_action(&mut rx).await.unwrap();
        assert_eq!((id, action), (keys[0], CounterAction::Increment(10)));
        respond_to.send(Ok(CounterActionResult::Increment(10))).unwrap();

        assert_eq!(handle.await.unwrap(), Err(rejection));
        assert!(rx.try_recv().is_err());
    }
}
