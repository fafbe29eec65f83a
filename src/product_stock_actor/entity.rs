use super::error::ProductStockError;
use crate::bus::{Channel, LineAddress, Message};
use crate::clients::NodeContext;
use crate::framework::Node;
use crate::model::{AuditKey, CounterKey};
use crate::store_actor::StoreError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument, warn};

/// Outcome of one day of customer demand, per product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySales {
    /// Units sold; zero where the sale was lost.
    pub sold: Vec<i64>,
    /// Products whose demand could not be met.
    pub lost: Vec<usize>,
}

/// Finished-goods stock. Counters live under `product:<i>`.
pub struct ProductStock {
    num_products: usize,
    min_demand: i64,
    max_demand: i64,
    rng: StdRng,
}

impl ProductStock {
    /// Demand is drawn uniformly from `min_demand..=max_demand`. A fixed `seed` makes
    /// the sequence reproducible.
    pub fn new(num_products: usize, min_demand: i64, max_demand: i64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            num_products,
            min_demand: min_demand.min(max_demand),
            max_demand: max_demand.max(min_demand),
            rng,
        }
    }

    /// Add a line's output to stock. No upper bound.
    #[instrument(skip(self, ctx), fields(line = %from))]
    pub async fn receive_products(
        &mut self,
        product: usize,
        from: LineAddress,
        quantity: i64,
        ctx: &NodeContext,
    ) -> Result<i64, ProductStockError> {
        if product >= self.num_products {
            return Err(ProductStockError::UnknownProduct(product));
        }
        let stock = ctx.store.increment(CounterKey::Product(product), quantity).await?;
        info!(product, quantity, stock, "Products received");
        Ok(stock)
    }

    /// One demand figure per product.
    pub fn draw_demand(&mut self) -> Vec<i64> {
        (0..self.num_products)
            .map(|_| self.rng.gen_range(self.min_demand..=self.max_demand))
            .collect()
    }

    /// Serve each product's demand in full or not at all. No partial fills and no
    /// backorders: a short product is a lost sale.
    #[instrument(skip(self, ctx))]
    pub async fn process_demand(
        &mut self,
        demand: &[i64],
        ctx: &NodeContext,
    ) -> Result<DailySales, ProductStockError> {
        let mut sales = DailySales {
            sold: vec![0; demand.len()],
            lost: Vec::new(),
        };

        for (product, &wanted) in demand.iter().enumerate() {
            match ctx.store.decrement(CounterKey::Product(product), wanted).await {
                Ok(_) => {
                    sales.sold[product] = wanted;
                    ctx.audit
                        .push(
                            AuditKey::Consumption,
                            format!("Customer consumed {} units of P{}", wanted, product + 1),
                        )
                        .await?;
                    info!(product, wanted, "Sale");
                }
                Err(StoreError::InsufficientStock { available, .. }) => {
                    sales.lost.push(product);
                    ctx.audit
                        .push(
                            AuditKey::LostSales,
                            format!(
                                "Order of {} units of P{} lost, stock {}",
                                wanted,
                                product + 1,
                                available
                            ),
                        )
                        .await?;
                    warn!(product, wanted, available, "Lost sale");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(sales)
    }

    /// Read the current stock of every product and broadcast it to the factories.
    pub async fn publish_stock_status(&self, ctx: &NodeContext) -> Result<Vec<i64>, ProductStockError> {
        let mut stock = Vec::with_capacity(self.num_products);
        for product in 0..self.num_products {
            stock.push(ctx.store.quantity(CounterKey::Product(product)).await?);
        }
        ctx.bus.publish(&Message::StockStatus {
            stock: stock.clone(),
        });
        info!(?stock, "Stock status sent to factories");
        Ok(stock)
    }

    /// The daily duty: draw demand, serve it, then publish the post-sale stock.
    pub async fn simulate_daily_customer_orders(
        &mut self,
        ctx: &NodeContext,
    ) -> Result<DailySales, ProductStockError> {
        let demand = self.draw_demand();
        let sales = self.process_demand(&demand, ctx).await?;
        self.publish_stock_status(ctx).await?;
        Ok(sales)
    }
}

#[async_trait]
impl Node for ProductStock {
    type Context = NodeContext;
    type Error = ProductStockError;

    fn name(&self) -> String {
        "product-stock".to_string()
    }

    fn channel(&self) -> Channel {
        Channel::ProductStock
    }

    async fn handle_message(&mut self, message: Message, ctx: &NodeContext) -> Result<(), ProductStockError> {
        if let Message::ProductsDelivered {
            product,
            from,
            quantity,
        } = message
        {
            self.receive_products(product, from, quantity, ctx).await?;
        }
        Ok(())
    }

    async fn on_day(&mut self, _day: u32, ctx: &NodeContext) -> Result<(), ProductStockError> {
        self.simulate_daily_customer_orders(ctx).await.map(|_| ())
    }
}
