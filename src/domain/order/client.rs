//! Orders sub-client: place, cancel, query.

use crate::adapter::Staged;
use crate::client::DeepBookBot;
use crate::domain::manager::ManagerRef;
use crate::domain::order::guard::assert_trading_allowed;
use crate::domain::order::LimitOrder;
use crate::domain::pool::PoolInfo;
use crate::error::SdkError;
use crate::probe::UnitsReport;
use crate::tx::DraftTransaction;

pub struct Orders<'a> {
    pub(crate) client: &'a DeepBookBot,
}

impl<'a> Orders<'a> {
    /// Stage a limit order. Refused unless trading is enabled.
    pub async fn place_limit(&self, tx: &mut DraftTransaction, order: &LimitOrder) -> Result<Staged, SdkError> {
        let config = &self.client.config;
        assert_trading_allowed(config.allow_trading, config.max_order_usd)?;
        tracing::info!(
            pool = %order.pool.key,
            manager = %order.manager.label,
            side = %order.side,
            price = %order.price,
            quantity = %order.quantity,
            client_order_id = order.client_order_id,
            "Placing limit order"
        );
        Ok(self.client.adapter.place_limit_order(tx, order).await?)
    }

    /// Stage one cancellation per id. Fails only when every id failed.
    pub async fn cancel(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
        order_ids: &[String],
    ) -> Result<UnitsReport, SdkError> {
        Ok(self
            .client
            .adapter
            .cancel_orders(tx, pool, manager, order_ids)
            .await?)
    }

    /// Ids of `manager`'s open orders in `pool`.
    pub async fn open(&self, pool: &PoolInfo, manager: &ManagerRef) -> Result<Vec<String>, SdkError> {
        Ok(self.client.adapter.open_orders(pool, manager).await?)
    }
}
