//! Managers sub-client: create, fund, register and inspect balance managers,
//! and register pools for them.

use crate::adapter::Staged;
use crate::chain::ObjectSummary;
use crate::client::DeepBookBot;
use crate::domain::manager::ManagerRef;
use crate::domain::pool::{CoinInfo, PoolInfo};
use crate::error::SdkError;
use crate::tx::DraftTransaction;

use rust_decimal::Decimal;

/// Sub-client for balance manager operations.
pub struct Managers<'a> {
    pub(crate) client: &'a DeepBookBot,
}

impl<'a> Managers<'a> {
    /// Resolve a label or raw id through the configured mapping.
    pub fn resolve(&self, label_or_id: &str) -> Result<ManagerRef, SdkError> {
        self.client
            .config
            .managers
            .resolve(label_or_id)
            .ok_or_else(|| SdkError::Validation(format!("Unknown balance manager {}", label_or_id)))
    }

    /// The manager this run acts on.
    pub fn configured(&self) -> Result<ManagerRef, SdkError> {
        self.client.config.require_manager()
    }

    pub async fn create(&self, tx: &mut DraftTransaction) -> Result<Staged, SdkError> {
        Ok(self.client.adapter.create_balance_manager(tx).await?)
    }

    pub async fn deposit(
        &self,
        tx: &mut DraftTransaction,
        manager: &ManagerRef,
        coin: &CoinInfo,
        amount: Decimal,
    ) -> Result<Staged, SdkError> {
        Ok(self.client.adapter.deposit(tx, manager, coin, amount).await?)
    }

    pub async fn register(&self, tx: &mut DraftTransaction, manager: &ManagerRef) -> Result<Staged, SdkError> {
        Ok(self.client.adapter.register_balance_manager(tx, manager).await?)
    }

    pub async fn register_pool(
        &self,
        tx: &mut DraftTransaction,
        pool: &PoolInfo,
        manager: &ManagerRef,
    ) -> Result<Staged, SdkError> {
        Ok(self.client.adapter.register_pool(tx, pool, manager).await?)
    }

    /// Balance of `coin` held by `manager`, in human units.
    pub async fn balance(&self, manager: &ManagerRef, coin: &CoinInfo) -> Result<Decimal, SdkError> {
        Ok(self.client.adapter.manager_balance(manager, coin).await?)
    }

    /// Object type and owner of `manager`. A missing object is an error.
    pub async fn inspect(&self, manager: &ManagerRef) -> Result<ObjectSummary, SdkError> {
        self.client
            .chain
            .get_object(&manager.id)
            .await?
            .ok_or_else(|| {
                SdkError::Validation(format!(
                    "Balance manager {} ({}) not found",
                    manager.label, manager.id
                ))
            })
    }
}
