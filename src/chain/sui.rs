//! [`ChainClient`] over the Sui JSON-RPC SDK.
//!
//! Drafts are compiled into a programmable transaction at submission time:
//! shared objects get their initial shared version from the node, owned
//! objects their current reference, and `CoinWithBalance` steps are satisfied
//! from the sender's coins (merged, then split to the exact amount).

use super::keys::{address_of, parse_keypair, to_object_id};
use super::{with_deadline, ChainClient, CoinSummary, InspectResults, ObjectSummary};
use crate::domain::pool::SUI_COIN_TYPE;
use crate::error::ChainError;
use crate::network::CLOCK_OBJECT_ID;
use crate::shared::ObjectIdStr;
use crate::tx::{DraftTransaction, Input, ObjectKind, PureArg, Step};

use async_trait::async_trait;
use move_core_types::language_storage::TypeTag;
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use sui_json_rpc_types::{Coin, SuiObjectDataOptions, SuiTransactionBlockResponseOptions};
use sui_sdk::{SuiClient, SuiClientBuilder};
use sui_types::base_types::{ObjectID, ObjectRef, SequenceNumber, SuiAddress};
use sui_types::crypto::SuiKeyPair;
use sui_types::digests::TransactionDigest;
use sui_types::object::Owner;
use sui_types::programmable_transaction_builder::ProgrammableTransactionBuilder;
use sui_types::quorum_driver_types::ExecuteTransactionRequestType;
use sui_types::transaction::{
    Argument, CallArg, Command, ObjectArg, ProgrammableMoveCall, ProgrammableTransaction,
    SharedObjectMutability, Transaction, TransactionData, TransactionKind,
};
use sui_types::type_input::TypeInput;

/// Coins fetched per `get_coins` page.
const COIN_PAGE: usize = 50;

fn rpc(e: impl std::fmt::Display) -> ChainError {
    ChainError::Rpc(e.to_string())
}

fn build(e: impl std::fmt::Display) -> ChainError {
    ChainError::Build(e.to_string())
}

fn object_id(id: &ObjectIdStr) -> Result<ObjectID, ChainError> {
    ObjectID::from_str(id.as_str()).map_err(|e| ChainError::InvalidId {
        value: id.to_string(),
        reason: e.to_string(),
    })
}

fn sui_address(id: &ObjectIdStr) -> Result<SuiAddress, ChainError> {
    SuiAddress::from_str(id.as_str()).map_err(|e| ChainError::InvalidId {
        value: id.to_string(),
        reason: e.to_string(),
    })
}

fn is_sui(coin_type: &str) -> bool {
    coin_type == SUI_COIN_TYPE
        || TypeTag::from_str(coin_type)
            .ok()
            .zip(TypeTag::from_str(SUI_COIN_TYPE).ok())
            .is_some_and(|(a, b)| a == b)
}

fn command_index(arg: Argument) -> Result<usize, ChainError> {
    match arg {
        Argument::Result(i) | Argument::NestedResult(i, _) => Ok(i as usize),
        other => Err(build(format!("expected a command result, got {:?}", other))),
    }
}

/// A compiled draft plus, for each draft step, the index of the command whose
/// results belong to it.
struct Compiled {
    pt: ProgrammableTransaction,
    step_commands: Vec<usize>,
}

pub struct SuiChain {
    client: SuiClient,
    keypair: SuiKeyPair,
    address: SuiAddress,
    address_id: ObjectIdStr,
    gas_budget: u64,
    timeout: Duration,
}

impl SuiChain {
    /// Decode the key and connect to `rpc_url`.
    pub async fn connect(
        rpc_url: &str,
        private_key: &str,
        gas_budget: u64,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let keypair = parse_keypair(private_key)?;
        let address = address_of(&keypair);
        let address_id = to_object_id(&address)?;

        let client = with_deadline("connect", timeout, async {
            SuiClientBuilder::default()
                .request_timeout(timeout)
                .build(rpc_url)
                .await
                .map_err(rpc)
        })
        .await?;

        tracing::info!(address = %address_id, rpc_url, "Connected to fullnode");
        Ok(Self {
            client,
            keypair,
            address,
            address_id,
            gas_budget,
            timeout,
        })
    }

    // ── Compilation ──────────────────────────────────────────────────────

    async fn compile(&self, draft: &DraftTransaction) -> Result<Compiled, ChainError> {
        let mut ptb = ProgrammableTransactionBuilder::new();
        let mut shared_versions: HashMap<ObjectID, SequenceNumber> = HashMap::new();
        let mut outputs: Vec<Argument> = Vec::with_capacity(draft.len());

        for step in draft.steps() {
            let output = match step {
                Step::MoveCall(call) => {
                    let mut arguments = Vec::with_capacity(call.args.len());
                    for input in &call.args {
                        arguments.push(
                            self.argument(&mut ptb, &mut shared_versions, &outputs, input)
                                .await?,
                        );
                    }
                    let type_arguments = call
                        .type_args
                        .iter()
                        .map(|t| {
                            TypeTag::from_str(t)
                                .map(TypeInput::from)
                                .map_err(|e| build(format!("type tag {}: {}", t, e)))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    ptb.command(Command::MoveCall(Box::new(ProgrammableMoveCall {
                        package: object_id(&call.package)?,
                        module: call.module.clone(),
                        function: call.function.clone(),
                        type_arguments,
                        arguments,
                    })))
                }
                Step::SplitCoins { coin, amounts } => {
                    let coin = self
                        .argument(&mut ptb, &mut shared_versions, &outputs, coin)
                        .await?;
                    let amounts = amounts
                        .iter()
                        .map(|a| pure(&mut ptb, &PureArg::U64(*a)))
                        .collect::<Result<Vec<_>, _>>()?;
                    ptb.command(Command::SplitCoins(coin, amounts))
                }
                Step::CoinWithBalance { coin_type, amount } => {
                    self.coin_with_balance(&mut ptb, coin_type, *amount).await?
                }
            };
            outputs.push(output);
        }

        let step_commands = outputs
            .iter()
            .map(|a| command_index(*a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Compiled {
            pt: ptb.finish(),
            step_commands,
        })
    }

    async fn argument(
        &self,
        ptb: &mut ProgrammableTransactionBuilder,
        shared_versions: &mut HashMap<ObjectID, SequenceNumber>,
        outputs: &[Argument],
        input: &Input,
    ) -> Result<Argument, ChainError> {
        let output = |i: usize| {
            outputs
                .get(i)
                .copied()
                .ok_or_else(|| build(format!("reference to step {} before it exists", i)))
        };

        match input {
            Input::Gas => Ok(Argument::GasCoin),
            Input::Result(i) => output(*i),
            Input::NestedResult(i, j) => match output(*i)? {
                Argument::Result(k) => Ok(Argument::NestedResult(k, *j as u16)),
                nested @ Argument::NestedResult(_, 0) if *j == 0 => Ok(nested),
                other => Err(build(format!("step {} output {:?} has no element {}", i, other, j))),
            },
            Input::Pure(value) => pure(ptb, value),
            Input::Object { id, kind } => {
                let oid = object_id(id)?;
                let call_arg = match kind {
                    ObjectKind::Owned => {
                        CallArg::Object(ObjectArg::ImmOrOwnedObject(self.object_ref(oid).await?))
                    }
                    ObjectKind::Shared { mutable } => {
                        let initial_shared_version = match shared_versions.get(&oid) {
                            Some(v) => *v,
                            None => {
                                let v = self.initial_shared_version(id, oid).await?;
                                shared_versions.insert(oid, v);
                                v
                            }
                        };
                        CallArg::Object(ObjectArg::SharedObject {
                            id: oid,
                            initial_shared_version,
                            mutability: if *mutable {
                                SharedObjectMutability::Mutable
                            } else {
                                SharedObjectMutability::Immutable
                            },
                        })
                    }
                };
                ptb.input(call_arg).map_err(build)
            }
        }
    }

    async fn initial_shared_version(
        &self,
        id: &ObjectIdStr,
        oid: ObjectID,
    ) -> Result<SequenceNumber, ChainError> {
        // The clock was created at genesis.
        if ObjectIdStr::parse(CLOCK_OBJECT_ID).is_ok_and(|clock| &clock == id) {
            return Ok(SequenceNumber::from_u64(1));
        }
        let summary = self
            .get_object(id)
            .await?
            .ok_or_else(|| ChainError::ObjectNotFound(oid.to_string()))?;
        summary
            .shared_version
            .map(SequenceNumber::from_u64)
            .ok_or_else(|| ChainError::NotShared(oid.to_string()))
    }

    async fn object_ref(&self, oid: ObjectID) -> Result<ObjectRef, ChainError> {
        let resp = with_deadline("get_object", self.timeout, async {
            self.client
                .read_api()
                .get_object_with_options(oid, SuiObjectDataOptions::new().with_owner())
                .await
                .map_err(rpc)
        })
        .await?;
        resp.data
            .map(|data| data.object_ref())
            .ok_or_else(|| ChainError::ObjectNotFound(oid.to_string()))
    }

    async fn coins(&self, coin_type: &str) -> Result<Vec<Coin>, ChainError> {
        let page = with_deadline("get_coins", self.timeout, async {
            self.client
                .coin_read_api()
                .get_coins(self.address, Some(coin_type.to_string()), None, Some(COIN_PAGE))
                .await
                .map_err(rpc)
        })
        .await?;
        Ok(page.data)
    }

    /// Merge enough of the sender's `coin_type` coins and split off `amount`.
    async fn coin_with_balance(
        &self,
        ptb: &mut ProgrammableTransactionBuilder,
        coin_type: &str,
        amount: u64,
    ) -> Result<Argument, ChainError> {
        let amount_arg = pure(ptb, &PureArg::U64(amount))?;
        if is_sui(coin_type) {
            let split = ptb.command(Command::SplitCoins(Argument::GasCoin, vec![amount_arg]));
            return Ok(Argument::NestedResult(command_index(split)? as u16, 0));
        }

        let mut coins = self.coins(coin_type).await?;
        if coins.is_empty() {
            return Err(ChainError::NoCoins {
                owner: self.address_id.to_string(),
                coin_type: coin_type.to_string(),
            });
        }
        coins.sort_by(|a, b| b.balance.cmp(&a.balance));

        let mut selected = Vec::new();
        let mut total = 0u64;
        for coin in coins {
            if total >= amount {
                break;
            }
            total = total.saturating_add(coin.balance);
            selected.push(coin.object_ref());
        }
        if total < amount {
            return Err(ChainError::InsufficientBalance {
                coin_type: coin_type.to_string(),
                needed: amount,
                available: total,
            });
        }

        let mut refs = selected.into_iter();
        let primary_ref = refs
            .next()
            .ok_or_else(|| build("coin selection came back empty"))?;
        let primary = ptb
            .input(CallArg::Object(ObjectArg::ImmOrOwnedObject(primary_ref)))
            .map_err(build)?;
        let rest = refs
            .map(|r| {
                ptb.input(CallArg::Object(ObjectArg::ImmOrOwnedObject(r)))
                    .map_err(build)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !rest.is_empty() {
            ptb.command(Command::MergeCoins(primary, rest));
        }
        let split = ptb.command(Command::SplitCoins(primary, vec![amount_arg]));
        Ok(Argument::NestedResult(command_index(split)? as u16, 0))
    }

    /// The sender's largest SUI coin.
    async fn gas_coin(&self) -> Result<ObjectRef, ChainError> {
        self.coins(SUI_COIN_TYPE)
            .await?
            .into_iter()
            .max_by_key(|c| c.balance)
            .map(|c| c.object_ref())
            .ok_or_else(|| ChainError::NoCoins {
                owner: self.address_id.to_string(),
                coin_type: SUI_COIN_TYPE.to_string(),
            })
    }
}

fn pure(ptb: &mut ProgrammableTransactionBuilder, value: &PureArg) -> Result<Argument, ChainError> {
    let bytes = match value {
        PureArg::U8(v) => bcs::to_bytes(v),
        PureArg::U64(v) => bcs::to_bytes(v),
        PureArg::U128(v) => bcs::to_bytes(v),
        PureArg::Bool(v) => bcs::to_bytes(v),
        PureArg::Address(id) => bcs::to_bytes(&sui_address(id)?),
    }
    .map_err(build)?;
    ptb.input(CallArg::Pure(bytes)).map_err(build)
}

fn response_options() -> SuiTransactionBlockResponseOptions {
    SuiTransactionBlockResponseOptions::new()
        .with_effects()
        .with_events()
        .with_object_changes()
}

#[async_trait]
impl ChainClient for SuiChain {
    fn address(&self) -> &ObjectIdStr {
        &self.address_id
    }

    async fn sign_and_execute(&self, tx: &DraftTransaction) -> Result<Value, ChainError> {
        tracing::info!(steps = ?tx.describe(), "Submitting transaction");
        let compiled = self.compile(tx).await?;
        let gas = self.gas_coin().await?;
        let gas_price = with_deadline("get_reference_gas_price", self.timeout, async {
            self.client
                .read_api()
                .get_reference_gas_price()
                .await
                .map_err(rpc)
        })
        .await?;

        let data = TransactionData::new_programmable(
            self.address,
            vec![gas],
            compiled.pt,
            self.gas_budget,
            gas_price,
        );
        let signed = Transaction::from_data_and_signer(data, vec![&self.keypair]);

        let response = with_deadline("execute_transaction_block", self.timeout, async {
            self.client
                .quorum_driver_api()
                .execute_transaction_block(
                    signed,
                    response_options(),
                    Some(ExecuteTransactionRequestType::WaitForLocalExecution),
                )
                .await
                .map_err(rpc)
        })
        .await?;

        tracing::info!(digest = %response.digest, "Transaction executed");
        serde_json::to_value(&response).map_err(rpc)
    }

    async fn get_object(&self, id: &ObjectIdStr) -> Result<Option<ObjectSummary>, ChainError> {
        let oid = object_id(id)?;
        let resp = with_deadline("get_object", self.timeout, async {
            self.client
                .read_api()
                .get_object_with_options(oid, SuiObjectDataOptions::new().with_owner().with_type())
                .await
                .map_err(rpc)
        })
        .await?;

        let Some(data) = resp.data else {
            return Ok(None);
        };
        let shared_version = match &data.owner {
            Some(Owner::Shared {
                initial_shared_version,
            }) => Some(initial_shared_version.value()),
            _ => None,
        };
        Ok(Some(ObjectSummary {
            object_id: id.clone(),
            version: data.version.value(),
            object_type: data.type_.as_ref().map(|t| t.to_string()),
            owner: serde_json::to_value(&data.owner).map_err(rpc)?,
            shared_version,
        }))
    }

    async fn get_transaction(&self, digest: &str) -> Result<Value, ChainError> {
        let digest = TransactionDigest::from_str(digest.trim()).map_err(|e| ChainError::InvalidId {
            value: digest.to_string(),
            reason: e.to_string(),
        })?;
        let response = with_deadline("get_transaction", self.timeout, async {
            self.client
                .read_api()
                .get_transaction_with_options(digest, response_options().with_input())
                .await
                .map_err(rpc)
        })
        .await?;
        serde_json::to_value(&response).map_err(rpc)
    }

    async fn get_coins(
        &self,
        owner: &ObjectIdStr,
        coin_type: &str,
    ) -> Result<Vec<CoinSummary>, ChainError> {
        let owner = sui_address(owner)?;
        let page = with_deadline("get_coins", self.timeout, async {
            self.client
                .coin_read_api()
                .get_coins(owner, Some(coin_type.to_string()), None, Some(COIN_PAGE))
                .await
                .map_err(rpc)
        })
        .await?;

        page.data
            .into_iter()
            .map(|c| {
                let id = c.coin_object_id.to_string();
                ObjectIdStr::parse(&id)
                    .map(|coin_object_id| CoinSummary {
                        coin_object_id,
                        balance: c.balance,
                    })
                    .map_err(|reason| ChainError::InvalidId { value: id, reason })
            })
            .collect()
    }

    async fn inspect(&self, tx: &DraftTransaction) -> Result<InspectResults, ChainError> {
XX, self.timeout, async {
            self.client
                .read_api()
                .dev_inspect_transaction_block(
                    self.address,
                    TransactionKind::ProgrammableTransaction(pt),
                    None,
                    None,
                    None,
                )
                .await
                .map_err(rpc)
        })
        .await?;
        let value = serde_json::to_value(&response).map_err(rpc)?;
        InspectResults::from_dev_inspect(&value, &step_commands)
    }
}
