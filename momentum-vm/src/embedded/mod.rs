//! Embedded contracts and the registry that dispatches calls to them.
//!
//! An embedded contract lives at a fixed address in the reserved contract
//! range and is described by an ABI schema. Each method of the schema is
//! backed by one [`Method`] implementation. The registry is immutable once
//! built; the process-wide instance returned by [`EmbeddedRegistry::global`]
//! is shared by `Arc`.

mod common;
pub mod plasma;
pub mod token;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use momentum_abi::{AbiSchema, Value, SELECTOR_SIZE};
use momentum_primitives::{AccountBlock, Address, Amount, BlockType, Hash, TokenStandard};
use momentum_storage::WriteStore;
use once_cell::sync::Lazy;

use crate::error::{VmError, VmResult};
use crate::plasma::PlasmaTable;
use crate::state::{account, keys};

pub use plasma::PLASMA_CONTRACT;
pub use token::TOKEN_CONTRACT;

/// One verb of an embedded contract.
pub trait Method: Send + Sync {
    /// Base plasma charged for a send invoking this method.
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64>;

    /// Storage-free check of a send block; rewrites `data` in canonical form.
    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()>;

    /// Executes the call on receipt. The only place contract storage changes.
    ///
    /// Returns the sends the contract emits; the engine assigns their
    /// heights and hashes.
    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>>;
}

/// Momentum acknowledged by the receive being generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcknowledgedMomentum {
    pub hash: Hash,
    pub height: u64,
    pub timestamp: u64,
}

/// View of engine state granted to a method while it receives a block.
pub struct MethodContext<'a> {
    store: &'a mut dyn WriteStore,
    address: Address,
    momentum: AcknowledgedMomentum,
    chain_identifier: u64,
}

impl<'a> MethodContext<'a> {
    pub fn new(
        store: &'a mut dyn WriteStore,
        address: Address,
        momentum: AcknowledgedMomentum,
        chain_identifier: u64,
    ) -> Self {
        Self {
            store,
            address,
            momentum,
            chain_identifier,
        }
    }

    /// Address of the executing contract.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn momentum(&self) -> &AcknowledgedMomentum {
        &self.momentum
    }

    pub fn chain_identifier(&self) -> u64 {
        self.chain_identifier
    }

    pub fn storage_get(&self, key: &[u8]) -> VmResult<Option<Vec<u8>>> {
        Ok(self.store.get(&keys::contract_storage(&self.address, key))?)
    }

    pub fn storage_put(&mut self, key: &[u8], value: Vec<u8>) -> VmResult<()> {
        Ok(self
            .store
            .put(keys::contract_storage(&self.address, key), value)?)
    }

    pub fn storage_delete(&mut self, key: &[u8]) -> VmResult<()> {
        Ok(self
            .store
            .delete(&keys::contract_storage(&self.address, key))?)
    }

    /// Entries under `prefix`, keys relative to the contract's storage.
    pub fn storage_scan(&self, prefix: &[u8]) -> VmResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let base = keys::contract_storage_prefix(&self.address).len();
        Ok(self
            .store
            .scan_prefix(&keys::contract_storage(&self.address, prefix))?
            .into_iter()
            .map(|(key, value)| (key[base..].to_vec(), value))
            .collect())
    }

    /// Reads ABI variable `name` stored under `key`.
    pub fn variable(&self, schema: &AbiSchema, name: &str, key: &[u8]) -> VmResult<Option<Vec<Value>>> {
        match self.storage_get(key)? {
            Some(data) => Ok(Some(schema.unpack_variable(name, &data)?)),
            None => Ok(None),
        }
    }

    /// Writes ABI variable `name` under `key`.
    pub fn put_variable(
        &mut self,
        schema: &AbiSchema,
        name: &str,
        key: &[u8],
        values: &[Value],
    ) -> VmResult<()> {
        let data = schema.pack_variable(name, values)?;
        self.storage_put(key, data)
    }

    pub fn balance(&self, token: &TokenStandard) -> VmResult<Amount> {
        account::balance(&*self.store, &self.address, token)
    }

    pub fn add_balance(&mut self, token: &TokenStandard, amount: &Amount) -> VmResult<()> {
        account::add_balance(&mut *self.store, &self.address, token, amount)
    }

    pub fn sub_balance(&mut self, token: &TokenStandard, amount: &Amount) -> VmResult<()> {
        account::sub_balance(&mut *self.store, &self.address, token, amount)
    }

    /// A send from this contract, to be finalized by the engine.
    pub fn send(&self, to: Address, token: TokenStandard, amount: Amount, data: Vec<u8>) -> AccountBlock {
        let mut block = AccountBlock::template(BlockType::ContractSend, self.chain_identifier);
        block.address = self.address;
        block.to_address = to;
        block.token_standard = token;
        block.amount = amount;
        block.data = data;
        block
    }
}

struct MethodEntry {
    method: Arc<dyn Method>,
    retired_at: Option<u64>,
}

struct EmbeddedContract {
    schema: AbiSchema,
    methods: HashMap<String, MethodEntry>,
}

/// Immutable table of embedded contracts keyed by address.
pub struct EmbeddedRegistry {
    contracts: HashMap<Address, EmbeddedContract>,
}

static GLOBAL: Lazy<VmResult<Arc<EmbeddedRegistry>>> =
    Lazy::new(|| EmbeddedRegistry::standard().map(Arc::new));

impl EmbeddedRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with every built-in contract.
    pub fn standard() -> VmResult<Self> {
        let builder = plasma::register(Self::builder())?;
        let builder = token::register(builder)?;
        Ok(builder.build())
    }

    /// Process-wide standard registry, built on first use.
    pub fn global() -> VmResult<Arc<EmbeddedRegistry>> {
        GLOBAL.clone()
    }

    /// Resolves the method called by `data` on the contract at `address`
    /// as of momentum height `momentum_height`.
    ///
    /// # Errors
    ///
    /// `NotContractAddress` outside the embedded range, `ContractDoesntExist`
    /// for an unregistered address, `ContractMethodNotFound` when the
    /// selector is unknown, has no implementation, or is retired.
    pub fn get_embedded_method(
        &self,
        momentum_height: u64,
        address: &Address,
        data: &[u8],
    ) -> VmResult<&dyn Method> {
        if !address.is_embedded() {
            return Err(VmError::NotContractAddress);
        }
        let contract = self
            .contracts
            .get(address)
            .ok_or(VmError::ContractDoesntExist)?;
        let selector = data
            .get(..SELECTOR_SIZE)
            .ok_or(VmError::ContractMethodNotFound)?;
        let abi_method = contract
            .schema
            .method_by_id(selector)
            .ok_or(VmError::ContractMethodNotFound)?;
        let entry = contract
            .methods
            .get(&abi_method.name)
            .ok_or(VmError::ContractMethodNotFound)?;
        if entry.retired_at.is_some_and(|height| momentum_height >= height) {
            return Err(VmError::ContractMethodNotFound);
        }
        Ok(entry.method.as_ref())
    }

    pub fn schema(&self, address: &Address) -> Option<&AbiSchema> {
        self.contracts.get(address).map(|contract| &contract.schema)
    }

    /// Registered contract addresses in ascending order.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.contracts.keys().copied().collect();
        addresses.sort();
        addresses
    }
}

impl fmt::Debug for EmbeddedRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedRegistry")
            .field("contracts", &self.addresses())
            .finish()
    }
}

/// Collects contracts and methods before freezing them into a registry.
#[derive(Default)]
pub struct RegistryBuilder {
    contracts: HashMap<Address, EmbeddedContract>,
}

impl RegistryBuilder {
    pub fn contract(mut self, address: Address, schema: AbiSchema) -> VmResult<Self> {
        if !address.is_embedded() {
            return Err(VmError::NotContractAddress);
        }
        if self.contracts.contains_key(&address) {
            return Err(VmError::internal(format!("contract {address} registered twice")));
        }
        self.contracts.insert(
            address,
            EmbeddedContract {
                schema,
                methods: HashMap::new(),
            },
        );
        Ok(self)
    }

    pub fn method<M: Method + 'static>(self, address: Address, name: &str, method: M) -> VmResult<Self> {
        self.insert(address, name, Arc::new(method), None)
    }

    /// Registers a method that stops resolving from momentum height `retired_at`.
    pub fn retired_method<M: Method + 'static>(
        self,
        address: Address,
        name: &str,
        method: M,
        retired_at: u64,
    ) -> VmResult<Self> {
        self.insert(address, name, Arc::new(method), Some(retired_at))
    }

    fn insert(
        mut self,
        address: Address,
        name: &str,
        method: Arc<dyn Method>,
        retired_at: Option<u64>,
    ) -> VmResult<Self> {
        let contract = self
            .contracts
            .get_mut(&address)
            .ok_or(VmError::ContractDoesntExist)?;
        if contract.schema.method_by_name(name).is_none() {
            return Err(VmError::ContractMethodNotFound);
        }
        contract
            .methods
            .insert(name.to_string(), MethodEntry { method, retired_at });
        Ok(self)
    }

    pub fn build(self) -> EmbeddedRegistry {
        EmbeddedRegistry {
            contracts: self.contracts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_resolves_known_methods() {
        let registry = EmbeddedRegistry::global().unwrap();
        let schema = registry.schema(&PLASMA_CONTRACT).unwrap();
        let data = schema
            .pack_method("Fuse", &[Value::Address(Address::embedded(b"x"))])
            .unwrap();
        assert!(registry.get_embedded_method(1, &PLASMA_CONTRACT, &data).is_ok());
        assert_eq!(registry.addresses(), vec![PLASMA_CONTRACT, TOKEN_CONTRACT]);
    }

    #[test]
    fn test_resolution_errors() {
        let registry = EmbeddedRegistry::global().unwrap();
        let user = Address::from_public_key(&[1u8; 32]);
        assert!(matches!(
            registry.get_embedded_method(1, &user, &[0; 4]),
            Err(VmError::NotContractAddress)
        ));
        assert!(matches!(
            registry.get_embedded_method(1, &Address::embedded(b"nothing"), &[0; 4]),
            Err(VmError::ContractDoesntExist)
        ));
        assert!(matches!(
            registry.get_embedded_method(1, &PLASMA_CONTRACT, &[0; 4]),
            Err(VmError::ContractMethodNotFound)
        ));
        assert!(matches!(
            registry.get_embedded_method(1, &PLASMA_CONTRACT, &[]),
            Err(VmError::ContractMethodNotFound)
        ));
    }

    #[test]
    fn test_unimplemented_schema_method() {
        let schema = AbiSchema::from_json(
            r#"[{"type":"function","name":"Ping","inputs":[]},{"type":"function","name":"Pong","inputs":[]}]"#,
        )
        .unwrap();
        let address = Address::embedded(b"pingpong");
        let registry = EmbeddedRegistry::builder()
            .contract(address, schema.clone())
            .unwrap()
            .build();
        let data = schema.pack_method("Pong", &[]).unwrap();
        assert!(matches!(
            registry.get_embedded_method(1, &address, &data),
            Err(VmError::ContractMethodNotFound)
        ));
    }

    #[test]
    fn test_builder_rejects_user_addresses() {
        let result = EmbeddedRegistry::builder().contract(Address::zero(), AbiSchema::default());
        assert!(matches!(result, Err(VmError::NotContractAddress)));
    }
}
