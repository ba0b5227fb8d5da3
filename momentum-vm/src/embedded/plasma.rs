//! Plasma contract: fusing QSR for plasma.
//!
//! `Fuse(address)` locks the sent QSR and credits its plasma to the
//! beneficiary. `CancelFuse(hash)` returns the QSR to the owner once the
//! entry has expired.

use momentum_abi::{AbiResult, AbiSchema, Value};
use momentum_primitives::{
    AccountBlock, Address, Amount, Hash, ONE_COIN, QSR_TOKEN_STANDARD,
};
use momentum_storage::{ReadStore, WriteStore};
use num_traits::Zero;
use once_cell::sync::Lazy;
use tracing::debug;

use super::common::{arg, canonicalize, require_zero_amount, schema_ref};
use super::{AcknowledgedMomentum, Method, MethodContext, RegistryBuilder};
use crate::constants::{FUSE_EXPIRATION_HEIGHT, FUSE_MIN_AMOUNT};
use crate::error::{VmError, VmResult};
use crate::plasma::PlasmaTable;
use crate::state::keys;

pub const PLASMA_CONTRACT: Address = Address::embedded(b"plasma");

pub const PLASMA_ABI: &str = r#"[
    {"type": "function", "name": "Fuse", "inputs": [
        {"name": "address", "type": "address"}
    ]},
    {"type": "function", "name": "CancelFuse", "inputs": [
        {"name": "id", "type": "hash"}
    ]},
    {"type": "variable", "name": "fusionInfo", "inputs": [
        {"name": "owner", "type": "address"},
        {"name": "amount", "type": "uint256"},
        {"name": "expirationHeight", "type": "uint64"},
        {"name": "beneficiary", "type": "address"}
    ]},
    {"type": "variable", "name": "fusedAmount", "inputs": [
        {"name": "amount", "type": "uint256"}
    ]}
]"#;

static SCHEMA: Lazy<AbiResult<AbiSchema>> = Lazy::new(|| AbiSchema::from_json(PLASMA_ABI));

pub fn schema() -> VmResult<&'static AbiSchema> {
    schema_ref(&SCHEMA)
}

const FUSION_PREFIX: u8 = 0x01;
const FUSED_AMOUNT_PREFIX: u8 = 0x02;

fn fusion_key(id: &Hash) -> Vec<u8> {
    let mut key = vec![FUSION_PREFIX];
    key.extend_from_slice(id.as_slice());
    key
}

fn fused_amount_key(beneficiary: &Address) -> Vec<u8> {
    let mut key = vec![FUSED_AMOUNT_PREFIX];
    key.extend_from_slice(beneficiary.as_slice());
    key
}

/// QSR locked by one `Fuse` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionEntry {
    pub id: Hash,
    pub owner: Address,
    pub amount: Amount,
    pub expiration_height: u64,
    pub beneficiary: Address,
}

impl FusionEntry {
    fn from_values(id: Hash, values: &[Value]) -> VmResult<Self> {
        Ok(Self {
            id,
            owner: arg(values, 0)?.as_address()?,
            amount: arg(values, 1)?.to_biguint()?,
            expiration_height: arg(values, 2)?.to_u64()?,
            beneficiary: arg(values, 3)?.as_address()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Address(self.owner),
            Value::from(self.amount.clone()),
            Value::from(self.expiration_height),
            Value::Address(self.beneficiary),
        ]
    }

    fn load(context: &MethodContext<'_>, id: &Hash) -> VmResult<Option<Self>> {
        match context.variable(schema()?, "fusionInfo", &fusion_key(id))? {
            Some(values) => Ok(Some(Self::from_values(*id, &values)?)),
            None => Ok(None),
        }
    }
}

/// Total QSR fused for `beneficiary`, read straight from contract storage.
pub fn fused_amount<S: ReadStore + ?Sized>(store: &S, beneficiary: &Address) -> VmResult<Amount> {
    let key = keys::contract_storage(&PLASMA_CONTRACT, &fused_amount_key(beneficiary));
    match store.get(&key)? {
        Some(data) => {
            let values = schema()?.unpack_variable("fusedAmount", &data)?;
            Ok(arg(&values, 0)?.to_biguint()?)
        }
        None => Ok(Amount::zero()),
    }
}

/// Every fusion entry, ordered by id.
pub fn fusion_entries<S: ReadStore + ?Sized>(store: &S) -> VmResult<Vec<FusionEntry>> {
    let prefix = keys::contract_storage(&PLASMA_CONTRACT, &[FUSION_PREFIX]);
    store
        .scan_prefix(&prefix)?
        .into_iter()
        .map(|(key, data)| {
            let id = Hash::from_bytes(&key[prefix.len()..])?;
            let values = schema()?.unpack_variable("fusionInfo", &data)?;
            FusionEntry::from_values(id, &values)
        })
        .collect()
}

fn adjust_fused(context: &mut MethodContext<'_>, beneficiary: &Address, delta: &Amount, add: bool) -> VmResult<()> {
    let key = fused_amount_key(beneficiary);
    let current = match context.variable(schema()?, "fusedAmount", &key)? {
        Some(values) => arg(&values, 0)?.to_biguint()?,
        None => Amount::zero(),
    };
    let updated = if add {
        current + delta
    } else if current >= *delta {
        current - delta
    } else {
        return Err(VmError::internal(format!("fused amount of {beneficiary} underflows")));
    };
    if updated.is_zero() {
        context.storage_delete(&key)
    } else {
        context.put_variable(schema()?, "fusedAmount", &key, &[Value::from(updated)])
    }
}

/// Stores a new fusion entry and credits its beneficiary.
pub(crate) fn record_fusion(context: &mut MethodContext<'_>, entry: &FusionEntry) -> VmResult<()> {
    context.put_variable(schema()?, "fusionInfo", &fusion_key(&entry.id), &entry.to_values())?;
    adjust_fused(context, &entry.beneficiary, &entry.amount, true)
}

/// Seeds a fusion at genesis: the locked QSR lands in the contract balance.
pub(crate) fn genesis_fusion(
    store: &mut dyn WriteStore,
    chain_identifier: u64,
    momentum: AcknowledgedMomentum,
    entry: &FusionEntry,
) -> VmResult<()> {
    let mut context = MethodContext::new(store, PLASMA_CONTRACT, momentum, chain_identifier);
    record_fusion(&mut context, entry)?;
    context.add_balance(&QSR_TOKEN_STANDARD, &entry.amount)
}

struct FuseMethod;

impl Method for FuseMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_simple)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        if block.token_standard != QSR_TOKEN_STANDARD
            || block.amount < Amount::from(FUSE_MIN_AMOUNT)
            || !(&block.amount % ONE_COIN).is_zero()
        {
            return Err(VmError::InvalidTokenOrAmount);
        }
        canonicalize(schema()?, "Fuse", block)?;
        Ok(())
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let args = schema()?.unpack_method("Fuse", &call.data)?;
        let entry = FusionEntry {
            id: send.hash,
            owner: send.address,
            amount: send.amount.clone(),
            expiration_height: context.momentum().height + FUSE_EXPIRATION_HEIGHT,
            beneficiary: arg(&args, 0)?.as_address()?,
        };
        record_fusion(context, &entry)?;
        debug!(
            target: "momentum",
            id = %entry.id,
            beneficiary = %entry.beneficiary,
            amount = %entry.amount,
            "fused"
        );
        Ok(Vec::new())
    }
}

struct CancelFuseMethod;

impl Method for CancelFuseMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_withdraw)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        require_zero_amount(block)?;
        canonicalize(schema()?, "CancelFuse", block)?;
        Ok(())
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let args = schema()?.unpack_method("CancelFuse", &call.data)?;
        let id = arg(&args, 0)?.as_hash()?;

        let entry = FusionEntry::load(context, &id)?.ok_or(VmError::DataNonExistent)?;
        if entry.owner != send.address {
            return Err(VmError::PermissionDenied);
        }
        if context.momentum().height < entry.expiration_height {
            return Err(VmError::FusionNotExpired);
        }

        context.storage_delete(&fusion_key(&id))?;
        adjust_fused(context, &entry.beneficiary, &entry.amount, false)?;
        debug!(target: "momentum", id = %id, amount = %entry.amount, "fusion cancelled");
        Ok(vec![context.send(
            entry.owner,
            QSR_TOKEN_STANDARD,
            entry.amount,
            Vec::new(),
        )])
    }
}

pub(crate) fn register(builder: RegistryBuilder) -> VmResult<RegistryBuilder> {
    builder
        .contract(PLASMA_CONTRACT, schema()?.clone())?
        .method(PLASMA_CONTRACT, "Fuse", FuseMethod)?
        .method(PLASMA_CONTRACT, "CancelFuse", CancelFuseMethod)
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_primitives::{BlockType, ZNN_TOKEN_STANDARD};

    fn fuse_send(amount: u64) -> AccountBlock {
        let mut block = AccountBlock::template(BlockType::UserSend, 1);
        block.to_address = PLASMA_CONTRACT;
        block.token_standard = QSR_TOKEN_STANDARD;
        block.amount = Amount::from(amount);
        block.data = schema()
            .unwrap()
            .pack_method("Fuse", &[Value::Address(Address::from_public_key(&[3u8; 32]))])
            .unwrap();
        block
    }

    #[test]
    fn test_fuse_amount_rules() {
        assert!(FuseMethod.validate_send_block(&mut fuse_send(FUSE_MIN_AMOUNT)).is_ok());
        assert_eq!(
            FuseMethod.validate_send_block(&mut fuse_send(FUSE_MIN_AMOUNT - ONE_COIN)),
            Err(VmError::InvalidTokenOrAmount)
        );
        assert_eq!(
            FuseMethod.validate_send_block(&mut fuse_send(FUSE_MIN_AMOUNT + 1)),
            Err(VmError::InvalidTokenOrAmount)
        );
        let mut znn = fuse_send(FUSE_MIN_AMOUNT);
        znn.token_standard = ZNN_TOKEN_STANDARD;
        assert_eq!(FuseMethod.validate_send_block(&mut znn), Err(VmError::InvalidTokenOrAmount));
    }

    #[test]
    fn test_cancel_requires_zero_amount() {
        let mut block = AccountBlock::template(BlockType::UserSend, 1);
        block.amount = Amount::from(1u64);
        block.data = schema()
            .unwrap()
            .pack_method("CancelFuse", &[Value::Hash(Hash::digest(b"id"))])
            .unwrap();
        assert_eq!(
            CancelFuseMethod.validate_send_block(&mut block),
            Err(VmError::InvalidTokenOrAmount)
        );
    }

    #[test]
    fn test_costs() {
        let table = PlasmaTable::default();
        assert_eq!(FuseMethod.plasma(&table).unwrap(), table.embedded_simple);
        assert_eq!(CancelFuseMethod.plasma(&table).unwrap(), table.embedded_withdraw);
    }
}
