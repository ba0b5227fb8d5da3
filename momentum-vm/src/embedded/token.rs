//! Token contract: issuing, minting, burning and updating ZTS tokens.

use momentum_abi::{AbiResult, AbiSchema, Value};
use momentum_primitives::{AccountBlock, Address, Amount, TokenStandard, ZNN_TOKEN_STANDARD};
use momentum_storage::ReadStore;
use num_traits::Zero;
use once_cell::sync::Lazy;
use tracing::debug;

use super::common::{arg, canonicalize, check_empty_call, require_zero_amount, schema_ref};
use super::{Method, MethodContext, RegistryBuilder};
use crate::constants::*;
use crate::error::{VmError, VmResult};
use crate::plasma::PlasmaTable;
use crate::state::keys;

pub const TOKEN_CONTRACT: Address = Address::embedded(b"token");

pub const TOKEN_ABI: &str = r#"[
    {"type": "function", "name": "IssueToken", "inputs": [
        {"name": "tokenName", "type": "string"},
        {"name": "tokenSymbol", "type": "string"},
        {"name": "tokenDomain", "type": "string"},
        {"name": "totalSupply", "type": "uint256"},
        {"name": "maxSupply", "type": "uint256"},
        {"name": "decimals", "type": "uint8"},
        {"name": "isMintable", "type": "bool"},
        {"name": "isBurnable", "type": "bool"},
        {"name": "isUtility", "type": "bool"}
    ]},
    {"type": "function", "name": "Mint", "inputs": [
        {"name": "tokenStandard", "type": "tokenStandard"},
        {"name": "amount", "type": "uint256"},
        {"name": "receiveAddress", "type": "address"}
    ]},
    {"type": "function", "name": "Burn", "inputs": []},
    {"type": "function", "name": "UpdateToken", "inputs": [
        {"name": "tokenStandard", "type": "tokenStandard"},
        {"name": "owner", "type": "address"},
        {"name": "isMintable", "type": "bool"},
        {"name": "isBurnable", "type": "bool"}
    ]},
    {"type": "variable", "name": "tokenInfo", "inputs": [
        {"name": "owner", "type": "address"},
        {"name": "tokenName", "type": "string"},
        {"name": "tokenSymbol", "type": "string"},
        {"name": "tokenDomain", "type": "string"},
        {"name": "totalSupply", "type": "uint256"},
        {"name": "maxSupply", "type": "uint256"},
        {"name": "decimals", "type": "uint8"},
        {"name": "isMintable", "type": "bool"},
        {"name": "isBurnable", "type": "bool"},
        {"name": "isUtility", "type": "bool"}
    ]}
]"#;

static SCHEMA: Lazy<AbiResult<AbiSchema>> = Lazy::new(|| AbiSchema::from_json(TOKEN_ABI));

pub fn schema() -> VmResult<&'static AbiSchema> {
    schema_ref(&SCHEMA)
}

const TOKEN_INFO_PREFIX: u8 = 0x01;

fn token_info_key(zts: &TokenStandard) -> Vec<u8> {
    let mut key = vec![TOKEN_INFO_PREFIX];
    key.extend_from_slice(zts.as_slice());
    key
}

/// Metadata and supply of an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub owner: Address,
    pub name: String,
    pub symbol: String,
    pub domain: String,
    pub total_supply: Amount,
    pub max_supply: Amount,
    pub decimals: u64,
    pub is_mintable: bool,
    pub is_burnable: bool,
    pub is_utility: bool,
}

impl TokenInfo {
    fn from_values(values: &[Value]) -> VmResult<Self> {
        Ok(Self {
            owner: arg(values, 0)?.as_address()?,
            name: arg(values, 1)?.as_str()?.to_string(),
            symbol: arg(values, 2)?.as_str()?.to_string(),
            domain: arg(values, 3)?.as_str()?.to_string(),
            total_supply: arg(values, 4)?.to_biguint()?,
            max_supply: arg(values, 5)?.to_biguint()?,
            decimals: arg(values, 6)?.to_u64()?,
            is_mintable: arg(values, 7)?.as_bool()?,
            is_burnable: arg(values, 8)?.as_bool()?,
            is_utility: arg(values, 9)?.as_bool()?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Address(self.owner),
            Value::from(self.name.as_str()),
            Value::from(self.symbol.as_str()),
            Value::from(self.domain.as_str()),
            Value::from(self.total_supply.clone()),
            Value::from(self.max_supply.clone()),
            Value::from(self.decimals),
            Value::from(self.is_mintable),
            Value::from(self.is_burnable),
            Value::from(self.is_utility),
        ]
    }

    fn load(context: &MethodContext<'_>, zts: &TokenStandard) -> VmResult<Option<Self>> {
        match context.variable(schema()?, "tokenInfo", &token_info_key(zts))? {
            Some(values) => Ok(Some(Self::from_values(&values)?)),
            None => Ok(None),
        }
    }

    fn save(&self, context: &mut MethodContext<'_>, zts: &TokenStandard) -> VmResult<()> {
        context.put_variable(schema()?, "tokenInfo", &token_info_key(zts), &self.to_values())
    }
}

/// Reads the info of `zts` from contract storage.
pub fn token_info<S: ReadStore + ?Sized>(store: &S, zts: &TokenStandard) -> VmResult<Option<TokenInfo>> {
    let key = keys::contract_storage(&TOKEN_CONTRACT, &token_info_key(zts));
    match store.get(&key)? {
        Some(data) => {
            let values = schema()?.unpack_variable("tokenInfo", &data)?;
            Ok(Some(TokenInfo::from_values(&values)?))
        }
        None => Ok(None),
    }
}

fn check_issue_args(args: &[Value]) -> VmResult<()> {
    let name = arg(args, 0)?.as_str()?;
    let symbol = arg(args, 1)?.as_str()?;
    let domain = arg(args, 2)?.as_str()?;
    let total_supply = arg(args, 3)?.to_biguint()?;
    let max_supply = arg(args, 4)?.to_biguint()?;
    let decimals = arg(args, 5)?.to_u64()?;
    let is_mintable = arg(args, 6)?.as_bool()?;

    if name.is_empty() || name.len() > TOKEN_NAME_MAX_LENGTH {
        return Err(VmError::invalid_arguments("token name length"));
    }
    if symbol.is_empty()
        || symbol.len() > TOKEN_SYMBOL_MAX_LENGTH
        || !symbol.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return Err(VmError::invalid_arguments("token symbol"));
    }
    if domain.len() > TOKEN_DOMAIN_MAX_LENGTH {
        return Err(VmError::invalid_arguments("token domain length"));
    }
    if decimals > TOKEN_MAX_DECIMALS {
        return Err(VmError::invalid_arguments("decimals"));
    }
    if max_supply.is_zero() || total_supply > max_supply {
        return Err(VmError::invalid_arguments("supply"));
    }
    if !is_mintable && total_supply != max_supply {
        return Err(VmError::invalid_arguments("fixed supply token must mint everything"));
    }
    Ok(())
}

struct IssueMethod;

impl Method for IssueMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_simple)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        if block.token_standard != ZNN_TOKEN_STANDARD || block.amount != Amount::from(TOKEN_ISSUE_FEE) {
            return Err(VmError::InvalidTokenOrAmount);
        }
        let args = canonicalize(schema()?, "IssueToken", block)?;
        check_issue_args(&args)
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let args = schema()?.unpack_method("IssueToken", &call.data)?;

        let zts = TokenStandard::derive(&send.hash);
        if TokenInfo::load(context, &zts)?.is_some() {
            return Err(VmError::invalid_arguments("token already issued"));
        }
        let info = TokenInfo {
            owner: send.address,
            name: arg(&args, 0)?.as_str()?.to_string(),
            symbol: arg(&args, 1)?.as_str()?.to_string(),
            domain: arg(&args, 2)?.as_str()?.to_string(),
            total_supply: arg(&args, 3)?.to_biguint()?,
            max_supply: arg(&args, 4)?.to_biguint()?,
            decimals: arg(&args, 5)?.to_u64()?,
            is_mintable: arg(&args, 6)?.as_bool()?,
            is_burnable: arg(&args, 7)?.as_bool()?,
            is_utility: arg(&args, 8)?.as_bool()?,
        };

        // The fee is burnt.
        context.sub_balance(&ZNN_TOKEN_STANDARD, &send.amount)?;
        info.save(context, &zts)?;
        debug!(target: "momentum", %zts, symbol = %info.symbol, supply = %info.total_supply, "token issued");

        if info.total_supply.is_zero() {
            return Ok(Vec::new());
        }
        context.add_balance(&zts, &info.total_supply)?;
        Ok(vec![context.send(info.owner, zts, info.total_supply, Vec::new())])
    }
}

struct MintMethod;

impl Method for MintMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_withdraw)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        require_zero_amount(block)?;
        let args = canonicalize(schema()?, "Mint", block)?;
        if arg(&args, 1)?.to_biguint()?.is_zero() {
            return Err(VmError::invalid_arguments("mint amount"));
        }
        Ok(())
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let args = schema()?.unpack_method("Mint", &call.data)?;
        let zts = arg(&args, 0)?.as_token_standard()?;
        let amount = arg(&args, 1)?.to_biguint()?;
        let receiver = arg(&args, 2)?.as_address()?;

        let mut info = TokenInfo::load(context, &zts)?.ok_or(VmError::DataNonExistent)?;
        if info.owner != send.address || !info.is_mintable {
            return Err(VmError::PermissionDenied);
        }
        let total = &info.total_supply + &amount;
        if total > info.max_supply {
            return Err(VmError::invalid_arguments("mint exceeds max supply"));
        }
        info.total_supply = total;
        info.save(context, &zts)?;
        context.add_balance(&zts, &amount)?;
        debug!(target: "momentum", %zts, %amount, "minted");
        Ok(vec![context.send(receiver, zts, amount, Vec::new())])
    }
}

struct BurnMethod;

impl Method for BurnMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_simple)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        if block.amount.is_zero() {
            return Err(VmError::InvalidTokenOrAmount);
        }
        check_empty_call(schema()?, "Burn", block)
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let zts = send.token_standard;
        let mut info = TokenInfo::load(context, &zts)?.ok_or(VmError::DataNonExistent)?;
        if !info.is_burnable && info.owner != send.address {
            return Err(VmError::PermissionDenied);
        }
        if info.total_supply < send.amount {
            return Err(VmError::internal(format!("burn of {zts} exceeds supply")));
        }
        info.total_supply -= &send.amount;
        info.max_supply -= &send.amount;
        info.save(context, &zts)?;
        context.sub_balance(&zts, &send.amount)?;
        debug!(target: "momentum", %zts, amount = %send.amount, "burnt");
        Ok(Vec::new())
    }
}

struct UpdateMethod;

impl Method for UpdateMethod {
    fn plasma(&self, table: &PlasmaTable) -> VmResult<u64> {
        Ok(table.embedded_simple)
    }

    fn validate_send_block(&self, block: &mut AccountBlock) -> VmResult<()> {
        require_zero_amount(block)?;
        canonicalize(schema()?, "UpdateToken", block)?;
        Ok(())
    }

    fn receive_block(
        &self,
        context: &mut MethodContext<'_>,
        send: &AccountBlock,
    ) -> VmResult<Vec<AccountBlock>> {
        let mut call = send.clone();
        self.validate_send_block(&mut call)?;
        let args = schema()?.unpack_method("UpdateToken", &call.data)?;
        let zts = arg(&args, 0)?.as_token_standard()?;
        let owner = arg(&args, 1)?.as_address()?;
        let is_mintable = arg(&args, 2)?.as_bool()?;
        let is_burnable = arg(&args, 3)?.as_bool()?;

        let mut info = TokenInfo::load(context, &zts)?.ok_or(VmError::DataNonExistent)?;
        if info.owner != send.address {
            return Err(VmError::PermissionDenied);
        }
        if (is_mintable && !info.is_mintable) || (is_burnable && !info.is_burnable) {
            return Err(VmError::PermissionDenied);
        }
        if info.is_mintable && !is_mintable {
            info.max_supply = info.total_supply.clone();
        }
        info.owner = owner;
        info.is_mintable = is_mintable;
        info.is_burnable = is_burnable;
        info.save(context, &zts)?;
        debug!(target: "momentum", %zts, owner = %owner, "token updated");
        Ok(Vec::new())
    }
}

pub(crate) fn register(builder: RegistryBuilder) -> VmResult<RegistryBuilder> {
    builder
        .contract(TOKEN_CONTRACT, schema()?.clone())?
        .method(TOKEN_CONTRACT, "IssueToken", IssueMethod)?
        .method(TOKEN_CONTRACT, "Mint", MintMethod)?
        .method(TOKEN_CONTRACT, "Burn", BurnMethod)?
        .method(TOKEN_CONTRACT, "UpdateToken", UpdateMethod)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::AcknowledgedMomentum;
    use crate::state::account;
    use momentum_primitives::{BlockType, Hash};
    use momentum_storage::MemoryStore;

    fn issuer() -> Address {
        Address::from_public_key(&[5u8; 32])
    }

    fn issue_args(total: u64, max: u64, mintable: bool) -> Vec<Value> {
        vec![
            Value::from("Test Token"),
            Value::from("TST"),
            Value::from("example.org"),
            Value::from(total),
            Value::from(max),
            Value::from(8u64),
            Value::from(mintable),
            Value::from(true),
            Value::from(false),
        ]
    }

    fn issue_send(args: &[Value]) -> AccountBlock {
        let mut block = AccountBlock::template(BlockType::UserSend, 1);
        block.address = issuer();
        block.to_address = TOKEN_CONTRACT;
        block.token_standard = ZNN_TOKEN_STANDARD;
        block.amount = Amount::from(TOKEN_ISSUE_FEE);
        block.hash = Hash::digest(b"issue");
        block.data = schema().unwrap().pack_method("IssueToken", args).unwrap();
        block
    }

    #[test]
    fn test_issue_validation() {
        assert!(IssueMethod.validate_send_block(&mut issue_send(&issue_args(100, 1000, true))).is_ok());
        assert!(matches!(
            IssueMethod.validate_send_block(&mut issue_send(&issue_args(100, 1000, false))),
            Err(VmError::InvalidArguments(_))
        ));
        assert!(matches!(
            IssueMethod.validate_send_block(&mut issue_send(&issue_args(2000, 1000, true))),
            Err(VmError::InvalidArguments(_))
        ));
        let mut cheap = issue_send(&issue_args(100, 100, false));
        cheap.amount = Amount::from(TOKEN_ISSUE_FEE - 1);
        assert_eq!(IssueMethod.validate_send_block(&mut cheap), Err(VmError::InvalidTokenOrAmount));
    }

    #[test]
    fn test_issue_burns_fee_and_emits_supply() {
        let mut store = MemoryStore::new();
        let send = issue_send(&issue_args(100, 1000, true));
        // The engine credits the call amount before invoking the method.
        account::add_balance(&mut store, &TOKEN_CONTRACT, &ZNN_TOKEN_STANDARD, &send.amount).unwrap();

        let descendants = {
            let mut context =
                MethodContext::new(&mut store, TOKEN_CONTRACT, AcknowledgedMomentum::default(), 1);
            IssueMethod.receive_block(&mut context, &send).unwrap()
        };

        let zts = TokenStandard::derive(&send.hash);
        assert_eq!(descendants.len(), 1);
        assert_eq!(descendants[0].to_address, issuer());
        assert_eq!(descendants[0].token_standard, zts);
        assert_eq!(descendants[0].amount, Amount::from(100u64));
        assert!(account::balance(&store, &TOKEN_CONTRACT, &ZNN_TOKEN_STANDARD).unwrap().is_zero());

        let info = token_info(&store, &zts).unwrap().unwrap();
        assert_eq!(info.owner, issuer());
        assert_eq!(info.symbol, "TST");
        assert_eq!(info.total_supply, Amount::from(100u64));
    }

    #[test]
    fn test_update_cannot_enable_flags() {
        let mut store = MemoryStore::new();
        let send = issue_send(&issue_args(100, 100, false));
        account::add_balance(&mut store, &TOKEN_CONTRACT, &ZNN_TOKEN_STANDARD, &send.amount).unwrap();
        let zts = TokenStandard::derive(&send.hash);

        let mut context = MethodContext::new(&mut store, TOKEN_CONTRACT, AcknowledgedMomentum::default(), 1);
        IssueMethod.receive_block(&mut context, &send).unwrap();

        let mut update = AccountBlock::template(BlockType::UserSend, 1);
        update.address = issuer();
        update.to_address = TOKEN_CONTRACT;
        update.data = schema()
            .unwrap()
            .pack_method(
                "UpdateToken",
                &[Value::from(zts), Value::Address(issuer()), Value::from(true), Value::from(true)],
            )
            .unwrap();
        assert_eq!(
            UpdateMethod.receive_block(&mut context, &update),
            Err(VmError::PermissionDenied)
        );
    }

    #[test]
    fn test_mint_requires_owner() {
        let mut store = MemoryStore::new();
        let send = issue_send(&issue_args(100, 1000, true));
        account::add_balance(&mut store, &TOKEN_CONTRACT, &ZNN_TOKEN_STANDARD, &send.amount).unwrap();
        let zts = TokenStandard::derive(&send.hash);
        let mut context = MethodContext::new(&mut store, TOKEN_CONTRACT, AcknowledgedMomentum::default(), 1);
        IssueMethod.receive_block(&mut context, &send).unwrap();

        let mut mint = AccountBlock::template(BlockType::UserSend, 1);
        mint.address = Address::from_public_key(&[6u8; 32]);
        mint.to_address = TOKEN_CONTRACT;
        mint.data = schema()
            .unwrap()
            .pack_method(
                "Mint",
                &[Value::from(zts), Value::from(10u64), Value::Address(issuer())],
            )
            .unwrap();
        assert_eq!(MintMethod.receive_block(&mut context, &mint), Err(VmError::PermissionDenied));

        mint.address = issuer();
        let sends = MintMethod.receive_block(&mut context, &mint).unwrap();
        assert_eq!(sends[0].amount, Amount::from(10u64));
    }
}
