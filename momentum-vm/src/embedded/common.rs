//! Helpers shared by embedded method implementations.

use momentum_abi::{AbiError, AbiResult, AbiSchema, Value};
use momentum_primitives::AccountBlock;
use num_traits::Zero;

use crate::error::{VmError, VmResult};

/// Decodes the call to `name` and rewrites `block.data` canonically.
pub(crate) fn canonicalize(
    schema: &AbiSchema,
    name: &str,
    block: &mut AccountBlock,
) -> VmResult<Vec<Value>> {
    let args = schema.unpack_method(name, &block.data)?;
    block.data = schema.pack_method(name, &args)?;
    Ok(args)
}

/// Checks a call to argument-less method `name`.
pub(crate) fn check_empty_call(schema: &AbiSchema, name: &str, block: &AccountBlock) -> VmResult<()> {
    Ok(schema.unpack_empty_method(name, &block.data)?)
}

pub(crate) fn require_zero_amount(block: &AccountBlock) -> VmResult<()> {
    if !block.amount.is_zero() {
        return Err(VmError::InvalidTokenOrAmount);
    }
    Ok(())
}

/// Argument `index` of a decoded call.
pub(crate) fn arg(args: &[Value], index: usize) -> VmResult<&Value> {
    args.get(index)
        .ok_or_else(|| VmError::invalid_arguments(format!("missing argument {index}")))
}

/// Maps a parse failure of a built-in schema to an owned error.
pub(crate) fn schema_ref(schema: &'static AbiResult<AbiSchema>) -> VmResult<&'static AbiSchema> {
    schema.as_ref().map_err(|err: &AbiError| VmError::from(err.clone()))
}
