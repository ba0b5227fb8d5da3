//! Method and variable definitions.

use momentum_primitives::Crypto;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{AbiError, AbiResult};
use crate::types::AbiType;
use crate::value::Value;

/// Bytes of the method selector prefix.
pub const SELECTOR_SIZE: usize = 4;

/// First four bytes of the SHA3-256 of a method signature.
pub type Selector = [u8; SELECTOR_SIZE];

/// Computes the selector of a canonical signature such as `Fuse(address)`.
pub fn selector_of(signature: &str) -> Selector {
    let digest = Crypto::sha3_256(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_SIZE];
    selector.copy_from_slice(&digest[..SELECTOR_SIZE]);
    selector
}

/// One named, typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: AbiType,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

fn types_of(inputs: &[Argument]) -> Vec<AbiType> {
    inputs.iter().map(|arg| arg.ty.clone()).collect()
}

fn signature_of(name: &str, inputs: &[Argument]) -> String {
    let types: Vec<String> = inputs.iter().map(|arg| arg.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

/// A callable contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiMethod {
    pub name: String,
    pub inputs: Vec<Argument>,
    selector: Selector,
}

impl AbiMethod {
    pub fn new(name: impl Into<String>, inputs: Vec<Argument>) -> Self {
        let name = name.into();
        let selector = selector_of(&signature_of(&name, &inputs));
        Self {
            name,
            inputs,
            selector,
        }
    }

    /// Canonical signature, e.g. `Mint(tokenStandard,uint256,address)`.
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    #[inline]
    pub fn selector(&self) -> Selector {
        self.selector
    }

    /// Selector followed by the encoded arguments.
    pub fn pack(&self, args: &[Value]) -> AbiResult<Vec<u8>> {
        let body = codec::encode(&types_of(&self.inputs), args)
            .map_err(|err| with_context(&self.name, err))?;
        let mut out = Vec::with_capacity(SELECTOR_SIZE + body.len());
        out.extend_from_slice(&self.selector);
        out.extend(body);
        Ok(out)
    }

    /// Decodes the argument section (input without the selector).
    pub fn unpack_args(&self, body: &[u8]) -> AbiResult<Vec<Value>> {
        codec::decode(&types_of(&self.inputs), body)
    }
}

/// A persisted contract variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiVariable {
    pub name: String,
    pub inputs: Vec<Argument>,
}

impl AbiVariable {
    pub fn new(name: impl Into<String>, inputs: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }

    pub fn pack(&self, values: &[Value]) -> AbiResult<Vec<u8>> {
        codec::encode(&types_of(&self.inputs), values).map_err(|err| with_context(&self.name, err))
    }

    pub fn unpack(&self, data: &[u8]) -> AbiResult<Vec<Value>> {
        codec::decode(&types_of(&self.inputs), data)
    }
}

fn with_context(name: &str, err: AbiError) -> AbiError {
    match err {
        AbiError::PackFailed(message) => AbiError::PackFailed(format!("{name}: {message}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_and_selector() {
        let method = AbiMethod::new(
            "Mint",
            vec![
                Argument::new("tokenStandard", AbiType::TokenStandard),
                Argument::new("amount", AbiType::Uint(256)),
                Argument::new("receiveAddress", AbiType::Address),
            ],
        );
        assert_eq!(method.signature(), "Mint(tokenStandard,uint256,address)");
        assert_eq!(method.selector(), selector_of("Mint(tokenStandard,uint256,address)"));
    }

    #[test]
    fn test_selector_ignores_argument_names() {
        let a = AbiMethod::new("Fuse", vec![Argument::new("address", AbiType::Address)]);
        let b = AbiMethod::new("Fuse", vec![Argument::new("beneficiary", AbiType::Address)]);
        assert_eq!(a.selector(), b.selector());
    }

    #[test]
    fn test_pack_prefixes_selector() {
        let method = AbiMethod::new("Burn", Vec::new());
        let data = method.pack(&[]).unwrap();
        assert_eq!(data, method.selector().to_vec());
    }

    #[test]
    fn test_pack_error_names_method() {
        let method = AbiMethod::new("Fuse", vec![Argument::new("address", AbiType::Address)]);
        let err = method.pack(&[]).unwrap_err();
        assert!(err.to_string().contains("Fuse"));
    }
}
