//! Recursive word-aligned tuple codec.
//!
//! A tuple is a head of fixed-size slots followed by a tail. Static values
//! sit in the head; dynamic values leave a 32-byte offset (relative to the
//! start of the tuple) in the head and are written to the tail.

use momentum_primitives::{Address, Hash, TokenStandard, ADDRESS_SIZE, TOKEN_STANDARD_SIZE};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Zero};

use crate::error::{AbiError, AbiResult};
use crate::types::{AbiType, WORD_SIZE};
use crate::value::Value;

/// Encodes `values` as a tuple of `types`.
pub fn encode(types: &[AbiType], values: &[Value]) -> AbiResult<Vec<u8>> {
    if types.len() != values.len() {
        return Err(AbiError::pack_failed(format!(
            "expected {} values, got {}",
            types.len(),
            values.len()
        )));
    }

    let head_len: usize = types.iter().map(AbiType::head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_value(ty, value)?);
        } else {
            head.extend(encode_value(ty, value)?);
        }
    }
    head.extend(tail);
    Ok(head)
}

/// Decodes a tuple of `types` starting at the beginning of `data`.
pub fn decode(types: &[AbiType], data: &[u8]) -> AbiResult<Vec<Value>> {
    let mut values = Vec::with_capacity(types.len());
    let mut offset = 0usize;
    for ty in types {
        if ty.is_dynamic() {
            let pointer = read_usize(read_word(data, offset)?)?;
            let element = data
                .get(pointer..)
                .ok_or_else(|| AbiError::unpack_failed("offset out of bounds"))?;
            values.push(decode_value(ty, element)?);
            offset += WORD_SIZE;
        } else {
            let element = data
                .get(offset..)
                .ok_or_else(|| AbiError::unpack_failed("unexpected end of input"))?;
            values.push(decode_value(ty, element)?);
            offset += ty.head_size();
        }
    }
    Ok(values)
}

fn encode_value(ty: &AbiType, value: &Value) -> AbiResult<Vec<u8>> {
    let mismatch = || {
        AbiError::pack_failed(format!("cannot pack {} as {ty}", value.kind()))
    };

    match (ty, value) {
        (AbiType::Uint(bits), Value::Int(n)) => Ok(int_word(n, *bits, false)?.to_vec()),
        (AbiType::Int(bits), Value::Int(n)) => Ok(int_word(n, *bits, true)?.to_vec()),
        (AbiType::Bool, Value::Bool(flag)) => Ok(usize_word(usize::from(*flag)).to_vec()),
        (AbiType::Address, Value::Address(address)) => Ok(left_pad(address.as_slice()).to_vec()),
        (AbiType::TokenStandard, Value::TokenStandard(zts)) => Ok(left_pad(zts.as_slice()).to_vec()),
        (AbiType::Hash, Value::Hash(hash)) => Ok(hash.as_slice().to_vec()),
        (AbiType::FixedBytes(len), Value::FixedBytes(bytes)) => {
            if bytes.len() != *len {
                return Err(AbiError::pack_failed(format!(
                    "bytes{len} given {} bytes",
                    bytes.len()
                )));
            }
            let mut word = [0u8; WORD_SIZE];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word.to_vec())
        }
        (AbiType::String, Value::String(text)) => Ok(encode_dynamic_bytes(text.as_bytes())),
        (AbiType::Bytes, Value::Bytes(bytes)) => Ok(encode_dynamic_bytes(bytes)),
        (AbiType::Array(inner, len), Value::Array(values)) => {
            if values.len() != *len {
                return Err(AbiError::pack_failed(format!(
                    "{ty} given {} elements",
                    values.len()
                )));
            }
            encode(&repeated(inner, *len), values)
        }
        (AbiType::Slice(inner), Value::Slice(values)) => {
            let mut out = usize_word(values.len()).to_vec();
            out.extend(encode(&repeated(inner, values.len()), values)?);
            Ok(out)
        }
        _ => Err(mismatch()),
    }
}

fn decode_value(ty: &AbiType, data: &[u8]) -> AbiResult<Value> {
    match ty {
        AbiType::Uint(bits) => {
            let n = BigInt::from(BigUint::from_bytes_be(read_word(data, 0)?));
            check_int_range(&n, *bits, false).map_err(AbiError::unpack_failed)?;
            Ok(Value::Int(n))
        }
        AbiType::Int(bits) => {
            let word = read_word(data, 0)?;
            let mut n = BigInt::from(BigUint::from_bytes_be(word));
            if word[0] & 0x80 != 0 {
                n -= BigInt::one() << 256;
            }
            check_int_range(&n, *bits, true).map_err(AbiError::unpack_failed)?;
            Ok(Value::Int(n))
        }
        AbiType::Bool => match read_usize(read_word(data, 0)?) {
            Ok(0) => Ok(Value::Bool(false)),
            Ok(1) => Ok(Value::Bool(true)),
            _ => Err(AbiError::unpack_failed("bool must be 0 or 1")),
        },
        AbiType::Address => {
            let bytes = strip_left_pad(read_word(data, 0)?, ADDRESS_SIZE, "address")?;
            Address::from_bytes(bytes)
                .map(Value::Address)
                .map_err(|err| AbiError::unpack_failed(err.to_string()))
        }
        AbiType::TokenStandard => {
            let bytes = strip_left_pad(read_word(data, 0)?, TOKEN_STANDARD_SIZE, "token standard")?;
            TokenStandard::from_bytes(bytes)
                .map(Value::TokenStandard)
                .map_err(|err| AbiError::unpack_failed(err.to_string()))
        }
        AbiType::Hash => Hash::from_bytes(read_word(data, 0)?)
            .map(Value::Hash)
            .map_err(|err| AbiError::unpack_failed(err.to_string())),
        AbiType::FixedBytes(len) => {
            let word = read_word(data, 0)?;
            if word[*len..].iter().any(|b| *b != 0) {
                return Err(AbiError::unpack_failed(format!("bytes{len} has non-zero padding")));
            }
            Ok(Value::FixedBytes(word[..*len].to_vec()))
        }
        AbiType::String => {
            let bytes = decode_dynamic_bytes(data)?;
            String::from_utf8(bytes)
                .map(Value::String)
                .map_err(|_| AbiError::unpack_failed("string is not valid utf-8"))
        }
        AbiType::Bytes => decode_dynamic_bytes(data).map(Value::Bytes),
        AbiType::Array(inner, len) => decode(&repeated(inner, *len), data).map(Value::Array),
        AbiType::Slice(inner) => {
            let len = read_usize(read_word(data, 0)?)?;
            let body = &data[WORD_SIZE..];
            // every element occupies at least one head word
            if len.checked_mul(WORD_SIZE).map_or(true, |need| need > body.len()) {
                return Err(AbiError::unpack_failed("slice length exceeds input"));
            }
            decode(&repeated(inner, len), body).map(Value::Slice)
        }
    }
}

fn repeated(ty: &AbiType, len: usize) -> Vec<AbiType> {
    vec![ty.clone(); len]
}

fn usize_word(value: usize) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

fn left_pad(bytes: &[u8]) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
    word
}

fn strip_left_pad<'a>(word: &'a [u8], len: usize, what: &str) -> AbiResult<&'a [u8]> {
    let (pad, body) = word.split_at(WORD_SIZE - len);
    if pad.iter().any(|b| *b != 0) {
        return Err(AbiError::unpack_failed(format!("{what} has non-zero padding")));
    }
    Ok(body)
}

fn int_bounds(bits: usize, signed: bool) -> (BigInt, BigInt) {
    if signed {
        let half = BigInt::one() << (bits - 1);
        (-half.clone(), half - 1)
    } else {
        (BigInt::zero(), (BigInt::one() << bits) - 1)
    }
}

fn check_int_range(value: &BigInt, bits: usize, signed: bool) -> Result<(), String> {
    let (min, max) = int_bounds(bits, signed);
    if *value < min || *value > max {
        let kind = if signed { "int" } else { "uint" };
        return Err(format!("{value} out of range for {kind}{bits}"));
    }
    Ok(())
}

fn int_word(value: &BigInt, bits: usize, signed: bool) -> AbiResult<[u8; WORD_SIZE]> {
    check_int_range(value, bits, signed).map_err(AbiError::pack_failed)?;
    let unsigned = if value.sign() == Sign::Minus {
        value + (BigInt::one() << 256)
    } else {
        value.clone()
    };
    Ok(left_pad(&unsigned.to_bytes_be().1))
}

fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD_SIZE) * WORD_SIZE;
    let mut out = Vec::with_capacity(WORD_SIZE + padded);
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(WORD_SIZE + padded, 0);
    out
}

fn decode_dynamic_bytes(data: &[u8]) -> AbiResult<Vec<u8>> {
    let len = read_usize(read_word(data, 0)?)?;
    let padded = len
        .checked_add(WORD_SIZE - 1)
        .map(|n| n / WORD_SIZE * WORD_SIZE)
        .ok_or_else(|| AbiError::unpack_failed("length overflow"))?;
    let body = data
        .get(WORD_SIZE..)
        .and_then(|rest| rest.get(..padded))
        .ok_or_else(|| AbiError::unpack_failed("unexpected end of input"))?;
    if body[len..].iter().any(|b| *b != 0) {
        return Err(AbiError::unpack_failed("non-zero padding after dynamic bytes"));
    }
    Ok(body[..len].to_vec())
}

fn read_word(data: &[u8], offset: usize) -> AbiResult<&[u8]> {
    offset
        .checked_add(WORD_SIZE)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| AbiError::unpack_failed("unexpected end of input"))
}

fn read_usize(word: &[u8]) -> AbiResult<usize> {
    let (high, low) = word.split_at(WORD_SIZE - 8);
    if high.iter().any(|b| *b != 0) {
        return Err(AbiError::unpack_failed("length or offset too large"));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(bytes))
        .map_err(|_| AbiError::unpack_failed("length or offset too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(text: &str) -> AbiType {
        AbiType::parse(text).unwrap()
    }

    #[test]
    fn test_static_layout() {
        let zts = TokenStandard::from_array([9u8; 10]);
        let data = encode(
            &[ty("uint8"), ty("bool"), ty("tokenStandard")],
            &[Value::from(5u64), Value::from(true), Value::from(zts)],
        )
        .unwrap();
        assert_eq!(data.len(), 96);
        assert_eq!(data[31], 5);
        assert_eq!(data[63], 1);
        assert!(data[64..86].iter().all(|b| *b == 0));
        assert_eq!(&data[86..96], &[9u8; 10]);
    }

    #[test]
    fn test_string_layout() {
        let data = encode(&[ty("string"), ty("uint256")], &[Value::from("abc"), Value::from(1u64)]).unwrap();
        // head: offset, uint; tail: length, content
        assert_eq!(data.len(), 128);
        assert_eq!(data[31], 64);
        assert_eq!(data[63], 1);
        assert_eq!(data[95], 3);
        assert_eq!(&data[96..99], b"abc");
    }

    #[test]
    fn test_negative_int_is_twos_complement() {
        let data = encode(&[ty("int64")], &[Value::from(-1i64)]).unwrap();
        assert!(data.iter().all(|b| *b == 0xff));
        let values = decode(&[ty("int64")], &data).unwrap();
        assert_eq!(values, vec![Value::from(-1i64)]);
    }

    #[test]
    fn test_out_of_range_rejected_both_ways() {
        assert!(matches!(
            encode(&[ty("uint8")], &[Value::from(256u64)]),
            Err(AbiError::PackFailed(_))
        ));
        assert!(matches!(
            encode(&[ty("uint8")], &[Value::from(-1i64)]),
            Err(AbiError::PackFailed(_))
        ));
        let wide = encode(&[ty("uint16")], &[Value::from(256u64)]).unwrap();
        assert!(matches!(decode(&[ty("uint8")], &wide), Err(AbiError::UnpackFailed(_))));
    }

    #[test]
    fn test_bool_must_be_zero_or_one() {
        let two = encode(&[ty("uint8")], &[Value::from(2u64)]).unwrap();
        assert!(decode(&[ty("bool")], &two).is_err());
    }

    #[test]
    fn test_variant_mismatch() {
        let err = encode(&[ty("address")], &[Value::from(1u64)]).unwrap_err();
        assert!(matches!(err, AbiError::PackFailed(_)));
        let err = encode(&[ty("uint256[2]")], &[Value::Slice(vec![Value::from(1u64), Value::from(2u64)])]).unwrap_err();
        assert!(matches!(err, AbiError::PackFailed(_)));
    }

    #[test]
    fn test_nested_dynamic_arrays() {
        let types = [ty("string[]"), ty("bytes32[2][]")];
        let values = vec![
            Value::Slice(vec![Value::from("a"), Value::from("longer than one word of text, certainly")]),
            Value::Slice(vec![Value::Array(vec![
                Value::FixedBytes(vec![1u8; 32]),
                Value::FixedBytes(vec![2u8; 32]),
            ])]),
        ];
        let data = encode(&types, &values).unwrap();
        assert_eq!(data.len() % WORD_SIZE, 0);
        assert_eq!(decode(&types, &data).unwrap(), values);
    }

    #[test]
    fn test_truncated_input() {
        let data = encode(&[ty("string")], &[Value::from("hello")]).unwrap();
        assert!(decode(&[ty("string")], &data[..data.len() - 1]).is_err());
        assert!(decode(&[ty("hash")], &[0u8; 31]).is_err());
    }

    #[test]
    fn test_huge_slice_length_rejected() {
        let mut data = usize_word(32).to_vec();
        data.extend_from_slice(&usize_word(1_000_000));
        assert!(decode(&[ty("uint256[]")], &data).is_err());
    }
}
