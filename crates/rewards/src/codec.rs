// Copyright 2026 Boundless Foundation, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON encoding of 256-bit amounts.
//!
//! Amounts are persisted as `{"type": "bigint", "value": "0x…"}` objects so that
//! entity documents stay readable and sort-independent of the host's numeric
//! limits. The codec is a pair of free functions plus a serde adapter usable with
//! `#[serde(with = "network_rewards::codec::json_bigint")]`.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Discriminator written into every encoded amount.
pub const BIGINT_TYPE: &str = "bigint";

/// Wire form of an encoded amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBigInt {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// Encode an amount as a tagged hex string.
pub fn encode_big_int(value: U256) -> JsonBigInt {
    JsonBigInt { kind: BIGINT_TYPE.to_string(), value: format!("0x{value:x}") }
}

/// Decode a tagged hex string back into an amount.
pub fn decode_big_int(encoded: &JsonBigInt) -> Result<U256, CodecError> {
    if encoded.kind != BIGINT_TYPE {
        return Err(CodecError::UnexpectedType(encoded.kind.clone()));
    }
    let digits = encoded
        .value
        .strip_prefix("0x")
        .ok_or_else(|| CodecError::InvalidHex(encoded.value.clone()))?;
    if digits.is_empty() {
        return Err(CodecError::InvalidHex(encoded.value.clone()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| CodecError::InvalidHex(encoded.value.clone()))
}

/// Serde adapter for `U256` fields stored in the tagged form.
pub mod json_bigint {
    use alloy::primitives::U256;
    use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

    use super::{decode_big_int, encode_big_int, JsonBigInt};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        encode_big_int(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let encoded = JsonBigInt::deserialize(deserializer)?;
        decode_big_int(&encoded).map_err(D::Error::custom)
    }
}
