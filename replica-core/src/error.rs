// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::borrow::Cow;

use thiserror::Error;

use crate::types::MarshalMethod;

/// Error type shared by the type model and the three codecs.
///
/// Prefer the static constructor functions over building variants directly;
/// they take anything convertible to `Cow<'static, str>` and keep error
/// construction out of the hot paths.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or unexpected wire content. Aborts the whole
    /// serialize/deserialize call.
    #[error("Serialization error: {0}")]
    Serialization(Cow<'static, str>),

    /// Read past the end of the input buffer.
    #[error("Buffer out of bound: {0} + {1} > {2}")]
    BufferOutOfBound(usize, usize, usize),

    /// A type was used before being registered.
    #[error("Type not registered: {0}")]
    TypeNotRegistered(Cow<'static, str>),

    /// A node view was requested that does not match the node's marshal
    /// method.
    #[error("Wrong node view: requested {requested:?}, node is {actual:?}")]
    WrongView {
        requested: MarshalMethod,
        actual: MarshalMethod,
    },

    /// Misuse of the type model: surrogate chains, key collisions,
    /// registration conflicts.
    #[error("Invalid operation: {0}")]
    InvalidOperation(Cow<'static, str>),

    /// Unknown RPC endpoint. Owned by the transport collaborators but raised
    /// through the same error family.
    #[error("Contract not found: {0}")]
    ContractNotFound(Cow<'static, str>),
}

impl Error {
    #[cold]
    pub fn serialization(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::Serialization(msg.into())
    }

    #[cold]
    pub fn buffer_out_of_bound(cursor: usize, additional: usize, len: usize) -> Error {
        Error::BufferOutOfBound(cursor, additional, len)
    }

    #[cold]
    pub fn type_not_registered(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::TypeNotRegistered(msg.into())
    }

    #[cold]
    pub fn wrong_view(requested: MarshalMethod, actual: MarshalMethod) -> Error {
        Error::WrongView { requested, actual }
    }

    #[cold]
    pub fn invalid_operation(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::InvalidOperation(msg.into())
    }

    #[cold]
    pub fn contract_not_found(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::ContractNotFound(msg.into())
    }
}

/// Returns early with the given error when the condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}
