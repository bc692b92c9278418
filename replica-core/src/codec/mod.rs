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

//! The three wire formats. Each codec is written purely against the node
//! abstraction and the registry; the traversal loop is the same everywhere,
//! only the token shapes differ.

pub mod binary;
pub mod json;
pub mod proto;

/// What a reader does when the wire carries a member the target schema
/// cannot fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownMembers {
    /// Raise a serialization error.
    #[default]
    Error,
    /// Discard the member's bytes and continue. The binary format is not
    /// self-describing, so its skip additionally needs the member's declared
    /// shape (a phantom or unsettable member); JSON and proto can skip
    /// anything.
    Skip,
}

#[derive(Clone, Copy, Debug)]
pub struct BinaryConfig {
    pub unknown_members: UnknownMembers,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        BinaryConfig {
            unknown_members: UnknownMembers::Skip,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonConfig {
    /// Lower-case member names on write and lookup, applied symmetrically.
    pub lower_case_names: bool,
    pub unknown_members: UnknownMembers,
}

#[derive(Clone, Copy, Debug)]
pub struct ProtoConfig {
    pub unknown_members: UnknownMembers,
}

impl Default for ProtoConfig {
    fn default() -> Self {
        ProtoConfig {
            unknown_members: UnknownMembers::Skip,
        }
    }
}
