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

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::error::Error;
use crate::types::ScalarKind;

/// Raw scalar carried by a primitive node, independent of any backing type.
///
/// Codecs move scalars, not concrete Rust values; the accessor's `make`
/// operation narrows or widens a decoded scalar onto the declared member
/// type, so a stream may legally carry a wider integer than the member holds.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::Str(_) => ScalarKind::Str,
            Scalar::Date(_) => ScalarKind::Date,
            Scalar::Timestamp(_) => ScalarKind::Timestamp,
        }
    }

    /// Integer view of any bool/integer scalar. Floats and strings do not
    /// convert implicitly.
    pub fn as_i64(&self) -> Result<i64, Error> {
        match self {
            Scalar::Bool(v) => Ok(*v as i64),
            Scalar::I8(v) => Ok(*v as i64),
            Scalar::I16(v) => Ok(*v as i64),
            Scalar::I32(v) => Ok(*v as i64),
            Scalar::I64(v) => Ok(*v),
            Scalar::U8(v) => Ok(*v as i64),
            Scalar::U16(v) => Ok(*v as i64),
            Scalar::U32(v) => Ok(*v as i64),
            Scalar::U64(v) => Ok(*v as i64),
            other => Err(Error::serialization(format!(
                "scalar {:?} is not an integer",
                other.kind()
            ))),
        }
    }

    pub fn as_f64(&self) -> Result<f64, Error> {
        match self {
            Scalar::F32(v) => Ok(*v as f64),
            Scalar::F64(v) => Ok(*v),
            other => Ok(other.as_i64()? as f64),
        }
    }

    pub fn into_i32(self) -> Result<i32, Error> {
        Ok(self.as_i64()? as i32)
    }

    pub fn into_string(self) -> Result<String, Error> {
        match self {
            Scalar::Str(s) => Ok(s),
            other => Err(Error::serialization(format!(
                "scalar {:?} is not a string",
                other.kind()
            ))),
        }
    }

    /// Converts this scalar to the requested kind. Integers narrow/widen with
    /// two's-complement cast semantics; bools interconvert with integers;
    /// dates and timestamps accept their wire integer forms (days since
    /// 1970-01-01 and milliseconds since the epoch).
    pub fn coerce(self, kind: ScalarKind) -> Result<Scalar, Error> {
        if self.kind() == kind {
            return Ok(self);
        }
        match kind {
            ScalarKind::Bool => Ok(Scalar::Bool(self.as_i64()? != 0)),
            ScalarKind::I8 => Ok(Scalar::I8(self.as_i64()? as i8)),
            ScalarKind::I16 => Ok(Scalar::I16(self.as_i64()? as i16)),
            ScalarKind::I32 => Ok(Scalar::I32(self.as_i64()? as i32)),
            ScalarKind::I64 => Ok(Scalar::I64(self.as_i64()?)),
            ScalarKind::U8 => Ok(Scalar::U8(self.as_i64()? as u8)),
            ScalarKind::U16 => Ok(Scalar::U16(self.as_i64()? as u16)),
            ScalarKind::U32 => Ok(Scalar::U32(self.as_i64()? as u32)),
            ScalarKind::U64 => Ok(Scalar::U64(self.as_i64()? as u64)),
            ScalarKind::F32 => Ok(Scalar::F32(self.as_f64()? as f32)),
            ScalarKind::F64 => Ok(Scalar::F64(self.as_f64()?)),
            ScalarKind::Str => Err(Error::serialization(format!(
                "cannot coerce {:?} to a string",
                self.kind()
            ))),
            ScalarKind::Date => {
                let days = self.as_i64()?;
                date_from_days(days).map(Scalar::Date)
            }
            ScalarKind::Timestamp => {
                let millis = self.as_i64()?;
                timestamp_from_millis(millis).map(Scalar::Timestamp)
            }
        }
    }
}

/// Days since 1970-01-01, the binary/proto wire form of a date.
pub fn days_from_date(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days()
}

pub fn date_from_days(days: i64) -> Result<NaiveDate, Error> {
    let epoch = NaiveDate::default();
    let shifted = if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| Error::serialization(format!("date out of range: {days} days")))
}

/// Milliseconds since the epoch, the binary/proto wire form of a timestamp.
pub fn millis_from_timestamp(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

pub fn timestamp_from_millis(millis: i64) -> Result<NaiveDateTime, Error> {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.naive_utc())
        .ok_or_else(|| Error::serialization(format!("timestamp out of range: {millis} ms")))
}
