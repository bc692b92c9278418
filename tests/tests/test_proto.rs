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

use std::collections::HashMap;

use replica_core::codec::UnknownMembers;
use replica_core::error::Error;
use replica_core::replica::Replica;
use replica_derive::Replicate;

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct PropClass {
    property: i32,
}

// Field index 0 becomes proto field number 1: tag (1 << 3) | varint = 0x08.
#[test]
fn single_varint_field_literal() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    let bytes = replica.to_proto(&PropClass { property: 3 }).unwrap();
    assert_eq!(bytes, vec![0x08, 0x03]);
    let back: PropClass = replica.from_proto(&bytes).unwrap();
    assert_eq!(back.property, 3);
}

#[test]
fn mixed_scalar_kinds_round_trip() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Mixed {
        flag: bool,
        count: i64,
        ratio: f32,
        exact: f64,
        name: String,
        level: Option<i32>,
    }

    let mut replica = Replica::new();
    replica.register::<Mixed>().unwrap();
    let value = Mixed {
        flag: true,
        count: 1 << 40,
        ratio: 0.5,
        exact: -2.25,
        name: "proto".to_string(),
        level: Some(12),
    };
    let back: Mixed = replica.from_proto(&replica.to_proto(&value).unwrap()).unwrap();
    assert_eq!(value, back);

    let absent = Mixed {
        level: None,
        ..value
    };
    let back: Mixed = replica.from_proto(&replica.to_proto(&absent).unwrap()).unwrap();
    assert_eq!(absent, back);
}

#[test]
fn zigzag_members_use_signed_varints() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Delta {
        #[replica(zigzag)]
        shift: i64,
    }

    let mut replica = Replica::new();
    replica.register::<Delta>().unwrap();
    // zigzag(-3) = 5
    let bytes = replica.to_proto(&Delta { shift: -3 }).unwrap();
    assert_eq!(bytes, vec![0x08, 0x05]);
    let back: Delta = replica.from_proto(&bytes).unwrap();
    assert_eq!(back.shift, -3);
}

#[test]
fn negative_default_encoding_round_trips() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Plain {
        value: i32,
    }

    let mut replica = Replica::new();
    replica.register::<Plain>().unwrap();
    // two's-complement cast through u64: ten varint bytes on the wire
    let bytes = replica.to_proto(&Plain { value: -1 }).unwrap();
    assert_eq!(bytes.len(), 11);
    let back: Plain = replica.from_proto(&bytes).unwrap();
    assert_eq!(back.value, -1);
}

#[test]
fn repeated_fields_emit_one_tag_per_element() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Batch {
        values: Vec<i32>,
        label: String,
    }

    let mut replica = Replica::new();
    replica.register::<Batch>().unwrap();
    let value = Batch {
        values: vec![1, 2],
        label: "b".to_string(),
    };
    let bytes = replica.to_proto(&value).unwrap();
    assert_eq!(
        bytes,
        vec![0x08, 0x01, 0x08, 0x02, 0x12, 0x01, b'b']
    );
    let back: Batch = replica.from_proto(&bytes).unwrap();
    assert_eq!(value, back);
}

// Repeated tags accumulate into the collection member even when interleaved
// with other fields.
#[test]
fn interleaved_repeated_tags_accumulate() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Batch {
        values: Vec<i32>,
        label: String,
    }

    let mut replica = Replica::new();
    replica.register::<Batch>().unwrap();
    let bytes = [0x08, 0x01, 0x12, 0x01, b'b', 0x08, 0x02, 0x08, 0x03];
    let back: Batch = replica.from_proto(&bytes).unwrap();
    assert_eq!(back.values, vec![1, 2, 3]);
    assert_eq!(back.label, "b");
}

#[test]
fn nested_messages_are_length_prefixed() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Inner {
        value: i32,
    }

    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Outer {
        inner: Inner,
        tail: i32,
    }

    let mut replica = Replica::new();
    replica.register::<Outer>().unwrap();
    let value = Outer {
        inner: Inner { value: 3 },
        tail: 9,
    };
    let bytes = replica.to_proto(&value).unwrap();
    // field 1 length-delimited [0x08 0x03], field 2 varint 9
    assert_eq!(bytes, vec![0x0A, 0x02, 0x08, 0x03, 0x10, 0x09]);
    let back: Outer = replica.from_proto(&bytes).unwrap();
    assert_eq!(value, back);
}

#[test]
fn maps_round_trip_as_entry_messages() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Lookup {
        entries: HashMap<String, i32>,
    }

    let mut replica = Replica::new();
    replica.register::<Lookup>().unwrap();
    let value = Lookup {
        entries: HashMap::from([("a".to_string(), 1), ("b".to_string(), 2)]),
    };
    let back: Lookup = replica.from_proto(&replica.to_proto(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn unknown_tags_are_skipped_by_wire_type() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Pair {
        x: i32,
        y: i32,
    }

    let mut replica = Replica::new();
    replica.register::<Pair>().unwrap();
    // field 1 = 5, unknown length-delimited field 3, then field 2 = 7
    let bytes = [0x08, 0x05, 0x1A, 0x02, 0xAA, 0xBB, 0x10, 0x07];
    let back: Pair = replica.from_proto(&bytes).unwrap();
    assert_eq!(back, Pair { x: 5, y: 7 });

    // unknown fixed-width fields skip their implied length
    let bytes = [0x1D, 0x01, 0x02, 0x03, 0x04, 0x08, 0x05];
    let back: Pair = replica.from_proto(&bytes).unwrap();
    assert_eq!(back.x, 5);
}

#[test]
fn unknown_tag_error_policy() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Pair {
        x: i32,
        y: i32,
    }

    let mut replica = Replica::new().proto_unknown_members(UnknownMembers::Error);
    replica.register::<Pair>().unwrap();
    let bytes = [0x08, 0x05, 0x1A, 0x02, 0xAA, 0xBB];
    let result: Result<Pair, Error> = replica.from_proto(&bytes);
    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn collections_are_not_independently_serializable() {
    let mut replica = Replica::new();
    replica.register::<Vec<i32>>().unwrap();
    let result = replica.to_proto(&vec![1, 2, 3]);
    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn null_top_level_is_the_empty_buffer() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    let bytes = replica.to_proto(&None::<PropClass>).unwrap();
    assert!(bytes.is_empty());
    let back: Option<PropClass> = replica.from_proto(&bytes).unwrap();
    assert_eq!(back, None);
}

#[test]
fn malformed_tag_aborts_the_call() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    // wire type 3 (group) is not supported
    let result: Result<PropClass, Error> = replica.from_proto(&[0x0B]);
    assert!(matches!(result, Err(Error::Serialization(_))));
    // field number 0 is illegal
    let result: Result<PropClass, Error> = replica.from_proto(&[0x00, 0x01]);
    assert!(matches!(result, Err(Error::Serialization(_))));
}
