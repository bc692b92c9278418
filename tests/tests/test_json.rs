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

use replica_core::codec::UnknownMembers;
use replica_core::error::Error;
use replica_core::node::Untyped;
use replica_core::replica::Replica;
use replica_derive::Replicate;

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct PropClass {
    #[replica(name = "Property")]
    property: i32,
}

#[test]
fn object_literal_shape() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    let json = replica.to_json(&PropClass { property: 3 }).unwrap();
    assert_eq!(json, r#"{"Property": 3}"#);
    let back: PropClass = replica.from_json(&json).unwrap();
    assert_eq!(back.property, 3);
}

#[test]
fn array_literal_shape() {
    let mut replica = Replica::new();
    replica.register::<Vec<i32>>().unwrap();
    let json = replica.to_json(&vec![1, 2, 3, 4]).unwrap();
    assert_eq!(json, "[1, 2, 3, 4]");
    let back: Vec<i32> = replica.from_json(&json).unwrap();
    assert_eq!(back, vec![1, 2, 3, 4]);
}

#[test]
fn null_at_any_position() {
    let mut replica = Replica::new();
    replica.register::<Vec<Option<i32>>>().unwrap();

    let back: Option<i32> = replica.from_json("null").unwrap();
    assert_eq!(back, None);
    assert_eq!(replica.to_json(&None::<i32>).unwrap(), "null");

    // null is legal where a collection or object is expected too
    let back: Option<Vec<Option<i32>>> = replica.from_json("null").unwrap();
    assert_eq!(back, None);
    let back: Option<PropClass> = {
        let mut replica = Replica::new();
        replica.register::<PropClass>().unwrap();
        replica.from_json("null").unwrap()
    };
    assert_eq!(back, None);
}

#[test]
fn whitespace_is_skipped_between_tokens() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    let back: PropClass = replica
        .from_json(" {\n\t\"Property\" :\r 3 } ")
        .unwrap();
    assert_eq!(back.property, 3);
}

#[test]
fn fixed_escape_table_round_trips() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Text {
        value: String,
    }

    let mut replica = Replica::new();
    replica.register::<Text>().unwrap();
    let value = Text {
        value: "a\"b\\c\nd\te".to_string(),
    };
    let json = replica.to_json(&value).unwrap();
    assert_eq!(json, "{\"value\": \"a\\\"b\\\\c\\nd\\te\"}");
    let back: Text = replica.from_json(&json).unwrap();
    assert_eq!(value, back);
}

#[test]
fn unknown_member_name_is_an_error_by_default() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    let result: Result<PropClass, Error> = replica.from_json(r#"{"Nope": 1}"#);
    assert!(matches!(result, Err(Error::Serialization(_))));
}

#[test]
fn unknown_member_skip_policy_discards_whole_values() {
    let mut replica = Replica::new().json_unknown_members(UnknownMembers::Skip);
    replica.register::<PropClass>().unwrap();
    let back: PropClass = replica
        .from_json(r#"{"Nope": {"deep": [1, {"x": "y"}, null]}, "Property": 3, "Also": false}"#)
        .unwrap();
    assert_eq!(back.property, 3);
}

#[test]
fn lower_case_policy_applies_symmetrically() {
    let mut replica = Replica::new().json_lower_case(true);
    replica.register::<PropClass>().unwrap();
    let json = replica.to_json(&PropClass { property: 3 }).unwrap();
    assert_eq!(json, r#"{"property": 3}"#);
    let back: PropClass = replica.from_json(&json).unwrap();
    assert_eq!(back.property, 3);
}

#[test]
fn numbers_parse_by_target_kind() {
    let replica = Replica::new();
    let back: f64 = replica.from_json("1.5e2").unwrap();
    assert_eq!(back, 150.0);
    let back: i64 = replica.from_json("-42").unwrap();
    assert_eq!(back, -42);
    let back: u64 = replica.from_json("18446744073709551615").unwrap();
    assert_eq!(back, u64::MAX);
    let result: Result<i32, Error> = replica.from_json("1.5");
    assert!(result.is_err());
}

#[test]
fn tuples_serialize_as_arrays() {
    let mut replica = Replica::new();
    replica.register::<(i32, String)>().unwrap();
    let value = (7, "seven".to_string());
    let json = replica.to_json(&value).unwrap();
    assert_eq!(json, r#"[7, "seven"]"#);
    let back: (i32, String) = replica.from_json(&json).unwrap();
    assert_eq!(value, back);
}

#[test]
fn blobs_serialize_as_number_arrays() {
    let mut replica = Replica::new();
    replica.register::<Vec<u8>>().unwrap();
    let json = replica.to_json(&vec![1u8, 2, 255]).unwrap();
    assert_eq!(json, "[1, 2, 255]");
    let back: Vec<u8> = replica.from_json(&json).unwrap();
    assert_eq!(back, vec![1, 2, 255]);
}

#[test]
fn dates_use_iso_literals() {
    let replica = Replica::new();
    let date = chrono::NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
    let json = replica.to_json(&date).unwrap();
    assert_eq!(json, "\"2021-06-15\"");
    let back: chrono::NaiveDate = replica.from_json(&json).unwrap();
    assert_eq!(back, date);
}

#[test]
fn dynamic_parse_infers_shape_from_data() {
    let replica = Replica::new();
    let tree = replica
        .parse_dynamic(r#"{"a": [1, 2.5, "x", null, true], "b": {"c": -3}}"#)
        .unwrap();
    let a = tree.get("a").unwrap();
    match a {
        Untyped::Array(items) => {
            assert_eq!(items[0], Untyped::Int(1));
            assert_eq!(items[1], Untyped::Float(2.5));
            assert_eq!(items[2], Untyped::Str("x".to_string()));
            assert!(items[3].is_null());
            assert_eq!(items[4], Untyped::Bool(true));
        }
        other => panic!("expected an array, got {other:?}"),
    }
    assert_eq!(tree.get("b").unwrap().get("c"), Some(&Untyped::Int(-3)));
}

#[test]
fn malformed_input_aborts_the_call() {
    let mut replica = Replica::new();
    replica.register::<PropClass>().unwrap();
    for bad in [
        r#"{"Property" 3}"#,
        r#"{"Property": 3"#,
        r#"{"Property": }"#,
        r#"{"Property": 3} extra"#,
    ] {
        let result: Result<PropClass, Error> = replica.from_json(bad);
        assert!(result.is_err(), "accepted {bad:?}");
    }
}
