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

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use replica_core::replica::Replica;
use replica_derive::Replicate;

#[test]
fn vectors_round_trip() {
    let mut replica = Replica::new();
    replica.register::<Vec<String>>().unwrap();
    let value = vec!["a".to_string(), "b".to_string()];
    let back: Vec<String> = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);

    let empty: Vec<String> = Vec::new();
    let back: Vec<String> = replica.from_bytes(&replica.to_bytes(&empty).unwrap()).unwrap();
    assert_eq!(back, empty);
}

#[test]
fn nullable_elements_round_trip() {
    let mut replica = Replica::new();
    replica.register::<Vec<Option<i32>>>().unwrap();
    let value = vec![Some(1), None, Some(3)];
    let back: Vec<Option<i32>> = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Vec<Option<i32>> = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn sets_round_trip() {
    let mut replica = Replica::new();
    replica.register::<HashSet<i32>>().unwrap();
    let value = HashSet::from([3, 1, 4, 1, 5]);
    let back: HashSet<i32> = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

// Dictionaries serialize as collections of key/value entry records.
#[test]
fn maps_round_trip() {
    let mut replica = Replica::new();
    replica.register::<HashMap<String, i32>>().unwrap();
    let value = HashMap::from([("one".to_string(), 1), ("two".to_string(), 2)]);
    let back: HashMap<String, i32> = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: HashMap<String, i32> = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn nested_map_values_round_trip() {
    let mut replica = Replica::new();
    replica.register::<HashMap<String, Vec<i32>>>().unwrap();
    let value = HashMap::from([("evens".to_string(), vec![2, 4]), ("odds".to_string(), vec![1])]);
    let back: HashMap<String, Vec<i32>> =
        replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn tuples_round_trip() {
    let mut replica = Replica::new();
    replica.register::<(i32, String, bool)>().unwrap();
    let value = (9, "nine".to_string(), true);
    let back: (i32, String, bool) = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: (i32, String, bool) = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

// Vec<u8> takes the blob fast path: one length-prefixed byte run, not an
// element-wise collection.
#[test]
fn byte_vectors_are_blobs() {
    let mut replica = Replica::new();
    replica.register::<Vec<u8>>().unwrap();
    let bytes = replica.to_bytes(&vec![1u8, 2, 3]).unwrap();
    assert_eq!(bytes, vec![0x01, 0x03, 0x00, 0x00, 0x00, 1, 2, 3]);
    let back: Vec<u8> = replica.from_bytes(&bytes).unwrap();
    assert_eq!(back, vec![1, 2, 3]);
}

#[test]
fn blob_members_round_trip_everywhere() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Payload {
        data: Vec<u8>,
    }

    let mut replica = Replica::new();
    replica.register::<Payload>().unwrap();
    let value = Payload {
        data: vec![0, 128, 255],
    };
    let back: Payload = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Payload = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Payload = replica.from_proto(&replica.to_proto(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn dates_and_timestamps_round_trip() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Stamped {
        day: NaiveDate,
        at: NaiveDateTime,
    }

    let mut replica = Replica::new();
    replica.register::<Stamped>().unwrap();
    let value = Stamped {
        day: NaiveDate::from_ymd_opt(1969, 12, 31).unwrap(),
        at: chrono::DateTime::from_timestamp_millis(1_600_000_000_123)
            .unwrap()
            .naive_utc(),
    };
    let back: Stamped = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Stamped = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Stamped = replica.from_proto(&replica.to_proto(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn collections_of_objects_round_trip() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    let mut replica = Replica::new();
    replica.register::<Vec<Point>>().unwrap();
    let value = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
    let back: Vec<Point> = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Vec<Point> = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}
