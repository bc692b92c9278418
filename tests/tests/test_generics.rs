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

use replica_core::model::Replicated;
use replica_core::replica::Replica;
use replica_derive::Replicate;

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct GenericHolder<T> {
    value: T,
    prop: String,
}

#[test]
fn generic_instantiation_round_trips() {
    let mut replica = Replica::new();
    replica.register::<GenericHolder<String>>().unwrap();
    let value = GenericHolder {
        value: "herp".to_string(),
        prop: "derp".to_string(),
    };
    let back: GenericHolder<String> = replica
        .from_bytes(&replica.to_bytes(&value).unwrap())
        .unwrap();
    assert_eq!(value, back);
    let back: GenericHolder<String> = replica
        .from_json(&replica.to_json(&value).unwrap())
        .unwrap();
    assert_eq!(value, back);
    let back: GenericHolder<String> = replica
        .from_proto(&replica.to_proto(&value).unwrap())
        .unwrap();
    assert_eq!(value, back);
}

#[test]
fn nested_generics_round_trip_recursively() {
    let mut replica = Replica::new();
    replica
        .register::<GenericHolder<GenericHolder<i32>>>()
        .unwrap();
    let value = GenericHolder {
        value: GenericHolder {
            value: 41,
            prop: "inner".to_string(),
        },
        prop: "outer".to_string(),
    };
    let back: GenericHolder<GenericHolder<i32>> = replica
        .from_bytes(&replica.to_bytes(&value).unwrap())
        .unwrap();
    assert_eq!(value, back);
    let back: GenericHolder<GenericHolder<i32>> = replica
        .from_json(&replica.to_json(&value).unwrap())
        .unwrap();
    assert_eq!(value, back);
}

// Generic arguments are part of the type key, so every instantiation is its
// own registry entry sharing the name component.
#[test]
fn instantiations_are_keyed_by_full_argument_list() {
    let mut replica = Replica::new();
    replica.register::<GenericHolder<i32>>().unwrap();
    replica.register::<GenericHolder<String>>().unwrap();

    assert_eq!(
        <GenericHolder<GenericHolder<i32>> as Replicated>::type_key().render(),
        "GenericHolder<GenericHolder<i32>>"
    );
    assert!(replica
        .registry()
        .contains(&<GenericHolder<i32> as Replicated>::type_key()));
    assert!(replica
        .registry()
        .contains(&<GenericHolder<String> as Replicated>::type_key()));
    assert!(!replica
        .registry()
        .contains(&<GenericHolder<f64> as Replicated>::type_key()));
}

#[test]
fn generic_member_inside_a_concrete_type() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Envelope {
        payload: GenericHolder<Vec<i32>>,
    }

    let mut replica = Replica::new();
    replica.register::<Envelope>().unwrap();
    let value = Envelope {
        payload: GenericHolder {
            value: vec![1, 2, 3],
            prop: "ints".to_string(),
        },
    };
    let back: Envelope = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}
