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

use replica_core::error::Error;
use replica_core::replica::Replica;
use replica_derive::Replicate;

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct Account {
    id: i32,
}

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct AccountWire {
    id: i32,
}

// The conversion pair is a fixed deterministic transform, so the round trip
// is not byte-identical to the input: the id comes back incremented.
#[test]
fn conversion_pair_applies_on_the_way_out() {
    let mut replica = Replica::new();
    replica
        .register_surrogate_with::<Account, AccountWire, _, _>(
            |a| AccountWire { id: a.id + 1 },
            |w| Account { id: w.id },
        )
        .unwrap();

    let bytes = replica.to_bytes(&Account { id: 1 }).unwrap();
    let back: Account = replica.from_bytes(&bytes).unwrap();
    assert_eq!(back.id, 2);

    let json = replica.to_json(&Account { id: 1 }).unwrap();
    assert_eq!(json, r#"{"id": 2}"#);
    let back: Account = replica.from_json(&json).unwrap();
    assert_eq!(back.id, 2);

    let proto = replica.to_proto(&Account { id: 1 }).unwrap();
    let back: Account = replica.from_proto(&proto).unwrap();
    assert_eq!(back.id, 2);
}

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct Celsius {
    degrees: i32,
}

#[derive(Replicate, Clone, Default, Debug, PartialEq)]
struct Fahrenheit {
    degrees: i32,
}

impl From<Celsius> for Fahrenheit {
    fn from(c: Celsius) -> Fahrenheit {
        Fahrenheit {
            degrees: c.degrees * 9 / 5 + 32,
        }
    }
}

impl From<Fahrenheit> for Celsius {
    fn from(f: Fahrenheit) -> Celsius {
        Celsius {
            degrees: (f.degrees - 32) * 5 / 9,
        }
    }
}

#[test]
fn from_impls_drive_the_conversion() {
    let mut replica = Replica::new();
    replica.register_surrogate::<Celsius, Fahrenheit>().unwrap();

    let json = replica.to_json(&Celsius { degrees: 100 }).unwrap();
    assert_eq!(json, r#"{"degrees": 212}"#);
    let back: Celsius = replica.from_json(&json).unwrap();
    assert_eq!(back.degrees, 100);
}

#[test]
fn structural_copy_matches_members_by_name() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Record {
        id: i32,
        note: String,
    }

    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct RecordWire {
        note: String,
        id: i32,
        checksum: u32,
    }

    let mut replica = Replica::new();
    replica
        .register_surrogate_structural::<Record, RecordWire>()
        .unwrap();

    let value = Record {
        id: 4,
        note: "kept".to_string(),
    };
    let back: Record = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(back, value);
}

#[test]
fn member_level_surrogate_wins_over_type_level() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Meters {
        value: i32,
    }

    // member-level stand-in, converted by structural copy
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Centis {
        value: i32,
    }

    // type-level stand-in whose conversion would skew the value
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Skewed {
        value: i32,
    }

    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Reading {
        #[replica(surrogate = "Centis")]
        depth: Meters,
    }

    let mut replica = Replica::new();
    replica.register::<Reading>().unwrap();
    replica
        .register_surrogate_with::<Meters, Skewed, _, _>(
            |m| Skewed {
                value: m.value + 10,
            },
            |s| Meters { value: s.value },
        )
        .unwrap();

    // the type-level pair would yield 17; the member-level structural copy
    // preserves 7, and only one of the two ever applies
    let back: Reading = replica
        .from_bytes(&replica.to_bytes(&Reading {
            depth: Meters { value: 7 },
        }).unwrap())
        .unwrap();
    assert_eq!(back.depth.value, 7);

    // a bare member of the same type still takes the type-level route
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Plain {
        depth: Meters,
    }
    replica.register::<Plain>().unwrap();
    let back: Plain = replica
        .from_bytes(&replica.to_bytes(&Plain {
            depth: Meters { value: 7 },
        }).unwrap())
        .unwrap();
    assert_eq!(back.depth.value, 17);
}

#[test]
fn chains_and_cycles_are_rejected_at_registration() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct A {
        v: i32,
    }
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct B {
        v: i32,
    }
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct C {
        v: i32,
    }

    let mut replica = Replica::new();
    replica.register_surrogate_structural::<A, B>().unwrap();
    // B is already in use as a surrogate: neither end of a new link may
    // reuse it
    assert!(matches!(
        replica.register_surrogate_structural::<B, C>(),
        Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
        replica.register_surrogate_structural::<B, A>(),
        Err(Error::InvalidOperation(_))
    ));
    assert!(matches!(
        replica.register_surrogate_structural::<C, B>(),
        Err(Error::InvalidOperation(_))
    ));
    // and A may not get a second stand-in
    assert!(matches!(
        replica.register_surrogate_structural::<A, C>(),
        Err(Error::InvalidOperation(_))
    ));
}
