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

// Unit-variant enums travel as their underlying integer kind. Explicit
// discriminants are honored and later variants continue from them.
#[derive(Replicate, Clone, Copy, Default, Debug, PartialEq)]
enum Status {
    #[default]
    Idle,
    Running = 5,
    Done,
}

#[test]
fn discriminants_follow_declaration() {
    let mut replica = Replica::new();
    replica.register::<Status>().unwrap();
    assert_eq!(replica.to_json(&Status::Idle).unwrap(), "0");
    assert_eq!(replica.to_json(&Status::Running).unwrap(), "5");
    assert_eq!(replica.to_json(&Status::Done).unwrap(), "6");
}

#[test]
fn enum_round_trips_as_integer() {
    let mut replica = Replica::new();
    replica.register::<Status>().unwrap();

    let bytes = replica.to_bytes(&Status::Running).unwrap();
    assert_eq!(bytes, vec![0x01, 0x05, 0x00, 0x00, 0x00]);
    let back: Status = replica.from_bytes(&bytes).unwrap();
    assert_eq!(back, Status::Running);

    let back: Status = replica.from_json("6").unwrap();
    assert_eq!(back, Status::Done);
}

#[test]
fn enum_member_round_trips_everywhere() {
    #[derive(Replicate, Clone, Default, Debug, PartialEq)]
    struct Job {
        name: String,
        status: Status,
    }

    let mut replica = Replica::new();
    replica.register::<Job>().unwrap();
    let value = Job {
        name: "ingest".to_string(),
        status: Status::Done,
    };
    let back: Job = replica.from_bytes(&replica.to_bytes(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Job = replica.from_json(&replica.to_json(&value).unwrap()).unwrap();
    assert_eq!(value, back);
    let back: Job = replica.from_proto(&replica.to_proto(&value).unwrap()).unwrap();
    assert_eq!(value, back);
}

#[test]
fn unknown_discriminant_is_an_error() {
    let mut replica = Replica::new();
    replica.register::<Status>().unwrap();
    let result: Result<Status, Error> = replica.from_json("9");
    assert!(matches!(result, Err(Error::Serialization(_))));
    let result: Result<Status, Error> = replica.from_bytes(&[0x01, 0x09, 0x00, 0x00, 0x00]);
    assert!(matches!(result, Err(Error::Serialization(_))));
}
