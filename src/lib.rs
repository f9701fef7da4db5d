//! [![license](https://img.shields.io/github/license/fussybeaver/bollard.svg)](https://github.com/fussybeaver/bollard/blob/master/LICENSE)
//!
//! # Bollard Flatten: Docker Swarm services as attribute trees
//!
//! Reads Docker Swarm service objects, as the Engine API returns them, and flattens them into
//! the generic attribute bag of a declarative state schema: string-keyed blocks of scalars,
//! lists, nested blocks and hashed sets.
//!
//! # Install
//!
//! Add the following to your `Cargo.toml` file
//!
//! ```nocompile
//! [dependencies]
//! bollard-flatten = "*"
//! ```
//!
//! # Usage
//!
//! Each Swarm structure has a flattener in the [`flatten`](flatten/index.html) module. A nested
//! block is a list of zero or one map; an absent input gives an empty list.
//!
//! ```rust
//! use bollard_flatten::flatten::flatten_service_update_or_rollback_config;
//! use bollard_flatten::service::{ServiceSpecUpdateConfig, UpdateFailureAction};
//! use bollard_flatten::value::Value;
//!
//! let config = ServiceSpecUpdateConfig {
//!     parallelism: Some(2),
//!     delay: Some(60_000_000_000),
//!     failure_action: Some(UpdateFailureAction::Rollback),
//!     ..Default::default()
//! };
//!
//! let state = flatten_service_update_or_rollback_config(Some(&config));
//! let block = state[0].as_map().unwrap();
//! assert_eq!(block["delay"], Value::from("1m"));
//! assert_eq!(block["max_failure_ratio"], Value::from("0.0"));
//! ```
//!
//! The full state of a service is read from an inspect payload:
//!
//! ```rust
//! use bollard_flatten::service::{flatten_service, ServiceStateOptions};
//!
//! let payload = r#"{
//!     "ID": "9mnpnzenvg8p8tdbtq4wvbkcz",
//!     "Spec": {
//!         "Name": "web",
//!         "Mode": { "Replicated": { "Replicas": 2 } },
//!         "TaskTemplate": { "ContainerSpec": { "Image": "nginx:alpine" } }
//!     }
//! }"#;
//!
//! let state = flatten_service(payload, &ServiceStateOptions { insert_defaults: true }).unwrap();
//! assert!(state.contains_key("update_config"));
//! ```
//!
//! ## Sets
//!
//! Unordered attributes are [`Set`](value/struct.Set.html)s: elements are identified by a hash
//! code, [`hash_string`](value/fn.hash_string.html) for plain strings and
//! [`hash_resource`](value/fn.hash_resource.html) for nested blocks.
//!
//! ## Errors
//!
//! The flatteners never fail. Parsing an inspect payload returns an
//! [`Error`](errors/enum.Error.html); enable the `json_data_content` feature to keep the
//! whole payload in data errors.
#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    unstable_features,
    unused_import_braces
)]
#![warn(rust_2018_idioms, trivial_numeric_casts, unused_qualifications)]

#[macro_use]
extern crate log;

pub mod errors;
pub mod flatten;
pub mod format;
pub mod service;
pub mod service_models;
pub mod value;
