//! Flatteners: one function per Swarm structure, each producing the attribute bag the state
//! schema stores for it.
//!
//! Single nested blocks are lists of zero or one map. An absent input yields an empty list
//! (or an empty set); an absent optional field is left out of the block rather than written
//! as a zero value.

use crate::format::{format_float, short_duration};
use crate::service_models::{
    EndpointPortConfig, HealthConfig, Mount, NetworkAttachmentConfig, Platform,
    ServiceSpecMode, ServiceSpecModeReplicated, ServiceSpecUpdateConfig, TaskSpecContainerSpecConfigs,
    TaskSpecContainerSpecDnsConfig, TaskSpecContainerSpecSecrets, TaskSpecLogDriver,
    TaskSpecPlacement, TaskSpecPlacementPreferences,
};
use crate::value::{hash_resource, hash_string, new_string_set, Map, Set, Value};

use std::collections::HashMap;

fn string_map(m: Option<&HashMap<String, String>>) -> Value {
    Value::from(m.cloned().unwrap_or_default())
}

fn non_empty(s: Option<&String>) -> Option<&String> {
    s.filter(|s| !s.is_empty())
}

fn non_empty_list(l: Option<&Vec<String>>) -> Option<&Vec<String>> {
    l.filter(|l| !l.is_empty())
}

/// Scheduling mode: `replicated` when the service runs a fixed number of tasks, and `global`
/// telling whether it runs one task per node.
pub fn flatten_service_mode(mode: Option<&ServiceSpecMode>) -> Vec<Value> {
    let mut m = Map::new();
    let mode = mode.copied().unwrap_or_default();
    if let Some(ref replicated) = mode.replicated {
        m.insert(
            "replicated".to_string(),
            Value::List(flatten_replicated(Some(replicated))),
        );
    }
    m.insert("global".to_string(), Value::Bool(mode.global.is_some()));
    vec![Value::Map(m)]
}

/// Replica count of a replicated service. Always a single block, empty if the count is unset.
pub fn flatten_replicated(replicated: Option<&ServiceSpecModeReplicated>) -> Vec<Value> {
    let mut m = Map::new();
    if let Some(replicas) = replicated.and_then(|r| r.replicas) {
        m.insert("replicas".to_string(), Value::from(replicas));
    }
    vec![Value::Map(m)]
}

/// Extra `/etc/hosts` entries as `{host, ip}` blocks.
///
/// Entries are read as `hostname:IP`, split at the first colon so an IPv6 address survives,
/// or in the Engine's `IP_address canonical_hostname [aliases...]` form.
pub fn flatten_service_hosts(hosts: Option<&[String]>) -> Vec<Value> {
    let hosts = match hosts {
        Some(hosts) if !hosts.is_empty() => hosts,
        _ => return Vec::new(),
    };

    hosts
        .iter()
        .filter_map(|entry| {
            let (host, ip) = match split_host_entry(entry) {
                Some(pair) => pair,
                None => {
                    warn!("skipping malformed extra host entry '{}'", entry);
                    return None;
                }
            };
            let mut m = Map::new();
            m.insert("host".to_string(), Value::from(host));
            m.insert("ip".to_string(), Value::from(ip));
            Some(Value::Map(m))
        })
        .collect()
}

fn split_host_entry(entry: &str) -> Option<(&str, &str)> {
    let mut fields = entry.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(ip), Some(host)) => Some((host, ip)),
        (Some(single), None) => single.split_once(':'),
        _ => None,
    }
}

/// Target network of each attachment.
pub fn flatten_service_networks(networks: Option<&[NetworkAttachmentConfig]>) -> Vec<Value> {
    networks
        .unwrap_or_default()
        .iter()
        .map(|n| Value::from(n.target.clone().unwrap_or_default()))
        .collect()
}

/// One block per mount, carrying the options of its type.
pub fn flatten_service_mounts(mounts: Option<&[Mount]>) -> Vec<Value> {
    mounts
        .unwrap_or_default()
        .iter()
        .map(|mount| {
            let mut m = Map::new();
            m.insert(
                "target".to_string(),
                Value::from(mount.target.clone().unwrap_or_default()),
            );
            m.insert(
                "source".to_string(),
                Value::from(mount.source.clone().unwrap_or_default()),
            );
            m.insert(
                "type".to_string(),
                Value::from(mount.typ.as_ref().map_or("", |v| v.as_str())),
            );
            if let Some(consistency) = non_empty(mount.consistency.as_ref()) {
                m.insert("consistency".to_string(), Value::from(consistency.as_str()));
            }
            m.insert(
                "read_only".to_string(),
                Value::Bool(mount.read_only.unwrap_or_default()),
            );
            if let Some(ref bind) = mount.bind_options {
                m.insert(
                    "bind_propagation".to_string(),
                    Value::from(bind.propagation.as_ref().map_or("", |v| v.as_str())),
                );
            }
            if let Some(ref volume) = mount.volume_options {
                m.insert(
                    "volume_no_copy".to_string(),
                    Value::Bool(volume.no_copy.unwrap_or_default()),
                );
                m.insert(
                    "volume_labels".to_string(),
                    string_map(volume.labels.as_ref()),
                );
                if let Some(ref driver) = volume.driver_config {
                    m.insert(
                        "volume_driver_name".to_string(),
                        Value::from(driver.name.clone().unwrap_or_default()),
                    );
                    m.insert(
                        "volume_driver_options".to_string(),
                        string_map(driver.options.as_ref()),
                    );
                }
            }
            if let Some(ref tmpfs) = mount.tmpfs_options {
                m.insert(
                    "tmpfs_size_bytes".to_string(),
                    Value::Int(tmpfs.size_bytes.unwrap_or_default()),
                );
                m.insert(
                    "tmpfs_mode".to_string(),
                    Value::from(tmpfs.mode.unwrap_or_default() & 0o777),
                );
            }
            Value::Map(m)
        })
        .collect()
}

/// Config references: `config_id`, plus `config_name` and the target `file_name` when known.
pub fn flatten_service_configs(configs: Option<&[TaskSpecContainerSpecConfigs]>) -> Vec<Value> {
    configs
        .unwrap_or_default()
        .iter()
        .map(|config| {
            let mut m = Map::new();
            m.insert(
                "config_id".to_string(),
                Value::from(config.config_id.clone().unwrap_or_default()),
            );
            if let Some(name) = non_empty(config.config_name.as_ref()) {
                m.insert("config_name".to_string(), Value::from(name.as_str()));
            }
            if let Some(ref file) = config.file {
                m.insert(
                    "file_name".to_string(),
                    Value::from(file.name.clone().unwrap_or_default()),
                );
            }
            Value::Map(m)
        })
        .collect()
}

/// Secret references: `secret_id`, plus `secret_name` and the target `file_name` when known.
pub fn flatten_service_secrets(secrets: Option<&[TaskSpecContainerSpecSecrets]>) -> Vec<Value> {
    secrets
        .unwrap_or_default()
        .iter()
        .map(|secret| {
            let mut m = Map::new();
            m.insert(
                "secret_id".to_string(),
                Value::from(secret.secret_id.clone().unwrap_or_default()),
            );
            if let Some(name) = non_empty(secret.secret_name.as_ref()) {
                m.insert("secret_name".to_string(), Value::from(name.as_str()));
            }
            if let Some(ref file) = secret.file {
                m.insert(
                    "file_name".to_string(),
                    Value::from(file.name.clone().unwrap_or_default()),
                );
            }
            Value::Map(m)
        })
        .collect()
}

/// Published ports. `external` is left out while the swarm has not assigned a port.
pub fn flatten_service_ports(ports: Option<&[EndpointPortConfig]>) -> Vec<Value> {
    ports
        .unwrap_or_default()
        .iter()
        .map(|port| {
            let mut m = Map::new();
            m.insert(
                "internal".to_string(),
                Value::from(port.target_port.unwrap_or_default()),
            );
            if let Some(published) = port.published_port.filter(|p| *p > 0) {
                m.insert("external".to_string(), Value::from(published));
            }
            m.insert(
                "publish_mode".to_string(),
                Value::from(port.publish_mode.as_ref().map_or("", |v| v.as_str())),
            );
            m.insert(
                "protocol".to_string(),
                Value::from(port.protocol.as_ref().map_or("", |v| v.as_str())),
            );
            Value::Map(m)
        })
        .collect()
}

/// Update or rollback policy. Durations are short Go durations, the failure ratio a
/// one-decimal string of its single-precision value (`0.15` reads as `0.2`).
pub fn flatten_service_update_or_rollback_config(
    config: Option<&ServiceSpecUpdateConfig>,
) -> Vec<Value> {
    let config = match config {
        Some(config) => config,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    m.insert(
        "parallelism".to_string(),
        Value::from(config.parallelism.unwrap_or_default()),
    );
    m.insert(
        "delay".to_string(),
        Value::from(short_duration(config.delay.unwrap_or_default())),
    );
    m.insert(
        "failure_action".to_string(),
        Value::from(config.failure_action.as_ref().map_or("", |v| v.as_str())),
    );
    m.insert(
        "monitor".to_string(),
        Value::from(short_duration(config.monitor.unwrap_or_default())),
    );
    m.insert(
        "max_failure_ratio".to_string(),
        Value::from(format_float(f64::from(
            config.max_failure_ratio.unwrap_or_default(),
        ))),
    );
    m.insert(
        "order".to_string(),
        Value::from(config.order.as_ref().map_or("", |v| v.as_str())),
    );
    vec![Value::Map(m)]
}

/// Placement block. Its `constraints`, `prefs` and `platforms` sets appear only when
/// non-empty, `max_replicas` only when set; a placement without any of them is still an
/// (empty) block.
pub fn flatten_service_placement(placement: Option<&TaskSpecPlacement>) -> Vec<Value> {
    let placement = match placement {
        Some(placement) => placement,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    if let Some(constraints) = non_empty_list(placement.constraints.as_ref()) {
        m.insert(
            "constraints".to_string(),
            Value::Set(new_string_set(hash_string, constraints.iter().cloned())),
        );
    }
    if let Some(prefs) = placement.preferences.as_deref().filter(|p| !p.is_empty()) {
        m.insert(
            "prefs".to_string(),
            Value::Set(flatten_placement_prefs(Some(prefs))),
        );
    }
    if let Some(platforms) = placement.platforms.as_deref().filter(|p| !p.is_empty()) {
        m.insert(
            "platforms".to_string(),
            Value::Set(flatten_placement_platforms(Some(platforms))),
        );
    }
    if let Some(max_replicas) = placement.max_replicas {
        m.insert("max_replicas".to_string(), Value::from(max_replicas));
    }
    vec![Value::Map(m)]
}

/// Spread descriptors of the placement preferences, as a string set.
///
/// A preference without a spread descriptor is skipped with a warning. It does not add an
/// empty `""` element to the set.
pub fn flatten_placement_prefs(prefs: Option<&[TaskSpecPlacementPreferences]>) -> Set {
    let descriptors = prefs.unwrap_or_default().iter().filter_map(|pref| {
        let descriptor = pref
            .spread
            .as_ref()
            .and_then(|spread| spread.spread_descriptor.clone());
        if descriptor.is_none() {
            warn!("skipping placement preference without a spread descriptor");
        }
        descriptor
    });
    new_string_set(hash_string, descriptors)
}

/// `{architecture, os}` blocks, as a set keyed by their content.
pub fn flatten_placement_platforms(platforms: Option<&[Platform]>) -> Set {
    let blocks = platforms.unwrap_or_default().iter().map(|platform| {
        let mut m = Map::new();
        m.insert(
            "architecture".to_string(),
            Value::from(platform.architecture.clone().unwrap_or_default()),
        );
        m.insert(
            "os".to_string(),
            Value::from(platform.os.clone().unwrap_or_default()),
        );
        Value::Map(m)
    });
    Set::new(hash_resource, blocks)
}

/// Log driver name and, when set, its options.
pub fn flatten_service_logging(driver: Option<&TaskSpecLogDriver>) -> Vec<Value> {
    let driver = match driver {
        Some(driver) => driver,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    m.insert(
        "driver_name".to_string(),
        Value::from(driver.name.clone().unwrap_or_default()),
    );
    if let Some(options) = driver.options.as_ref().filter(|o| !o.is_empty()) {
        m.insert("options".to_string(), Value::from(options.clone()));
    }
    vec![Value::Map(m)]
}

/// Health check. The durations are always written, `0s` meaning "inherit".
pub fn flatten_service_healthcheck(health: Option<&HealthConfig>) -> Vec<Value> {
    let health = match health {
        Some(health) => health,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    if let Some(test) = non_empty_list(health.test.as_ref()) {
        m.insert("test".to_string(), Value::from(test.clone()));
    }
    m.insert(
        "interval".to_string(),
        Value::from(short_duration(health.interval.unwrap_or_default())),
    );
    m.insert(
        "timeout".to_string(),
        Value::from(short_duration(health.timeout.unwrap_or_default())),
    );
    m.insert(
        "start_period".to_string(),
        Value::from(short_duration(health.start_period.unwrap_or_default())),
    );
    m.insert(
        "retries".to_string(),
        Value::Int(health.retries.unwrap_or_default()),
    );
    vec![Value::Map(m)]
}

/// Resolver configuration; each list only when non-empty.
pub fn flatten_service_dns_config(dns: Option<&TaskSpecContainerSpecDnsConfig>) -> Vec<Value> {
    let dns = match dns {
        Some(dns) => dns,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    if let Some(nameservers) = non_empty_list(dns.nameservers.as_ref()) {
        m.insert("nameservers".to_string(), Value::from(nameservers.clone()));
    }
    if let Some(search) = non_empty_list(dns.search.as_ref()) {
        m.insert("search".to_string(), Value::from(search.clone()));
    }
    if let Some(options) = non_empty_list(dns.options.as_ref()) {
        m.insert("options".to_string(), Value::from(options.clone()));
    }
    vec![Value::Map(m)]
}
