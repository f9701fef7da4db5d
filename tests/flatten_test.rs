use bollard_flatten::flatten::*;
use bollard_flatten::service::*;
use bollard_flatten::value::{hash_resource, hash_string, Map, Set, Value};

use std::collections::HashMap;

const SEC: i64 = 1_000_000_000;

fn block(values: &[Value]) -> &Map {
    assert_eq!(values.len(), 1, "expected a single block, got {:?}", values);
    values[0].as_map().unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn service_mode_replicated() {
    let mode = ServiceSpecMode {
        replicated: Some(ServiceSpecModeReplicated { replicas: Some(3) }),
        global: None,
    };
    let state = flatten_service_mode(Some(&mode));
    let m = block(&state);
    assert_eq!(m["global"], Value::Bool(false));
    let replicated = block(m["replicated"].as_list().unwrap());
    assert_eq!(replicated["replicas"], Value::Int(3));
}

#[test]
fn service_mode_global() {
    let mode = ServiceSpecMode {
        replicated: None,
        global: Some(ServiceSpecModeGlobal {}),
    };
    let state = flatten_service_mode(Some(&mode));
    let m = block(&state);
    assert_eq!(m["global"], Value::Bool(true));
    assert!(!m.contains_key("replicated"));
}

#[test]
fn service_mode_absent() {
    let state = flatten_service_mode(None);
    let m = block(&state);
    assert_eq!(m.len(), 1);
    assert_eq!(m["global"], Value::Bool(false));
}

#[test]
fn replicated_without_count_is_an_empty_block() {
    assert_eq!(flatten_replicated(None), vec![Value::Map(Map::new())]);
    let replicated = ServiceSpecModeReplicated { replicas: None };
    assert_eq!(
        flatten_replicated(Some(&replicated)),
        vec![Value::Map(Map::new())]
    );
}

#[test]
fn hosts() {
    assert!(flatten_service_hosts(None).is_empty());
    assert!(flatten_service_hosts(Some(&[][..])).is_empty());

    let hosts = strings(&["db:10.0.0.2", "10.0.0.3 cache cache.local", "garbage"]);
    let state = flatten_service_hosts(Some(hosts.as_slice()));
    assert_eq!(state.len(), 2);

    let first = state[0].as_map().unwrap();
    assert_eq!(first["host"], Value::from("db"));
    assert_eq!(first["ip"], Value::from("10.0.0.2"));
    let second = state[1].as_map().unwrap();
    assert_eq!(second["host"], Value::from("cache"));
    assert_eq!(second["ip"], Value::from("10.0.0.3"));
}

#[test]
fn networks() {
    assert!(flatten_service_networks(None).is_empty());

    let networks = vec![
        NetworkAttachmentConfig {
            target: Some("frontend".to_string()),
        },
        NetworkAttachmentConfig {
            target: Some("backend".to_string()),
        },
    ];
    assert_eq!(
        flatten_service_networks(Some(networks.as_slice())),
        vec![Value::from("frontend"), Value::from("backend")]
    );
}

#[test]
fn bind_mount() {
    let mounts = vec![Mount {
        target: Some("/etc/app".to_string()),
        source: Some("/srv/app".to_string()),
        typ: Some(MountType::Bind),
        read_only: Some(true),
        bind_options: Some(MountBindOptions {
            propagation: Some(BindPropagation::RPrivate),
        }),
        ..Default::default()
    }];
    let state = flatten_service_mounts(Some(mounts.as_slice()));
    let m = block(&state);
    assert_eq!(m["target"], Value::from("/etc/app"));
    assert_eq!(m["source"], Value::from("/srv/app"));
    assert_eq!(m["type"], Value::from("bind"));
    assert_eq!(m["read_only"], Value::Bool(true));
    assert_eq!(m["bind_propagation"], Value::from("rprivate"));
    assert!(!m.contains_key("consistency"));
    assert!(!m.contains_key("volume_no_copy"));
    assert!(!m.contains_key("tmpfs_mode"));
}

#[test]
fn image_and_unlisted_mount_types() {
    let mounts = vec![
        Mount {
            target: Some("/models".to_string()),
            source: Some("registry.local/models:v2".to_string()),
            typ: Some(MountType::Image),
            ..Default::default()
        },
        Mount {
            target: Some("/scratch".to_string()),
            typ: Some(MountType::from("ramdisk")),
            ..Default::default()
        },
    ];
    let state = flatten_service_mounts(Some(mounts.as_slice()));
    assert_eq!(state.len(), 2);
    assert_eq!(state[0].as_map().unwrap()["type"], Value::from("image"));
    assert_eq!(state[1].as_map().unwrap()["type"], Value::from("ramdisk"));
}

#[test]
fn volume_mount() {
    let mut labels = HashMap::new();
    labels.insert("team".to_string(), "infra".to_string());
    let mut options = HashMap::new();
    options.insert("size".to_string(), "10G".to_string());

    let mounts = vec![Mount {
        target: Some("/data".to_string()),
        source: Some("data".to_string()),
        typ: Some(MountType::Volume),
        consistency: Some("cached".to_string()),
        volume_options: Some(MountVolumeOptions {
            no_copy: Some(true),
            labels: Some(labels),
            driver_config: Some(MountVolumeOptionsDriverConfig {
                name: Some("local".to_string()),
                options: Some(options),
            }),
        }),
        ..Default::default()
    }];
    let state = flatten_service_mounts(Some(mounts.as_slice()));
    let m = block(&state);
    assert_eq!(m["type"], Value::from("volume"));
    assert_eq!(m["consistency"], Value::from("cached"));
    assert_eq!(m["read_only"], Value::Bool(false));
    assert_eq!(m["volume_no_copy"], Value::Bool(true));
    assert_eq!(
        m["volume_labels"].as_map().unwrap()["team"],
        Value::from("infra")
    );
    assert_eq!(m["volume_driver_name"], Value::from("local"));
    assert_eq!(
        m["volume_driver_options"].as_map().unwrap()["size"],
        Value::from("10G")
    );
    assert!(!m.contains_key("bind_propagation"));
}

#[test]
fn tmpfs_mount_keeps_permission_bits() {
    let mounts = vec![Mount {
        target: Some("/tmp".to_string()),
        typ: Some(MountType::Tmpfs),
        tmpfs_options: Some(MountTmpfsOptions {
            size_bytes: Some(1 << 20),
            // directory bit plus 01777
            mode: Some(0x8000_0000 | 0o1777),
        }),
        ..Default::default()
    }];
    let state = flatten_service_mounts(Some(mounts.as_slice()));
    let m = block(&state);
    assert_eq!(m["source"], Value::from(""));
    assert_eq!(m["tmpfs_size_bytes"], Value::Int(1 << 20));
    assert_eq!(m["tmpfs_mode"], Value::Int(0o777));
}

#[test]
fn configs_and_secrets() {
    assert!(flatten_service_configs(None).is_empty());
    assert!(flatten_service_secrets(Some(&[][..])).is_empty());

    let configs = vec![
        TaskSpecContainerSpecConfigs {
            config_id: Some("cfg1".to_string()),
            config_name: Some("nginx.conf".to_string()),
            file: Some(TaskSpecContainerSpecFile {
                name: Some("/etc/nginx/nginx.conf".to_string()),
            }),
        },
        TaskSpecContainerSpecConfigs {
            config_id: Some("cfg2".to_string()),
            config_name: Some(String::new()),
            file: None,
        },
    ];
    let state = flatten_service_configs(Some(configs.as_slice()));
    assert_eq!(state.len(), 2);
    let first = state[0].as_map().unwrap();
    assert_eq!(first["config_id"], Value::from("cfg1"));
    assert_eq!(first["config_name"], Value::from("nginx.conf"));
    assert_eq!(first["file_name"], Value::from("/etc/nginx/nginx.conf"));
    let second = state[1].as_map().unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second["config_id"], Value::from("cfg2"));

    let secrets = vec![TaskSpecContainerSpecSecrets {
        secret_id: Some("sec1".to_string()),
        secret_name: Some("db_password".to_string()),
        file: Some(TaskSpecContainerSpecFile {
            name: Some("db_password".to_string()),
        }),
    }];
    let state = flatten_service_secrets(Some(secrets.as_slice()));
    let m = block(&state);
    assert_eq!(m["secret_id"], Value::from("sec1"));
    assert_eq!(m["secret_name"], Value::from("db_password"));
    assert_eq!(m["file_name"], Value::from("db_password"));
}

#[test]
fn ports() {
    assert!(flatten_service_ports(None).is_empty());

    let ports = vec![
        EndpointPortConfig {
            protocol: Some(PortProtocol::Tcp),
            target_port: Some(80),
            published_port: Some(8080),
            publish_mode: Some(PublishMode::Ingress),
            ..Default::default()
        },
        EndpointPortConfig {
            protocol: Some(PortProtocol::Udp),
            target_port: Some(53),
            published_port: Some(0),
            publish_mode: Some(PublishMode::Host),
            ..Default::default()
        },
    ];
    let state = flatten_service_ports(Some(ports.as_slice()));
    let first = state[0].as_map().unwrap();
    assert_eq!(first["internal"], Value::Int(80));
    assert_eq!(first["external"], Value::Int(8080));
    assert_eq!(first["publish_mode"], Value::from("ingress"));
    assert_eq!(first["protocol"], Value::from("tcp"));
    let second = state[1].as_map().unwrap();
    assert!(!second.contains_key("external"));
    assert_eq!(second["publish_mode"], Value::from("host"));
    assert_eq!(second["protocol"], Value::from("udp"));
}

#[test]
fn update_config() {
    assert!(flatten_service_update_or_rollback_config(None).is_empty());

    let config = ServiceSpecUpdateConfig {
        parallelism: Some(2),
        delay: Some(10 * SEC),
        failure_action: Some(UpdateFailureAction::Continue),
        monitor: Some(3600 * SEC),
        max_failure_ratio: Some(0.1),
        order: Some(UpdateOrder::StartFirst),
    };
    let state = flatten_service_update_or_rollback_config(Some(&config));
    let m = block(&state);
    assert_eq!(m["parallelism"], Value::Int(2));
    assert_eq!(m["delay"], Value::from("10s"));
    assert_eq!(m["failure_action"], Value::from("continue"));
    assert_eq!(m["monitor"], Value::from("1h"));
    assert_eq!(m["max_failure_ratio"], Value::from("0.1"));
    assert_eq!(m["order"], Value::from("start-first"));
}

#[test]
fn update_config_zero_values() {
    let state = flatten_service_update_or_rollback_config(Some(&Default::default()));
    let m = block(&state);
    assert_eq!(m["parallelism"], Value::Int(0));
    assert_eq!(m["delay"], Value::from("0s"));
    assert_eq!(m["monitor"], Value::from("0s"));
    assert_eq!(m["failure_action"], Value::from(""));
    assert_eq!(m["max_failure_ratio"], Value::from("0.0"));
}

#[test]
fn placement() {
    assert!(flatten_service_placement(None).is_empty());

    let empty = flatten_service_placement(Some(&TaskSpecPlacement::default()));
    assert_eq!(empty, vec![Value::Map(Map::new())]);

    let placement = TaskSpecPlacement {
        constraints: Some(strings(&[
            "node.role==manager",
            "engine.labels.os==linux",
            "node.role==manager",
        ])),
        preferences: Some(vec![
            TaskSpecPlacementPreferences {
                spread: Some(TaskSpecPlacementSpread {
                    spread_descriptor: Some("node.labels.az".to_string()),
                }),
            },
            TaskSpecPlacementPreferences { spread: None },
        ]),
        max_replicas: Some(2),
        platforms: Some(vec![
            Platform {
                architecture: Some("amd64".to_string()),
                os: Some("linux".to_string()),
            },
            Platform {
                architecture: Some("amd64".to_string()),
                os: Some("linux".to_string()),
            },
            Platform {
                architecture: Some("arm64".to_string()),
                os: Some("linux".to_string()),
            },
        ]),
    };
    let state = flatten_service_placement(Some(&placement));
    let m = block(&state);

    let constraints = m["constraints"].as_set().unwrap();
    assert_eq!(constraints.len(), 2);
    assert!(constraints.contains(&Value::from("engine.labels.os==linux")));

    let prefs = m["prefs"].as_set().unwrap();
    assert_eq!(prefs.len(), 1);
    assert!(prefs.contains(&Value::from("node.labels.az")));

    let platforms = m["platforms"].as_set().unwrap();
    assert_eq!(platforms.len(), 2);

    assert_eq!(m["max_replicas"], Value::Int(2));
}

#[test]
fn placement_sets_when_empty() {
    assert_eq!(flatten_placement_prefs(None), Set::empty(hash_string));
    assert!(flatten_placement_platforms(Some(&[][..])).is_empty());
    assert_eq!(flatten_placement_platforms(None), Set::empty(hash_resource));
}

#[test]
fn logging() {
    assert!(flatten_service_logging(None).is_empty());

    let driver = TaskSpecLogDriver {
        name: Some("json-file".to_string()),
        options: Some(HashMap::new()),
    };
    let state = flatten_service_logging(Some(&driver));
    let m = block(&state);
    assert_eq!(m["driver_name"], Value::from("json-file"));
    assert!(!m.contains_key("options"));

    let mut options = HashMap::new();
    options.insert("max-size".to_string(), "10m".to_string());
    let driver = TaskSpecLogDriver {
        name: Some("json-file".to_string()),
        options: Some(options),
    };
    let state = flatten_service_logging(Some(&driver));
    let m = block(&state);
    assert_eq!(
        m["options"].as_map().unwrap()["max-size"],
        Value::from("10m")
    );
}

#[test]
fn healthcheck() {
    assert!(flatten_service_healthcheck(None).is_empty());

    let health = HealthConfig {
        test: Some(strings(&["CMD", "curl", "-f", "http://localhost"])),
        interval: Some(90 * SEC),
        timeout: Some(5 * SEC),
        retries: Some(3),
        start_period: None,
    };
    let state = flatten_service_healthcheck(Some(&health));
    let m = block(&state);
    assert_eq!(m["test"].as_list().unwrap().len(), 4);
    assert_eq!(m["interval"], Value::from("1m30s"));
    assert_eq!(m["timeout"], Value::from("5s"));
    assert_eq!(m["start_period"], Value::from("0s"));
    assert_eq!(m["retries"], Value::Int(3));

    let state = flatten_service_healthcheck(Some(&HealthConfig {
        test: Some(Vec::new()),
        ..Default::default()
    }));
    assert!(!block(&state).contains_key("test"));
}

#[test]
fn dns_config() {
    assert!(flatten_service_dns_config(None).is_empty());

    let dns = TaskSpecContainerSpecDnsConfig {
        nameservers: Some(strings(&["8.8.8.8"])),
        search: Some(Vec::new()),
        options: None,
    };
    let state = flatten_service_dns_config(Some(&dns));
    let m = block(&state);
    assert_eq!(m.len(), 1);
    assert_eq!(m["nameservers"], Value::List(vec![Value::from("8.8.8.8")]));
}
