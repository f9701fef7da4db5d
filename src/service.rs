//! Service state: composes the flatteners into the full state of a Swarm service.

pub use crate::service_models::*;

use crate::errors::Error;
use crate::flatten::{
    flatten_service_configs, flatten_service_dns_config, flatten_service_healthcheck,
    flatten_service_hosts, flatten_service_logging, flatten_service_mode, flatten_service_mounts,
    flatten_service_networks, flatten_service_placement, flatten_service_ports,
    flatten_service_secrets, flatten_service_update_or_rollback_config,
};
use crate::format::short_duration;
use crate::value::{hash_string, new_string_set, Map, Value};

use serde::de::DeserializeOwned;

const DEFAULT_UPDATE_MONITOR: i64 = 5_000_000_000;
const DEFAULT_RESTART_DELAY: i64 = 5_000_000_000;

/// Parameters used when reading the state of a service.
///
/// ## Examples
///
/// ```rust
/// use bollard_flatten::service::ServiceStateOptions;
///
/// ServiceStateOptions{
///     insert_defaults: true,
/// };
/// ```
///
/// ```rust
/// # use bollard_flatten::service::ServiceStateOptions;
/// # use std::default::Default;
///
/// let options: ServiceStateOptions = Default::default();
/// ```
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ServiceStateOptions {
    /// Fill absent update, rollback, restart and endpoint settings with the swarm defaults,
    /// as the Engine does for an inspect with `insertDefaults`.
    pub insert_defaults: bool,
}

/// Update and rollback policy the swarm applies when the spec leaves it out.
pub fn default_update_config() -> ServiceSpecUpdateConfig {
    ServiceSpecUpdateConfig {
        parallelism: Some(1),
        delay: Some(0),
        failure_action: Some(UpdateFailureAction::Pause),
        monitor: Some(DEFAULT_UPDATE_MONITOR),
        max_failure_ratio: Some(0.0),
        order: Some(UpdateOrder::StopFirst),
    }
}

/// Restart policy the swarm applies when the spec leaves it out.
pub fn default_restart_policy() -> TaskSpecRestartPolicy {
    TaskSpecRestartPolicy {
        condition: Some(RestartCondition::Any),
        delay: Some(DEFAULT_RESTART_DELAY),
        max_attempts: Some(0),
        window: Some(0),
    }
}

/// Parses the body of a service inspect response.
///
/// ## Examples
///
/// ```rust
/// use bollard_flatten::service::parse_service;
///
/// let service = parse_service(r#"{"ID": "9mnpnzenvg8p", "Spec": {"Name": "web"}}"#).unwrap();
/// assert_eq!(service.spec.unwrap().name.as_deref(), Some("web"));
/// ```
pub fn parse_service(json: &str) -> Result<Service, Error> {
    decode_json(json)
}

/// Parses a service inspect response and flattens its spec.
pub fn flatten_service(json: &str, options: &ServiceStateOptions) -> Result<Map, Error> {
    let service = parse_service(json)?;
    debug!(
        "flattening service {}",
        service.id.as_deref().unwrap_or("<unknown>")
    );
    Ok(flatten_service_spec(
        &service.spec.unwrap_or_default(),
        options,
    ))
}

fn decode_json<T: DeserializeOwned>(contents: &str) -> Result<T, Error> {
    serde_json::from_str::<T>(contents).map_err(|e| {
        if e.is_data() {
            Error::JsonDataError {
                message: excerpt(contents, e.line(), e.column()),
                #[cfg(feature = "json_data_content")]
                contents: contents.to_string(),
                column: e.column(),
            }
        } else {
            e.into()
        }
    })
}

// A few characters on each side of the failing position.
fn excerpt(contents: &str, line: usize, column: usize) -> String {
    const CONTEXT: usize = 32;

    let line = contents.lines().nth(line.saturating_sub(1)).unwrap_or("");
    let chars: Vec<char> = line.chars().collect();
    let end = column.min(chars.len());
    let start = end.saturating_sub(CONTEXT);
    let stop = (end + CONTEXT).min(chars.len());
    chars[start..stop].iter().collect()
}

/// Full state of a service spec: `name`, `labels`, `task_spec`, `mode`, `update_config`,
/// `rollback_config` and `endpoint_spec`.
pub fn flatten_service_spec(spec: &ServiceSpec, options: &ServiceStateOptions) -> Map {
    let mut m = Map::new();
    m.insert(
        "name".to_string(),
        Value::from(spec.name.clone().unwrap_or_default()),
    );
    if let Some(labels) = spec.labels.as_ref().filter(|l| !l.is_empty()) {
        m.insert("labels".to_string(), Value::from(labels.clone()));
    }

    let task = spec.task_template.clone().unwrap_or_default();
    let mut state = flatten_task_spec(&task, options);
    // Service-level networks predate the task template's and are only read as a fallback.
    if task.networks.as_ref().map_or(true, Vec::is_empty) {
        if let Some(Value::Map(block)) = state.first_mut() {
            block.insert(
                "networks".to_string(),
                Value::List(flatten_service_networks(spec.networks.as_deref())),
            );
        }
    }
    m.insert("task_spec".to_string(), Value::List(state));

    m.insert(
        "mode".to_string(),
        Value::List(flatten_service_mode(spec.mode.as_ref())),
    );

    let update_config = with_default(spec.update_config.clone(), options, default_update_config);
    m.insert(
        "update_config".to_string(),
        Value::List(flatten_service_update_or_rollback_config(
            update_config.as_ref(),
        )),
    );
    let rollback_config = with_default(
        spec.rollback_config.clone(),
        options,
        default_update_config,
    );
    m.insert(
        "rollback_config".to_string(),
        Value::List(flatten_service_update_or_rollback_config(
            rollback_config.as_ref(),
        )),
    );

    let mut endpoint = spec.endpoint_spec.clone();
    if options.insert_defaults {
        let endpoint = endpoint.get_or_insert_with(EndpointSpec::default);
        if endpoint.mode.is_none() {
            trace!("inserting default endpoint mode");
            endpoint.mode = Some(EndpointMode::Vip);
        }
    }
    m.insert(
        "endpoint_spec".to_string(),
        Value::List(flatten_endpoint_spec(endpoint.as_ref())),
    );
    m
}

fn with_default<T, F>(value: Option<T>, options: &ServiceStateOptions, default: F) -> Option<T>
where
    F: FnOnce() -> T,
{
    match value {
        None if options.insert_defaults => {
            trace!("inserting swarm default for an absent block");
            Some(default())
        }
        value => value,
    }
}

/// Task template block.
pub fn flatten_task_spec(task: &TaskSpec, options: &ServiceStateOptions) -> Vec<Value> {
    let mut m = Map::new();
    m.insert(
        "container_spec".to_string(),
        Value::List(flatten_container_spec(task.container_spec.as_ref())),
    );
    m.insert(
        "resources".to_string(),
        Value::List(flatten_resources(task.resources.as_ref())),
    );
    let restart_policy = with_default(task.restart_policy.clone(), options, default_restart_policy);
    m.insert(
        "restart_policy".to_string(),
        Value::List(flatten_restart_policy(restart_policy.as_ref())),
    );
    m.insert(
        "placement".to_string(),
        Value::List(flatten_service_placement(task.placement.as_ref())),
    );
    if let Some(force_update) = task.force_update {
        m.insert("force_update".to_string(), Value::from(force_update));
    }
    if let Some(runtime) = task.runtime.as_ref().filter(|r| !r.is_empty()) {
        m.insert("runtime".to_string(), Value::from(runtime.as_str()));
    }
    m.insert(
        "networks".to_string(),
        Value::List(flatten_service_networks(task.networks.as_deref())),
    );
    m.insert(
        "log_driver".to_string(),
        Value::List(flatten_service_logging(task.log_driver.as_ref())),
    );
    vec![Value::Map(m)]
}

fn insert_string(m: &mut Map, key: &str, value: Option<&String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        m.insert(key.to_string(), Value::from(value.as_str()));
    }
}

fn insert_list(m: &mut Map, key: &str, value: Vec<Value>) {
    if !value.is_empty() {
        m.insert(key.to_string(), Value::List(value));
    }
}

/// Container block of the task template.
pub fn flatten_container_spec(spec: Option<&TaskSpecContainerSpec>) -> Vec<Value> {
    let spec = match spec {
        Some(spec) => spec,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    insert_string(&mut m, "image", spec.image.as_ref());
    if let Some(labels) = spec.labels.as_ref().filter(|l| !l.is_empty()) {
        m.insert("labels".to_string(), Value::from(labels.clone()));
    }
    let strings = |l: &Option<Vec<String>>| -> Vec<Value> {
        l.iter().flatten().map(|s| Value::from(s.as_str())).collect()
    };
    insert_list(&mut m, "command", strings(&spec.command));
    insert_list(&mut m, "args", strings(&spec.args));
    insert_string(&mut m, "hostname", spec.hostname.as_ref());
    if let Some(env) = spec.env.as_ref().filter(|e| !e.is_empty()) {
        m.insert(
            "env".to_string(),
            Value::Set(new_string_set(hash_string, env.iter().cloned())),
        );
    }
    insert_string(&mut m, "dir", spec.dir.as_ref());
    insert_string(&mut m, "user", spec.user.as_ref());
    insert_list(&mut m, "groups", strings(&spec.groups));
    if let Some(read_only) = spec.read_only {
        m.insert("read_only".to_string(), Value::Bool(read_only));
    }
    insert_list(
        &mut m,
        "mounts",
        flatten_service_mounts(spec.mounts.as_deref()),
    );
    insert_string(&mut m, "stop_signal", spec.stop_signal.as_ref());
    if let Some(grace) = spec.stop_grace_period {
        m.insert(
            "stop_grace_period".to_string(),
            Value::from(short_duration(grace)),
        );
    }
    insert_list(
        &mut m,
        "healthcheck",
        flatten_service_healthcheck(spec.health_check.as_ref()),
    );
    insert_list(
        &mut m,
        "hosts",
        flatten_service_hosts(spec.hosts.as_deref()),
    );
    insert_list(
        &mut m,
        "dns_config",
        flatten_service_dns_config(spec.dns_config.as_ref()),
    );
    insert_list(
        &mut m,
        "secrets",
        flatten_service_secrets(spec.secrets.as_deref()),
    );
    insert_list(
        &mut m,
        "configs",
        flatten_service_configs(spec.configs.as_deref()),
    );
    if let Some(isolation) = spec.isolation.as_ref().filter(|i| **i != Isolation::Empty) {
        m.insert("isolation".to_string(), Value::from(isolation.as_str()));
    }
    vec![Value::Map(m)]
}

/// Resource limits and reservations.
pub fn flatten_resources(resources: Option<&TaskSpecResources>) -> Vec<Value> {
    let resources = match resources {
        Some(resources) => resources,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    if let Some(ref limits) = resources.limits {
        m.insert(
            "limits".to_string(),
            Value::List(vec![flatten_resource_object(limits)]),
        );
    }
    if let Some(ref reservation) = resources.reservation {
        m.insert(
            "reservation".to_string(),
            Value::List(vec![flatten_resource_object(reservation)]),
        );
    }
    vec![Value::Map(m)]
}

fn flatten_resource_object(resources: &ResourceObject) -> Value {
    let mut m = Map::new();
    if let Some(nano_cpus) = resources.nano_cpus {
        m.insert("nano_cpus".to_string(), Value::Int(nano_cpus));
    }
    if let Some(memory_bytes) = resources.memory_bytes {
        m.insert("memory_bytes".to_string(), Value::Int(memory_bytes));
    }
    if let Some(generic) = resources
        .generic_resources
        .as_ref()
        .filter(|g| !g.is_empty())
    {
        m.insert(
            "generic_resources".to_string(),
            Value::List(vec![flatten_generic_resources(generic)]),
        );
    }
    Value::Map(m)
}

// Named and discrete resources both render as `kind=value` strings.
fn flatten_generic_resources(resources: &[GenericResources]) -> Value {
    let named = resources.iter().filter_map(|r| {
        r.named_resource_spec.as_ref().map(|spec| {
            format!(
                "{}={}",
                spec.kind.as_deref().unwrap_or_default(),
                spec.value.as_deref().unwrap_or_default()
            )
        })
    });
    let discrete = resources.iter().filter_map(|r| {
        r.discrete_resource_spec.as_ref().map(|spec| {
            format!(
                "{}={}",
                spec.kind.as_deref().unwrap_or_default(),
                spec.value.unwrap_or_default()
            )
        })
    });

    let mut m = Map::new();
    m.insert(
        "named_resources_spec".to_string(),
        Value::Set(new_string_set(hash_string, named)),
    );
    m.insert(
        "discrete_resources_spec".to_string(),
        Value::Set(new_string_set(hash_string, discrete)),
    );
    Value::Map(m)
}

/// Restart policy block.
pub fn flatten_restart_policy(policy: Option<&TaskSpecRestartPolicy>) -> Vec<Value> {
    let policy = match policy {
        Some(policy) => policy,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    m.insert(
        "condition".to_string(),
        Value::from(policy.condition.as_ref().map_or("", |v| v.as_str())),
    );
    m.insert(
        "delay".to_string(),
        Value::from(short_duration(policy.delay.unwrap_or_default())),
    );
    m.insert(
        "max_attempts".to_string(),
        Value::from(policy.max_attempts.unwrap_or_default()),
    );
    m.insert(
        "window".to_string(),
        Value::from(short_duration(policy.window.unwrap_or_default())),
    );
    vec![Value::Map(m)]
}

/// Endpoint block: resolution `mode` and published `ports`.
pub fn flatten_endpoint_spec(spec: Option<&EndpointSpec>) -> Vec<Value> {
    let spec = match spec {
        Some(spec) => spec,
        None => return Vec::new(),
    };

    let mut m = Map::new();
    if let Some(mode) = spec.mode.as_ref().filter(|mode| **mode != EndpointMode::Empty) {
        m.insert("mode".to_string(), Value::from(mode.as_str()));
    }
    insert_list(
        &mut m,
        "ports",
        flatten_service_ports(spec.ports.as_deref()),
    );
    vec![Value::Map(m)]
}

