//! Swarm service models, as the Engine API returns them from `GET /services/{id}`.
//!
//! Every field is optional: the Engine omits zero values from its payloads. Durations are
//! nanoseconds.

use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        ///
        /// Values this crate does not know are kept verbatim in `Other`.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum $name {
            #[default]
            Empty,
            $($variant,)+
            Other(String),
        }

        impl $name {
            /// The value as it is spelled on the wire.
            pub fn as_str(&self) -> &str {
                match self {
                    $name::Empty => "",
                    $($name::$variant => $wire,)+
                    $name::Other(s) => s,
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    "" => $name::Empty,
                    $($wire => $name::$variant,)+
                    x => $name::Other(x.to_string()),
                }
            }
        }

        impl FromStr for $name {
            type Err = Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name::from(s))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize<'de>>::deserialize(deserializer)?;
                Ok($name::from(s.as_str()))
            }
        }
    };
}

/// A service, as returned by the inspect endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    /// The ID of the service.
    #[serde(rename = "ID")]
    pub id: Option<String>,
    /// User modifiable configuration of the service.
    pub spec: Option<ServiceSpec>,
}

/// User modifiable configuration for a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ServiceSpec {
    /// Name of the service.
    pub name: Option<String>,
    /// User-defined key/value metadata.
    pub labels: Option<HashMap<String, String>>,
    pub task_template: Option<TaskSpec>,
    pub mode: Option<ServiceSpecMode>,
    pub update_config: Option<ServiceSpecUpdateConfig>,
    pub rollback_config: Option<ServiceSpecUpdateConfig>,
    /// Networks to attach the service to. Deprecated in favour of the task template's networks.
    pub networks: Option<Vec<NetworkAttachmentConfig>>,
    pub endpoint_spec: Option<EndpointSpec>,
}

/// Scheduling mode for the service. Exactly one variant is set.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ServiceSpecMode {
    pub replicated: Option<ServiceSpecModeReplicated>,
    pub global: Option<ServiceSpecModeGlobal>,
}

/// Replicated mode: a fixed number of tasks.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ServiceSpecModeReplicated {
    pub replicas: Option<u64>,
}

/// Global mode: one task per node. Carries no settings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpecModeGlobal {}

/// Specification for the update or rollback strategy of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSpecUpdateConfig {
    /// Maximum number of tasks to be updated in one iteration (0 means unlimited parallelism).
    pub parallelism: Option<u64>,
    /// Amount of time between updates, in nanoseconds.
    pub delay: Option<i64>,
    /// Action to take if an updated task fails to run, or stops running during the update.
    pub failure_action: Option<UpdateFailureAction>,
    /// Amount of time to monitor each updated task for failures, in nanoseconds.
    pub monitor: Option<i64>,
    /// The fraction of tasks that may fail during an update before the failure action is invoked.
    pub max_failure_ratio: Option<f32>,
    /// The order of operations when rolling out an updated task.
    pub order: Option<UpdateOrder>,
}

wire_enum! {
    /// Action to take if an updated task fails to run, or stops running during the update.
    pub enum UpdateFailureAction {
        Continue => "continue",
        Pause => "pause",
        Rollback => "rollback",
    }
}

wire_enum! {
    /// Whether the old task is stopped before the new one starts, or the other way around.
    pub enum UpdateOrder {
        StopFirst => "stop-first",
        StartFirst => "start-first",
    }
}

/// User modifiable task configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpec {
    pub container_spec: Option<TaskSpecContainerSpec>,
    pub resources: Option<TaskSpecResources>,
    pub restart_policy: Option<TaskSpecRestartPolicy>,
    pub placement: Option<TaskSpecPlacement>,
    /// A counter that triggers an update even if no relevant parameters have been changed.
    pub force_update: Option<u64>,
    /// Runtime is the type of runtime specified for the task executor.
    pub runtime: Option<String>,
    /// Specifies which networks the service should attach to.
    pub networks: Option<Vec<NetworkAttachmentConfig>>,
    pub log_driver: Option<TaskSpecLogDriver>,
}

/// Container spec for the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpecContainerSpec {
    /// The image name to use for the container.
    pub image: Option<String>,
    /// User-defined key/value data.
    pub labels: Option<HashMap<String, String>>,
    /// The command to be run in the image.
    pub command: Option<Vec<String>>,
    /// Arguments to the command.
    pub args: Option<Vec<String>>,
    /// The hostname to use for the container.
    pub hostname: Option<String>,
    /// Environment variables in the form `VAR=value`.
    pub env: Option<Vec<String>>,
    /// The working directory for commands to run in.
    pub dir: Option<String>,
    /// The user inside the container.
    pub user: Option<String>,
    /// Additional groups that the container process will run as.
    pub groups: Option<Vec<String>>,
    /// Mount the container's root filesystem as read only.
    pub read_only: Option<bool>,
    /// Mounts added to containers created as part of the service.
    pub mounts: Option<Vec<Mount>>,
    /// Signal to stop the container.
    pub stop_signal: Option<String>,
    /// Time to wait for the container to terminate before killing it, in nanoseconds.
    pub stop_grace_period: Option<i64>,
    /// Health check run inside the container.
    pub health_check: Option<HealthConfig>,
    /// Extra `/etc/hosts` entries, either `IP_address canonical_hostname [aliases...]` or
    /// `hostname:IP`.
    pub hosts: Option<Vec<String>>,
    /// Resolver configuration.
    #[serde(rename = "DNSConfig")]
    pub dns_config: Option<TaskSpecContainerSpecDnsConfig>,
    /// References to secrets exposed to the service.
    pub secrets: Option<Vec<TaskSpecContainerSpecSecrets>>,
    /// References to configs exposed to the service.
    pub configs: Option<Vec<TaskSpecContainerSpecConfigs>>,
    /// Isolation technology of the containers running the service. (Windows only)
    pub isolation: Option<Isolation>,
}

wire_enum! {
    /// Isolation technology of the containers running the service. (Windows only)
    pub enum Isolation {
        Default => "default",
        Process => "process",
        Hyperv => "hyperv",
    }
}

/// A mount inside the service's containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct Mount {
    /// Container path.
    pub target: Option<String>,
    /// Mount source (e.g. a volume name, a host path).
    pub source: Option<String>,
    #[serde(rename = "Type")]
    pub typ: Option<MountType>,
    pub read_only: Option<bool>,
    /// The consistency requirement for the mount: `default`, `consistent`, `cached`, or `delegated`.
    pub consistency: Option<String>,
    pub bind_options: Option<MountBindOptions>,
    pub volume_options: Option<MountVolumeOptions>,
    pub tmpfs_options: Option<MountTmpfsOptions>,
}

wire_enum! {
    /// The mount type.
    pub enum MountType {
        Bind => "bind",
        Volume => "volume",
        Image => "image",
        Tmpfs => "tmpfs",
        Npipe => "npipe",
        Cluster => "cluster",
    }
}

/// Optional configuration for the `bind` type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct MountBindOptions {
    pub propagation: Option<BindPropagation>,
}

wire_enum! {
    /// A propagation mode with the value `[r]private`, `[r]shared`, or `[r]slave`.
    pub enum BindPropagation {
        Private => "private",
        RPrivate => "rprivate",
        Shared => "shared",
        RShared => "rshared",
        Slave => "slave",
        RSlave => "rslave",
    }
}

/// Optional configuration for the `volume` type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct MountVolumeOptions {
    /// Populate volume with data from the target.
    pub no_copy: Option<bool>,
    pub labels: Option<HashMap<String, String>>,
    pub driver_config: Option<MountVolumeOptionsDriverConfig>,
}

/// Driver used to create the volume, with its options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct MountVolumeOptionsDriverConfig {
    pub name: Option<String>,
    pub options: Option<HashMap<String, String>>,
}

/// Optional configuration for the `tmpfs` type.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MountTmpfsOptions {
    /// The size for the tmpfs mount in bytes.
    pub size_bytes: Option<i64>,
    /// The file mode of the tmpfs mount, permission bits included.
    pub mode: Option<u32>,
}

/// A test to perform to check that the container is healthy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthConfig {
    /// `[]` inherits, `["NONE"]` disables, `["CMD", args...]` or `["CMD-SHELL", command]` runs.
    pub test: Option<Vec<String>>,
    /// The time to wait between checks in nanoseconds.
    pub interval: Option<i64>,
    /// The time to wait before considering the check to have hung, in nanoseconds.
    pub timeout: Option<i64>,
    /// The number of consecutive failures needed to consider a container as unhealthy.
    pub retries: Option<i64>,
    /// Start period for the container to initialize before counting retries, in nanoseconds.
    pub start_period: Option<i64>,
}

/// Resolver configuration (`resolv.conf`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpecContainerSpecDnsConfig {
    /// The IP addresses of the name servers.
    pub nameservers: Option<Vec<String>>,
    /// A search list for host-name lookup.
    pub search: Option<Vec<String>>,
    /// Internal resolver variables to be modified (e.g., `debug`, `ndots:3`).
    pub options: Option<Vec<String>>,
}

/// A reference to a secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecContainerSpecSecrets {
    pub file: Option<TaskSpecContainerSpecFile>,
    #[serde(rename = "SecretID")]
    pub secret_id: Option<String>,
    /// Name of the secret, for display only. The secret is identified by its ID.
    pub secret_name: Option<String>,
}

/// A reference to a config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecContainerSpecConfigs {
    pub file: Option<TaskSpecContainerSpecFile>,
    #[serde(rename = "ConfigID")]
    pub config_id: Option<String>,
    /// Name of the config, for display only. The config is identified by its ID.
    pub config_name: Option<String>,
}

/// File target of a secret or config reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpecContainerSpecFile {
    /// Final filename in the container.
    pub name: Option<String>,
}

/// Resource requirements which apply to each container of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecResources {
    pub limits: Option<ResourceObject>,
    pub reservation: Option<ResourceObject>,
}

/// Resources advertised by a node or requested by a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct ResourceObject {
    #[serde(rename = "NanoCPUs")]
    pub nano_cpus: Option<i64>,
    pub memory_bytes: Option<i64>,
    pub generic_resources: Option<Vec<GenericResources>>,
}

/// User-defined resources, either named (`GPU=UUID1`) or discrete (`SSD=3`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct GenericResources {
    pub named_resource_spec: Option<GenericResourcesNamedResourceSpec>,
    pub discrete_resource_spec: Option<GenericResourcesDiscreteResourceSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct GenericResourcesNamedResourceSpec {
    pub kind: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct GenericResourcesDiscreteResourceSpec {
    pub kind: Option<String>,
    pub value: Option<i64>,
}

/// Restart policy for the containers of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpecRestartPolicy {
    /// Condition for restart.
    pub condition: Option<RestartCondition>,
    /// Delay between restart attempts, in nanoseconds.
    pub delay: Option<i64>,
    /// Maximum attempts to restart a given container before giving up (0 is ignored).
    pub max_attempts: Option<u64>,
    /// Time window used to evaluate the restart policy, in nanoseconds (0 is unbounded).
    pub window: Option<i64>,
}

wire_enum! {
    /// Condition for restart.
    pub enum RestartCondition {
        None => "none",
        OnFailure => "on-failure",
        Any => "any",
    }
}

/// Scheduling constraints for the tasks of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSpecPlacement {
    /// An array of constraints, e.g. `node.role==manager`.
    pub constraints: Option<Vec<String>>,
    /// Scheduler preferences, from highest to lowest precedence.
    pub preferences: Option<Vec<TaskSpecPlacementPreferences>>,
    /// Maximum number of replicas per node (0 is unlimited).
    pub max_replicas: Option<u64>,
    /// Platforms the service's image can run on.
    pub platforms: Option<Vec<Platform>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecPlacementPreferences {
    pub spread: Option<TaskSpecPlacementSpread>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecPlacementSpread {
    /// Label descriptor, such as `engine.labels.az`.
    pub spread_descriptor: Option<String>,
}

/// Platform represents the platform (Arch/OS).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Platform {
    /// Hardware architecture (for example, `x86_64`).
    pub architecture: Option<String>,
    /// Operating system (for example, `linux` or `windows`).
    #[serde(rename = "OS")]
    pub os: Option<String>,
}

/// Specifies how a service should be attached to a particular network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkAttachmentConfig {
    /// The target network for attachment. Must be a network name or ID.
    pub target: Option<String>,
}

/// Log driver for the tasks of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct TaskSpecLogDriver {
    pub name: Option<String>,
    pub options: Option<HashMap<String, String>>,
}

/// Properties that can be configured to access and load balance a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointSpec {
    /// The mode of resolution to use for internal load balancing between tasks.
    pub mode: Option<EndpointMode>,
    /// Exposed ports. Only allowed with `vip` resolution.
    pub ports: Option<Vec<EndpointPortConfig>>,
}

wire_enum! {
    /// The mode of resolution to use for internal load balancing between tasks.
    pub enum EndpointMode {
        Vip => "vip",
        Dnsrr => "dnsrr",
    }
}

/// A published port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct EndpointPortConfig {
    pub name: Option<String>,
    pub protocol: Option<PortProtocol>,
    /// The port inside the container.
    pub target_port: Option<u32>,
    /// The port on the swarm hosts.
    pub published_port: Option<u32>,
    pub publish_mode: Option<PublishMode>,
}

wire_enum! {
    /// Transport protocol of a published port.
    pub enum PortProtocol {
        Tcp => "tcp",
        Udp => "udp",
        Sctp => "sctp",
    }
}

wire_enum! {
    /// `ingress` publishes through the routing mesh on every node, `host` only on the nodes
    /// running a task.
    pub enum PublishMode {
        Ingress => "ingress",
        Host => "host",
    }
}
