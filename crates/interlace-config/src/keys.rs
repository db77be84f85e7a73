//! Stable property key names shared by every bootstrap component.

/// Delimited list of management component selectors.
pub const MANAGEMENT_COMPONENTS: &str = "management.components";

/// Address the remote connector server binds to (`tcp://host:port`).
pub const REMOTE_REGISTRY_SERVICE_ADDRESS: &str = "remote.registry.service.address";

/// Object-name override for the exposed connector server.
pub const REMOTE_REGISTRY_OBJECT_NAME: &str = "remote.registry.object.name";

/// Prefix for connector environment entries (`<prefix><name>=<value>`).
pub const REMOTE_REGISTRY_ENV_PREFIX: &str = "remote.registry.env.";

/// Address the embedded web console binds to (`tcp://host:port`).
pub const WEBCONSOLE_LISTEN_ADDRESS: &str = "webconsole.listen.address";

/// Serialisation format used by the default marshaller.
pub const MARSHALLER_OUTPUT_FORMAT: &str = "marshaller.output.format";

/// Whether marshalled output is pretty-printed.
pub const MARSHALLER_OUTPUT_BEAUTIFY: &str = "marshaller.output.beautify";

/// Names a registered custom adapter registry implementation.
pub const ADAPTER_REGISTRY_IMPL: &str = "adapter.registry.impl";

/// Object-name override for the exposed adapter registry.
pub const ADAPTER_REGISTRY_OBJECT_NAME: &str = "adapter.registry.object.name";

/// Primary adapter configuration location; `.N` suffixes declare secondaries.
pub const ADAPTER_CONFIG_URL: &str = "adapter.config.url";

/// Overrides the default adapter configuration resource name.
pub const ADAPTER_CONFIG_DEFAULT_NAME: &str = "adapter.config.default.name";

/// Selects the configuration manager variant.
pub const CONFIGURATION_MANAGER: &str = "configuration.manager";

/// Version-control implementation name.
pub const VCS_IMPLEMENTATION: &str = "vcs.implementation";

/// Remote repository URL for the version-control backend.
pub const VCS_REMOTE_URL: &str = "vcs.remote.url";

/// Local working copy path for the version-control backend.
pub const VCS_WORKING_COPY: &str = "vcs.working.copy";

/// Optional branch checked out by the version-control backend.
pub const VCS_BRANCH: &str = "vcs.branch";

/// Forces the logging backend to initialise from a specific source.
pub const LOGGING_CONFIG_URL: &str = "logging.config.url";
