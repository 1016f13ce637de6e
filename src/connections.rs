use crate::service::ConnectionCatalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The form parameter whose choices are the usable connections.
const CONNECTION_PARAMETER: &str = "connection";

/// The backing store of a connection.  Types outside the ones this crate cares about are kept
/// verbatim as [ConnectionType::Other].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
#[allow(clippy::upper_case_acronyms)]
pub enum ConnectionType {
    EC2,
    Filesystem,
    GCS,
    Azure,
    Other(String),
}

impl ConnectionType {
    /// Whether managed folders for this plugin may be stored on this type of connection.
    fn is_supported(&self) -> bool {
        !matches!(self, ConnectionType::Other(_))
    }
}

impl From<String> for ConnectionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "EC2" => Self::EC2,
            "Filesystem" => Self::Filesystem,
            "GCS" => Self::GCS,
            "Azure" => Self::Azure,
            _ => Self::Other(s),
        }
    }
}

impl From<ConnectionType> for String {
    fn from(t: ConnectionType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EC2 => write!(f, "EC2"),
            Self::Filesystem => write!(f, "Filesystem"),
            Self::GCS => write!(f, "GCS"),
            Self::Azure => write!(f, "Azure"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Settings of one platform connection, as far as the resolver needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub allow_write: bool,
    #[serde(default)]
    pub allow_managed_folders: bool,
}

/// One entry of a form dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// The response shape of a parameter resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterChoices {
    pub choices: Vec<Choice>,
}

/// The request passed by the host when it needs choices for a form parameter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRequest {
    pub parameter_name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub plugin_config: Value,
    #[serde(default)]
    pub inputs: Value,
}

/// Keep the connections that can hold a writable managed folder, labelled with their type.
/// Input order is preserved.
pub fn filter_connections(all: &[ConnectionDescriptor]) -> Vec<Choice> {
    all.iter()
        .filter(|c| c.connection_type.is_supported() && c.allow_write && c.allow_managed_folders)
        .map(|c| Choice {
            value: c.name.clone(),
            label: format!("{} ({})", c.name, c.connection_type),
        })
        .collect()
}

/// Resolve the choices for a form parameter.  An unknown parameter name yields a single
/// placeholder choice rather than an error, so the form always has something to show.
pub async fn resolve_parameter(
    request: &ParameterRequest,
    catalog: &dyn ConnectionCatalog,
) -> Result<ParameterChoices> {
    if request.parameter_name != CONNECTION_PARAMETER {
        log::warn!("unknown parameter {:?}", request.parameter_name);
        return Ok(ParameterChoices {
            choices: vec![Choice {
                value: "wrong".to_owned(),
                label: "Problem getting the name of the parameter.".to_owned(),
            }],
        });
    }

    let mut descriptors = vec![];
    for name in catalog
        .list_connections()
        .await
        .context("listing connections")?
    {
        let settings = catalog
            .connection_settings(&name)
            .await
            .with_context(|| format!("reading settings of connection {}", name))?;
        descriptors.push(settings);
    }

    let choices = filter_connections(&descriptors);
    log::debug!(
        "{} of {} connections usable for managed folders",
        choices.len(),
        descriptors.len()
    );
    Ok(ParameterChoices { choices })
}
