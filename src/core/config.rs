//! Agent and task configuration records loaded from YAML
//!
//! A crew keeps its agents and tasks in two documents, `agents.yaml` and
//! `tasks.yaml`. Each document maps an identifier to a record of named
//! fields. The store treats field values opaquely; presence and shape checks
//! happen when stages are built.

use crate::core::error::{CrewError, CrewResult};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which configuration document a record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Agents,
    Tasks,
}

impl Namespace {
    /// File name of the document holding this namespace
    pub fn file_name(&self) -> &'static str {
        match self {
            Namespace::Agents => "agents.yaml",
            Namespace::Tasks => "tasks.yaml",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Agents => write!(f, "agent"),
            Namespace::Tasks => write!(f, "task"),
        }
    }
}

/// A named configuration record, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord {
    id: String,
    fields: BTreeMap<String, Value>,
}

impl ConfigRecord {
    pub fn new(id: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw field value
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field value if it is a string
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

/// Where configuration documents come from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Directory holding `agents.yaml` and `tasks.yaml` (directly or under `config/`)
    Dir(PathBuf),
    /// The two documents as YAML text
    Yaml { agents: String, tasks: String },
}

/// Holds every agent and task record of a crew, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    agents: BTreeMap<String, ConfigRecord>,
    tasks: BTreeMap<String, ConfigRecord>,
}

impl ConfigStore {
    /// Load records from a configuration source
    pub fn load(source: ConfigSource) -> CrewResult<Self> {
        match source {
            ConfigSource::Dir(dir) => Self::from_dir(dir),
            ConfigSource::Yaml { agents, tasks } => Self::from_yaml(&agents, &tasks),
        }
    }

    /// Parse the agents and tasks documents
    pub fn from_yaml(agents: &str, tasks: &str) -> CrewResult<Self> {
        Ok(Self {
            agents: parse_namespace(Namespace::Agents.file_name(), agents)?,
            tasks: parse_namespace(Namespace::Tasks.file_name(), tasks)?,
        })
    }

    /// Load `agents.yaml` and `tasks.yaml` from a crew directory
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> CrewResult<Self> {
        let dir = dir.as_ref();
        let agents_path = locate(dir, Namespace::Agents);
        let tasks_path = locate(dir, Namespace::Tasks);

        let agents = read(&agents_path)?;
        let tasks = read(&tasks_path)?;

        Ok(Self {
            agents: parse_namespace(&agents_path.display().to_string(), &agents)?,
            tasks: parse_namespace(&tasks_path.display().to_string(), &tasks)?,
        })
    }

    /// Get a record by namespace and identifier
    pub fn get(&self, namespace: Namespace, id: &str) -> CrewResult<&ConfigRecord> {
        self.records(namespace)
            .get(id)
            .ok_or_else(|| CrewError::NotFound {
                namespace,
                id: id.to_string(),
            })
    }

    /// Identifiers in a namespace, sorted
    pub fn ids(&self, namespace: Namespace) -> impl Iterator<Item = &str> {
        self.records(namespace).keys().map(String::as_str)
    }

    pub fn len(&self, namespace: Namespace) -> usize {
        self.records(namespace).len()
    }

    fn records(&self, namespace: Namespace) -> &BTreeMap<String, ConfigRecord> {
        match namespace {
            Namespace::Agents => &self.agents,
            Namespace::Tasks => &self.tasks,
        }
    }
}

/// Prefer `<dir>/<file>`, fall back to `<dir>/config/<file>`
fn locate(dir: &Path, namespace: Namespace) -> PathBuf {
    let direct = dir.join(namespace.file_name());
    if direct.exists() {
        return direct;
    }
    let nested = dir.join("config").join(namespace.file_name());
    if nested.exists() {
        nested
    } else {
        direct
    }
}

fn read(path: &Path) -> CrewResult<String> {
    std::fs::read_to_string(path).map_err(|source| CrewError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_namespace(origin: &str, yaml: &str) -> CrewResult<BTreeMap<String, ConfigRecord>> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let document: Value = serde_yaml::from_str(yaml).map_err(|source| CrewError::Yaml {
        origin: origin.to_string(),
        source,
    })?;

    let mapping = match document {
        Value::Null => return Ok(BTreeMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(CrewError::invalid(
                origin,
                "expected a mapping of identifiers to records",
            ))
        }
    };

    let mut records = BTreeMap::new();
    for (key, value) in mapping {
        let id = key
            .as_str()
            .ok_or_else(|| CrewError::invalid(origin, "record identifiers must be strings"))?
            .to_string();

        let fields = match value {
            Value::Mapping(fields) => fields,
            _ => return Err(CrewError::invalid(&id, "record must be a mapping of fields")),
        };

        let mut named = BTreeMap::new();
        for (field, field_value) in fields {
            let name = field
                .as_str()
                .ok_or_else(|| CrewError::invalid(&id, "field names must be strings"))?;
            named.insert(name.to_string(), field_value);
        }

        records.insert(id.clone(), ConfigRecord::new(id, named));
    }

    Ok(records)
}
