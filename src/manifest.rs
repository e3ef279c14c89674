//! Manifest model and loader.
//!
//! A manifest declares four optional sections:
//!
//! ```yaml
//! Services:
//!   apache2:
//!     packages: [apache2, php5]
//! Packages:
//!   php5:
//!     files: [hello.php]
//! Files:
//!   hello.php:
//!     base: /var/www/html/
//!     name: hello.php
//!     content: "<?php echo 'Hello'; ?>"
//!     owner: root
//!     group: root
//!     mode: "644"
//! Evictions: [cron]
//! ```
//!
//! Mappings keep document order because services are cycled in the order
//! they are written. The manifest is read once and never mutated.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::{Result, RudiError};

/// Manifest file used when no path is given on the command line.
pub const DEFAULT_MANIFEST: &str = "rudi.yaml";

/// The declarative input of a convergence run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(rename = "Services", default)]
    pub services: Option<OrderedMap<ServiceSpec>>,

    #[serde(rename = "Packages", default)]
    pub packages: Option<OrderedMap<PackageSpec>>,

    #[serde(rename = "Files", default)]
    pub files: Option<OrderedMap<FileSpec>>,

    #[serde(rename = "Evictions", default)]
    pub evictions: Option<Vec<String>>,
}

/// A service and the packages installed while it is stopped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceSpec {
    pub packages: Vec<String>,
}

/// Files a package needs once it is installed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageSpec {
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

/// A single file to deploy.
///
/// `mode` is applied to both the parent directory and the file itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSpec {
    pub base: String,
    pub name: String,
    pub content: String,
    #[serde(deserialize_with = "scalar_string")]
    pub owner: String,
    #[serde(deserialize_with = "scalar_string")]
    pub group: String,
    #[serde(deserialize_with = "scalar_string")]
    pub mode: String,
}

impl FileSpec {
    /// Target path: `base` followed directly by `name`.
    ///
    /// No separator is inserted; `base` is expected to end with one.
    pub fn target_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.base, self.name))
    }
}

impl Manifest {
    /// Load a manifest, picking the format from the file extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RudiError::manifest(path, format!("cannot read manifest: {e}")))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.map_err(|message| RudiError::manifest(path, message))
    }

    /// Parse a YAML manifest. An empty or comment-only document is an empty manifest.
    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        if is_blank_document(content) {
            return Ok(Self::default());
        }
        let manifest: Option<Self> =
            serde_yaml_ng::from_str(content).map_err(|e| format!("invalid YAML: {e}"))?;
        Ok(manifest.unwrap_or_default())
    }

    /// Parse a JSON manifest.
    pub fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let manifest: Option<Self> =
            serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}"))?;
        Ok(manifest.unwrap_or_default())
    }

    /// Packages a service installs, in declared order.
    pub fn service_packages(&self, service: &str) -> &[String] {
        self.services
            .as_ref()
            .and_then(|services| services.get(service))
            .map(|spec| spec.packages.as_slice())
            .unwrap_or_default()
    }

    /// File keys a package requires. Unknown packages require nothing.
    pub fn package_files(&self, package: &str) -> &[String] {
        self.packages
            .as_ref()
            .and_then(|packages| packages.get(package))
            .and_then(|spec| spec.files.as_deref())
            .unwrap_or_default()
    }

    /// Look up a file descriptor by key.
    pub fn file(&self, key: &str) -> Option<&FileSpec> {
        self.files.as_ref().and_then(|files| files.get(key))
    }
}

fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

// ============================================================================
// Ordered mapping
// ============================================================================

/// A string-keyed mapping that keeps document order.
///
/// Duplicate keys are rejected while deserializing.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Insert or replace `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut access: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            map.entries.push((key, value));
        }
        Ok(map)
    }
}

/// Accept `owner: 0` or `mode: 644` as well as quoted strings.
fn scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
    })
}
