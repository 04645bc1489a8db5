/// Layered Configuration
///
/// Settings are addressed by a normalized key and resolved from three sources
/// in strict precedence order: command-line flags the user actually typed,
/// `GITHUB_`-prefixed environment variables, then built-in defaults. The
/// result is captured once into an immutable [`Snapshot`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use figment::providers::Serialized;
use figment::value::{Dict, Map, Value as Layered};
use figment::{Figment, Metadata, Profile, Provider};
use serde::Serialize;

use crate::core::error::{DecodeError, Error};

/// Environment variables by name.
pub type EnvMap = HashMap<String, String>;

/// Prefix for every environment variable the resolver reads.
pub const ENV_PREFIX: &str = "GITHUB";

/// Toolset selection used when none is configured.
pub const DEFAULT_TOOLSETS: &[&str] = &["all"];

/// Logical setting names, in canonical spelling.
pub mod keys {
    pub const TOOLSETS: &str = "toolsets";
    pub const DYNAMIC_TOOLSETS: &str = "dynamic-toolsets";
    pub const READ_ONLY: &str = "read-only";
    pub const LOG_FILE: &str = "log-file";
    pub const ENABLE_COMMAND_LOGGING: &str = "enable-command-logging";
    pub const EXPORT_TRANSLATIONS: &str = "export-translations";
    pub const HOST: &str = "host";
    pub const PERSONAL_ACCESS_TOKEN: &str = "personal-access-token";
}

const SEPARATORS: [char; 1] = ['_'];
const CANONICAL_SEPARATOR: &str = "-";

/// Canonicalize a key: lower-case, every separator variant replaced by `-`.
///
/// Idempotent, so flag registration and lookup can both run through it.
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(SEPARATORS, CANONICAL_SEPARATOR)
}

/// A normalized configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
    pub fn new(raw: &str) -> Self {
        ConfigKey(normalize_key(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConfigKey {
    fn from(raw: &str) -> Self {
        ConfigKey::new(raw)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Str(_) => Kind::Str,
            Value::Bool(_) => Kind::Bool,
            Value::List(_) => Kind::List,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    Bool,
    List,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::Bool => "boolean",
            Kind::List => "list",
        }
    }
}

/// `PREFIX_*` variables from an injected environment, as a figment layer.
///
/// Matches the prefix case-insensitively like `Env::prefixed`, strips it and
/// normalizes the rest, so `GITHUB_READ_ONLY` lands on `read-only`. Empty
/// values are left out and count as unset.
struct PrefixedEnv<'a> {
    prefix: String,
    vars: &'a EnvMap,
}

impl<'a> PrefixedEnv<'a> {
    fn new(prefix: &str, vars: &'a EnvMap) -> Self {
        Self {
            prefix: format!("{}_", prefix.to_ascii_uppercase()),
            vars,
        }
    }

    fn key_for(&self, name: &str) -> Option<String> {
        let head = name.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        let key = normalize_key(&name[self.prefix.len()..]);
        (!key.is_empty()).then_some(key)
    }
}

impl Provider for PrefixedEnv<'_> {
    fn metadata(&self) -> Metadata {
        Metadata::named(format!("`{}` environment variable(s)", self.prefix))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let dict: Dict = self
            .vars
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(name, value)| Some((self.key_for(name)?, Layered::from(value.clone()))))
            .collect();
        Ok(Profile::Default.collect(dict))
    }
}

/// Layered key/value store: flags > environment > defaults.
///
/// The layers are merged by figment; this type only tracks which keys exist,
/// their types and which flag feeds each key.
#[derive(Debug, Default)]
pub struct Resolver {
    prefix: String,
    kinds: BTreeMap<ConfigKey, Kind>,
    defaults: BTreeMap<String, Value>,
    bindings: HashMap<ConfigKey, ConfigKey>,
    flags: HashMap<ConfigKey, Value>,
    env: EnvMap,
}

impl Resolver {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    /// Replace the environment the resolver reads from.
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env = vars.into_iter().collect();
        self
    }

    /// Declare a key and its type without a default.
    pub fn declare(&mut self, key: &str, kind: Kind) {
        self.kinds.insert(ConfigKey::new(key), kind);
    }

    /// Declare a key with a default; the default also fixes its type.
    pub fn set_default(&mut self, key: &str, value: Value) {
        let key = ConfigKey::new(key);
        self.kinds.insert(key.clone(), value.kind());
        self.defaults.insert(key.as_str().to_string(), value);
    }

    /// Allow `key` to be supplied by the command-line flag `flag`.
    pub fn bind(&mut self, key: &str, flag: &str) {
        let key = ConfigKey::new(key);
        self.kinds.entry(key.clone()).or_insert(Kind::Str);
        self.bindings.insert(key, ConfigKey::new(flag));
    }

    /// Record a flag the user passed explicitly on the command line.
    pub fn set_flag(&mut self, flag: &str, value: Value) {
        self.flags.insert(ConfigKey::new(flag), value);
    }

    /// Defaults, then the prefixed environment, then bound flags as globals.
    fn figment(&self) -> Figment {
        let flags: BTreeMap<&str, &Value> = self
            .bindings
            .iter()
            .filter_map(|(key, flag)| Some((key.as_str(), self.flags.get(flag)?)))
            .collect();

        Figment::from(Serialized::defaults(&self.defaults))
            .merge(PrefixedEnv::new(&self.prefix, &self.env))
            .merge(Serialized::globals(flags))
    }

    pub fn get_string(&self, key: &str) -> Result<String, Error> {
        resolve_string(&self.figment(), &ConfigKey::new(key))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, Error> {
        resolve_bool(&self.figment(), &ConfigKey::new(key))
    }

    /// String values are split on commas here rather than by a generic
    /// decoder; every entry must be non-empty.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, Error> {
        resolve_string_list(&self.figment(), &ConfigKey::new(key))
    }

    /// Resolve every declared key into an immutable snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, Error> {
        let figment = self.figment();
        let mut values = BTreeMap::new();
        for (key, kind) in &self.kinds {
            let value = match kind {
                Kind::Str => Value::Str(resolve_string(&figment, key)?),
                Kind::Bool => Value::Bool(resolve_bool(&figment, key)?),
                Kind::List => Value::List(resolve_string_list(&figment, key)?),
            };
            values.insert(key.clone(), value);
        }
        Ok(Snapshot { values })
    }
}

fn lookup(figment: &Figment, key: &ConfigKey) -> Result<Option<Layered>, Error> {
    match figment.find_value(key.as_str()) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.missing() => Ok(None),
        Err(e) => Err(Error::ConfigLoad(e)),
    }
}

fn resolve_string(figment: &Figment, key: &ConfigKey) -> Result<String, Error> {
    match lookup(figment, key)? {
        None => Ok(String::new()),
        Some(Layered::String(_, s)) => Ok(s),
        Some(Layered::Bool(_, b)) => Ok(b.to_string()),
        Some(other) => Err(mismatch(key, Kind::Str, &other)),
    }
}

fn resolve_bool(figment: &Figment, key: &ConfigKey) -> Result<bool, Error> {
    match lookup(figment, key)? {
        None => Ok(false),
        Some(Layered::Bool(_, b)) => Ok(b),
        Some(Layered::String(_, s)) => parse_bool(&s).map_err(|e| Error::decode(key.as_str(), e)),
        Some(other) => Err(mismatch(key, Kind::Bool, &other)),
    }
}

fn resolve_string_list(figment: &Figment, key: &ConfigKey) -> Result<Vec<String>, Error> {
    let parsed = match lookup(figment, key)? {
        None => return Ok(Vec::new()),
        Some(Layered::String(_, s)) => split_list(&s),
        Some(Layered::Array(_, items)) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in &items {
                match item.as_str() {
                    Some(entry) => entries.push(entry.to_string()),
                    None => return Err(mismatch(key, Kind::Str, item)),
                }
            }
            check_entries(&entries)
        }
        Some(other) => return Err(mismatch(key, Kind::List, &other)),
    };
    parsed.map_err(|e| Error::decode(key.as_str(), e))
}

fn layered_kind(value: &Layered) -> &'static str {
    match value {
        Layered::String(..) | Layered::Char(..) => Kind::Str.name(),
        Layered::Bool(..) => Kind::Bool.name(),
        Layered::Array(..) => Kind::List.name(),
        Layered::Num(..) => "number",
        Layered::Dict(..) => "table",
        Layered::Empty(..) => "empty",
    }
}

fn mismatch(key: &ConfigKey, expected: Kind, found: &Layered) -> Error {
    Error::decode(
        key.as_str(),
        DecodeError::TypeMismatch {
            expected: expected.name(),
            found: layered_kind(found),
        },
    )
}

fn parse_bool(raw: &str) -> Result<bool, DecodeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(DecodeError::InvalidBool(raw.to_string())),
    }
}

fn split_list(raw: &str) -> Result<Vec<String>, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let items: Vec<String> = raw.split(',').map(|s| s.trim().to_string()).collect();
    check_entries(&items).map_err(|e| match e {
        DecodeError::EmptyListEntry { index, .. } => DecodeError::EmptyListEntry {
            index,
            raw: raw.to_string(),
        },
        other => other,
    })
}

fn check_entries(items: &[String]) -> Result<Vec<String>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let item = item.trim();
            if item.is_empty() {
                Err(DecodeError::EmptyListEntry {
                    index,
                    raw: items.join(","),
                })
            } else {
                Ok(item.to_string())
            }
        })
        .collect()
}

/// Immutable, fully merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    values: BTreeMap<ConfigKey, Value>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&ConfigKey::new(key))
    }

    pub fn get_string(&self, key: &str) -> &str {
        match self.get(key) {
            Some(Value::Str(s)) => s,
            _ => "",
        }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    pub fn get_string_list(&self, key: &str) -> &[String] {
        match self.get(key) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }
}

/// The process environment, skipping entries that are not valid UTF-8.
pub fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Resolver with every GitHub server option declared and bound to its flag.
pub fn github_resolver<I>(env: I) -> Resolver
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut resolver = Resolver::new(ENV_PREFIX).with_env(env);

    resolver.set_default(
        keys::TOOLSETS,
        Value::List(DEFAULT_TOOLSETS.iter().map(|s| s.to_string()).collect()),
    );
    resolver.set_default(keys::DYNAMIC_TOOLSETS, Value::Bool(false));
    resolver.set_default(keys::READ_ONLY, Value::Bool(false));
    resolver.set_default(keys::LOG_FILE, Value::Str(String::new()));
    resolver.set_default(keys::ENABLE_COMMAND_LOGGING, Value::Bool(false));
    resolver.set_default(keys::EXPORT_TRANSLATIONS, Value::Bool(false));
    resolver.set_default(keys::HOST, Value::Str(String::new()));
    resolver.declare(keys::PERSONAL_ACCESS_TOKEN, Kind::Str);

    resolver.bind(keys::TOOLSETS, "toolsets");
    // registered with the env spelling on purpose; normalization folds it
    resolver.bind("dynamic_toolsets", "dynamic-toolsets");
    resolver.bind(keys::READ_ONLY, "read-only");
    resolver.bind(keys::LOG_FILE, "log-file");
    resolver.bind(keys::ENABLE_COMMAND_LOGGING, "enable-command-logging");
    resolver.bind(keys::EXPORT_TRANSLATIONS, "export-translations");
    resolver.bind(keys::HOST, "gh-host");

    resolver
}
