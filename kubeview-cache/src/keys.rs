//! Cache key encoding for infrastructure and metric records.
//!
//! Keys must stay byte-for-byte stable across processes and releases: they
//! are shared with whatever populates the cache.

use kubeview_core::{Kind, ResourceIdentity};

/// Leading segment of every key.
pub const PROVIDER: &str = "kubernetes.v2";

/// Cache type namespace holding metric records.
pub const METRIC_TYPE_NAMESPACE: &str = "kubernetesMetric";

const SEPARATOR: char = ':';

/// Which family of records a key addresses.
///
/// The family is the second key segment, so keys of different families can
/// never collide even for the same identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Infrastructure,
    Metric,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Infrastructure => "infrastructure",
            KeyType::Metric => "metric",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "infrastructure" => Some(KeyType::Infrastructure),
            "metric" => Some(KeyType::Metric),
            _ => None,
        }
    }
}

/// A structured cache key.
///
/// # Format
///
/// `kubernetes.v2:<type>:<kind>:<account>:<location>:<name>`
///
/// Variable fields are escaped (`%` as `%25`, `:` as `%3A`) so that no field
/// can contain the separator. [`CacheKey::decode`] accepts exactly the
/// strings [`CacheKey::encode`] produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    key_type: KeyType,
    identity: ResourceIdentity,
}

impl CacheKey {
    pub fn infrastructure(identity: ResourceIdentity) -> Self {
        Self {
            key_type: KeyType::Infrastructure,
            identity,
        }
    }

    pub fn metric(identity: ResourceIdentity) -> Self {
        Self {
            key_type: KeyType::Metric,
            identity,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn into_identity(self) -> ResourceIdentity {
        self.identity
    }

    /// Encode to the string stored in the cache.
    pub fn encode(&self) -> String {
        let identity = &self.identity;
        format!(
            "{}:{}:{}:{}:{}:{}",
            PROVIDER,
            self.key_type.as_str(),
            escape(identity.kind().as_str()),
            escape(identity.account()),
            escape(identity.location()),
            escape(identity.name()),
        )
    }

    /// Decode a key string.
    ///
    /// Returns `None` if:
    /// - The provider prefix or key type segment is wrong
    /// - There are not exactly six segments
    /// - The kind is unknown or not in canonical form
    /// - A field contains an invalid escape sequence
    pub fn decode(key: &str) -> Option<Self> {
        let segments: Vec<&str> = key.split(SEPARATOR).collect();
        let [provider, key_type, kind, account, location, name] = segments.as_slice() else {
            return None;
        };

        if *provider != PROVIDER {
            return None;
        }
        let key_type = KeyType::parse(key_type)?;

        let kind_name = unescape(kind)?;
        let kind = Kind::parse(&kind_name)
            .ok()
            .filter(|kind| kind.as_str() == kind_name)?;

        Some(Self {
            key_type,
            identity: ResourceIdentity::new(
                kind,
                unescape(account)?,
                unescape(location)?,
                unescape(name)?,
            ),
        })
    }

    /// Prefix shared by every key of one family, kind and account.
    pub fn account_prefix(key_type: KeyType, kind: &Kind, account: &str) -> String {
        format!(
            "{}:{}:{}:{}:",
            PROVIDER,
            key_type.as_str(),
            escape(kind.as_str()),
            escape(account)
        )
    }
}

/// Key of the primary record for a resource.
pub fn infrastructure_key(kind: &Kind, account: &str, location: &str, name: &str) -> String {
    CacheKey::infrastructure(ResourceIdentity::new(kind.clone(), account, location, name)).encode()
}

/// Key of the metric record for a resource.
pub fn metric_key(kind: &Kind, account: &str, location: &str, name: &str) -> String {
    CacheKey::metric(ResourceIdentity::new(kind.clone(), account, location, name)).encode()
}

/// Parse any key produced by this module.
pub fn parse_key(key: &str) -> Option<CacheKey> {
    CacheKey::decode(key)
}

fn escape(field: &str) -> String {
    field.replace('%', "%25").replace(SEPARATOR, "%3A")
}

fn unescape(field: &str) -> Option<String> {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let escape = rest.get(idx + 1..idx + 3)?;
        match escape {
            "25" => out.push('%'),
            "3A" => out.push(SEPARATOR),
            _ => return None,
        }
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    Some(out)
}
