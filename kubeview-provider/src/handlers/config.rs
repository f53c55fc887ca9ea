use kubeview_core::{Artifact, Kind, KindHandler, Manifest};

/// Handler for config maps and secrets.
///
/// The object is itself the artifact. Versioned objects (`app-config-v003`)
/// report the `vNNN` suffix as the artifact version and the base name as the
/// artifact name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResourceHandler {
    kind: Kind,
}

impl ConfigResourceHandler {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }

    pub fn config_map() -> Self {
        Self::new(Kind::ConfigMap)
    }

    pub fn secret() -> Self {
        Self::new(Kind::Secret)
    }
}

/// Split `name-vNNN` into `("name", Some("vNNN"))`.
fn split_version(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once("-v") {
        Some((base, digits))
            if !base.is_empty()
                && digits.len() == 3
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            (base, Some(&name[base.len() + 1..]))
        }
        _ => (name, None),
    }
}

impl KindHandler for ConfigResourceHandler {
    fn kind(&self) -> Kind {
        self.kind.clone()
    }

    fn list_artifacts(&self, manifest: &Manifest) -> Vec<Artifact> {
        let Some(full_name) = manifest.name() else {
            return Vec::new();
        };

        let (base, version) = split_version(full_name);
        let mut artifact = Artifact::kubernetes(self.kind.as_str(), base, manifest.namespace());
        artifact.reference = full_name.to_string();
        artifact.version = version.map(str::to_string);
        vec![artifact]
    }
}
