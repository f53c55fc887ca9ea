use kubeview_core::{Kind, KindHandler};

/// Fallback handler: always stable, no artifacts, no warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericHandler {
    kind: Kind,
}

impl GenericHandler {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }
}

impl KindHandler for GenericHandler {
    fn kind(&self) -> Kind {
        self.kind.clone()
    }
}
