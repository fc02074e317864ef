use crate::contract::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Prefix,
    /// Log group names embed the environment prefix mid-path
    /// (`/aws/lambda/<prefix>...`), so they match anywhere in the name.
    Substring,
}

impl NameMatch {
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::LogGroup => Self::Substring,
            ResourceKind::Table | ResourceKind::ObjectStore | ResourceKind::EventBus => {
                Self::Prefix
            }
        }
    }

    pub fn matches(self, name: &str, environment_prefix: &str) -> bool {
        match self {
            Self::Prefix => name.starts_with(environment_prefix),
            Self::Substring => name.contains(environment_prefix),
        }
    }
}

pub fn belongs_to_environment(kind: ResourceKind, name: &str, environment_prefix: &str) -> bool {
    NameMatch::for_kind(kind).matches(name, environment_prefix)
}
