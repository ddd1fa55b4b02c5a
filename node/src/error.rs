use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("flow error: {0}")]
    Flow(#[from] accord_flows::FlowError),

    #[error("identity error: {0}")]
    Identity(#[from] crate::identity::IdentityError),

    #[error("vault error: {0}")]
    Vault(#[from] accord_vault::VaultError),

    #[error("party {0} is already registered on this network")]
    DuplicateParty(String),

    #[error("config error: {0}")]
    Config(String),
}
