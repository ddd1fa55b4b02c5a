//! The party node — wires flows to their collaborators.

use std::sync::Arc;

use tokio::task::JoinHandle;

use accord_contract::{CommittedTransaction, StateRef, TokenState};
use accord_flows::{
    issue_flow, respond_once, transfer_flow, FlowConfig, FlowContext, FlowError, NotaryClient,
    ResponderOutcome, ResponderPolicy, TokenResponderPolicy,
};
use accord_types::{Amount, Commodity, KeyPair, LinearId, Party, PartyName};
use accord_vault::{MemoryVault, VaultReader};

use crate::error::NodeError;
use crate::events::CommitBus;
use crate::identity::IdentityDirectory;
use crate::metrics::FlowMetrics;
use crate::network::InProcessNetwork;

/// One party's running node: identity, keys, vault, responder loop, and the
/// operations a presentation layer consumes.
pub struct Node {
    ctx: Arc<FlowContext>,
    vault: Arc<MemoryVault>,
    directory: Arc<IdentityDirectory>,
    metrics: Arc<FlowMetrics>,
    commits: Arc<CommitBus>,
    responder: JoinHandle<()>,
}

impl Node {
    /// Start a node with the default token responder policy.
    ///
    /// Must be called from within a tokio runtime: the responder loop is
    /// spawned immediately.
    pub fn start(
        name: &str,
        keys: KeyPair,
        network: Arc<InProcessNetwork>,
        notary: Arc<dyn NotaryClient>,
        directory: Arc<IdentityDirectory>,
        flow_config: FlowConfig,
    ) -> Result<Arc<Node>, NodeError> {
        Self::start_with_policy(
            name,
            keys,
            network,
            notary,
            directory,
            flow_config,
            Arc::new(TokenResponderPolicy),
        )
    }

    /// Start a node with a custom responder policy.
    #[allow(clippy::too_many_arguments)]
    pub fn start_with_policy(
        name: &str,
        keys: KeyPair,
        network: Arc<InProcessNetwork>,
        notary: Arc<dyn NotaryClient>,
        directory: Arc<IdentityDirectory>,
        flow_config: FlowConfig,
        policy: Arc<dyn ResponderPolicy>,
    ) -> Result<Arc<Node>, NodeError> {
        let party = Party::new(PartyName::new(name), keys.public);
        if !directory.register(party.clone()) {
            return Err(NodeError::DuplicateParty(name.to_string()));
        }
        let mut incoming = network.register(&party);

        let vault = Arc::new(MemoryVault::new());
        let ctx = Arc::new(FlowContext {
            local: party,
            keys,
            vault: vault.clone(),
            transport: network,
            notary,
            config: flow_config,
        });
        let metrics = Arc::new(FlowMetrics::new());
        let commits = Arc::new(CommitBus::new());

        let responder = tokio::spawn({
            let ctx = Arc::clone(&ctx);
            let metrics = Arc::clone(&metrics);
            let commits = Arc::clone(&commits);
            async move {
                while let Some(mut session) = incoming.recv().await {
                    metrics.sessions_responded.inc();
                    let ctx = Arc::clone(&ctx);
                    let metrics = Arc::clone(&metrics);
                    let commits = Arc::clone(&commits);
                    let policy = Arc::clone(&policy);
                    tokio::spawn(async move {
                        match respond_once(&ctx, &mut session, policy.as_ref()).await {
                            Ok(ResponderOutcome::Committed(committed)) => {
                                metrics.transactions_recorded.inc();
                                commits.publish(&committed);
                            }
                            Ok(ResponderOutcome::Rejected { reason }) => {
                                tracing::info!(party = %ctx.local, %reason, "rejected incoming transaction");
                            }
                            Ok(ResponderOutcome::Aborted { reason }) => {
                                tracing::info!(party = %ctx.local, %reason, "incoming flow aborted");
                            }
                            Err(error) => {
                                tracing::warn!(party = %ctx.local, %error, "responder session failed");
                            }
                        }
                    });
                }
            }
        });

        tracing::info!(party = name, "node started");
        Ok(Arc::new(Node {
            ctx,
            vault,
            directory,
            metrics,
            commits,
            responder,
        }))
    }

    /// This node's resolved identity.
    pub fn whoami(&self) -> &Party {
        &self.ctx.local
    }

    /// Every other party registered with the identity directory.
    pub fn peers(&self) -> Vec<Party> {
        self.directory
            .parties()
            .into_iter()
            .filter(|p| *p != self.ctx.local)
            .collect()
    }

    /// Issue a fresh token of `quantity` units of `commodity` to this party.
    pub async fn issue(
        &self,
        quantity: u128,
        commodity: Commodity,
    ) -> Result<CommittedTransaction, NodeError> {
        self.metrics.flows_started.inc();
        let result = issue_flow(&self.ctx, Amount::new(quantity, commodity)).await;
        self.finish_flow(result)
    }

    /// Transfer the live token of `linear_id` to the party named
    /// `new_owner_name`. Name resolution happens before anything else; an
    /// unknown or ambiguous name fails without proposing a transaction.
    pub async fn transfer(
        &self,
        linear_id: LinearId,
        new_owner_name: &str,
    ) -> Result<CommittedTransaction, NodeError> {
        let new_owner = self.directory.resolve_party(new_owner_name)?;
        self.metrics.flows_started.inc();
        let result = transfer_flow(&self.ctx, linear_id, &new_owner).await;
        self.finish_flow(result)
    }

    /// All live records in this node's vault.
    pub fn live_records(&self) -> Result<Vec<(StateRef, TokenState)>, NodeError> {
        Ok(self.vault.live_records()?)
    }

    /// Live records denominated in the given commodity code.
    pub fn live_by_commodity(
        &self,
        code: &str,
    ) -> Result<Vec<(StateRef, TokenState)>, NodeError> {
        Ok(self.vault.live_by_commodity(code)?)
    }

    /// Subscribe to every transaction this node records.
    pub fn subscribe_commits(
        &self,
    ) -> tokio::sync::broadcast::Receiver<CommittedTransaction> {
        self.commits.subscribe()
    }

    pub fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    /// Stop the responder loop. In-flight flows initiated by this node are
    /// unaffected; new incoming sessions will no longer be answered.
    pub fn shutdown(&self) {
        self.responder.abort();
    }

    fn finish_flow(
        &self,
        result: Result<CommittedTransaction, FlowError>,
    ) -> Result<CommittedTransaction, NodeError> {
        match result {
            Ok(committed) => {
                self.metrics.flows_committed.inc();
                self.commits.publish(&committed);
                Ok(committed)
            }
            Err(error) => {
                self.metrics.flows_rejected.inc();
                if matches!(error, FlowError::NotarizationConflict { .. }) {
                    self.metrics.notarization_conflicts.inc();
                }
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notary::InProcessNotary;

    fn testnet() -> (
        Arc<InProcessNetwork>,
        Arc<InProcessNotary>,
        Arc<IdentityDirectory>,
    ) {
        (
            Arc::new(InProcessNetwork::new()),
            Arc::new(InProcessNotary::new()),
            Arc::new(IdentityDirectory::new()),
        )
    }

    #[tokio::test]
    async fn duplicate_party_name_is_refused() {
        let (network, notary, directory) = testnet();
        let _a = Node::start(
            "PartyA",
            accord_crypto::keypair_from_seed(&[1u8; 32]),
            Arc::clone(&network),
            notary.clone(),
            Arc::clone(&directory),
            FlowConfig::default(),
        )
        .unwrap();

        let result = Node::start(
            "PartyA",
            accord_crypto::keypair_from_seed(&[2u8; 32]),
            network,
            notary,
            directory,
            FlowConfig::default(),
        );
        assert!(matches!(result, Err(NodeError::DuplicateParty(_))));
    }

    #[tokio::test]
    async fn whoami_and_peers() {
        let (network, notary, directory) = testnet();
        let a = Node::start(
            "PartyA",
            accord_crypto::keypair_from_seed(&[1u8; 32]),
            Arc::clone(&network),
            notary.clone(),
            Arc::clone(&directory),
            FlowConfig::default(),
        )
        .unwrap();
        let _b = Node::start(
            "PartyB",
            accord_crypto::keypair_from_seed(&[2u8; 32]),
            network,
            notary,
            directory,
            FlowConfig::default(),
        )
        .unwrap();

        assert_eq!(a.whoami().name.as_str(), "PartyA");
        let peers = a.peers();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].name.as_str(), "PartyB");
    }
}
