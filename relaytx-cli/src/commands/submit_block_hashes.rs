use super::{keyring, provider, HexBytes};
use crate::config::RelaytxConfig;
use clap::Args;
use relaytx_core::types::msg::{MsgNewBlockHashes, Votes};
use relaytx_middleware::TxClient;
use std::sync::Arc;
use tracing::{info, warn};

/// `relaytx submit-block-hashes --start-block N --hash HEX... --vote-signature HEX`
///
/// The proposer is the address of the configured key.
#[derive(Debug, Args)]
pub struct SubmitBlockHashesCmd {
    /// Height of the first hash
    #[arg(long)]
    pub start_block: u64,

    /// Block hash, repeat for every consecutive block
    #[arg(long = "hash", value_name = "HEX", required = true)]
    pub hashes: Vec<HexBytes>,

    /// Aggregated vote signature
    #[arg(long, value_name = "HEX")]
    pub vote_signature: HexBytes,

    #[arg(long, default_value_t = 0)]
    pub vote_sequence: u64,

    #[arg(long, default_value_t = 0)]
    pub vote_epoch: u64,

    /// Bitmap of the voters
    #[arg(long, value_name = "HEX")]
    pub voters: Option<HexBytes>,
}

impl SubmitBlockHashesCmd {
    fn votes(&self) -> Votes {
        let votes = Votes::new(self.vote_signature.0.clone())
            .sequence(self.vote_sequence)
            .epoch(self.vote_epoch);
        match &self.voters {
            Some(voters) => votes.voters(voters.0.clone()),
            None => votes,
        }
    }

    pub async fn run(&self, config: &RelaytxConfig) -> eyre::Result<()> {
        let tx_config = config.tx_config()?;
        let provider = Arc::new(provider(config)?);
        let keyring = keyring(config, &tx_config.key_name)?;
        let client = TxClient::new(provider.clone(), provider, keyring, tx_config);

        let proposer = client.identity().await?.address;
        let msg = MsgNewBlockHashes::builder()
            .proposer(proposer.as_str())
            .start_block_number(self.start_block)
            .block_hashes(self.hashes.iter().map(|hash| hash.0.clone()))
            .vote(self.votes())
            .build()?;
        info!(
            %proposer,
            start_block = self.start_block,
            hashes = self.hashes.len(),
            "submitting block hashes"
        );

        let cancel = async {
            // without a signal handler the submission simply runs to completion
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await
            }
        };
        match client.send_until(&[msg], cancel).await {
            Ok(tx_hash) => {
                println!("{tx_hash}");
                Ok(())
            }
            Err(err) => {
                if let Some(tx_hash) = err.pending_hash() {
                    warn!(%tx_hash, "transaction may still be included, check it before resubmitting");
                }
                let kind = err.kind();
                Err(eyre::Report::new(err).wrap_err(format!("{kind}")))
            }
        }
    }
}
