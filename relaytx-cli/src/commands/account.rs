use super::provider;
use crate::config::RelaytxConfig;
use clap::Args;
use relaytx_core::types::Address;
use relaytx_providers::AccountRetriever;

/// `relaytx account <address>`
#[derive(Debug, Args)]
pub struct AccountCmd {
    /// Account address, e.g. goat1...
    pub address: Address,
}

impl AccountCmd {
    pub async fn run(&self, config: &RelaytxConfig) -> eyre::Result<()> {
        let provider = provider(config)?;
        let meta = provider.resolve(&self.address).await?;
        println!("address:        {}", self.address);
        println!("account number: {}", meta.account_number);
        println!("sequence:       {}", meta.sequence);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requires_rpc_url() {
        let cmd = AccountCmd { address: "goat1xyz".parse().unwrap() };
        let err = cmd.run(&RelaytxConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("rpc_url"));
    }
}
