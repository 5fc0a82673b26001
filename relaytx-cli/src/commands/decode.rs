use super::HexBytes;
use clap::Args;
use relaytx_core::types::{
    msg::{Msg, MsgNewBlockHashes},
    SignedTx,
};
use std::fmt::Write;

/// `relaytx decode <hex>`
#[derive(Debug, Args)]
pub struct DecodeCmd {
    /// Encoded transaction, as produced by the pipeline
    #[arg(value_name = "HEX")]
    pub tx: HexBytes,
}

impl DecodeCmd {
    pub fn run(&self) -> eyre::Result<()> {
        let tx = SignedTx::decode(&self.tx.0)?;
        print!("{}", describe(&tx)?);
        Ok(())
    }
}

/// Human readable summary of a signed transaction
pub(crate) fn describe(tx: &SignedTx) -> eyre::Result<String> {
    let body = tx.body()?;
    let auth_info = tx.auth_info()?;
    let mut out = String::new();

    writeln!(out, "hash:           {}", tx.hash())?;
    writeln!(out, "messages:       {}", body.messages.len())?;
    for (idx, any) in body.messages.iter().enumerate() {
        writeln!(out, "  [{idx}] {}", any.type_url)?;
        if any.type_url == MsgNewBlockHashes::TYPE_URL {
            let msg = MsgNewBlockHashes::from_any(any)?;
            writeln!(out, "      proposer:    {}", msg.proposer())?;
            writeln!(out, "      start block: {}", msg.start_block_number())?;
            for hash in msg.block_hash() {
                writeln!(out, "      hash:        {hash}")?;
            }
            writeln!(
                out,
                "      vote:        sequence {} epoch {}",
                msg.vote().sequence,
                msg.vote().epoch
            )?;
        }
    }
    if !body.memo.is_empty() {
        writeln!(out, "memo:           {}", body.memo)?;
    }
    if body.timeout_height > 0 {
        writeln!(out, "timeout height: {}", body.timeout_height)?;
    }
    for info in &auth_info.signer_infos {
        match &info.public_key {
            Some(key) => writeln!(out, "signer:         {key} (sequence {})", info.sequence)?,
            None => writeln!(out, "signer:         no public key (sequence {})", info.sequence)?,
        }
    }
    let fee = auth_info.fee.amount.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
    writeln!(out, "fee:            {fee} (gas limit {})", auth_info.fee.gas_limit)?;
    writeln!(out, "signatures:     {}", tx.signatures().len())?;
    Ok(out)
}
