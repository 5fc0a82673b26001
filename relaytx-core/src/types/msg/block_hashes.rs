use super::{MessageError, Msg};
use crate::{
    proto,
    types::{Address, Bytes},
};
use serde::{Deserialize, Serialize};

/// The votes of the relayer set backing a proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votes {
    /// Relayer sequence the votes were cast at
    pub sequence: u64,
    /// Relayer epoch the votes were cast in
    pub epoch: u64,
    /// Bitmap of the voters that took part
    pub voters: Bytes,
    /// Aggregated vote signature. Must not be empty.
    pub signature: Bytes,
}

impl Votes {
    /// Votes carrying only an aggregated signature
    pub fn new<T: Into<Bytes>>(signature: T) -> Self {
        Self { signature: signature.into(), ..Default::default() }
    }

    #[must_use]
    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub fn voters<T: Into<Bytes>>(mut self, voters: T) -> Self {
        self.voters = voters.into();
        self
    }
}

impl From<&Votes> for proto::Votes {
    fn from(votes: &Votes) -> Self {
        proto::Votes {
            sequence: votes.sequence,
            epoch: votes.epoch,
            voters: votes.voters.to_vec(),
            signature: votes.signature.to_vec(),
        }
    }
}

impl From<proto::Votes> for Votes {
    fn from(raw: proto::Votes) -> Self {
        Votes {
            sequence: raw.sequence,
            epoch: raw.epoch,
            voters: raw.voters.into(),
            signature: raw.signature.into(),
        }
    }
}

/// Announces the hashes of a run of consecutive Bitcoin blocks, starting at
/// `start_block_number`, on behalf of the relayer set.
///
/// Built through [`MsgNewBlockHashes::builder`], which enforces that the proposer
/// is set, that at least one hash is present, that no hash is empty and that the
/// votes carry a signature. The fields cannot be changed afterwards, and
/// deserializing goes through the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "MsgNewBlockHashesFields")]
pub struct MsgNewBlockHashes {
    proposer: Address,
    start_block_number: u64,
    block_hash: Vec<Bytes>,
    vote: Votes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MsgNewBlockHashesFields {
    proposer: String,
    start_block_number: u64,
    block_hash: Vec<Bytes>,
    vote: Votes,
}

impl TryFrom<MsgNewBlockHashesFields> for MsgNewBlockHashes {
    type Error = MessageError;

    fn try_from(fields: MsgNewBlockHashesFields) -> Result<Self, Self::Error> {
        MsgNewBlockHashes::builder()
            .proposer(fields.proposer)
            .start_block_number(fields.start_block_number)
            .block_hashes(fields.block_hash)
            .vote(fields.vote)
            .build()
    }
}

impl MsgNewBlockHashes {
    /// Starts an empty builder. [`MsgNewBlockHashesBuilder::build`] checks the
    /// payload.
    pub fn builder() -> MsgNewBlockHashesBuilder {
        MsgNewBlockHashesBuilder::default()
    }

    pub fn proposer(&self) -> &Address {
        &self.proposer
    }

    pub fn start_block_number(&self) -> u64 {
        self.start_block_number
    }

    /// Block hashes in height order, the first one at `start_block_number`
    pub fn block_hash(&self) -> &[Bytes] {
        &self.block_hash
    }

    pub fn vote(&self) -> &Votes {
        &self.vote
    }
}

impl Msg for MsgNewBlockHashes {
    const TYPE_URL: &'static str = "/goat.bitcoin.v1.MsgNewBlockHashes";

    type Proto = proto::MsgNewBlockHashes;

    fn signer(&self) -> &Address {
        &self.proposer
    }

    fn validate(&self) -> Result<(), MessageError> {
        if self.block_hash.is_empty() {
            return Err(MessageError::InvalidPayload("block hash list is empty".to_owned()))
        }
        if let Some(idx) = self.block_hash.iter().position(|hash| hash.is_empty()) {
            return Err(MessageError::InvalidPayload(format!("block hash #{idx} is empty")))
        }
        if self.vote.signature.is_empty() {
            return Err(MessageError::InvalidPayload("vote signature is empty".to_owned()))
        }
        Ok(())
    }

    fn to_proto(&self) -> proto::MsgNewBlockHashes {
        proto::MsgNewBlockHashes {
            proposer: self.proposer.to_string(),
            vote: Some((&self.vote).into()),
            start_block_number: self.start_block_number,
            block_hash: self.block_hash.iter().map(Bytes::to_vec).collect(),
        }
    }

    fn from_proto(raw: proto::MsgNewBlockHashes) -> Result<Self, MessageError> {
        let builder = MsgNewBlockHashes::builder()
            .proposer(raw.proposer)
            .start_block_number(raw.start_block_number)
            .block_hashes(raw.block_hash);
        let builder = match raw.vote {
            Some(vote) => builder.vote(vote.into()),
            None => builder,
        };
        builder.build()
    }
}

/// Builder for [`MsgNewBlockHashes`].
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct MsgNewBlockHashesBuilder {
    proposer: Option<String>,
    start_block_number: u64,
    block_hash: Vec<Bytes>,
    vote: Option<Votes>,
}

impl MsgNewBlockHashesBuilder {
    /// Sets the proposing relayer, which is also the message signer
    pub fn proposer<T: Into<String>>(mut self, proposer: T) -> Self {
        self.proposer = Some(proposer.into());
        self
    }

    pub fn start_block_number(mut self, number: u64) -> Self {
        self.start_block_number = number;
        self
    }

    /// Appends one block hash
    pub fn block_hash<T: Into<Bytes>>(mut self, hash: T) -> Self {
        self.block_hash.push(hash.into());
        self
    }

    /// Appends several block hashes, keeping their order
    pub fn block_hashes<I, T>(mut self, hashes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        self.block_hash.extend(hashes.into_iter().map(Into::into));
        self
    }

    pub fn vote(mut self, vote: Votes) -> Self {
        self.vote = Some(vote);
        self
    }

    /// Validates the collected fields and builds the message
    pub fn build(self) -> Result<MsgNewBlockHashes, MessageError> {
        let proposer = self
            .proposer
            .ok_or_else(|| MessageError::InvalidPayload("proposer is missing".to_owned()))?;
        let proposer = Address::new(proposer)
            .map_err(|err| MessageError::InvalidPayload(format!("proposer: {err}")))?;
        let vote =
            self.vote.ok_or_else(|| MessageError::InvalidPayload("vote is missing".to_owned()))?;

        let msg = MsgNewBlockHashes {
            proposer,
            start_block_number: self.start_block_number,
            block_hash: self.block_hash,
            vote,
        };
        msg.validate()?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Any;

    fn builder() -> MsgNewBlockHashesBuilder {
        MsgNewBlockHashes::builder()
            .proposer("addr1")
            .start_block_number(100)
            .block_hashes([b"h1".to_vec(), b"h2".to_vec()])
            .vote(Votes::new(b"sig".to_vec()))
    }

    #[test]
    fn builds_valid_message() {
        let msg = builder().build().unwrap();
        assert_eq!(msg.signer().as_str(), "addr1");
        assert_eq!(msg.start_block_number(), 100);
        assert_eq!(msg.block_hash().len(), 2);
        assert_eq!(msg.block_hash()[0], b"h1".to_vec());
        assert_eq!(msg.vote().signature, b"sig".to_vec());
    }

    #[test]
    fn rejects_empty_hash_list() {
        let err = MsgNewBlockHashes::builder()
            .proposer("addr1")
            .vote(Votes::new(b"sig".to_vec()))
            .build()
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_missing_fields() {
        let no_proposer = MsgNewBlockHashes::builder()
            .block_hash(b"h1".to_vec())
            .vote(Votes::new(b"sig".to_vec()))
            .build();
        assert!(matches!(no_proposer, Err(MessageError::InvalidPayload(_))));

        assert!(matches!(builder().proposer("  ").build(), Err(MessageError::InvalidPayload(_))));
        assert!(matches!(
            builder().block_hash(Vec::new()).build(),
            Err(MessageError::InvalidPayload(msg)) if msg.contains("#2")
        ));
        assert!(matches!(
            builder().vote(Votes::new(Vec::new())).build(),
            Err(MessageError::InvalidPayload(_))
        ));

        let no_vote = MsgNewBlockHashes::builder().proposer("addr1").block_hash(b"h1".to_vec()).build();
        assert!(matches!(no_vote, Err(MessageError::InvalidPayload(_))));
    }

    #[test]
    fn envelope_roundtrip() {
        let msg = builder().build().unwrap();
        let any = msg.to_any();
        assert_eq!(any.type_url, "/goat.bitcoin.v1.MsgNewBlockHashes");
        assert_eq!(MsgNewBlockHashes::from_any(&any).unwrap(), msg);

        let wrong = Any { type_url: "/other.Msg".to_owned(), value: any.value.clone() };
        assert!(matches!(
            MsgNewBlockHashes::from_any(&wrong),
            Err(MessageError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn encoding_depends_on_every_field() {
        let base = builder().build().unwrap().encode();
        let variants = [
            builder().proposer("addr2").build().unwrap(),
            builder().start_block_number(101).build().unwrap(),
            builder().block_hash(b"h3".to_vec()).build().unwrap(),
            builder().vote(Votes::new(b"sig2".to_vec())).build().unwrap(),
            builder().vote(Votes::new(b"sig".to_vec()).epoch(1)).build().unwrap(),
        ];
        for variant in variants {
            assert_ne!(variant.encode(), base);
        }
        assert_eq!(builder().build().unwrap().encode(), base);
    }

    #[test]
    fn decoding_enforces_the_payload_rules() {
        let mut raw = builder().build().unwrap().to_proto();
        raw.block_hash.clear();
        let any = Any {
            type_url: MsgNewBlockHashes::TYPE_URL.to_owned(),
            value: prost::Message::encode_to_vec(&raw).into(),
        };
        assert!(matches!(MsgNewBlockHashes::from_any(&any), Err(MessageError::InvalidPayload(_))));

        let mut raw = builder().build().unwrap().to_proto();
        raw.vote = None;
        assert!(matches!(MsgNewBlockHashes::from_proto(raw), Err(MessageError::InvalidPayload(_))));
    }

    #[test]
    fn deserializing_enforces_the_payload_rules() {
        let msg = builder().build().unwrap();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["startBlockNumber"], 100);
        assert_eq!(serde_json::from_value::<MsgNewBlockHashes>(json.clone()).unwrap(), msg);

        let mut empty = json.clone();
        empty["blockHash"] = serde_json::json!([]);
        let err = serde_json::from_value::<MsgNewBlockHashes>(empty).unwrap_err();
        assert!(err.to_string().contains("block hash list is empty"));

        let mut blank = json;
        blank["proposer"] = serde_json::json!(" ");
        assert!(serde_json::from_value::<MsgNewBlockHashes>(blank).is_err());
    }
}
