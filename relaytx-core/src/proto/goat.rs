//! `goat.bitcoin.v1` and `goat.relayer.v1`.

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Votes {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(uint64, tag = "2")]
    pub epoch: u64,
    #[prost(bytes = "vec", tag = "3")]
    pub voters: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub signature: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct MsgNewBlockHashes {
    #[prost(string, tag = "1")]
    pub proposer: String,
    #[prost(message, optional, tag = "2")]
    pub vote: Option<Votes>,
    #[prost(uint64, tag = "3")]
    pub start_block_number: u64,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub block_hash: Vec<Vec<u8>>,
}
