use crate::{encoding::EncodingError, proto};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// An error involving a coin amount or denomination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    /// The coin string had no leading amount
    #[error("coin {0:?} has no amount")]
    MissingAmount(String),
    /// The amount did not fit an unsigned 128-bit integer
    #[error("coin amount {0:?} is not a valid non-negative integer")]
    InvalidAmount(String),
    /// The denomination did not match `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`
    #[error("invalid denomination {0:?}")]
    InvalidDenom(String),
    /// The same denomination appeared twice in one coin list
    #[error("duplicate denomination {0:?}")]
    DuplicateDenom(String),
}

/// An amount of a single denomination, e.g. `1000ugoat`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination
    pub denom: String,
    /// Amount in the smallest unit of `denom`
    #[serde(with = "amount_string")]
    pub amount: u128,
}

impl Coin {
    /// Creates a coin, validating the denomination
    pub fn new<T: Into<String>>(amount: u128, denom: T) -> Result<Self, CoinError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self { denom, amount })
    }

    /// Checks the denomination of an already constructed coin
    pub fn validate(&self) -> Result<(), CoinError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(CoinError::MissingAmount(s.to_owned()))
        }
        let amount = amount.parse::<u128>().map_err(|_| CoinError::InvalidAmount(s.to_owned()))?;
        Coin::new(amount, denom)
    }
}

impl From<&Coin> for proto::Coin {
    fn from(coin: &Coin) -> Self {
        proto::Coin { denom: coin.denom.clone(), amount: coin.amount.to_string() }
    }
}

impl TryFrom<proto::Coin> for Coin {
    type Error = EncodingError;

    fn try_from(raw: proto::Coin) -> Result<Self, Self::Error> {
        // the wire form is a plain decimal: no sign, no leading zeros
        let canonical = !raw.amount.is_empty() &&
            raw.amount.bytes().all(|b| b.is_ascii_digit()) &&
            (raw.amount == "0" || !raw.amount.starts_with('0'));
        let amount = match raw.amount.parse::<u128>() {
            Ok(amount) if canonical => amount,
            _ => return Err(EncodingError::invalid("coin amount", format!("{:?}", raw.amount))),
        };
        Coin::new(amount, raw.denom).map_err(|err| EncodingError::invalid("coin denom", err))
    }
}

/// Parses a comma separated coin list such as `"1000ugoat,5uatom"`.
///
/// The result is sorted by denomination and rejects duplicates, so that two fee
/// strings naming the same coins in a different order encode identically. An empty
/// string is an empty list.
pub fn parse_coins(s: &str) -> Result<Vec<Coin>, CoinError> {
    let mut coins = s
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Coin::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    normalize_coins(&mut coins)?;
    Ok(coins)
}

pub(crate) fn normalize_coins(coins: &mut [Coin]) -> Result<(), CoinError> {
    for coin in coins.iter() {
        coin.validate()?;
    }
    coins.sort_by(|a, b| a.denom.cmp(&b.denom));
    if let Some(dup) = coins.windows(2).find(|w| w[0].denom == w[1].denom) {
        return Err(CoinError::DuplicateDenom(dup[0].denom.clone()))
    }
    Ok(())
}

fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let mut chars = denom.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) &&
        (3..=128).contains(&denom.len()) &&
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_owned()))
    }
}

/// The fee attached to a transaction: the coins paid and the gas limit they buy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Coins paid, sorted by denomination
    pub amount: Vec<Coin>,
    /// Maximum gas the transaction may consume
    pub gas_limit: u64,
}

impl From<&Fee> for proto::Fee {
    fn from(fee: &Fee) -> Self {
        proto::Fee { amount: fee.amount.iter().map(Into::into).collect(), gas_limit: fee.gas_limit }
    }
}

impl TryFrom<proto::Fee> for Fee {
    type Error = EncodingError;

    fn try_from(raw: proto::Fee) -> Result<Self, Self::Error> {
        let amount = raw.amount.into_iter().map(Coin::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Fee { amount, gas_limit: raw.gas_limit })
    }
}

// Amounts travel as decimal strings in JSON, matching the ledger's own APIs.
mod amount_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(amount: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&amount.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(|_| D::Error::custom(format!("invalid coin amount {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_coin() {
        let coin: Coin = "1000ugoat".parse().unwrap();
        assert_eq!(coin, Coin { denom: "ugoat".to_owned(), amount: 1000 });
        assert_eq!(coin.to_string(), "1000ugoat");
    }

    #[test]
    fn rejects_malformed_coins() {
        assert!(matches!("ugoat".parse::<Coin>(), Err(CoinError::MissingAmount(_))));
        assert!(matches!("-5ugoat".parse::<Coin>(), Err(CoinError::MissingAmount(_))));
        assert!(matches!("1000".parse::<Coin>(), Err(CoinError::InvalidDenom(_))));
        assert!(matches!("10u".parse::<Coin>(), Err(CoinError::InvalidDenom(_))));
        assert!(matches!("10ugo at".parse::<Coin>(), Err(CoinError::InvalidDenom(_))));
        assert!(matches!(
            "999999999999999999999999999999999999999999ugoat".parse::<Coin>(),
            Err(CoinError::InvalidAmount(_))
        ));
    }

    #[test]
    fn accepts_ibc_denoms() {
        let coin: Coin = "7ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
            .parse()
            .unwrap();
        assert_eq!(coin.amount, 7);
    }

    #[test]
    fn coin_lists_are_sorted_and_deduplicated() {
        let coins = parse_coins("5uatom, 1000ugoat").unwrap();
        assert_eq!(coins, parse_coins("1000ugoat,5uatom").unwrap());
        assert_eq!(coins[0].denom, "uatom");

        assert_eq!(
            parse_coins("1ugoat,2ugoat"),
            Err(CoinError::DuplicateDenom("ugoat".to_owned()))
        );
        assert!(parse_coins("").unwrap().is_empty());
    }

    #[test]
    fn fee_wire_roundtrip() {
        let fee = Fee { amount: parse_coins("1000ugoat,5uatom").unwrap(), gas_limit: 200_000 };
        let raw = proto::Fee::from(&fee);
        assert_eq!(raw.amount[0], proto::Coin { denom: "uatom".into(), amount: "5".into() });
        assert_eq!(Fee::try_from(raw).unwrap(), fee);
    }

    #[test]
    fn rejects_malformed_wire_amounts() {
        for amount in ["", "-1", "+1", "01", "1.5", "1e3"] {
            let raw = proto::Coin { denom: "ugoat".into(), amount: amount.into() };
            assert!(
                matches!(Coin::try_from(raw), Err(EncodingError::InvalidField { field: "coin amount", .. })),
                "{amount:?}"
            );
        }
        let zero = proto::Coin { denom: "ugoat".into(), amount: "0".into() };
        assert_eq!(Coin::try_from(zero).unwrap().amount, 0);

        let bad_denom = proto::Coin { denom: "u".into(), amount: "1".into() };
        assert!(matches!(Coin::try_from(bad_denom), Err(EncodingError::InvalidField { field: "coin denom", .. })));
    }

    #[test]
    fn amount_serializes_as_string() {
        let coin: Coin = "1000ugoat".parse().unwrap();
        let json = serde_json::to_value(&coin).unwrap();
        assert_eq!(json, serde_json::json!({ "denom": "ugoat", "amount": "1000" }));
    }
}
