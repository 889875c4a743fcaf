//! Typed chain messages carried in a transaction body.
//!
//! Each message serializes as `{"typeUrl": "...", "value": {...}}` with
//! camelCase fields, matching the JSON shape the chain's REST layer and
//! dApps exchange.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Type URLs
// ---------------------------------------------------------------------------

pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";
pub const MSG_VOTE_TYPE_URL: &str = "/rsuncitychain.evoting.MsgVote";
pub const MSG_CREATE_PROPOSAL_TYPE_URL: &str = "/rsuncitychain.evoting.MsgCreateProposal";
pub const MSG_CREATE_LANDRECORD_TYPE_URL: &str = "/rsuncitychain.landregistration.MsgCreateLandrecord";
pub const MSG_CREATE_INDIVIDUALRECORD_TYPE_URL: &str =
    "/rsuncitychain.individualregistration.MsgCreateIndividualrecord";

/// Default proposal voting period: seven days, in seconds.
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 604_800;

// ---------------------------------------------------------------------------
// Decimal-string serde helper
// ---------------------------------------------------------------------------

/// Serializes integers as decimal strings, the way the chain's JSON
/// encodes 64-bit and wider values.
pub(crate) mod as_string {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An amount of one denomination, in minimal units.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "as_string")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

// ---------------------------------------------------------------------------
// Message bodies
// ---------------------------------------------------------------------------

/// Bank transfer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgSend {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

/// A vote on an e-voting proposal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgVote {
    pub creator: String,
    #[serde(with = "as_string")]
    pub proposal_id: u64,
    pub option: String,
}

fn default_voting_period() -> u64 {
    DEFAULT_VOTING_PERIOD_SECS
}

fn default_options() -> Vec<String> {
    vec!["yes".to_string(), "no".to_string()]
}

/// A new e-voting proposal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateProposal {
    pub creator: String,
    pub title: String,
    pub description: String,
    /// Voting window in seconds.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,
    #[serde(default = "default_options")]
    pub options: Vec<String>,
}

impl MsgCreateProposal {
    /// Proposal with the default seven-day window and yes/no options.
    pub fn new(creator: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            title: title.into(),
            description: description.into(),
            voting_period: DEFAULT_VOTING_PERIOD_SECS,
            options: default_options(),
        }
    }
}

/// Registration of a land parcel.
///
/// `previous_owner`, `phone_number` and `email_address` are optional and
/// serialize as empty strings when absent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateLandrecord {
    pub creator: String,
    pub land_registration_number: String,
    pub owner_address: String,
    pub location_address: String,
    pub owner_name: String,
    /// `YYYY-MM-DD`.
    pub purchase_date: String,
    #[serde(default)]
    pub previous_owner: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email_address: String,
}

/// Registration of a citizen.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgCreateIndividualrecord {
    pub creator: String,
    pub personal_registration_number: String,
    /// The citizen's wallet address.
    pub address: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub gender: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub telephone_number: String,
}

// ---------------------------------------------------------------------------
// TxMessage
// ---------------------------------------------------------------------------

/// Any message the wallet can sign.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typeUrl", content = "value")]
pub enum TxMessage {
    #[serde(rename = "/cosmos.bank.v1beta1.MsgSend")]
    Send(MsgSend),
    #[serde(rename = "/rsuncitychain.evoting.MsgVote")]
    Vote(MsgVote),
    #[serde(rename = "/rsuncitychain.evoting.MsgCreateProposal")]
    CreateProposal(MsgCreateProposal),
    #[serde(rename = "/rsuncitychain.landregistration.MsgCreateLandrecord")]
    CreateLandrecord(MsgCreateLandrecord),
    #[serde(rename = "/rsuncitychain.individualregistration.MsgCreateIndividualrecord")]
    CreateIndividualrecord(MsgCreateIndividualrecord),
}

impl TxMessage {
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::Send(_) => MSG_SEND_TYPE_URL,
            Self::Vote(_) => MSG_VOTE_TYPE_URL,
            Self::CreateProposal(_) => MSG_CREATE_PROPOSAL_TYPE_URL,
            Self::CreateLandrecord(_) => MSG_CREATE_LANDRECORD_TYPE_URL,
            Self::CreateIndividualrecord(_) => MSG_CREATE_INDIVIDUALRECORD_TYPE_URL,
        }
    }

    /// The address that must sign this message.
    pub fn signer(&self) -> &str {
        match self {
            Self::Send(m) => &m.from_address,
            Self::Vote(m) => &m.creator,
            Self::CreateProposal(m) => &m.creator,
            Self::CreateLandrecord(m) => &m.creator,
            Self::CreateIndividualrecord(m) => &m.creator,
        }
    }

    /// Shorthand for a single-denomination transfer.
    pub fn send(from: impl Into<String>, to: impl Into<String>, amount: Coin) -> Self {
        Self::Send(MsgSend {
            from_address: from.into(),
            to_address: to.into(),
            amount: vec![amount],
        })
    }

    pub fn vote(creator: impl Into<String>, proposal_id: u64, option: impl Into<String>) -> Self {
        Self::Vote(MsgVote {
            creator: creator.into(),
            proposal_id,
            option: option.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_json_shape() -> std::result::Result<(), serde_json::Error> {
        let msg = TxMessage::send("sunc1from", "sunc1to", Coin::new("sunc", 1_500_000));
        let json = serde_json::to_value(&msg)?;
        assert_eq!(json["typeUrl"], MSG_SEND_TYPE_URL);
        assert_eq!(json["value"]["fromAddress"], "sunc1from");
        assert_eq!(json["value"]["toAddress"], "sunc1to");
        assert_eq!(json["value"]["amount"][0]["amount"], "1500000");
        assert_eq!(json["value"]["amount"][0]["denom"], "sunc");

        let back: TxMessage = serde_json::from_value(json)?;
        assert_eq!(back, msg);
        Ok(())
    }

    #[test]
    fn proposal_defaults_apply_on_deserialize() -> std::result::Result<(), serde_json::Error> {
        let json = serde_json::json!({
            "typeUrl": MSG_CREATE_PROPOSAL_TYPE_URL,
            "value": {"creator": "sunc1c", "title": "Parks", "description": "More parks"}
        });
        let msg: TxMessage = serde_json::from_value(json)?;
        match msg {
            TxMessage::CreateProposal(p) => {
                assert_eq!(p.voting_period, DEFAULT_VOTING_PERIOD_SECS);
                assert_eq!(p.options, vec!["yes", "no"]);
            }
            other => panic!("unexpected message {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn vote_proposal_id_is_a_string() -> std::result::Result<(), serde_json::Error> {
        let json = serde_json::to_value(TxMessage::vote("sunc1v", 42, "yes"))?;
        assert_eq!(json["value"]["proposalId"], "42");
        Ok(())
    }

    #[test]
    fn type_url_and_signer() {
        let land = TxMessage::CreateLandrecord(MsgCreateLandrecord {
            creator: "sunc1land".into(),
            ..Default::default()
        });
        assert_eq!(land.type_url(), MSG_CREATE_LANDRECORD_TYPE_URL);
        assert_eq!(land.signer(), "sunc1land");
    }

    #[test]
    fn unknown_type_url_rejected() {
        let json = serde_json::json!({"typeUrl": "/other.Msg", "value": {}});
        assert!(serde_json::from_value::<TxMessage>(json).is_err());
    }
}
