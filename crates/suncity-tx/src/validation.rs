//! Field validation of transactions before signing.
//!
//! Every check returns the first failure as
//! [`SuncityError::InvalidTransaction`]. Date rules take `today` as an
//! argument so callers (and tests) control the clock.

use chrono::{Datelike, NaiveDate};
use suncity_crypto::address::AddressCodec;
use suncity_types::{Result, SuncityError};

use crate::message::{
    Coin, MsgCreateIndividualrecord, MsgCreateLandrecord, MsgCreateProposal, MsgSend, MsgVote,
    TxMessage,
};
use crate::transaction::{UnsignedTx, MAX_MEMO_CHARS};

pub const MAX_PROPOSAL_TITLE_CHARS: usize = 200;
pub const MAX_PROPOSAL_DESCRIPTION_CHARS: usize = 2000;
/// One day.
pub const MIN_VOTING_PERIOD_SECS: u64 = 86_400;
/// Thirty days.
pub const MAX_VOTING_PERIOD_SECS: u64 = 2_592_000;
pub const MIN_PROPOSAL_OPTIONS: usize = 2;
pub const MAX_PROPOSAL_OPTIONS: usize = 10;
pub const MAX_EMAIL_CHARS: usize = 254;
pub const MIN_CITIZEN_AGE: i32 = 18;
pub const MAX_CITIZEN_AGE: i32 = 150;
pub const GENDERS: [&str; 5] = ["M", "F", "Male", "Female", "Other"];

fn invalid(reason: impl Into<String>) -> SuncityError {
    SuncityError::InvalidTransaction {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Validates the memo, fee and every message of `tx`.
///
/// # Errors
///
/// Returns [`SuncityError::InvalidTransaction`] naming the first field
/// that fails.
pub fn validate_transaction(tx: &UnsignedTx, codec: &AddressCodec, today: NaiveDate) -> Result<()> {
    if tx.body.messages.is_empty() {
        return Err(invalid("transaction has no messages"));
    }
    validate_memo(&tx.body.memo)?;

    let fee = &tx.auth_info.fee;
    if fee.gas_limit == 0 {
        return Err(invalid("fee gasLimit must be positive"));
    }
    for coin in &fee.amount {
        if coin.denom.is_empty() {
            return Err(invalid("fee denom must not be empty"));
        }
    }

    for (index, message) in tx.body.messages.iter().enumerate() {
        validate_message(message, codec, today)
            .map_err(|e| invalid(format!("message {index}: {}", reason_of(e))))?;
    }
    Ok(())
}

fn reason_of(err: SuncityError) -> String {
    match err {
        SuncityError::InvalidTransaction { reason } => reason,
        other => other.to_string(),
    }
}

/// Memos are limited to [`MAX_MEMO_CHARS`] characters.
pub fn validate_memo(memo: &str) -> Result<()> {
    let chars = memo.chars().count();
    if chars > MAX_MEMO_CHARS {
        return Err(invalid(format!(
            "memo is {chars} characters, limit is {MAX_MEMO_CHARS}"
        )));
    }
    Ok(())
}

/// Dispatches to the per-message validator.
pub fn validate_message(message: &TxMessage, codec: &AddressCodec, today: NaiveDate) -> Result<()> {
    match message {
        TxMessage::Send(m) => validate_send(m, codec),
        TxMessage::Vote(m) => validate_vote(m, codec),
        TxMessage::CreateProposal(m) => validate_proposal(m, codec),
        TxMessage::CreateLandrecord(m) => validate_landrecord(m, codec, today),
        TxMessage::CreateIndividualrecord(m) => validate_individualrecord(m, codec, today),
    }
}

// ---------------------------------------------------------------------------
// Per-message rules
// ---------------------------------------------------------------------------

fn require_address(codec: &AddressCodec, field: &str, value: &str) -> Result<()> {
    codec
        .parse(value)
        .map(|_| ())
        .map_err(|e| invalid(format!("{field}: {e}")))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

fn validate_amount(coins: &[Coin]) -> Result<()> {
    if coins.is_empty() {
        return Err(invalid("amount is required"));
    }
    for coin in coins {
        if coin.denom.is_empty() {
            return Err(invalid("amount denom must not be empty"));
        }
        if coin.amount == 0 {
            return Err(invalid(format!("amount of {} must be positive", coin.denom)));
        }
    }
    Ok(())
}

pub fn validate_send(msg: &MsgSend, codec: &AddressCodec) -> Result<()> {
    require_address(codec, "fromAddress", &msg.from_address)?;
    require_address(codec, "toAddress", &msg.to_address)?;
    if msg.from_address.eq_ignore_ascii_case(&msg.to_address) {
        return Err(invalid("cannot send to the sending address"));
    }
    validate_amount(&msg.amount)
}

pub fn validate_vote(msg: &MsgVote, codec: &AddressCodec) -> Result<()> {
    require_address(codec, "creator", &msg.creator)?;
    require_non_empty("option", &msg.option)
}

pub fn validate_proposal(msg: &MsgCreateProposal, codec: &AddressCodec) -> Result<()> {
    require_address(codec, "creator", &msg.creator)?;
    require_non_empty("title", &msg.title)?;
    if msg.title.chars().count() > MAX_PROPOSAL_TITLE_CHARS {
        return Err(invalid(format!(
            "title exceeds {MAX_PROPOSAL_TITLE_CHARS} characters"
        )));
    }
    require_non_empty("description", &msg.description)?;
    if msg.description.chars().count() > MAX_PROPOSAL_DESCRIPTION_CHARS {
        return Err(invalid(format!(
            "description exceeds {MAX_PROPOSAL_DESCRIPTION_CHARS} characters"
        )));
    }
    if !(MIN_VOTING_PERIOD_SECS..=MAX_VOTING_PERIOD_SECS).contains(&msg.voting_period) {
        return Err(invalid(format!(
            "votingPeriod must be between {MIN_VOTING_PERIOD_SECS} and {MAX_VOTING_PERIOD_SECS} seconds"
        )));
    }
    if !(MIN_PROPOSAL_OPTIONS..=MAX_PROPOSAL_OPTIONS).contains(&msg.options.len()) {
        return Err(invalid(format!(
            "a proposal needs {MIN_PROPOSAL_OPTIONS} to {MAX_PROPOSAL_OPTIONS} options"
        )));
    }
    if msg.options.iter().any(|o| o.trim().is_empty()) {
        return Err(invalid("proposal options must not be empty"));
    }
    Ok(())
}

pub fn validate_landrecord(msg: &MsgCreateLandrecord, codec: &AddressCodec, today: NaiveDate) -> Result<()> {
    require_address(codec, "creator", &msg.creator)?;
    if !is_registration_number(&msg.land_registration_number, 3) {
        return Err(invalid(
            "landRegistrationNumber must be 3-20 uppercase letters or digits",
        ));
    }
    require_address(codec, "ownerAddress", &msg.owner_address)?;
    require_non_empty("locationAddress", &msg.location_address)?;
    require_non_empty("ownerName", &msg.owner_name)?;

    let purchased = parse_date("purchaseDate", &msg.purchase_date)?;
    if purchased > today {
        return Err(invalid("purchaseDate cannot be in the future"));
    }

    if !msg.phone_number.is_empty() && !is_phone_number(&msg.phone_number) {
        return Err(invalid("phoneNumber must contain 7-15 digits"));
    }
    if !msg.email_address.is_empty() && !is_email(&msg.email_address) {
        return Err(invalid("emailAddress is not a valid email address"));
    }
    Ok(())
}

pub fn validate_individualrecord(
    msg: &MsgCreateIndividualrecord,
    codec: &AddressCodec,
    today: NaiveDate,
) -> Result<()> {
    require_address(codec, "creator", &msg.creator)?;
    if !is_registration_number(&msg.personal_registration_number, 5) {
        return Err(invalid(
            "personalRegistrationNumber must be 5-20 uppercase letters or digits",
        ));
    }
    require_address(codec, "address", &msg.address)?;

    let born = parse_date("dateOfBirth", &msg.date_of_birth)?;
    if born > today {
        return Err(invalid("dateOfBirth cannot be in the future"));
    }
    let age = age_on(born, today);
    if !(MIN_CITIZEN_AGE..=MAX_CITIZEN_AGE).contains(&age) {
        return Err(invalid(format!(
            "age must be between {MIN_CITIZEN_AGE} and {MAX_CITIZEN_AGE}, got {age}"
        )));
    }

    if !GENDERS.contains(&msg.gender.as_str()) {
        return Err(invalid(format!("gender must be one of {}", GENDERS.join(", "))));
    }
    if !msg.email_address.is_empty() && !is_email(&msg.email_address) {
        return Err(invalid("emailAddress is not a valid email address"));
    }
    if !msg.telephone_number.is_empty() && !is_phone_number(&msg.telephone_number) {
        return Err(invalid("telephoneNumber must contain 7-15 digits"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field formats
// ---------------------------------------------------------------------------

/// `[A-Z0-9]{min,20}`.
fn is_registration_number(value: &str, min: usize) -> bool {
    (min..=20).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// 7 to 15 digits, with an optional leading `+` and spaces, dashes or
/// parentheses as separators.
pub fn is_phone_number(value: &str) -> bool {
    let body = value.strip_prefix('+').unwrap_or(value);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

/// `local@domain.tld`, no whitespace, at most [`MAX_EMAIL_CHARS`].
pub fn is_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_CHARS || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    if value.len() != 10 {
        return Err(invalid(format!("{field} must be YYYY-MM-DD")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(format!("{field} must be a valid YYYY-MM-DD date")))
}

/// Whole years between `born` and `today`.
fn age_on(born: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsgCreateProposal;
    use crate::transaction::Fee;

    const ALICE: &str = "sunc19rl4cm2hmr8afy4kldpxz3fka4jguq0ac0wm7j";

    fn codec() -> AddressCodec {
        AddressCodec::new("sunc").expect("valid prefix")
    }

    fn bob() -> String {
        suncity_crypto::bech32::encode("sunc", &[7u8; 20]).expect("encodes")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
    }

    fn land() -> MsgCreateLandrecord {
        MsgCreateLandrecord {
            creator: ALICE.into(),
            land_registration_number: "LR2024001".into(),
            owner_address: bob(),
            location_address: "12 Harbour Road".into(),
            owner_name: "Ada Sun".into(),
            purchase_date: "2020-05-01".into(),
            ..Default::default()
        }
    }

    fn citizen() -> MsgCreateIndividualrecord {
        MsgCreateIndividualrecord {
            creator: ALICE.into(),
            personal_registration_number: "PRN12345".into(),
            address: bob(),
            date_of_birth: "1990-01-31".into(),
            gender: "Female".into(),
            ..Default::default()
        }
    }

    #[test]
    fn send_rules() {
        let c = codec();
        let ok = TxMessage::send(ALICE, bob(), Coin::new("sunc", 1));
        assert!(validate_message(&ok, &c, today()).is_ok());

        let to_self = TxMessage::send(ALICE, ALICE, Coin::new("sunc", 1));
        assert!(validate_message(&to_self, &c, today()).is_err());

        let zero = TxMessage::send(ALICE, bob(), Coin::new("sunc", 0));
        assert!(validate_message(&zero, &c, today()).is_err());

        let foreign = TxMessage::send(ALICE, "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4", Coin::new("sunc", 1));
        assert!(validate_message(&foreign, &c, today()).is_err());
    }

    #[test]
    fn memo_limit_counts_characters() {
        assert!(validate_memo(&"é".repeat(MAX_MEMO_CHARS)).is_ok());
        assert!(validate_memo(&"a".repeat(MAX_MEMO_CHARS + 1)).is_err());
    }

    #[test]
    fn transaction_reports_message_index() {
        let tx = UnsignedTx::new(
            vec![
                TxMessage::send(ALICE, bob(), Coin::new("sunc", 5)),
                TxMessage::vote(ALICE, 1, ""),
            ],
            Fee::new(Coin::new("sunc", 5000), 200_000),
            "",
        );
        match validate_transaction(&tx, &codec(), today()) {
            Err(SuncityError::InvalidTransaction { reason }) => {
                assert!(reason.starts_with("message 1:"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_transaction_and_zero_gas_rejected() {
        let empty = UnsignedTx::new(Vec::new(), Fee::new(Coin::new("sunc", 0), 1), "");
        assert!(validate_transaction(&empty, &codec(), today()).is_err());

        let no_gas = UnsignedTx::new(
            vec![TxMessage::vote(ALICE, 1, "yes")],
            Fee::new(Coin::new("sunc", 0), 0),
            "",
        );
        assert!(validate_transaction(&no_gas, &codec(), today()).is_err());
    }

    #[test]
    fn proposal_rules() {
        let c = codec();
        let base = MsgCreateProposal::new(ALICE, "Parks", "Plant more trees");
        assert!(validate_proposal(&base, &c).is_ok());

        let mut short = base.clone();
        short.voting_period = 3_600;
        assert!(validate_proposal(&short, &c).is_err());

        let mut one_option = base.clone();
        one_option.options = vec!["yes".into()];
        assert!(validate_proposal(&one_option, &c).is_err());

        let mut blank_option = base.clone();
        blank_option.options = vec!["yes".into(), " ".into()];
        assert!(validate_proposal(&blank_option, &c).is_err());

        let mut long_title = base;
        long_title.title = "t".repeat(MAX_PROPOSAL_TITLE_CHARS + 1);
        assert!(validate_proposal(&long_title, &c).is_err());
    }

    #[test]
    fn landrecord_rules() {
        let c = codec();
        assert!(validate_landrecord(&land(), &c, today()).is_ok());

        let mut lower = land();
        lower.land_registration_number = "lr2024".into();
        assert!(validate_landrecord(&lower, &c, today()).is_err());

        let mut future = land();
        future.purchase_date = "2026-10-17".into();
        assert!(validate_landrecord(&future, &c, today()).is_err());

        let mut bad_date = land();
        bad_date.purchase_date = "2020-02-30".into();
        assert!(validate_landrecord(&bad_date, &c, today()).is_err());

        let mut contact = land();
        contact.phone_number = "+1 (555) 010-9999".into();
        contact.email_address = "ada@sun.city".into();
        assert!(validate_landrecord(&contact, &c, today()).is_ok());

        contact.email_address = "ada@suncity".into();
        assert!(validate_landrecord(&contact, &c, today()).is_err());
    }

    #[test]
    fn individualrecord_age_bounds() {
        let c = codec();
        assert!(validate_individualrecord(&citizen(), &c, today()).is_ok());

        let mut minor = citizen();
        minor.date_of_birth = "2008-10-17".into();
        assert!(validate_individualrecord(&minor, &c, today()).is_err());

        let mut just_adult = citizen();
        just_adult.date_of_birth = "2008-10-16".into();
        assert!(validate_individualrecord(&just_adult, &c, today()).is_ok());

        let mut gender = citizen();
        gender.gender = "x".into();
        assert!(validate_individualrecord(&gender, &c, today()).is_err());
    }

    #[test]
    fn field_formats() {
        assert!(is_phone_number("5550100"));
        assert!(!is_phone_number("12345"));
        assert!(!is_phone_number("555-CALL-NOW"));
        assert!(is_email("a@b.co"));
        assert!(!is_email("a b@c.de"));
        assert!(!is_email("@c.de"));
        assert!(!is_email("a@@c.de"));
        assert!(parse_date("d", "2020-1-01").is_err());
    }
}
