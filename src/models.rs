//! Record types stored in DynamoDB.
//!
//! The backing tables keep numeric and boolean attributes as strings, so
//! each stored shape has a separate item struct that is decoded into the
//! domain type at the storage boundary.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentinel written over personal fields when a user is soft-anonymized.
pub const CLEARED: &str = "#CLEARED#";

/// A user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    /// Not part of query projections, so absent on read.
    #[serde(rename = "Inserted", default)]
    pub inserted: i64,
}

/// A reservation as the application sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRecord {
    pub reservation_id: String,
    pub from_date: String,
    pub to_date: String,
    pub user_id: String,
    pub deleted: bool,
    pub cost: i64,
    pub deposit: i64,
    pub location: String,
}

/// A reservation as it is stored: boolean and numeric attributes are
/// string-typed in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationItem {
    #[serde(rename = "ReservationId")]
    pub reservation_id: String,
    #[serde(rename = "FromDate")]
    pub from_date: String,
    #[serde(rename = "ToDate")]
    pub to_date: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Deleted")]
    pub deleted: String,
    #[serde(rename = "CostValue")]
    pub cost: String,
    #[serde(rename = "DepositValue")]
    pub deposit: String,
    #[serde(rename = "Location", default)]
    pub location: String,
}

impl TryFrom<ReservationItem> for ReservationRecord {
    type Error = Error;

    fn try_from(item: ReservationItem) -> Result<Self> {
        let deleted = item
            .deleted
            .parse::<bool>()
            .map_err(|_| Error::Decode(format!("invalid Deleted value: {:?}", item.deleted)))?;
        let cost = item
            .cost
            .parse::<i64>()
            .map_err(|_| Error::Decode(format!("invalid CostValue: {:?}", item.cost)))?;
        let deposit = item
            .deposit
            .parse::<i64>()
            .map_err(|_| Error::Decode(format!("invalid DepositValue: {:?}", item.deposit)))?;

        Ok(Self {
            reservation_id: item.reservation_id,
            from_date: item.from_date,
            to_date: item.to_date,
            user_id: item.user_id,
            deleted,
            cost,
            deposit,
            location: item.location,
        })
    }
}

impl From<&ReservationRecord> for ReservationItem {
    fn from(record: &ReservationRecord) -> Self {
        Self {
            reservation_id: record.reservation_id.clone(),
            from_date: record.from_date.clone(),
            to_date: record.to_date.clone(),
            user_id: record.user_id.clone(),
            deleted: record.deleted.to_string(),
            cost: record.cost.to_string(),
            deposit: record.deposit.to_string(),
            location: record.location.clone(),
        }
    }
}

/// Append-only audit row written when a reservation is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionAuditRecord {
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "ReservationId")]
    pub reservation_id: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Message")]
    pub message: String,
}
