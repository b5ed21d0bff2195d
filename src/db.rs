//! DynamoDB record access.
//!
//! Every lookup goes through a filtered scan; the tables carry no secondary
//! indexes. Scans read a single page only, which matches how the backing
//! tables are sized and used today.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;
use serde::Serialize;
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_item};
use tracing::info;

use crate::config::TableProperties;
use crate::models::{DeletionAuditRecord, ReservationItem, ReservationRecord, UserRecord, CLEARED};
use crate::{Error, Result};

const USER_TABLE: &str = "userData";
const USER_PROJECTION: &[&str] = &["FullName", "Email", "Phone", "UserId"];
const RESERVATION_PROJECTION: &[&str] = &[
    "ReservationId",
    "FromDate",
    "ToDate",
    "UserId",
    "Deleted",
    "CostValue",
    "DepositValue",
    "Location",
];

/// DynamoDB client bound to the loaded table mapping.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: DynamoClient,
    tables: TableProperties,
}

impl DynamoStore {
    /// Create a store from a shared SDK config and the loaded table mapping.
    pub fn new(config: &aws_config::SdkConfig, tables: TableProperties) -> Self {
        Self {
            client: DynamoClient::new(config),
            tables,
        }
    }

    /// Scan a table for rows whose `column` equals `value`, returning the
    /// projected attributes of the first result page.
    pub async fn scan_by_field(
        &self,
        column: &str,
        value: &str,
        table: &str,
        projection: &[&str],
    ) -> Result<Vec<HashMap<String, AttributeValue>>> {
        let (expression, mut names) = projection_expression(projection);
        names.insert("#filter".to_string(), column.to_string());

        let output = self
            .client
            .scan()
            .table_name(table)
            .filter_expression("#filter = :value")
            .set_expression_attribute_names(Some(names))
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .projection_expression(expression)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Scan failed on {}: {}", table, e)))?;

        Ok(output.items().to_vec())
    }

    /// Put a serializable record into a table, replacing any existing row
    /// with the same key.
    pub async fn put_item<T: Serialize>(&self, record: &T, table: &str) -> Result<()> {
        let item = to_item(record).map_err(|e| Error::Decode(e.to_string()))?;

        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("PutItem failed on {}: {}", table, e)))?;

        Ok(())
    }

    /// Delete a row by its full key.
    pub async fn delete_by_key(
        &self,
        key: HashMap<String, AttributeValue>,
        table: &str,
    ) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("DeleteItem failed on {}: {}", table, e)))?;

        Ok(())
    }

    /// Overwrite a set of attributes on the row with the given key.
    pub async fn update_fields(
        &self,
        key: HashMap<String, AttributeValue>,
        table: &str,
        updates: &[(&str, AttributeValue)],
    ) -> Result<()> {
        let (expression, names, values) = update_expression(updates);

        self.client
            .update_item()
            .table_name(table)
            .set_key(Some(key))
            .update_expression(expression)
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("UpdateItem failed on {}: {}", table, e)))?;

        Ok(())
    }

    /// Find a user by email address. Absent is not an error.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let table = self.tables.resolve(USER_TABLE)?;
        let items = self
            .scan_by_field("Email", email, &table, USER_PROJECTION)
            .await?;

        for item in items {
            let user: UserRecord = from_item(item).map_err(|e| Error::Decode(e.to_string()))?;
            if user.email == email {
                info!(user_id = %user.user_id, "User record found");
                return Ok(Some(user));
            }
        }

        info!(email, "User record not found");
        Ok(None)
    }

    /// Find a user by id. Absent is not an error.
    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let table = self.tables.resolve(USER_TABLE)?;
        let items = self
            .scan_by_field("UserId", user_id, &table, USER_PROJECTION)
            .await?;

        match items.into_iter().next() {
            Some(item) => {
                let user: UserRecord = from_item(item).map_err(|e| Error::Decode(e.to_string()))?;
                Ok(Some(user))
            }
            None => {
                info!(user_id, "User record not found");
                Ok(None)
            }
        }
    }

    /// Soft-anonymize a user: overwrite name, email and phone with the
    /// cleared sentinel. The row itself stays.
    pub async fn clear_user_data(&self, user_id: &str) -> Result<()> {
        let table = self.tables.resolve(USER_TABLE)?;

        let user = self
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))?;

        info!(user_id, email = %user.email, "Clearing user data");

        let cleared = AttributeValue::S(CLEARED.to_string());
        let key = HashMap::from([(
            "UserId".to_string(),
            AttributeValue::S(user_id.to_string()),
        )]);
        self.update_fields(
            key,
            &table,
            &[
                ("Email", cleared.clone()),
                ("FullName", cleared.clone()),
                ("Phone", cleared),
            ],
        )
        .await?;

        info!(user_id, "User record cleared");
        Ok(())
    }

    /// Append a deletion audit row.
    pub async fn insert_audit_record(
        &self,
        record: &DeletionAuditRecord,
        table: &str,
    ) -> Result<()> {
        info!(
            user_id = %record.user_id,
            reservation_id = %record.reservation_id,
            kind = %record.kind,
            "Inserting deletion audit record"
        );
        self.put_item(record, table).await
    }

    /// Fetch all reservation rows with the given reservation id, decoding
    /// the string-typed stored attributes. A single undecodable row fails
    /// the whole read.
    pub async fn find_reservations_by_id(
        &self,
        reservation_id: &str,
        table: &str,
    ) -> Result<Vec<ReservationRecord>> {
        info!(reservation_id, table, "Querying reservations");

        let items = self
            .scan_by_field("ReservationId", reservation_id, table, RESERVATION_PROJECTION)
            .await?;

        let stored: Vec<ReservationItem> =
            from_items(items).map_err(|e| Error::Decode(e.to_string()))?;

        stored
            .into_iter()
            .map(ReservationRecord::try_from)
            .collect()
    }

    /// Insert a reservation row.
    pub async fn insert_reservation(
        &self,
        record: &ReservationRecord,
        table: &str,
    ) -> Result<()> {
        let item = ReservationItem::from(record);
        self.put_item(&item, table).await?;

        info!(reservation_id = %record.reservation_id, table, "Reservation inserted");
        Ok(())
    }

    /// Physically delete a reservation row by id.
    pub async fn delete_reservation(&self, reservation_id: &str, table: &str) -> Result<()> {
        let key = HashMap::from([(
            "ReservationId".to_string(),
            AttributeValue::S(reservation_id.to_string()),
        )]);
        self.delete_by_key(key, table).await?;

        info!(reservation_id, table, "Reservation deleted");
        Ok(())
    }

    /// Soft-delete a reservation by flipping its stored `Deleted` flag.
    pub async fn mark_reservation_deleted(
        &self,
        reservation_id: &str,
        user_id: &str,
        table: &str,
    ) -> Result<()> {
        let key = HashMap::from([
            (
                "ReservationId".to_string(),
                AttributeValue::S(reservation_id.to_string()),
            ),
            (
                "UserId".to_string(),
                AttributeValue::S(user_id.to_string()),
            ),
        ]);
        self.update_fields(key, table, &[("Deleted", AttributeValue::S("true".to_string()))])
            .await?;

        info!(reservation_id, user_id, "Reservation marked deleted");
        Ok(())
    }
}

/// Build a `SET` update expression with aliased attribute names and values.
fn update_expression(
    updates: &[(&str, AttributeValue)],
) -> (
    String,
    HashMap<String, String>,
    HashMap<String, AttributeValue>,
) {
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    let mut parts = Vec::with_capacity(updates.len());

    for (i, (column, value)) in updates.iter().enumerate() {
        parts.push(format!("#u{} = :v{}", i, i));
        names.insert(format!("#u{}", i), column.to_string());
        values.insert(format!(":v{}", i), value.clone());
    }

    (format!("SET {}", parts.join(", ")), names, values)
}

/// Build a projection expression with aliased attribute names. Aliases keep
/// reserved words such as `Location` usable.
fn projection_expression(columns: &[&str]) -> (String, HashMap<String, String>) {
    let mut names = HashMap::new();
    let mut parts = Vec::with_capacity(columns.len());

    for (i, column) in columns.iter().enumerate() {
        let alias = format!("#p{}", i);
        parts.push(alias.clone());
        names.insert(alias, column.to_string());
    }

    (parts.join(", "), names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_aliases_every_column() {
        let (expression, names) = projection_expression(&["UserId", "Location", "Type"]);
        assert_eq!(expression, "#p0, #p1, #p2");
        assert_eq!(names["#p1"], "Location");
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn update_expression_aliases_fields_and_values() {
        let cleared = AttributeValue::S(CLEARED.to_string());
        let (expression, names, values) = update_expression(&[
            ("Email", cleared.clone()),
            ("FullName", cleared.clone()),
            ("Phone", cleared),
        ]);
        assert_eq!(expression, "SET #u0 = :v0, #u1 = :v1, #u2 = :v2");
        assert_eq!(names["#u1"], "FullName");
        assert_eq!(
            values[":v2"],
            AttributeValue::S("#CLEARED#".to_string())
        );
    }

    #[test]
    fn reservation_items_decode_from_attribute_maps() {
        let item: HashMap<String, AttributeValue> = [
            ("ReservationId", "R1"),
            ("FromDate", "2026-08-01"),
            ("ToDate", "2026-08-03"),
            ("UserId", "U1"),
            ("Deleted", "false"),
            ("CostValue", "100"),
            ("DepositValue", "40"),
            ("Location", "LAV"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
        .collect();

        let stored: Vec<ReservationItem> = from_items(vec![item]).unwrap();
        let records: Result<Vec<ReservationRecord>> = stored
            .into_iter()
            .map(ReservationRecord::try_from)
            .collect();

        let records = records.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].deleted);
        assert_eq!(records[0].cost, 100);
    }

    #[test]
    fn undecodable_row_aborts_the_batch() {
        let good: HashMap<String, AttributeValue> = [
            ("ReservationId", "R1"),
            ("FromDate", "2026-08-01"),
            ("ToDate", "2026-08-03"),
            ("UserId", "U1"),
            ("Deleted", "false"),
            ("CostValue", "100"),
            ("DepositValue", "40"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
        .collect();

        let mut bad = good.clone();
        bad.insert(
            "CostValue".to_string(),
            AttributeValue::S("abc".to_string()),
        );

        let stored: Vec<ReservationItem> = from_items(vec![good, bad]).unwrap();
        let records: Result<Vec<ReservationRecord>> = stored
            .into_iter()
            .map(ReservationRecord::try_from)
            .collect();

        assert!(matches!(records, Err(Error::Decode(_))));
    }
}
