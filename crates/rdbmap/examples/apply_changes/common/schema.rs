//! Database schema setup for the apply_changes example

#![allow(dead_code)]

use rdbmap::{OrmError, OrmResult};
use tokio_postgres::Client;

/// Recreate the CUSTOMER / ANORDER tables and seed two customers with one order.
pub async fn setup_shop_schema(client: &Client) -> OrmResult<()> {
    client
        .batch_execute(
            "DROP TABLE IF EXISTS anorder CASCADE;
             DROP TABLE IF EXISTS customer CASCADE;
             CREATE TABLE customer (
                 id INT PRIMARY KEY,
                 lastname TEXT NOT NULL,
                 version INT NOT NULL DEFAULT 0
             );
             CREATE TABLE anorder (
                 id INT PRIMARY KEY,
                 product TEXT NOT NULL,
                 customer_id INT REFERENCES customer(id)
             );
             INSERT INTO customer (id, lastname, version) VALUES (1, 'Smith', 0), (2, 'Jones', 0);
             INSERT INTO anorder (id, product, customer_id) VALUES (100, 'Widget', 2);",
        )
        .await
        .map_err(OrmError::from_db_error)
}
