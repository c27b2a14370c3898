//! Customer repository for database operations.
//!
//! The customer row carries a `version` column; every mutation of the
//! aggregate (including attaching a new order) must pass an optimistic
//! version check so concurrent writers cannot silently overwrite each other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tamarind_core::{CustomerId, Email, OrderId, Role};

use super::RepositoryError;
use super::orders::{OrderLineRow, OrderRow, assemble_orders};
use crate::models::{Customer, Order, OrderLine};

/// Raw customer row as stored in the database.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    version: i32,
    created_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_customer(self) -> Result<Customer, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Customer {
            id: CustomerId::new(self.id),
            username: self.username,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            version: self.version,
            orders: Vec::new(),
            created_at: self.created_at,
        })
    }
}

/// Fields required to register a new customer.
#[derive(Debug)]
pub struct NewCustomer<'a> {
    pub username: &'a str,
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer by username, without orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, username, email, first_name, last_name, version, created_at
            FROM customer
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Get a customer by ID, without orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, username, email, first_name, last_name, version, created_at
            FROM customer
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Get a customer by username with all orders eagerly loaded.
    ///
    /// The Customer↔Order relationship is bidirectional; callers that intend
    /// to attach a new order must start from this aggregate so both sides
    /// stay consistent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_with_orders(
        &self,
        username: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let Some(mut customer) = self.get_by_username(username).await? else {
            return Ok(None);
        };

        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, total, created_at, version
            FROM shop_order
            WHERE customer_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(customer.id)
        .fetch_all(self.pool)
        .await?;

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT l.order_id, l.article_id, l.article_name, l.unit_price, l.quantity
            FROM order_line l
            JOIN shop_order o ON o.id = l.order_id
            WHERE o.customer_id = $1
            ORDER BY l.id
            ",
        )
        .bind(customer.id)
        .fetch_all(self.pool)
        .await?;

        customer.orders = assemble_orders(orders, lines)?;
        Ok(Some(customer))
    }

    /// Get the stored password hash for a username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as(
            r"
            SELECT password_hash
            FROM customer
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(hash,)| hash))
    }

    /// Get the raw role names granted to a customer.
    ///
    /// Returned as stored (the legacy role-name strings); the auth service
    /// owns the conversion into [`Role`] values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_role_names(&self, id: CustomerId) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r"
            SELECT role
            FROM customer_role
            WHERE customer_id = $1
            ORDER BY role
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(role,)| role).collect())
    }

    /// Get the raw role names granted to a customer, by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_role_names_by_username(
        &self,
        username: &str,
    ) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r"
            SELECT cr.role
            FROM customer_role cr
            JOIN customer c ON c.id = cr.customer_id
            WHERE c.username = $1
            ORDER BY cr.role
            ",
        )
        .bind(username)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(role,)| role).collect())
    }

    /// Register a new customer with the `Customer` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: NewCustomer<'_>) -> Result<Customer, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customer (username, email, first_name, last_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, first_name, last_name, version, created_at
            ",
        )
        .bind(new.username)
        .bind(new.email.as_str())
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query(
            r"
            INSERT INTO customer_role (customer_id, role)
            VALUES ($1, $2)
            ",
        )
        .bind(row.id)
        .bind(Role::Customer.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_customer()
    }

    /// Grant a role to a customer. Granting an already-held role is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_role(&self, id: CustomerId, role: Role) -> Result<(), RepositoryError> {
        self.require_exists(id).await?;

        sqlx::query(
            r"
            INSERT INTO customer_role (customer_id, role)
            VALUES ($1, $2)
            ON CONFLICT (customer_id, role) DO NOTHING
            ",
        )
        .bind(id)
        .bind(role.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Revoke a role from a customer. Revoking an absent role is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_role(&self, id: CustomerId, role: Role) -> Result<(), RepositoryError> {
        self.require_exists(id).await?;

        sqlx::query(
            r"
            DELETE FROM customer_role
            WHERE customer_id = $1 AND role = $2
            ",
        )
        .bind(id)
        .bind(role.as_str())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Attach a new order to a customer as one atomic unit.
    ///
    /// Bumps the customer's version (optimistic check against the version the
    /// caller loaded), inserts the order row, and inserts every line, all in
    /// one transaction. Nothing is observable on failure.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::StaleVersion` if the customer row changed
    /// since the caller loaded it.
    /// Returns `RepositoryError::NotFound` if the customer row is gone.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_order(
        &self,
        customer: &Customer,
        lines: &[OrderLine],
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Version check doubles as the existence check: zero rows means the
        // customer vanished or someone else won the write race.
        let touched = sqlx::query(
            r"
            UPDATE customer
            SET version = version + 1
            WHERE id = $1 AND version = $2
            ",
        )
        .bind(customer.id)
        .bind(customer.version)
        .execute(&mut *tx)
        .await?;

        if touched.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM customer WHERE id = $1")
                .bind(customer.id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(if exists.is_some() {
                RepositoryError::StaleVersion
            } else {
                RepositoryError::NotFound
            });
        }

        let order_row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO shop_order (customer_id, total)
            VALUES ($1, $2)
            RETURNING id, customer_id, total, created_at, version
            ",
        )
        .bind(customer.id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                r"
                INSERT INTO order_line (order_id, article_id, article_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_row.id)
            .bind(line.article_id)
            .bind(&line.article_name)
            .bind(line.unit_price)
            .bind(i64::from(line.quantity))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(order_row.id),
            customer_id: CustomerId::new(order_row.customer_id),
            lines: lines.to_vec(),
            total: order_row.total,
            created_at: order_row.created_at,
            version: order_row.version,
        })
    }

    async fn require_exists(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM customer WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
