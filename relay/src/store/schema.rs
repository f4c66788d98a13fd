// pod-relay/src/store/schema.rs

//! DDL for the relay's tables. Every statement is idempotent.

pub const SCHEMA_STATEMENTS: &[&str] = &[
  r#"CREATE TABLE IF NOT EXISTS shopify_orders (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    financial_status TEXT,
    fulfillment_status TEXT,
    total_price TEXT NOT NULL,
    currency TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    pod_order_id TEXT,
    pod_status TEXT,
    pod_sent_at TIMESTAMPTZ,
    order_data TEXT NOT NULL
  )"#,
  r#"CREATE INDEX IF NOT EXISTS shopify_orders_created_at_idx ON shopify_orders (created_at DESC)"#,
  r#"CREATE TABLE IF NOT EXISTS pod_orders (
    id UUID PRIMARY KEY,
    shopify_order_id TEXT NOT NULL REFERENCES shopify_orders (id),
    pod_api_order_id TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
      CHECK (status IN ('pending', 'sent', 'failed', 'processing', 'completed')),
    products TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    error_message TEXT
  )"#,
  r#"CREATE INDEX IF NOT EXISTS pod_orders_shopify_order_id_idx ON pod_orders (shopify_order_id)"#,
  r#"CREATE TABLE IF NOT EXISTS app_settings (
    id UUID PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
  )"#,
  // Owned by the storefront platform's auth flow; the relay never reads it.
  r#"CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    shop TEXT NOT NULL,
    state TEXT NOT NULL,
    is_online BOOLEAN NOT NULL DEFAULT false,
    scope TEXT,
    expires TIMESTAMPTZ,
    access_token TEXT NOT NULL,
    user_id TEXT,
    first_name TEXT,
    last_name TEXT,
    email TEXT,
    account_owner BOOLEAN NOT NULL DEFAULT false,
    locale TEXT,
    collaborator BOOLEAN DEFAULT false,
    email_verified BOOLEAN DEFAULT false
  )"#,
];
