//! DDL for the star-schema target tables.
//!
//! Dimension tables are keyed by their natural keys; `fact_sales` references
//! them with `ON DELETE CASCADE` so clearing a dimension also clears the
//! facts that point at it.

use pg_escape::quote_identifier;

/// Target tables in load order (parents before children).
pub const TABLES: [&str; 6] = [
    "dim_payment_method",
    "dim_shipping_method",
    "dim_customer",
    "dim_product",
    "dim_location",
    "fact_sales",
];

/// Idempotent DDL for the target tables (`PostgreSQL` dialect).
pub const POSTGRES_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS dim_payment_method (
    payment_method_id SERIAL PRIMARY KEY,
    payment_type TEXT NOT NULL,
    payment_provider TEXT NOT NULL,
    UNIQUE (payment_type, payment_provider)
);

CREATE TABLE IF NOT EXISTS dim_shipping_method (
    shipping_method_id SERIAL PRIMARY KEY,
    shipping_type TEXT NOT NULL,
    carrier TEXT NOT NULL,
    estimated_days INTEGER NOT NULL,
    UNIQUE (shipping_type, carrier)
);

CREATE TABLE IF NOT EXISTS dim_customer (
    customer_id SERIAL PRIMARY KEY,
    customer_key TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    date_of_birth DATE,
    gender TEXT,
    address_line1 TEXT,
    address_line2 TEXT,
    city TEXT,
    state TEXT,
    postal_code TEXT,
    country TEXT,
    customer_segment TEXT,
    loyalty_tier TEXT,
    join_date DATE
);

CREATE TABLE IF NOT EXISTS dim_product (
    product_id SERIAL PRIMARY KEY,
    product_key TEXT NOT NULL UNIQUE,
    product_name TEXT NOT NULL,
    product_description TEXT,
    category TEXT NOT NULL,
    subcategory TEXT,
    brand TEXT,
    supplier TEXT,
    unit_price DOUBLE PRECISION NOT NULL,
    cost_price DOUBLE PRECISION NOT NULL,
    profit_margin DOUBLE PRECISION NOT NULL,
    size TEXT,
    color TEXT,
    weight DOUBLE PRECISION,
    weight_unit TEXT,
    is_active BOOLEAN NOT NULL,
    discontinued_date DATE
);

CREATE TABLE IF NOT EXISTS dim_location (
    location_id SERIAL PRIMARY KEY,
    location_key TEXT NOT NULL UNIQUE,
    location_name TEXT NOT NULL,
    location_type TEXT,
    address_line1 TEXT,
    city TEXT,
    state TEXT,
    postal_code TEXT,
    country TEXT,
    region TEXT,
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    is_active BOOLEAN NOT NULL,
    open_date DATE
);

CREATE TABLE IF NOT EXISTS fact_sales (
    sales_id BIGSERIAL PRIMARY KEY,
    order_number TEXT NOT NULL,
    order_line_number INTEGER NOT NULL,
    customer_key TEXT NOT NULL REFERENCES dim_customer (customer_key) ON DELETE CASCADE,
    product_key TEXT NOT NULL REFERENCES dim_product (product_key) ON DELETE CASCADE,
    location_key TEXT NOT NULL REFERENCES dim_location (location_key) ON DELETE CASCADE,
    date_key INTEGER NOT NULL,
    order_date DATE NOT NULL,
    ship_date DATE,
    days_to_ship INTEGER,
    payment_type TEXT NOT NULL,
    payment_provider TEXT NOT NULL,
    shipping_type TEXT NOT NULL,
    carrier TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price DOUBLE PRECISION NOT NULL,
    unit_cost DOUBLE PRECISION NOT NULL,
    discount_amount DOUBLE PRECISION NOT NULL,
    tax_amount DOUBLE PRECISION NOT NULL,
    shipping_cost DOUBLE PRECISION NOT NULL,
    line_total DOUBLE PRECISION NOT NULL,
    line_profit DOUBLE PRECISION NOT NULL,
    order_total DOUBLE PRECISION NOT NULL,
    order_status TEXT NOT NULL,
    UNIQUE (order_number, order_line_number),
    FOREIGN KEY (payment_type, payment_provider)
        REFERENCES dim_payment_method (payment_type, payment_provider) ON DELETE CASCADE,
    FOREIGN KEY (shipping_type, carrier)
        REFERENCES dim_shipping_method (shipping_type, carrier) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_fact_sales_date_key ON fact_sales (date_key);
";

/// Idempotent DDL for the target tables (`SQLite` dialect).
///
/// Dates are stored as ISO-8601 `TEXT`, booleans as `INTEGER` 0/1.
pub const SQLITE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS dim_payment_method (
    payment_method_id INTEGER PRIMARY KEY AUTOINCREMENT,
    payment_type TEXT NOT NULL,
    payment_provider TEXT NOT NULL,
    UNIQUE (payment_type, payment_provider)
);

CREATE TABLE IF NOT EXISTS dim_shipping_method (
    shipping_method_id INTEGER PRIMARY KEY AUTOINCREMENT,
    shipping_type TEXT NOT NULL,
    carrier TEXT NOT NULL,
    estimated_days INTEGER NOT NULL,
    UNIQUE (shipping_type, carrier)
);

CREATE TABLE IF NOT EXISTS dim_customer (
    customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
    customer_key TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    date_of_birth TEXT,
    gender TEXT,
    address_line1 TEXT,
    address_line2 TEXT,
    city TEXT,
    state TEXT,
    postal_code TEXT,
    country TEXT,
    customer_segment TEXT,
    loyalty_tier TEXT,
    join_date TEXT
);

CREATE TABLE IF NOT EXISTS dim_product (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_key TEXT NOT NULL UNIQUE,
    product_name TEXT NOT NULL,
    product_description TEXT,
    category TEXT NOT NULL,
    subcategory TEXT,
    brand TEXT,
    supplier TEXT,
    unit_price REAL NOT NULL,
    cost_price REAL NOT NULL,
    profit_margin REAL NOT NULL,
    size TEXT,
    color TEXT,
    weight REAL,
    weight_unit TEXT,
    is_active INTEGER NOT NULL,
    discontinued_date TEXT
);

CREATE TABLE IF NOT EXISTS dim_location (
    location_id INTEGER PRIMARY KEY AUTOINCREMENT,
    location_key TEXT NOT NULL UNIQUE,
    location_name TEXT NOT NULL,
    location_type TEXT,
    address_line1 TEXT,
    city TEXT,
    state TEXT,
    postal_code TEXT,
    country TEXT,
    region TEXT,
    latitude REAL,
    longitude REAL,
    is_active INTEGER NOT NULL,
    open_date TEXT
);

CREATE TABLE IF NOT EXISTS fact_sales (
    sales_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_number TEXT NOT NULL,
    order_line_number INTEGER NOT NULL,
    customer_key TEXT NOT NULL REFERENCES dim_customer (customer_key) ON DELETE CASCADE,
    product_key TEXT NOT NULL REFERENCES dim_product (product_key) ON DELETE CASCADE,
    location_key TEXT NOT NULL REFERENCES dim_location (location_key) ON DELETE CASCADE,
    date_key INTEGER NOT NULL,
    order_date TEXT NOT NULL,
    ship_date TEXT,
    days_to_ship INTEGER,
    payment_type TEXT NOT NULL,
    payment_provider TEXT NOT NULL,
    shipping_type TEXT NOT NULL,
    carrier TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    unit_price REAL NOT NULL,
    unit_cost REAL NOT NULL,
    discount_amount REAL NOT NULL,
    tax_amount REAL NOT NULL,
    shipping_cost REAL NOT NULL,
    line_total REAL NOT NULL,
    line_profit REAL NOT NULL,
    order_total REAL NOT NULL,
    order_status TEXT NOT NULL,
    UNIQUE (order_number, order_line_number),
    FOREIGN KEY (payment_type, payment_provider)
        REFERENCES dim_payment_method (payment_type, payment_provider) ON DELETE CASCADE,
    FOREIGN KEY (shipping_type, carrier)
        REFERENCES dim_shipping_method (shipping_type, carrier) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_fact_sales_date_key ON fact_sales (date_key);
";

/// Full `PostgreSQL` bootstrap script: create `schema`, point the session at
/// it, then create the tables.
#[must_use]
pub fn postgres_bootstrap(schema: &str) -> String {
    let ident = quote_identifier(schema);
    format!("CREATE SCHEMA IF NOT EXISTS {ident};\nSET search_path TO {ident};\n{POSTGRES_TABLES}")
}
