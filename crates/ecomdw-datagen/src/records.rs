//! One struct per source file. Field names are the CSV headers.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub location_key: String,
    pub location_name: String,
    pub location_type: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_active: bool,
    pub open_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub customer_key: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub customer_segment: String,
    pub loyalty_tier: Option<String>,
    pub join_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub product_key: String,
    pub product_name: String,
    pub product_description: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub supplier: String,
    pub unit_price: f64,
    pub cost_price: f64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub weight: f64,
    pub weight_unit: String,
    pub is_active: bool,
    pub discontinued_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentMethod {
    pub payment_type: String,
    pub payment_provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingMethod {
    pub shipping_type: String,
    pub carrier: String,
    pub estimated_days: i32,
}

/// One order line. Order-level fields repeat on every line of the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleLine {
    pub order_number: String,
    pub order_line_number: i32,
    pub customer_key: String,
    pub product_key: String,
    pub order_date: NaiveDate,
    pub ship_date: Option<NaiveDate>,
    pub location_key: String,
    pub payment_type: String,
    pub payment_provider: String,
    pub shipping_type: String,
    pub carrier: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub shipping_cost: f64,
    pub line_total: f64,
    pub line_profit: f64,
    pub order_total: f64,
    pub order_status: String,
}

/// Everything one generator run produces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub locations: Vec<Location>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub payment_methods: Vec<PaymentMethod>,
    pub shipping_methods: Vec<ShippingMethod>,
    pub sales: Vec<SaleLine>,
}

impl Dataset {
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.locations.len()
            + self.customers.len()
            + self.products.len()
            + self.payment_methods.len()
            + self.shipping_methods.len()
            + self.sales.len()
    }
}
