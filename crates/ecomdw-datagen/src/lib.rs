//! Seeded sample data for the e-commerce warehouse.
//!
//! [`generate`] builds a reproducible [`Dataset`] (same seed and as-of date,
//! same rows) and [`write_csv`] writes it as one `<source>.csv` per entity,
//! ready for [`ecomdw_engine::CsvExtractor`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod catalog;
pub mod records;
mod writer;

use chrono::{Days, NaiveDate, Utc};
use fake::faker::address::en::{
    BuildingNumber, CityName, SecondaryAddress, StateAbbr, StreetName, ZipCode,
};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

pub use records::{
    Customer, Dataset, Location, PaymentMethod, Product, SaleLine, ShippingMethod,
};
pub use writer::{write_csv, DatagenError};

use catalog::{
    BRANDS, COLORS, CUSTOMER_SEGMENTS, GENDERS, LOCATION_TYPES, LOYALTY_TIERS, ORDER_STATUSES,
    PAYMENT_METHODS, PRODUCT_CATEGORIES, REGIONS, SHIPPING_METHODS, SIZES,
};

/// How much data to generate and from which seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub customers: usize,
    pub products_per_subcategory: usize,
    pub order_lines: usize,
    /// "Today" for every relative date.
    pub as_of: NaiveDate,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            customers: 1000,
            products_per_subcategory: 20,
            order_lines: 15_000,
            as_of: Utc::now().date_naive(),
        }
    }
}

/// Build every entity from `config`.
#[must_use]
pub fn generate(config: &GeneratorConfig) -> Dataset {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let as_of = config.as_of;

    let locations = locations(&mut rng, as_of);
    let customers = customers(&mut rng, config.customers, as_of);
    let products = products(&mut rng, config.products_per_subcategory);
    let payment_methods: Vec<PaymentMethod> = PAYMENT_METHODS
        .iter()
        .map(|&(payment_type, payment_provider)| PaymentMethod {
            payment_type: payment_type.into(),
            payment_provider: payment_provider.into(),
        })
        .collect();
    let shipping_methods: Vec<ShippingMethod> = SHIPPING_METHODS
        .iter()
        .map(|&(shipping_type, carrier, estimated_days)| ShippingMethod {
            shipping_type: shipping_type.into(),
            carrier: carrier.into(),
            estimated_days,
        })
        .collect();

    let sales = sales(
        &mut rng,
        config.order_lines,
        as_of,
        &Refs {
            customers: &customers,
            products: &products,
            locations: &locations,
            payment_methods: &payment_methods,
            shipping_methods: &shipping_methods,
        },
    );

    Dataset {
        locations,
        customers,
        products,
        payment_methods,
        shipping_methods,
        sales,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A date uniformly between `min_days` and `max_days` before `as_of`.
fn days_before(rng: &mut StdRng, as_of: NaiveDate, min_days: u64, max_days: u64) -> NaiveDate {
    let back = rng.gen_range(min_days..=max_days);
    as_of.checked_sub_days(Days::new(back)).unwrap_or(as_of)
}

fn street_address(rng: &mut StdRng) -> String {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    format!("{number} {street}")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    // Every catalog list is non-empty.
    &items[rng.gen_range(0..items.len())]
}

// ── Dimensions ───────────────────────────────────────────────────────

fn locations(rng: &mut StdRng, as_of: NaiveDate) -> Vec<Location> {
    let mut out = Vec::new();
    for &(region, cities) in REGIONS {
        for &city in cities {
            for &location_type in LOCATION_TYPES {
                out.push(Location {
                    location_key: format!("LOC-{:04}", out.len() + 1),
                    location_name: format!("{city} {location_type}"),
                    location_type: location_type.into(),
                    address_line1: street_address(rng),
                    city: city.into(),
                    state: StateAbbr().fake_with_rng(rng),
                    postal_code: ZipCode().fake_with_rng(rng),
                    country: "USA".into(),
                    region: region.into(),
                    latitude: (rng.gen_range(-90.0..90.0_f64) * 1e6).round() / 1e6,
                    longitude: (rng.gen_range(-180.0..180.0_f64) * 1e6).round() / 1e6,
                    is_active: true,
                    open_date: days_before(rng, as_of, 365, 5 * 365),
                });
            }
        }
    }
    out
}

fn customers(rng: &mut StdRng, count: usize, as_of: NaiveDate) -> Vec<Customer> {
    (1..=count)
        .map(|i| {
            let join_date = days_before(rng, as_of, 0, 3 * 365);
            Customer {
                customer_key: format!("CUST-{i:06}"),
                first_name: FirstName().fake_with_rng(rng),
                last_name: LastName().fake_with_rng(rng),
                email: SafeEmail().fake_with_rng(rng),
                phone: PhoneNumber().fake_with_rng(rng),
                date_of_birth: days_before(rng, as_of, 18 * 365, 80 * 365),
                gender: (*pick(rng, GENDERS)).into(),
                address_line1: street_address(rng),
                address_line2: rng
                    .gen_bool(0.3)
                    .then(|| SecondaryAddress().fake_with_rng(rng)),
                city: CityName().fake_with_rng(rng),
                state: StateAbbr().fake_with_rng(rng),
                postal_code: ZipCode().fake_with_rng(rng),
                country: "USA".into(),
                customer_segment: (*pick(rng, CUSTOMER_SEGMENTS)).into(),
                loyalty_tier: pick(rng, LOYALTY_TIERS).map(String::from),
                join_date,
            }
        })
        .collect()
}

fn products(rng: &mut StdRng, per_subcategory: usize) -> Vec<Product> {
    let mut out = Vec::new();
    for &(category, subcategories) in PRODUCT_CATEGORIES {
        for &subcategory in subcategories {
            for _ in 0..per_subcategory {
                let cost_price = round2(rng.gen_range(10.0..500.0));
                let markup = rng.gen_range(1.3..2.5);
                let first: String = Word().fake_with_rng(rng);
                let last: String = Word().fake_with_rng(rng);
                out.push(Product {
                    product_key: format!("PROD-{:06}", out.len() + 1),
                    product_name: format!("{} {subcategory} {}", title_case(&first), title_case(&last)),
                    product_description: Sentence(12..13).fake_with_rng(rng),
                    category: category.into(),
                    subcategory: subcategory.into(),
                    brand: (*pick(rng, BRANDS)).into(),
                    supplier: CompanyName().fake_with_rng(rng),
                    unit_price: round2(cost_price * markup),
                    cost_price,
                    size: pick(rng, SIZES).map(String::from),
                    color: pick(rng, COLORS).map(String::from),
                    weight: round2(rng.gen_range(0.1..20.0)),
                    weight_unit: "lbs".into(),
                    is_active: rng.gen::<f64>() > 0.05,
                    discontinued_date: None,
                });
            }
        }
    }
    out
}

// ── Facts ────────────────────────────────────────────────────────────

struct Refs<'a> {
    customers: &'a [Customer],
    products: &'a [Product],
    locations: &'a [Location],
    payment_methods: &'a [PaymentMethod],
    shipping_methods: &'a [ShippingMethod],
}

/// Order-level attributes shared by every line of one order.
struct OrderHeader<'a> {
    order_number: String,
    customer: &'a Customer,
    order_date: NaiveDate,
    ship_date: Option<NaiveDate>,
    location: &'a Location,
    payment: &'a PaymentMethod,
    shipping: &'a ShippingMethod,
    status: &'static str,
    line: i32,
    total: f64,
}

/// Roughly 70% of lines start a new order; the rest extend the current one.
/// `order_total` is the running total of the order so far.
fn sales(rng: &mut StdRng, lines: usize, as_of: NaiveDate, refs: &Refs<'_>) -> Vec<SaleLine> {
    if refs.customers.is_empty() || refs.products.is_empty() {
        return Vec::new();
    }
    let Ok(weights) = WeightedIndex::new(ORDER_STATUSES.iter().map(|(_, w)| *w)) else {
        return Vec::new();
    };
    let mut order_seq = 1000u32;
    let mut out = Vec::with_capacity(lines);
    let mut header: Option<OrderHeader<'_>> = None;

    for _ in 0..lines {
        match header.as_mut() {
            Some(order) if rng.gen::<f64>() >= 0.7 => order.line += 1,
            _ => {
                order_seq += 1;
                let order_date = days_before(rng, as_of, 0, 730);
                let status = ORDER_STATUSES[weights.sample(rng)].0;
                let ship_date = matches!(status, "Shipped" | "Delivered").then(|| {
                    order_date
                        .checked_add_days(Days::new(rng.gen_range(1..=3)))
                        .unwrap_or(order_date)
                });
                header = Some(OrderHeader {
                    order_number: format!("ORD-{order_seq:08}"),
                    customer: pick(rng, refs.customers),
                    order_date,
                    ship_date,
                    location: pick(rng, refs.locations),
                    payment: pick(rng, refs.payment_methods),
                    shipping: pick(rng, refs.shipping_methods),
                    status,
                    line: 1,
                    total: 0.0,
                });
            }
        }
        let Some(order) = header.as_mut() else {
            continue;
        };

        let product = pick(rng, refs.products);
        let quantity: i32 = rng.gen_range(1..=5);
        let gross = product.unit_price * f64::from(quantity);
        let discount_amount = if rng.gen_bool(0.2) {
            round2(gross * rng.gen_range(0.05..0.25))
        } else {
            0.0
        };
        let line_total = round2(gross - discount_amount);
        let line_profit = round2(line_total - product.cost_price * f64::from(quantity));
        let tax_amount = round2(line_total * 0.08);
        let shipping_cost = if order.line == 1 {
            round2(rng.gen_range(5.0..15.0))
        } else {
            0.0
        };
        order.total += line_total + tax_amount + shipping_cost;

        out.push(SaleLine {
            order_number: order.order_number.clone(),
            order_line_number: order.line,
            customer_key: order.customer.customer_key.clone(),
            product_key: product.product_key.clone(),
            order_date: order.order_date,
            ship_date: order.ship_date,
            location_key: order.location.location_key.clone(),
            payment_type: order.payment.payment_type.clone(),
            payment_provider: order.payment.payment_provider.clone(),
            shipping_type: order.shipping.shipping_type.clone(),
            carrier: order.shipping.carrier.clone(),
            quantity,
            unit_price: product.unit_price,
            unit_cost: product.cost_price,
            discount_amount,
            tax_amount,
            shipping_cost,
            line_total,
            line_profit,
            order_total: round2(order.total),
            order_status: order.status.into(),
        });
    }
    out
}
