//! Fixed reference lists the generator draws from.

pub(crate) const REGIONS: &[(&str, &[&str])] = &[
    ("Northeast", &["New York", "Boston", "Philadelphia", "Pittsburgh"]),
    ("Southeast", &["Miami", "Atlanta", "Charlotte", "Orlando"]),
    ("Midwest", &["Chicago", "Detroit", "Minneapolis", "Columbus"]),
    ("Southwest", &["Phoenix", "Dallas", "Houston", "Austin"]),
    ("West", &["Los Angeles", "San Francisco", "Seattle", "Denver"]),
];

pub(crate) const LOCATION_TYPES: &[&str] = &["Store", "Warehouse"];

pub(crate) const PRODUCT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Electronics", &["Laptops", "Smartphones", "Tablets", "Headphones", "Cameras"]),
    ("Clothing", &["Men's Wear", "Women's Wear", "Kids' Wear", "Shoes", "Accessories"]),
    ("Home & Garden", &["Furniture", "Decor", "Kitchen", "Bedding", "Garden Tools"]),
    ("Sports", &["Fitness", "Outdoor", "Team Sports", "Water Sports", "Cycling"]),
    ("Books", &["Fiction", "Non-Fiction", "Educational", "Children's", "Comics"]),
];

pub(crate) const BRANDS: &[&str] = &[
    "TechPro", "StyleMax", "HomeEssentials", "SportZone", "BookWorld", "EliteGear",
    "ComfortPlus", "UrbanStyle", "NatureLife", "SmartChoice",
];

pub(crate) const SIZES: &[Option<&str>] = &[Some("S"), Some("M"), Some("L"), Some("XL"), None];

pub(crate) const COLORS: &[Option<&str>] = &[
    Some("Black"), Some("White"), Some("Blue"), Some("Red"), Some("Green"), Some("Gray"), None,
];

pub(crate) const GENDERS: &[&str] = &["Male", "Female", "Other"];

pub(crate) const CUSTOMER_SEGMENTS: &[&str] = &["Premium", "Regular", "Budget"];

pub(crate) const LOYALTY_TIERS: &[Option<&str>] =
    &[Some("Bronze"), Some("Silver"), Some("Gold"), Some("Platinum"), None];

pub(crate) const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("Credit Card", "Visa"),
    ("Credit Card", "Mastercard"),
    ("Credit Card", "American Express"),
    ("Debit Card", "Visa"),
    ("Debit Card", "Mastercard"),
    ("Digital Wallet", "PayPal"),
    ("Digital Wallet", "Apple Pay"),
    ("Digital Wallet", "Google Pay"),
];

pub(crate) const SHIPPING_METHODS: &[(&str, &str, i32)] = &[
    ("Standard", "USPS", 5),
    ("Standard", "UPS", 5),
    ("Express", "FedEx", 2),
    ("Express", "UPS", 2),
    ("Overnight", "FedEx", 1),
    ("Overnight", "UPS", 1),
];

/// Status and its relative weight.
pub(crate) const ORDER_STATUSES: &[(&str, f64)] = &[
    ("Delivered", 0.70),
    ("Shipped", 0.15),
    ("Processing", 0.10),
    ("Cancelled", 0.05),
];
